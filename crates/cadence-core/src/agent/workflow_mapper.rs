//! WorkflowMapper: recurring workflows, steps and tools.

use super::code::AgentCode;
use super::context::AgentContext;
use super::contract::TopicAgent;
use crate::profile::Profile;

#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowMapperAgent;

impl TopicAgent for WorkflowMapperAgent {
    fn code(&self) -> AgentCode {
        AgentCode::WorkflowMapper
    }

    fn topic_instruction(&self) -> &'static str {
        "Your goal is to map ONE recurring workflow the member runs: give it a \
         short name, walk through its steps in order, and note the tools used \
         at each step and how often it happens. If we already know some of \
         their workflows, ask about a different one."
    }

    fn extraction_schema(&self) -> &'static str {
        r#"{
  "workflow_name": string (short name, required),
  "steps": [string] (in order),
  "tools": [string],
  "frequency": string (e.g. "daily", "weekly", "month-end")
}"#
    }

    fn prior_value(&self, profile: &Profile) -> Option<String> {
        if profile.main_workflows.is_empty() {
            return None;
        }
        let names: Vec<&str> = profile
            .main_workflows
            .iter()
            .map(|workflow| workflow.name.as_str())
            .collect();
        Some(format!("known workflows: {}", names.join(", ")))
    }

    fn follow_up_hint(&self, user_turns: usize) -> Option<&'static str> {
        match user_turns {
            1 => Some("the individual steps, in order"),
            _ => Some("the tools used and how often the workflow runs"),
        }
    }

    fn fallback_opening(&self, ctx: &AgentContext) -> String {
        format!(
            "Hi {}! Could you tell me about a task or process you go through regularly?",
            ctx.member.first_name()
        )
    }

    fn fallback_follow_up(&self, _ctx: &AgentContext) -> String {
        "Got it. Could you walk me through the steps, and which tools you use along the way?"
            .to_string()
    }

    fn fallback_closing(&self, ctx: &AgentContext) -> String {
        format!(
            "Thanks, {}! That walkthrough is really helpful.",
            ctx.member.first_name()
        )
    }
}
