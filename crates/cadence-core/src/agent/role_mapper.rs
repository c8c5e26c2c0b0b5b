//! RoleMapper: what the member's role is.

use super::code::AgentCode;
use super::context::AgentContext;
use super::contract::TopicAgent;
use crate::profile::Profile;

#[derive(Debug, Clone, Copy, Default)]
pub struct RoleMapperAgent;

impl TopicAgent for RoleMapperAgent {
    fn code(&self) -> AgentCode {
        AgentCode::RoleMapper
    }

    fn topic_instruction(&self) -> &'static str {
        "Your goal is to understand the member's role in their own words: what \
         they are responsible for, their main duties, and whether they work \
         directly with customers."
    }

    fn extraction_schema(&self) -> &'static str {
        r#"{
  "role_summary": string (one sentence, required),
  "primary_duties": [string],
  "customer_facing": boolean
}"#
    }

    fn prior_value(&self, profile: &Profile) -> Option<String> {
        profile
            .role_summary()
            .map(|summary| format!("their role was described as \"{summary}\""))
    }

    fn follow_up_hint(&self, user_turns: usize) -> Option<&'static str> {
        match user_turns {
            1 => Some("their main day-to-day duties"),
            _ => Some("whether they work directly with customers"),
        }
    }

    fn fallback_opening(&self, ctx: &AgentContext) -> String {
        let member = &ctx.member;
        match member.job_title.as_deref() {
            Some(title) => format!(
                "Hi {}! I'd love to understand your work better. As {}, how would you describe your role in a sentence or two?",
                member.first_name(),
                title
            ),
            None => format!(
                "Hi {}! I'd love to understand your work better. How would you describe your role in a sentence or two?",
                member.first_name()
            ),
        }
    }

    fn fallback_follow_up(&self, _ctx: &AgentContext) -> String {
        "That helps. What are the main things you spend your days on?".to_string()
    }

    fn fallback_closing(&self, ctx: &AgentContext) -> String {
        format!(
            "Thank you, {}! That gives me a much clearer picture of your role.",
            ctx.member.first_name()
        )
    }
}
