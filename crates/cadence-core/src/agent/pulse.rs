//! Pulse: morale and burnout check-in.

use super::code::AgentCode;
use super::context::AgentContext;
use super::contract::TopicAgent;
use crate::profile::Profile;

#[derive(Debug, Clone, Copy, Default)]
pub struct PulseAgent;

impl TopicAgent for PulseAgent {
    fn code(&self) -> AgentCode {
        AgentCode::Pulse
    }

    fn topic_instruction(&self) -> &'static str {
        "Your goal is a quick morale check-in: how the member's week is going, \
         how energized or drained they feel, and what is weighing on them. \
         Be warm and non-judgmental; this is not a performance review."
    }

    fn extraction_schema(&self) -> &'static str {
        r#"{
  "rating": integer 1-5 (1 = very low morale, 5 = very high morale),
  "burnout_risk": "low" | "medium" | "high",
  "stressors": [string],
  "summary": string
}"#
    }

    fn prior_value(&self, profile: &Profile) -> Option<String> {
        profile
            .morale
            .as_ref()
            .map(|morale| format!("last check-in rated their week {}/5", morale.rating))
    }

    fn follow_up_hint(&self, user_turns: usize) -> Option<&'static str> {
        match user_turns {
            1 => Some("what is driving that feeling, and whether workload is sustainable"),
            _ => Some("whether anything would make next week easier"),
        }
    }

    fn fallback_opening(&self, ctx: &AgentContext) -> String {
        format!(
            "Hi {}! Quick check-in: how has your week been going so far?",
            ctx.member.first_name()
        )
    }

    fn fallback_follow_up(&self, _ctx: &AgentContext) -> String {
        "Thanks for sharing. What has been taking up most of your energy lately?".to_string()
    }

    fn fallback_closing(&self, ctx: &AgentContext) -> String {
        format!(
            "Thanks, {}. I appreciate you being open about how things are going. Talk soon!",
            ctx.member.first_name()
        )
    }
}
