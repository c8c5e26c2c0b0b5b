//! PainScanner: friction in workflows and tools.
//!
//! Pain points are multi-valued, so the opening never references a prior
//! value.

use super::code::AgentCode;
use super::context::AgentContext;
use super::contract::TopicAgent;
use crate::profile::Profile;

#[derive(Debug, Clone, Copy, Default)]
pub struct PainScannerAgent;

impl TopicAgent for PainScannerAgent {
    fn code(&self) -> AgentCode {
        AgentCode::PainScanner
    }

    fn topic_instruction(&self) -> &'static str {
        "Your goal is to find ONE concrete friction point in the member's work: \
         what slows them down or frustrates them, which workflow or tool it is \
         tied to, and whether it is getting better or worse."
    }

    fn extraction_schema(&self) -> &'static str {
        r#"{
  "pain_description": string (required),
  "workflow_name": string or null,
  "tool_name": string or null,
  "rating": integer 1-5 (1 = getting much worse, 3 = unchanged, 5 = clearly improving)
}"#
    }

    fn prior_value(&self, _profile: &Profile) -> Option<String> {
        None
    }

    fn follow_up_hint(&self, user_turns: usize) -> Option<&'static str> {
        match user_turns {
            1 => Some("which workflow or tool the problem shows up in"),
            _ => Some("whether it has been getting better or worse recently"),
        }
    }

    fn fallback_opening(&self, ctx: &AgentContext) -> String {
        format!(
            "Hi {}! What's one thing in your work that slows you down or frustrates you right now?",
            ctx.member.first_name()
        )
    }

    fn fallback_follow_up(&self, _ctx: &AgentContext) -> String {
        "That sounds frustrating. Where does it show up most, in a particular tool or process?"
            .to_string()
    }

    fn fallback_closing(&self, ctx: &AgentContext) -> String {
        format!(
            "Thanks for flagging that, {}. It's really useful to know.",
            ctx.member.first_name()
        )
    }
}
