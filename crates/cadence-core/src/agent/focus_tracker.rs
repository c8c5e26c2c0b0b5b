//! FocusTracker: what the member is focused on right now.

use super::code::AgentCode;
use super::context::AgentContext;
use super::contract::TopicAgent;
use crate::profile::Profile;

#[derive(Debug, Clone, Copy, Default)]
pub struct FocusTrackerAgent;

impl TopicAgent for FocusTrackerAgent {
    fn code(&self) -> AgentCode {
        AgentCode::FocusTracker
    }

    fn topic_instruction(&self) -> &'static str {
        "Your goal is to learn what the member is mainly focused on right now \
         and what that work involves. If a previous focus is known, ask whether \
         it is still their main focus or what replaced it."
    }

    fn extraction_schema(&self) -> &'static str {
        r#"{
  "current_focus_label": string (short label, required),
  "tags": [string],
  "summary": string
}"#
    }

    fn prior_value(&self, profile: &Profile) -> Option<String> {
        profile
            .current_focus
            .as_ref()
            .map(|focus| format!("their focus was \"{}\"", focus.label))
    }

    fn follow_up_hint(&self, user_turns: usize) -> Option<&'static str> {
        match user_turns {
            1 => Some("what that work involves this week"),
            _ => Some("what would help them make progress on it"),
        }
    }

    fn fallback_opening(&self, ctx: &AgentContext) -> String {
        let name = ctx.member.first_name();
        let previous = ctx
            .profile
            .as_ref()
            .and_then(|profile| profile.current_focus.as_ref())
            .map(|focus| focus.label.as_str());
        match previous {
            Some(label) => format!(
                "Hi {name}! Last time you were focused on \"{label}\". Is that still your main focus, or has something else taken over?"
            ),
            None => format!("Hi {name}! What's your main focus at work right now?"),
        }
    }

    fn fallback_follow_up(&self, _ctx: &AgentContext) -> String {
        "Thanks! What does that involve for you this week?".to_string()
    }

    fn fallback_closing(&self, ctx: &AgentContext) -> String {
        format!("Thanks, {}! Good luck with it.", ctx.member.first_name())
    }
}
