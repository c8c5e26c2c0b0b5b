//! Prompt templates shared by every topic.

use super::context::AgentContext;
use super::contract::TopicAgent;
use minijinja::{Environment, context};

const CONVERSATION_TEMPLATE: &str = r#"You are {{ agent_name }}, a friendly workplace check-in assistant having a short chat with {{ first_name }}{% if job_title %}, who works as {{ job_title }}{% endif %}{% if department %} in {{ department }}{% endif %}. They are a {{ seniority }} in their organization.

{{ topic_instruction }}
{% if prior %}
What we learned about this last time: {{ prior }}
{% endif %}
Rules:
- Keep every reply to at most three short sentences.
- Ask at most one question per reply.
- Never mention forms, data collection or profiles.

{% if phase == "opening" -%}
Greet {{ first_name }} by name and ask your first question.{% if prior %} Refer to what we learned last time.{% endif %}
{%- elif phase == "follow_up" -%}
Acknowledge what {{ first_name }} just said and ask one follow-up question.{% if hint %} Focus: {{ hint }}{% endif %}
{%- else -%}
Thank {{ first_name }} warmly for their time and close the conversation. Do not ask any further questions.
{%- endif %}"#;

const EXTRACTION_TEMPLATE: &str = r#"You extract structured data from a workplace check-in conversation about: {{ topic }}.

Read the transcript and output a JSON object matching this schema:
{{ schema }}

Use null or an empty list for anything the member did not mention.
IMPORTANT: Output ONLY valid JSON, no markdown formatting or commentary."#;

/// What the next assistant turn has to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase<'a> {
    Opening,
    FollowUp { hint: Option<&'a str> },
    Closing,
}

impl Phase<'_> {
    fn name(&self) -> &'static str {
        match self {
            Phase::Opening => "opening",
            Phase::FollowUp { .. } => "follow_up",
            Phase::Closing => "closing",
        }
    }
}

/// System instruction for a conversational turn.
pub(crate) fn conversation_instruction<A: TopicAgent + ?Sized>(
    agent: &A,
    ctx: &AgentContext,
    phase: Phase<'_>,
) -> String {
    let member = &ctx.member;
    let prior = ctx.profile.as_ref().and_then(|profile| agent.prior_value(profile));
    let hint = match phase {
        Phase::FollowUp { hint } => hint,
        _ => None,
    };

    let rendered = Environment::new().render_str(
        CONVERSATION_TEMPLATE,
        context! {
            agent_name => agent.code().display_name(),
            first_name => member.first_name(),
            job_title => member.job_title.as_deref(),
            department => member.department_name.as_deref(),
            seniority => member.seniority.label(),
            topic_instruction => agent.topic_instruction(),
            prior => prior,
            phase => phase.name(),
            hint => hint,
        },
    );

    match rendered {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!("Failed to render conversation prompt: {}", err);
            format!(
                "You are {}, talking with {}. {}",
                agent.code().display_name(),
                member.first_name(),
                agent.topic_instruction()
            )
        }
    }
}

/// System instruction for extraction.
pub(crate) fn extraction_instruction<A: TopicAgent + ?Sized>(agent: &A) -> String {
    let rendered = Environment::new().render_str(
        EXTRACTION_TEMPLATE,
        context! {
            topic => agent.code().display_name(),
            schema => agent.extraction_schema(),
        },
    );

    match rendered {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!("Failed to render extraction prompt: {}", err);
            format!(
                "Output ONLY a JSON object matching this schema:\n{}",
                agent.extraction_schema()
            )
        }
    }
}

/// Cue sent as the single user message when asking for an opening line.
pub(crate) const OPENING_CUE: &str = "(The member has just opened the conversation.)";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentCode, AgentContext};
    use crate::member::{Member, MembershipStatus, Seniority};
    use crate::profile::{CurrentFocus, Profile};

    fn context_with_profile(profile: Option<Profile>) -> AgentContext {
        let member = Member {
            id: "m-1".to_string(),
            organization_id: "org-1".to_string(),
            display_name: "Dana Scully".to_string(),
            job_title: Some("Data Analyst".to_string()),
            department_id: Some("d-1".to_string()),
            department_name: Some("Finance".to_string()),
            seniority: Seniority::IndividualContributor,
            status: MembershipStatus::Active,
        };
        AgentContext::new(member, profile, Vec::new())
    }

    #[test]
    fn test_opening_instruction_is_personalized() {
        let ctx = context_with_profile(None);
        let agent = AgentCode::Pulse.definition();
        let text = conversation_instruction(agent, &ctx, Phase::Opening);
        assert!(text.contains("Dana"));
        assert!(text.contains("Data Analyst"));
        assert!(text.contains("Finance"));
        assert!(text.contains("individual contributor"));
        assert!(text.contains("Greet Dana by name"));
    }

    #[test]
    fn test_focus_instruction_mentions_previous_focus() {
        let mut profile = Profile::empty("m-1");
        profile.current_focus = Some(CurrentFocus {
            label: "Migrating the data warehouse".to_string(),
            tags: Vec::new(),
            summary: None,
            updated_at: chrono::Utc::now(),
        });
        let ctx = context_with_profile(Some(profile));
        let agent = AgentCode::FocusTracker.definition();
        let text = conversation_instruction(agent, &ctx, Phase::Opening);
        assert!(text.contains("Migrating the data warehouse"));
    }

    #[test]
    fn test_follow_up_instruction_includes_hint() {
        let ctx = context_with_profile(None);
        let agent = AgentCode::WorkflowMapper.definition();
        let text = conversation_instruction(agent, &ctx, Phase::FollowUp { hint: Some("ask about tools") });
        assert!(text.contains("Focus: ask about tools"));
    }

    #[test]
    fn test_extraction_instruction_contains_schema() {
        let agent = AgentCode::RoleMapper.definition();
        let text = extraction_instruction(agent);
        assert!(text.contains("role_summary"));
        assert!(text.contains("Output ONLY valid JSON"));
    }
}
