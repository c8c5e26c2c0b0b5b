//! The contract every topic agent satisfies.

use super::code::AgentCode;
use super::context::AgentContext;
use super::prompts::{self, OPENING_CUE, Phase};
use crate::extraction::{ExtractedRecord, validate};
use crate::profile::Profile;
use crate::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::session::ConversationTurn;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// User turns required before a conversation may complete.
pub const DEFAULT_MIN_USER_TURNS: usize = 2;

/// Result of advancing a conversation by one user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Assistant reply shown to the member
    pub message: String,
    pub is_complete: bool,
    /// Present only on completion, and only if extraction succeeded
    pub extracted: Option<ExtractedRecord>,
    /// Topic hint describing what the next question is after
    pub follow_up_hint: Option<String>,
    /// True when the reply is a hardcoded fallback line
    pub used_fallback: bool,
}

/// A conversational topic.
///
/// Implementors provide the topic-specific pieces; the provided methods
/// implement turn-taking, completion gating and extraction identically for
/// every topic.
#[async_trait]
pub trait TopicAgent: Send + Sync {
    fn code(&self) -> AgentCode;

    /// Completion threshold for this topic.
    fn min_user_turns(&self) -> usize {
        DEFAULT_MIN_USER_TURNS
    }

    /// What the conversation is about and how to steer it.
    fn topic_instruction(&self) -> &'static str;

    /// JSON schema description handed to the extraction call.
    fn extraction_schema(&self) -> &'static str;

    /// The profile's current value for this topic, phrased for a prompt.
    fn prior_value(&self, profile: &Profile) -> Option<String>;

    /// What the next follow-up question should go after, given how many
    /// user turns have been recorded.
    fn follow_up_hint(&self, user_turns: usize) -> Option<&'static str>;

    fn fallback_opening(&self, ctx: &AgentContext) -> String;

    fn fallback_follow_up(&self, ctx: &AgentContext) -> String;

    fn fallback_closing(&self, ctx: &AgentContext) -> String;

    /// Threshold in effect for this context.
    fn effective_min_user_turns(&self, ctx: &AgentContext) -> usize {
        ctx.min_user_turns.unwrap_or_else(|| self.min_user_turns()).max(1)
    }

    /// Produces the first assistant utterance.
    ///
    /// Never fails: provider errors and empty replies yield the topic's
    /// fallback opening.
    async fn opening_message(&self, provider: &dyn LlmProvider, ctx: &AgentContext) -> String {
        let request = CompletionRequest::new(
            prompts::conversation_instruction(self, ctx, Phase::Opening),
            vec![ChatMessage::user(OPENING_CUE)],
        )
        .with_temperature(ctx.generation.conversation_temperature)
        .with_max_tokens(ctx.generation.conversation_max_tokens);

        let (message, _) = generate_or_fallback(provider, request, self.code(), || {
            self.fallback_opening(ctx)
        })
        .await;
        message
    }

    /// Records the user's message, then continues or closes the conversation.
    ///
    /// The user turn is appended before the provider is called, so a failed
    /// continuation still counts it. The reply is appended as an assistant
    /// turn.
    async fn advance_turn(
        &self,
        provider: &dyn LlmProvider,
        ctx: &mut AgentContext,
        user_message: &str,
    ) -> TurnOutcome {
        ctx.turns.push(ConversationTurn::user(user_message.trim()));
        let user_turns = ctx.user_turn_count();

        if user_turns < self.effective_min_user_turns(ctx) {
            let hint = self.follow_up_hint(user_turns);
            let request = CompletionRequest::new(
                prompts::conversation_instruction(self, ctx, Phase::FollowUp { hint }),
                history(ctx),
            )
            .with_temperature(ctx.generation.conversation_temperature)
            .with_max_tokens(ctx.generation.conversation_max_tokens);

            let (message, used_fallback) = generate_or_fallback(provider, request, self.code(), || {
                self.fallback_follow_up(ctx)
            })
            .await;
            ctx.turns.push(ConversationTurn::assistant(message.clone()));

            return TurnOutcome {
                message,
                is_complete: false,
                extracted: None,
                follow_up_hint: hint.map(str::to_string),
                used_fallback,
            };
        }

        let extracted = self.extract(provider, ctx).await;

        let request = CompletionRequest::new(
            prompts::conversation_instruction(self, ctx, Phase::Closing),
            history(ctx),
        )
        .with_temperature(ctx.generation.conversation_temperature)
        .with_max_tokens(ctx.generation.conversation_max_tokens);

        let (message, used_fallback) = generate_or_fallback(provider, request, self.code(), || {
            self.fallback_closing(ctx)
        })
        .await;
        ctx.turns.push(ConversationTurn::assistant(message.clone()));

        TurnOutcome {
            message,
            is_complete: true,
            extracted,
            follow_up_hint: None,
            used_fallback,
        }
    }

    /// Derives the structured record from the full history.
    ///
    /// Returns `None` when there is nothing to extract from, when the
    /// provider fails, or when the validator rejects the output.
    async fn extract(&self, provider: &dyn LlmProvider, ctx: &AgentContext) -> Option<ExtractedRecord> {
        if ctx.user_turn_count() == 0 {
            return None;
        }

        let request = CompletionRequest::new(
            prompts::extraction_instruction(self),
            vec![ChatMessage::user(ctx.transcript())],
        )
        .with_temperature(ctx.generation.extraction_temperature)
        .with_max_tokens(ctx.generation.extraction_max_tokens);

        match provider.complete(request).await {
            Ok(raw) => {
                let record = validate(self.code(), &raw);
                if record.is_none() {
                    tracing::warn!(
                        agent = %self.code(),
                        "Extraction output rejected by validator"
                    );
                }
                record
            }
            Err(err) => {
                tracing::warn!(agent = %self.code(), "Extraction call failed: {}", err);
                None
            }
        }
    }
}

fn history(ctx: &AgentContext) -> Vec<ChatMessage> {
    ctx.turns.iter().map(ChatMessage::from).collect()
}

/// Runs a conversational completion, substituting the fallback line when the
/// provider fails or answers with blank text.
async fn generate_or_fallback<F>(
    provider: &dyn LlmProvider,
    request: CompletionRequest,
    code: AgentCode,
    fallback: F,
) -> (String, bool)
where
    F: FnOnce() -> String,
{
    match provider.complete(request).await {
        Ok(text) if !text.trim().is_empty() => (text.trim().to_string(), false),
        Ok(_) => {
            tracing::warn!(agent = %code, provider = provider.name(), "Provider returned empty text, using fallback");
            (fallback(), true)
        }
        Err(err) => {
            tracing::warn!(agent = %code, provider = provider.name(), "Provider call failed, using fallback: {}", err);
            (fallback(), true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::BurnoutRisk;
    use crate::member::{Member, MembershipStatus, Seniority};
    use crate::provider::ProviderError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies in order; fails once the script runs out.
    struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<String, ProviderError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn ok(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
        }

        fn failing() -> Self {
            Self::new(Vec::new())
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(ProviderError::Request {
                        message: "connection refused".to_string(),
                        is_retryable: true,
                    })
                })
        }
    }

    fn dana() -> Member {
        Member {
            id: "m-1".to_string(),
            organization_id: "org-1".to_string(),
            display_name: "Dana Scully".to_string(),
            job_title: Some("Data Analyst".to_string()),
            department_id: None,
            department_name: None,
            seniority: Seniority::IndividualContributor,
            status: MembershipStatus::Active,
        }
    }

    fn context() -> AgentContext {
        AgentContext::new(dana(), None, Vec::new())
    }

    #[tokio::test]
    async fn test_completion_gated_on_user_turns() {
        let provider = ScriptedProvider::failing();
        let agent = AgentCode::FocusTracker.definition();
        let mut ctx = context().with_min_user_turns(3);

        for expected_user_turns in 1..3 {
            let outcome = agent.advance_turn(&provider, &mut ctx, "still on the migration").await;
            assert!(!outcome.is_complete);
            assert!(outcome.extracted.is_none());
            assert_eq!(ctx.user_turn_count(), expected_user_turns);
        }

        let outcome = agent.advance_turn(&provider, &mut ctx, "that's about it").await;
        assert!(outcome.is_complete);
        assert_eq!(ctx.user_turn_count(), 3);
    }

    #[tokio::test]
    async fn test_pulse_conversation_extracts_morale() {
        let provider = ScriptedProvider::ok(&[
            "Hi Dana! How has your week been?",
            "Sorry to hear that. What's been driving it?",
            r#"```json
{"rating": 2, "burnout_risk": "high", "stressors": ["back-to-back meetings"], "summary": "rough week"}
```"#,
            "Thanks for being open, Dana. Take care!",
        ]);
        let agent = AgentCode::Pulse.definition();
        let mut ctx = context();

        let opening = agent.opening_message(&provider, &ctx).await;
        assert_eq!(opening, "Hi Dana! How has your week been?");
        ctx.turns.push(ConversationTurn::assistant(opening));

        let first = agent.advance_turn(&provider, &mut ctx, "Pretty rough week honestly").await;
        assert!(!first.is_complete);
        assert!(!first.used_fallback);
        assert!(first.follow_up_hint.is_some());

        let second = agent
            .advance_turn(&provider, &mut ctx, "Too many meetings, no time to do real work")
            .await;
        assert!(second.is_complete);
        assert_eq!(second.message, "Thanks for being open, Dana. Take care!");

        let Some(ExtractedRecord::Pulse(record)) = second.extracted else {
            panic!("expected a pulse record, got {:?}", second.extracted);
        };
        assert_eq!(record.rating, 2);
        assert_eq!(record.burnout_risk, BurnoutRisk::High);
        assert_eq!(record.stressors, vec!["back-to-back meetings".to_string()]);

        // opening + follow-up + extraction + closing
        assert_eq!(provider.request_count(), 4);
        assert_eq!(ctx.turns.len(), 5);
    }

    #[tokio::test]
    async fn test_provider_failure_uses_fallback_lines() {
        let provider = ScriptedProvider::failing();
        let agent = AgentCode::Pulse.definition();
        let mut ctx = context();

        let opening = agent.opening_message(&provider, &ctx).await;
        assert!(opening.contains("Dana"));

        let outcome = agent.advance_turn(&provider, &mut ctx, "fine I guess").await;
        assert!(outcome.used_fallback);
        assert!(!outcome.message.is_empty());
        assert_eq!(ctx.turns.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_reply_counts_as_failure() {
        let provider = ScriptedProvider::ok(&["   "]);
        let agent = AgentCode::PainScanner.definition();
        let opening = agent.opening_message(&provider, &context()).await;
        assert!(opening.starts_with("Hi Dana"));
    }

    #[tokio::test]
    async fn test_failed_extraction_still_completes() {
        let provider = ScriptedProvider::ok(&[
            "What is your role?",
            "And your main duties?",
            "I could not find anything to extract.",
            "Thanks Dana!",
        ]);
        let agent = AgentCode::RoleMapper.definition();
        let mut ctx = context();

        agent.opening_message(&provider, &ctx).await;
        agent.advance_turn(&provider, &mut ctx, "I analyse data").await;
        let outcome = agent.advance_turn(&provider, &mut ctx, "reports mostly").await;

        assert!(outcome.is_complete);
        assert!(outcome.extracted.is_none());
        assert_eq!(outcome.message, "Thanks Dana!");
    }

    #[tokio::test]
    async fn test_extract_without_user_turns_skips_provider() {
        let provider = ScriptedProvider::ok(&[r#"{"rating": 4}"#]);
        let agent = AgentCode::Pulse.definition();
        assert!(agent.extract(&provider, &context()).await.is_none());
        assert_eq!(provider.request_count(), 0);
    }

    #[test]
    fn test_min_user_turns_never_below_one() {
        let agent = AgentCode::Pulse.definition();
        assert_eq!(agent.effective_min_user_turns(&context()), DEFAULT_MIN_USER_TURNS);
        assert_eq!(agent.effective_min_user_turns(&context().with_min_user_turns(0)), 1);
    }
}
