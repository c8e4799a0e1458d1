//! Client-side conversation about one uploaded blueprint.
//!
//! The machine moves `NoBlueprint -> AwaitingAutoAnalysis -> Interactive` and
//! back to `NoBlueprint` on reset. [`Conversation::step`] is a pure transition:
//! it takes the current value and an [`Event`] and returns the next value plus
//! the [`Effect`]s the host must carry out (issuing analysis requests). The
//! host feeds each request's outcome back in as another event.

use std::sync::Arc;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use strum_macros::Display as StrumDisplay;

use crate::Confidence;
use crate::presenter::clean;

/// Substring identifying the placeholder turn shown while the first analysis runs.
pub const ANALYZING_MARKER: &str = "Analyzing your blueprint";

const ANALYZING_PLACEHOLDER: &str = "🔍 **Analyzing your blueprint...** Please wait while I perform a comprehensive analysis of all rooms, dimensions, and features.";

const FOLLOW_UP_HINT: &str =
    "\n\n---\n\n💬 **You can now ask me follow-up questions about any specific details!**";

/// Characters of each prior turn carried into a follow-up's context summary.
pub const CONTEXT_EXCERPT_CHARS: usize = 150;

pub const QUICK_QUESTIONS: [&str; 6] = [
    "Tell me more about bedroom dimensions",
    "Details on bathroom fixtures",
    "Kitchen layout and appliances",
    "What about storage spaces?",
    "HVAC and electrical details",
    "Accessibility features",
];

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, StrumDisplay)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    fn is_placeholder(&self) -> bool {
        self.role == Role::Assistant && self.content.contains(ANALYZING_MARKER)
    }
}

/// Upload-time derived identifier, e.g. `20240315_142530`.
#[derive(Clone, Debug, PartialEq, Eq, Display, From)]
pub struct BlueprintId(pub String);

/// Identifies one outgoing analysis request. Issued from a counter that
/// survives resets, so a reply can never be mistaken for a later request's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, From)]
pub struct RequestId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct BlueprintSession {
    pub id: BlueprintId,
    pub file_name: String,
    pub image: Arc<[u8]>,
    pub auto_analyzed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    NoBlueprint,
    AwaitingAutoAnalysis,
    Interactive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalysisMode {
    /// The one-off exhaustive first look run right after upload.
    Comprehensive,
    FollowUp,
}

/// What the host must send: the full image again plus the outgoing question.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisRequest {
    pub request_id: RequestId,
    pub blueprint_id: BlueprintId,
    pub file_name: String,
    pub image: Arc<[u8]>,
    pub question: Option<String>,
    pub mode: AnalysisMode,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnalysisOutcome {
    /// The service answered. The answer may itself carry `Confidence::Error`.
    Answered {
        analysis: String,
        confidence: Confidence,
    },
    /// The request never produced an answer (network error, non-2xx status).
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Uploaded {
        id: BlueprintId,
        file_name: String,
        image: Arc<[u8]>,
    },
    AnalysisCompleted {
        request_id: RequestId,
        outcome: AnalysisOutcome,
    },
    QuestionAsked(String),
    Reset,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    RequestAnalysis(AnalysisRequest),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Conversation {
    phase: Phase,
    session: Option<BlueprintSession>,
    turns: Vec<Turn>,
    pending: Option<RequestId>,
    last_request: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> Option<&BlueprintSession> {
        self.session.as_ref()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// True while a request for this session is outstanding.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending
    }

    pub fn accepts_questions(&self) -> bool {
        self.phase == Phase::Interactive && self.pending.is_none()
    }

    /// Suggested follow-ups are offered only while the first analysis is the sole turn.
    pub fn offers_quick_questions(&self) -> bool {
        self.accepts_questions() && self.turns.len() == 1
    }

    pub fn step(self, event: Event) -> (Self, Vec<Effect>) {
        match event {
            Event::Uploaded {
                id,
                file_name,
                image,
            } => self.on_uploaded(id, file_name, image),
            Event::AnalysisCompleted {
                request_id,
                outcome,
            } => self.on_analysis_completed(request_id, outcome),
            Event::QuestionAsked(question) => self.on_question(question),
            Event::Reset => (
                Self {
                    last_request: self.last_request,
                    ..Self::default()
                },
                Vec::new(),
            ),
        }
    }

    fn issue_request(&mut self) -> RequestId {
        self.last_request += 1;
        let request_id = RequestId(self.last_request);
        self.pending = Some(request_id);
        request_id
    }

    fn on_uploaded(
        mut self,
        id: BlueprintId,
        file_name: String,
        image: Arc<[u8]>,
    ) -> (Self, Vec<Effect>) {
        if self.phase != Phase::NoBlueprint {
            return (self, Vec::new());
        }

        let request = AnalysisRequest {
            request_id: self.issue_request(),
            blueprint_id: id.clone(),
            file_name: file_name.clone(),
            image: image.clone(),
            question: None,
            mode: AnalysisMode::Comprehensive,
        };

        self.session = Some(BlueprintSession {
            id,
            file_name,
            image,
            auto_analyzed: false,
        });
        self.turns.clear();
        self.turns.push(Turn::assistant(ANALYZING_PLACEHOLDER));
        self.phase = Phase::AwaitingAutoAnalysis;

        (self, vec![Effect::RequestAnalysis(request)])
    }

    fn on_analysis_completed(
        mut self,
        request_id: RequestId,
        outcome: AnalysisOutcome,
    ) -> (Self, Vec<Effect>) {
        if self.pending != Some(request_id) {
            // stale reply from a session that was reset or replaced
            return (self, Vec::new());
        }

        match self.phase {
            Phase::AwaitingAutoAnalysis => {
                self.turns.retain(|turn| !turn.is_placeholder());
                self.turns.push(Turn::assistant(first_analysis_text(outcome)));
                if let Some(session) = self.session.as_mut() {
                    session.auto_analyzed = true;
                }
                self.phase = Phase::Interactive;
            }
            Phase::Interactive => {
                let raw = match outcome {
                    AnalysisOutcome::Answered { analysis, .. } => analysis,
                    AnalysisOutcome::Failed(reason) => format!("Error: {}", reason),
                };
                self.turns.push(Turn::assistant(clean(&raw)));
            }
            Phase::NoBlueprint => return (self, Vec::new()),
        }

        self.pending = None;
        (self, Vec::new())
    }

    fn on_question(mut self, question: String) -> (Self, Vec<Effect>) {
        let question = question.trim();
        if question.is_empty() || !self.accepts_questions() {
            return (self, Vec::new());
        }
        let Some(session) = self.session.clone() else {
            return (self, Vec::new());
        };

        self.turns.push(Turn::user(question));
        let request = AnalysisRequest {
            request_id: self.issue_request(),
            blueprint_id: session.id,
            file_name: session.file_name,
            image: session.image,
            question: Some(build_follow_up_question(&self.turns, question)),
            mode: AnalysisMode::FollowUp,
        };

        (self, vec![Effect::RequestAnalysis(request)])
    }
}

fn first_analysis_text(outcome: AnalysisOutcome) -> String {
    match outcome {
        AnalysisOutcome::Answered {
            analysis,
            confidence: Confidence::High,
        } => format!("{}{}", clean(&analysis), FOLLOW_UP_HINT),
        AnalysisOutcome::Answered {
            analysis,
            confidence: Confidence::Error,
        } => clean(&analysis),
        AnalysisOutcome::Failed(reason) => format!("❌ Error analyzing blueprint: {}", reason),
    }
}

/// Builds the outgoing question for a follow-up. `turns` must already end with
/// the new user turn. With more than two turns the earlier ones are summarised
/// as flat text, since the remote model keeps no memory between calls.
pub fn build_follow_up_question(turns: &[Turn], question: &str) -> String {
    if turns.len() <= 2 {
        return question.to_string();
    }

    let mut context = String::from("Previous conversation:\n");
    for turn in &turns[..turns.len() - 1] {
        let excerpt: String = turn.content.chars().take(CONTEXT_EXCERPT_CHARS).collect();
        context.push_str(&format!("{}: {}...\n", turn.role, excerpt));
    }
    format!("{}\nNew question: {}", context, question)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blueprint_id() -> BlueprintId {
        BlueprintId::from("20240315_142530".to_string())
    }

    fn uploaded() -> Event {
        Event::Uploaded {
            id: blueprint_id(),
            file_name: "plan.png".to_string(),
            image: Arc::from(vec![1u8, 2, 3]),
        }
    }

    fn high(text: &str) -> AnalysisOutcome {
        AnalysisOutcome::Answered {
            analysis: text.to_string(),
            confidence: Confidence::High,
        }
    }

    /// Completes whatever request is currently outstanding.
    fn reply(conversation: Conversation, outcome: AnalysisOutcome) -> (Conversation, Vec<Effect>) {
        let request_id = conversation
            .pending_request()
            .expect("a request should be outstanding");
        conversation.step(Event::AnalysisCompleted {
            request_id,
            outcome,
        })
    }

    fn answer(conversation: Conversation, text: &str) -> (Conversation, Vec<Effect>) {
        reply(conversation, high(text))
    }

    fn interactive() -> Conversation {
        let (conversation, _) = Conversation::new().step(uploaded());
        let (conversation, _) = answer(conversation, "3 bedrooms, 2 baths.");
        conversation
    }

    fn request_of(effects: &[Effect]) -> &AnalysisRequest {
        match effects {
            [Effect::RequestAnalysis(request)] => request,
            other => panic!("expected one analysis request, got {:?}", other),
        }
    }

    #[test]
    fn upload_starts_comprehensive_analysis_with_placeholder() {
        let (conversation, effects) = Conversation::new().step(uploaded());

        assert_eq!(conversation.phase(), Phase::AwaitingAutoAnalysis);
        assert_eq!(conversation.turns().len(), 1);
        assert!(conversation.turns()[0].content.contains(ANALYZING_MARKER));
        assert!(conversation.is_busy());

        let request = request_of(&effects);
        assert_eq!(request.mode, AnalysisMode::Comprehensive);
        assert_eq!(request.question, None);
        assert_eq!(&*request.image, &[1u8, 2, 3]);
    }

    #[test]
    fn first_result_replaces_placeholder_and_enables_questions() {
        let (conversation, _) = Conversation::new().step(uploaded());
        let (conversation, effects) = answer(conversation, "## Executive Summary\nA small bungalow.");

        assert!(effects.is_empty());
        assert_eq!(conversation.phase(), Phase::Interactive);
        assert_eq!(conversation.turns().len(), 1);
        let first = &conversation.turns()[0];
        assert!(!first.content.contains(ANALYZING_MARKER));
        assert!(first.content.starts_with("A small bungalow."));
        assert!(first.content.contains("follow-up questions"));
        assert!(conversation.session().unwrap().auto_analyzed);
        assert!(conversation.offers_quick_questions());
    }

    #[test]
    fn failed_first_analysis_still_becomes_interactive() {
        let (conversation, _) = Conversation::new().step(uploaded());
        let (conversation, effects) = reply(
            conversation,
            AnalysisOutcome::Failed("connection refused".to_string()),
        );

        assert!(effects.is_empty());
        assert_eq!(conversation.phase(), Phase::Interactive);
        assert_eq!(
            conversation.turns(),
            &[Turn::assistant("❌ Error analyzing blueprint: connection refused")]
        );
    }

    #[test]
    fn error_confidence_first_analysis_has_no_follow_up_hint() {
        let (conversation, _) = Conversation::new().step(uploaded());
        let (conversation, _) = reply(
            conversation,
            AnalysisOutcome::Answered {
                analysis: "Error analyzing blueprint: 401 Unauthorized".to_string(),
                confidence: Confidence::Error,
            },
        );

        assert_eq!(conversation.phase(), Phase::Interactive);
        assert_eq!(
            conversation.turns()[0].content,
            "Error analyzing blueprint: 401 Unauthorized"
        );
    }

    #[test]
    fn first_question_is_sent_verbatim() {
        let (conversation, effects) =
            interactive().step(Event::QuestionAsked("How big is the kitchen?".to_string()));

        let request = request_of(&effects);
        assert_eq!(request.mode, AnalysisMode::FollowUp);
        assert_eq!(request.question.as_deref(), Some("How big is the kitchen?"));
        assert_eq!(conversation.turns().len(), 2);
        assert!(!conversation.accepts_questions());
    }

    #[test]
    fn later_questions_carry_previous_conversation() {
        let (conversation, _) =
            interactive().step(Event::QuestionAsked("How big is the kitchen?".to_string()));
        let (conversation, _) = answer(conversation, "About 12' x 10'.");
        let (conversation, effects) =
            conversation.step(Event::QuestionAsked("And the bedrooms?".to_string()));

        assert_eq!(conversation.turns().len(), 4);
        let question = request_of(&effects).question.clone().unwrap();
        assert!(question.starts_with("Previous conversation:\n"));
        assert!(question.contains("user: How big is the kitchen?...\n"));
        assert!(question.contains("assistant: About 12' x 10'....\n"));
        assert!(question.ends_with("\nNew question: And the bedrooms?"));
        assert!(!question.contains("assistant: And the bedrooms?"));
    }

    #[test]
    fn context_excerpts_truncate_on_char_boundaries() {
        let long = "é".repeat(CONTEXT_EXCERPT_CHARS + 40);
        let turns = vec![
            Turn::assistant(long),
            Turn::user("q1"),
            Turn::assistant("a1"),
            Turn::user("q2"),
        ];
        let question = build_follow_up_question(&turns, "q2");

        let expected = format!("assistant: {}...\n", "é".repeat(CONTEXT_EXCERPT_CHARS));
        assert!(question.contains(&expected));
        assert!(question.ends_with("New question: q2"));
    }

    #[test]
    fn questions_are_ignored_while_a_reply_is_pending() {
        let (conversation, _) = interactive().step(Event::QuestionAsked("First?".to_string()));
        let (conversation, effects) = conversation.step(Event::QuestionAsked("Second?".to_string()));

        assert!(effects.is_empty());
        assert_eq!(conversation.turns().len(), 2);
    }

    #[test]
    fn questions_are_ignored_before_first_analysis() {
        let (conversation, _) = Conversation::new().step(uploaded());
        let (conversation, effects) = conversation.step(Event::QuestionAsked("Rooms?".to_string()));

        assert!(effects.is_empty());
        assert_eq!(conversation.phase(), Phase::AwaitingAutoAnalysis);
        assert_eq!(conversation.turns().len(), 1);
    }

    #[test]
    fn blank_questions_are_ignored() {
        let (conversation, effects) = interactive().step(Event::QuestionAsked("   ".to_string()));
        assert!(effects.is_empty());
        assert_eq!(conversation.turns().len(), 1);
    }

    #[test]
    fn follow_up_transport_failure_becomes_error_turn() {
        let (conversation, _) = interactive().step(Event::QuestionAsked("Rooms?".to_string()));
        let (conversation, _) = reply(
            conversation,
            AnalysisOutcome::Failed("Server error: 500".to_string()),
        );

        assert_eq!(conversation.turns().last().unwrap().content, "Error: Server error: 500");
        assert!(conversation.accepts_questions());
    }

    #[test]
    fn reset_clears_everything() {
        let (conversation, effects) = interactive().step(Event::Reset);

        assert!(effects.is_empty());
        assert_eq!(conversation.phase(), Phase::NoBlueprint);
        assert!(conversation.session().is_none());
        assert!(conversation.turns().is_empty());
        assert!(!conversation.is_busy());
    }

    #[test]
    fn stale_reply_after_reset_is_dropped() {
        let (conversation, effects) = Conversation::new().step(uploaded());
        let stale = request_of(&effects).request_id;
        let (conversation, _) = conversation.step(Event::Reset);
        let (conversation, _) = conversation.step(Event::AnalysisCompleted {
            request_id: stale,
            outcome: high("late"),
        });

        assert_eq!(conversation.phase(), Phase::NoBlueprint);
        assert!(conversation.turns().is_empty());
    }

    #[test]
    fn reupload_in_the_same_second_ignores_the_old_reply() {
        let (conversation, first) = Conversation::new().step(uploaded());
        let old_request = request_of(&first).request_id;
        let (conversation, _) = conversation.step(Event::Reset);
        let (conversation, second) = conversation.step(Event::Uploaded {
            id: blueprint_id(),
            file_name: "office_b.png".to_string(),
            image: Arc::from(vec![9u8]),
        });
        let new_request = request_of(&second).request_id;
        assert_ne!(old_request, new_request);

        let (conversation, _) = conversation.step(Event::AnalysisCompleted {
            request_id: old_request,
            outcome: high("ANALYSIS OF HOUSE A"),
        });
        assert_eq!(conversation.phase(), Phase::AwaitingAutoAnalysis);
        assert!(conversation.turns()[0].content.contains(ANALYZING_MARKER));

        let (conversation, _) = conversation.step(Event::AnalysisCompleted {
            request_id: new_request,
            outcome: high("An open-plan office."),
        });
        assert_eq!(conversation.phase(), Phase::Interactive);
        assert_eq!(conversation.session().unwrap().file_name, "office_b.png");
        assert!(conversation.turns()[0].content.starts_with("An open-plan office."));
    }

    #[test]
    fn reply_to_an_unknown_request_is_dropped() {
        let (conversation, _) = Conversation::new().step(uploaded());
        let (conversation, _) = conversation.step(Event::AnalysisCompleted {
            request_id: RequestId(99),
            outcome: AnalysisOutcome::Failed("late".to_string()),
        });

        assert_eq!(conversation.phase(), Phase::AwaitingAutoAnalysis);
        assert!(conversation.is_busy());
    }

    #[test]
    fn upload_is_ignored_once_a_blueprint_is_loaded() {
        let before = interactive();
        let (after, effects) = before.clone().step(uploaded());

        assert!(effects.is_empty());
        assert_eq!(after, before);
    }

    #[test]
    fn auto_analysis_runs_once_per_upload() {
        let (conversation, first) = Conversation::new().step(uploaded());
        let answered = request_of(&first).request_id;
        let (conversation, second) = answer(conversation, "done");
        let (_, third) = conversation.step(Event::AnalysisCompleted {
            request_id: answered,
            outcome: high("again"),
        });

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert!(third.is_empty());
    }
}
