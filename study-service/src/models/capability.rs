//! Study-aid capabilities offered by the gateway.
//!
//! Every text endpoint shares one request/response contract; a `Capability`
//! carries everything that differs between them: the route, the single
//! response key, the system instruction sent to the model and, for the
//! structured capabilities, the JSON schema the model must follow.

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Summary,
    Quiz,
    Explanation,
    StudyPlan,
    Flashcards,
}

/// Which configured model a capability runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Fast,
    Pro,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::Summary,
        Capability::Quiz,
        Capability::Explanation,
        Capability::StudyPlan,
        Capability::Flashcards,
    ];

    pub fn route(self) -> &'static str {
        match self {
            Capability::Summary => "/summarize",
            Capability::Quiz => "/generate-quiz",
            Capability::Explanation => "/explain",
            Capability::StudyPlan => "/study-plan",
            Capability::Flashcards => "/flashcards",
        }
    }

    /// The only key present in this capability's JSON response.
    pub fn response_key(self) -> &'static str {
        match self {
            Capability::Summary => "summary",
            Capability::Quiz => "quiz",
            Capability::Explanation => "explanation",
            Capability::StudyPlan => "plan",
            Capability::Flashcards => "flashcards",
        }
    }

    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Summary => "summary",
            Capability::Quiz => "quiz",
            Capability::Explanation => "explanation",
            Capability::StudyPlan => "study_plan",
            Capability::Flashcards => "flashcards",
        }
    }

    pub fn model_tier(self) -> ModelTier {
        match self {
            Capability::Quiz | Capability::StudyPlan => ModelTier::Pro,
            Capability::Summary | Capability::Explanation | Capability::Flashcards => {
                ModelTier::Fast
            }
        }
    }

    pub fn system_prompt(self) -> &'static str {
        match self {
            Capability::Summary => {
                "You are an expert academic summarizer. Provide three versions of summary for \
                 the text: short (bullet points), medium (paragraphs), and long (detailed \
                 analysis). Return valid JSON matching the requested schema."
            }
            Capability::Quiz => {
                "Generate a quiz with exactly 10 questions based on the provided text: 5 MCQs \
                 (multiple choice), 3 True/False, and 2 short answers. For each question, \
                 identify the specific 'topic' and provide a 'reviewSuggestion' explaining \
                 exactly what the user should re-read if they get it wrong. Ensure questions \
                 test deep understanding, not just surface facts. Return valid JSON."
            }
            Capability::Explanation => {
                "Explain the core concepts of the provided text as if I am 5 years old (ELI5 \
                 mode). Use analogies and simple language. Be engaging and encouraging."
            }
            Capability::StudyPlan => {
                "Create a personalized, day-by-day study plan to master this topic. Include \
                 learning goals and a difficulty assessment. Be realistic about time \
                 requirements. Return valid JSON."
            }
            Capability::Flashcards => {
                "Generate 10 high-quality flashcards for the provided text. Focus on key \
                 terms, definitions, and important concepts. Return valid JSON."
            }
        }
    }

    /// Response schema in Gemini's OpenAPI subset. `None` means free text.
    pub fn output_schema(self) -> Option<Value> {
        match self {
            Capability::Explanation => None,
            Capability::Summary => Some(json!({
                "type": "OBJECT",
                "properties": {
                    "short": { "type": "STRING" },
                    "medium": { "type": "STRING" },
                    "long": { "type": "STRING" }
                },
                "required": ["short", "medium", "long"]
            })),
            Capability::Quiz => Some(json!({
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING" },
                        "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "answer": { "type": "STRING" },
                        "type": { "type": "STRING", "enum": ["mcq", "true-false", "short-answer"] },
                        "explanation": { "type": "STRING" },
                        "topic": { "type": "STRING" },
                        "reviewSuggestion": { "type": "STRING" }
                    },
                    "required": ["question", "answer", "type", "explanation", "topic", "reviewSuggestion"]
                }
            })),
            Capability::StudyPlan => Some(json!({
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING" },
                    "difficulty": { "type": "STRING", "enum": ["Beginner", "Intermediate", "Advanced"] },
                    "learningGoals": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "schedule": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "day": { "type": "INTEGER" },
                                "focus": { "type": "STRING" },
                                "tasks": { "type": "ARRAY", "items": { "type": "STRING" } }
                            }
                        }
                    }
                }
            })),
            Capability::Flashcards => Some(json!({
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "front": { "type": "STRING" },
                        "back": { "type": "STRING" }
                    }
                }
            })),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
