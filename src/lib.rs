//! Daily stress check-in: questionnaire schema, answer engine and the
//! weighted-sum stress classifier.

pub mod answers;
pub mod bulk;
pub mod outcome;
pub mod schema;
pub mod scoring;
pub mod telemetry;
pub mod validation;

pub use answers::{is_active, AnswerValue, Answers};
pub use bulk::{read_bulk, read_bulk_with};
pub use outcome::{result_content, Probabilities, ResultContent, ResultPage, Suggestion};
pub use schema::{
    clamp_value, ChoiceOption, Dependency, NumericDomain, Question, QuestionKind, Schema, Section,
    QUESTIONS,
};
pub use scoring::{classify, Assessment, LabelMapping, Scorer, Stress, StressCategory};
pub use validation::{progress, validate_field, validate_form, FieldError, FormValidation};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No question with this id exists in the schema.
    #[error("unknown question: {0}")]
    IllegalQuestion(String),
    /// The value does not fit the question's type or options.
    #[error("illegal answer for {id}: expected {expected}")]
    IllegalAnswer { id: String, expected: &'static str },
    #[error("duplicate question id: {0}")]
    DuplicateQuestion(String),
    #[error("question {id} depends on unknown question {field}")]
    DanglingDependency { id: String, field: String },
    /// Active questions left unanswered or invalid at submission.
    #[error("questionnaire is incomplete: {}", missing.join(", "))]
    NotFulfilled { missing: Vec<String> },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Telemetry(#[from] telemetry::TelemetryError),
}
