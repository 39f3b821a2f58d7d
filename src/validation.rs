use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::answers::{is_active, AnswerValue, Answers};
use crate::schema::{parse_number, NumericDomain, Question, Schema};

/// Why a single field was rejected. The Display text is what the user sees.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("This field is required")]
    Required,
    #[error("Please enter a valid number")]
    NotANumber,
    #[error("Value must be at least {min}")]
    BelowMin { min: f64 },
    #[error("Value must be at most {max}")]
    AboveMax { max: f64 },
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn validate_field(question: &Question, value: &AnswerValue) -> Result<(), FieldError> {
    match question.kind.domain() {
        Some(domain) => validate_numeric(domain, value),
        None if value.is_answered() => Ok(()),
        None => Err(FieldError::Required),
    }
}

fn validate_numeric(domain: &NumericDomain, value: &AnswerValue) -> Result<(), FieldError> {
    let number = match value {
        AnswerValue::Null => return Err(FieldError::Required),
        // Blank text is unanswered here, not the number 0.
        AnswerValue::Text(text) if text.trim().is_empty() => return Err(FieldError::Required),
        AnswerValue::Text(text) => parse_number(text),
        AnswerValue::Number(number) => Some(*number),
        AnswerValue::Bool(_) | AnswerValue::List(_) => None,
    };
    let number = match number {
        Some(number) if !number.is_nan() => number,
        _ => return Err(FieldError::NotANumber),
    };
    if number < domain.min {
        return Err(FieldError::BelowMin { min: domain.min });
    }
    if number > domain.max {
        return Err(FieldError::AboveMax { max: domain.max });
    }
    Ok(())
}

/// Outcome of checking the whole questionnaire before submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValidation {
    pub field_errors: BTreeMap<String, FieldError>,
    /// Labels of the failing questions, in schema order.
    pub missing_fields: Vec<String>,
}

impl FormValidation {
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }
}

/// Validates every active question. Inactive questions never report an
/// error, whatever their value.
pub fn validate_form(schema: &Schema, answers: &Answers) -> FormValidation {
    let mut result = FormValidation::default();
    for question in schema.questions() {
        if !is_active(question, answers) {
            continue;
        }
        if let Err(error) = validate_field(question, answers.get(&question.id)) {
            result.missing_fields.push(question.label.clone());
            result.field_errors.insert(question.id.clone(), error);
        }
    }
    tracing::debug!(
        errors = result.field_errors.len(),
        missing = ?result.missing_fields,
        "validated questionnaire"
    );
    result
}

/// Share of active questions that currently validate, as a rounded
/// percentage in `0..=100`.
pub fn progress(schema: &Schema, answers: &Answers) -> u8 {
    let (done, total) = schema
        .questions()
        .filter(|question| is_active(question, answers))
        .fold((0usize, 0usize), |(done, total), question| {
            let ok = validate_field(question, answers.get(&question.id)).is_ok();
            (done + usize::from(ok), total + 1)
        });
    if total == 0 {
        return 100;
    }
    ((done * 100 + total / 2) / total) as u8
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::{QuestionKind, QUESTIONS};

    fn question(id: &str) -> &'static Question {
        QUESTIONS.question(id).unwrap()
    }

    #[test]
    fn test_numeric_bounds() {
        let sleep = question("sleepHours");
        assert_eq!(
            validate_field(sleep, &(-1.0).into()),
            Err(FieldError::BelowMin { min: 0.0 })
        );
        assert_eq!(
            validate_field(sleep, &25.0.into()),
            Err(FieldError::AboveMax { max: 24.0 })
        );
        assert!(validate_field(sleep, &0.0.into()).is_ok());
        assert!(validate_field(sleep, &24.0.into()).is_ok());
        assert!(validate_field(sleep, &7.5.into()).is_ok());

        let tasks = question("tasksToComplete");
        assert!(validate_field(tasks, &50.0.into()).is_ok());
        assert_eq!(
            validate_field(tasks, &51.0.into()).unwrap_err().to_string(),
            "Value must be at most 50"
        );
        assert_eq!(
            validate_field(tasks, &(-1.0).into()).unwrap_err().to_string(),
            "Value must be at least 0"
        );
    }

    #[test]
    fn test_fractional_bound_message() {
        let question = Question::new(
            "nap",
            "Nap",
            QuestionKind::Range(NumericDomain::new(0.5, 2.5, 0.5, 1.0)),
        );
        assert_eq!(
            validate_field(&question, &0.0.into()).unwrap_err().to_string(),
            "Value must be at least 0.5"
        );
        assert_eq!(
            validate_field(&question, &3.0.into()).unwrap_err().to_string(),
            "Value must be at most 2.5"
        );
    }

    #[test]
    fn test_numeric_text() {
        let sleep = question("sleepHours");
        assert!(validate_field(sleep, &" 6.5 ".into()).is_ok());
        assert_eq!(validate_field(sleep, &"".into()), Err(FieldError::Required));
        assert_eq!(validate_field(sleep, &"six".into()), Err(FieldError::NotANumber));
        assert_eq!(validate_field(sleep, &AnswerValue::Null), Err(FieldError::Required));
        assert_eq!(validate_field(sleep, &true.into()), Err(FieldError::NotANumber));
        assert_eq!(
            validate_field(sleep, &f64::NAN.into()),
            Err(FieldError::NotANumber)
        );
    }

    #[test]
    fn test_infinity_text() {
        let sleep = question("sleepHours");
        for text in ["inf", "infinity", "-inf", "INF", "Inf"] {
            assert_eq!(validate_field(sleep, &text.into()), Err(FieldError::NotANumber));
        }
        assert_eq!(
            validate_field(sleep, &"Infinity".into()),
            Err(FieldError::AboveMax { max: 24.0 })
        );
        assert_eq!(
            validate_field(sleep, &"-Infinity".into()),
            Err(FieldError::BelowMin { min: 0.0 })
        );
        assert!(validate_field(question("tasksToComplete"), &"1e1".into()).is_ok());
    }

    #[test]
    fn test_choice_required() {
        let events = question("stressfulEvents");
        assert!(validate_field(events, &false.into()).is_ok());
        assert_eq!(validate_field(events, &AnswerValue::Null), Err(FieldError::Required));

        let difficulty = question("taskDifficulty");
        assert_eq!(validate_field(difficulty, &"  ".into()), Err(FieldError::Required));
        assert!(validate_field(difficulty, &"Easy".into()).is_ok());

        let triggers = question("stressTriggers");
        assert_eq!(
            validate_field(triggers, &AnswerValue::List(vec![])),
            Err(FieldError::Required)
        );
    }

    #[test]
    fn test_validate_form_initial() {
        let answers = Answers::initial(&QUESTIONS);
        let result = validate_form(&QUESTIONS, &answers);
        assert!(!result.is_valid());
        assert_eq!(
            result.missing_fields,
            vec![
                "Age Range",
                "Gender",
                "Current Status",
                "Commute today (mins)",
                "Overall Task Difficulty",
                "Feeling under pressure?",
                "Quality",
                "Home Environment Satisfaction",
                "Did you experience any challenging moments today?",
                "Overthinking frequency",
            ]
        );
        assert!(!result.field_errors.contains_key("stressTriggers"));
        assert!(!result.field_errors.contains_key("sleepHours"));
    }

    #[test]
    fn test_validate_form_skips_inactive() {
        let mut answers = Answers::initial(&QUESTIONS);
        answers
            .insert(&QUESTIONS, "stressTriggers", AnswerValue::Null)
            .unwrap();
        answers
            .insert(&QUESTIONS, "stressfulEvents", false.into())
            .unwrap();
        let result = validate_form(&QUESTIONS, &answers);
        assert!(!result.field_errors.contains_key("stressTriggers"));

        answers
            .insert(&QUESTIONS, "stressfulEvents", true.into())
            .unwrap();
        let result = validate_form(&QUESTIONS, &answers);
        assert_eq!(
            result.field_errors.get("stressTriggers"),
            Some(&FieldError::Required)
        );
    }

    #[test]
    fn test_progress() {
        let mut answers = Answers::initial(&QUESTIONS);
        // five numeric defaults out of fifteen active questions
        assert_eq!(progress(&QUESTIONS, &answers), 33);
        answers.insert(&QUESTIONS, "sleepHours", 30.0.into()).unwrap();
        assert_eq!(progress(&QUESTIONS, &answers), 27);
        assert_eq!(progress(&Schema::new(vec![]), &answers), 100);
    }
}
