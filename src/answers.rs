use std::collections::BTreeMap;
use std::io;

use serde::{Deserialize, Serialize};

use crate::schema::{Question, QuestionKind, Schema};
use crate::Error;

/// Current value of one answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl AnswerValue {
    /// Whether the user has given a response. `false` counts as answered;
    /// null, blank text and an empty selection do not.
    pub fn is_answered(&self) -> bool {
        match self {
            AnswerValue::Null => false,
            AnswerValue::Text(text) => !text.trim().is_empty(),
            AnswerValue::List(items) => !items.is_empty(),
            AnswerValue::Bool(_) | AnswerValue::Number(_) => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            AnswerValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        AnswerValue::Bool(value)
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        AnswerValue::Number(value)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_owned())
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(items: Vec<&str>) -> Self {
        AnswerValue::List(items.into_iter().map(str::to_owned).collect())
    }
}

static NULL: AnswerValue = AnswerValue::Null;

/// Question id to current value, for one questionnaire session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Answers {
    values: BTreeMap<String, AnswerValue>,
}

impl Answers {
    /// Every question of the schema at its default value.
    pub fn initial(schema: &Schema) -> Self {
        Self {
            values: schema
                .questions()
                .map(|question| (question.id.clone(), question.default_value()))
                .collect(),
        }
    }

    /// Reads a JSON object of answers on top of the schema defaults.
    pub fn load<R: io::Read>(schema: &Schema, reader: R) -> Result<Self, Error> {
        let raw: BTreeMap<String, AnswerValue> = serde_json::from_reader(reader)?;
        let mut answers = Self::initial(schema);
        for (id, value) in raw {
            answers.insert(schema, &id, value)?;
        }
        Ok(answers)
    }

    /// Missing entries read as null.
    pub fn get(&self, id: &str) -> &AnswerValue {
        self.values.get(id).unwrap_or(&NULL)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.values.iter().map(|(id, value)| (id.as_str(), value))
    }

    /// Stores an answer after checking it fits the question. Null is
    /// always accepted and clears the answer.
    pub fn insert(&mut self, schema: &Schema, id: &str, value: AnswerValue) -> Result<(), Error> {
        let question = schema
            .question(id)
            .ok_or_else(|| Error::IllegalQuestion(id.to_owned()))?;
        check_shape(question, &value)?;
        self.values.insert(question.id.clone(), value);
        Ok(())
    }

    // Unchecked write for batch input, where stale or unknown labels must
    // survive to be scored as 0.
    pub(crate) fn put(&mut self, id: &str, value: AnswerValue) {
        self.values.insert(id.to_owned(), value);
    }

    /// Selects or deselects one option of a multi-select answer. Selection
    /// order is kept.
    pub fn toggle(&mut self, schema: &Schema, id: &str, option: &str) -> Result<(), Error> {
        let question = schema
            .question(id)
            .ok_or_else(|| Error::IllegalQuestion(id.to_owned()))?;
        let QuestionKind::MultiSelect { options } = &question.kind else {
            return Err(illegal(question));
        };
        if !options.iter().any(|candidate| candidate.value() == option) {
            return Err(illegal(question));
        }
        let mut selected = self.get(id).as_list().map(<[String]>::to_vec).unwrap_or_default();
        match selected.iter().position(|item| item == option) {
            Some(index) => {
                selected.remove(index);
            }
            None => selected.push(option.to_owned()),
        }
        self.values.insert(question.id.clone(), AnswerValue::List(selected));
        Ok(())
    }
}

impl FromIterator<(String, AnswerValue)> for Answers {
    /// Builds answers as-is, without a schema check.
    fn from_iter<I: IntoIterator<Item = (String, AnswerValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

fn illegal(question: &Question) -> Error {
    Error::IllegalAnswer {
        id: question.id.clone(),
        expected: question.kind.name(),
    }
}

fn check_shape(question: &Question, value: &AnswerValue) -> Result<(), Error> {
    let fits = match (&question.kind, value) {
        (_, AnswerValue::Null) => true,
        // Typed text is kept so validation can report it.
        (QuestionKind::Number(_) | QuestionKind::Range(_), AnswerValue::Number(_))
        | (QuestionKind::Number(_) | QuestionKind::Range(_), AnswerValue::Text(_)) => true,
        (QuestionKind::YesNo, AnswerValue::Bool(_)) => true,
        (QuestionKind::MultiSelect { options }, AnswerValue::List(items)) => items
            .iter()
            .all(|item| options.iter().any(|option| option.value() == item)),
        (
            QuestionKind::Radio { options }
            | QuestionKind::RadioList { options }
            | QuestionKind::RadioChip { options },
            AnswerValue::Text(text),
        ) => options.iter().any(|option| option.value() == text),
        _ => false,
    };
    if fits {
        Ok(())
    } else {
        Err(illegal(question))
    }
}

/// A question is active when it has no dependency, or when the referenced
/// answer equals the required value exactly (`false` is not null).
pub fn is_active(question: &Question, answers: &Answers) -> bool {
    match &question.depends_on {
        None => true,
        Some(dependency) => answers.get(&dependency.field) == &dependency.value,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::QUESTIONS;

    #[test]
    fn test_initial() {
        let answers = Answers::initial(&QUESTIONS);
        assert_eq!(answers.iter().count(), QUESTIONS.len());
        for question in QUESTIONS.questions() {
            assert_eq!(answers.get(&question.id), &question.default_value());
        }
        assert_eq!(answers, Answers::initial(&QUESTIONS));
    }

    #[test]
    fn test_is_answered() {
        assert!(!AnswerValue::Null.is_answered());
        assert!(!AnswerValue::from("   ").is_answered());
        assert!(!AnswerValue::List(vec![]).is_answered());
        assert!(AnswerValue::Bool(false).is_answered());
        assert!(AnswerValue::Number(0.0).is_answered());
        assert!(AnswerValue::from("Easy").is_answered());
    }

    #[test]
    fn test_insert() {
        let mut answers = Answers::initial(&QUESTIONS);
        assert!(answers.insert(&QUESTIONS, "sleepHours", 6.5.into()).is_ok());
        assert!(answers.insert(&QUESTIONS, "sleepHours", "six".into()).is_ok());
        assert!(answers.insert(&QUESTIONS, "taskDifficulty", "Hard".into()).is_ok());
        assert!(answers.insert(&QUESTIONS, "interactionQuality", "low".into()).is_ok());
        assert!(answers.insert(&QUESTIONS, "stressfulEvents", false.into()).is_ok());
        assert!(answers.insert(&QUESTIONS, "stressfulEvents", AnswerValue::Null).is_ok());

        assert!(matches!(
            answers.insert(&QUESTIONS, "mood", 1.0.into()),
            Err(Error::IllegalQuestion(_))
        ));
        assert!(matches!(
            answers.insert(&QUESTIONS, "taskDifficulty", "Medium".into()),
            Err(Error::IllegalAnswer { expected: "radio", .. })
        ));
        assert!(answers.insert(&QUESTIONS, "stressfulEvents", "yes".into()).is_err());
        assert!(answers
            .insert(&QUESTIONS, "stressTriggers", vec!["Bad weather", "Aliens"].into())
            .is_err());
    }

    #[test]
    fn test_toggle() {
        let mut answers = Answers::initial(&QUESTIONS);
        answers.toggle(&QUESTIONS, "stressTriggers", "Bad weather").unwrap();
        answers.toggle(&QUESTIONS, "stressTriggers", "Financial stress").unwrap();
        assert_eq!(
            answers.get("stressTriggers"),
            &AnswerValue::from(vec!["Bad weather", "Financial stress"])
        );
        answers.toggle(&QUESTIONS, "stressTriggers", "Bad weather").unwrap();
        assert_eq!(
            answers.get("stressTriggers"),
            &AnswerValue::from(vec!["Financial stress"])
        );
        assert!(answers.toggle(&QUESTIONS, "stressTriggers", "Aliens").is_err());
        assert!(answers.toggle(&QUESTIONS, "gender", "Male").is_err());
    }

    #[test]
    fn test_is_active() {
        let triggers = QUESTIONS.question("stressTriggers").unwrap();
        let sleep = QUESTIONS.question("sleepHours").unwrap();
        let mut answers = Answers::initial(&QUESTIONS);

        assert!(is_active(sleep, &answers));
        assert!(!is_active(triggers, &answers));

        answers.insert(&QUESTIONS, "stressfulEvents", false.into()).unwrap();
        assert!(!is_active(triggers, &answers));

        answers.insert(&QUESTIONS, "stressfulEvents", true.into()).unwrap();
        assert!(is_active(triggers, &answers));
    }

    #[test]
    fn test_dependency_on_false_is_not_null() {
        let question =
            Question::new("followUp", "Follow up", QuestionKind::YesNo).depends_on("gate", false);
        let mut answers: Answers = [("gate".to_owned(), AnswerValue::Null)].into_iter().collect();
        assert!(!is_active(&question, &answers));
        answers = [("gate".to_owned(), AnswerValue::Bool(false))].into_iter().collect();
        assert!(is_active(&question, &answers));
    }

    #[test]
    fn test_load() {
        let json = r#"{"sleepHours": 4, "stressfulEvents": true, "stressTriggers": ["Bad weather"], "gender": null}"#;
        let answers = Answers::load(&QUESTIONS, json.as_bytes()).unwrap();
        assert_eq!(answers.get("sleepHours"), &AnswerValue::Number(4.0));
        assert_eq!(answers.get("stressfulEvents"), &AnswerValue::Bool(true));
        assert_eq!(answers.get("workStudyHours"), &AnswerValue::Number(8.0));
        assert_eq!(answers.get("gender"), &AnswerValue::Null);

        assert!(Answers::load(&QUESTIONS, r#"{"mood": 3}"#.as_bytes()).is_err());
        assert!(Answers::load(&QUESTIONS, "not json".as_bytes()).is_err());
    }
}
