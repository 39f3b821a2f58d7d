use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::answers::AnswerValue;
use crate::Error;

/// The daily check-in questionnaire. Built once, checked by the tests.
pub static QUESTIONS: Lazy<Schema> = Lazy::new(Schema::standard);

/// One allowed value of a choice-style question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChoiceOption {
    Plain(String),
    Labelled { value: String, label: String },
}

impl ChoiceOption {
    pub fn labelled(value: &str, label: &str) -> Self {
        ChoiceOption::Labelled {
            value: value.to_owned(),
            label: label.to_owned(),
        }
    }

    /// The value stored in the answers.
    pub fn value(&self) -> &str {
        match self {
            ChoiceOption::Plain(value) => value,
            ChoiceOption::Labelled { value, .. } => value,
        }
    }

    /// The text shown to the user.
    pub fn label(&self) -> &str {
        match self {
            ChoiceOption::Plain(value) => value,
            ChoiceOption::Labelled { label, .. } => label,
        }
    }
}

impl From<&str> for ChoiceOption {
    fn from(value: &str) -> Self {
        ChoiceOption::Plain(value.to_owned())
    }
}

fn plain(values: &[&str]) -> Vec<ChoiceOption> {
    values.iter().map(|&value| value.into()).collect()
}

/// Bounds and default of a numeric question.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericDomain {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub integer_only: bool,
    #[serde(rename = "defaultValue")]
    pub default: f64,
}

impl NumericDomain {
    pub fn new(min: f64, max: f64, step: f64, default: f64) -> Self {
        Self {
            min,
            max,
            step,
            integer_only: false,
            default,
        }
    }

    pub fn integer(mut self) -> Self {
        self.integer_only = true;
        self
    }

    pub fn clamp(&self, value: f64) -> f64 {
        let value = clamp_value(value, self.min, self.max);
        if self.integer_only {
            round_half_up(value)
        } else {
            value
        }
    }

    /// Increment button: one step up, kept inside the domain.
    pub fn step_up(&self, current: f64) -> f64 {
        self.clamp(current + self.step)
    }

    /// Decrement button: one step down, kept inside the domain.
    pub fn step_down(&self, current: f64) -> f64 {
        self.clamp(current - self.step)
    }

    /// Finalizes typed text into a committed value.
    ///
    /// Empty input, a lone `-` and unparsable text all fall back to `min`.
    /// Integer-only domains truncate toward zero, so `3.7` commits as `3`
    /// and `1e1` as `10`.
    pub fn commit(&self, input: &str) -> f64 {
        let input = input.trim();
        if input.is_empty() || input == "-" {
            return self.min;
        }
        match parse_number(input) {
            Some(value) if self.integer_only => self.clamp(value.trunc()),
            Some(value) => self.clamp(value),
            None => self.min,
        }
    }
}

/// Reads typed numeric text. Rust's own spellings of infinity and NaN are
/// not numbers here; only `Infinity` with an optional sign is.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    match text {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub fn clamp_value(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

// Halves round toward positive infinity, so -2.5 becomes -2.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Input type of a question together with the constraints that type needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum QuestionKind {
    Number(NumericDomain),
    Range(NumericDomain),
    Radio { options: Vec<ChoiceOption> },
    RadioList { options: Vec<ChoiceOption> },
    RadioChip { options: Vec<ChoiceOption> },
    YesNo,
    MultiSelect { options: Vec<ChoiceOption> },
}

impl QuestionKind {
    pub fn name(&self) -> &'static str {
        match self {
            QuestionKind::Number(_) => "number",
            QuestionKind::Range(_) => "range",
            QuestionKind::Radio { .. } => "radio",
            QuestionKind::RadioList { .. } => "radioList",
            QuestionKind::RadioChip { .. } => "radioChip",
            QuestionKind::YesNo => "yesNo",
            QuestionKind::MultiSelect { .. } => "multiSelect",
        }
    }

    pub fn domain(&self) -> Option<&NumericDomain> {
        match self {
            QuestionKind::Number(domain) | QuestionKind::Range(domain) => Some(domain),
            _ => None,
        }
    }

    pub fn options(&self) -> Option<&[ChoiceOption]> {
        match self {
            QuestionKind::Radio { options }
            | QuestionKind::RadioList { options }
            | QuestionKind::RadioChip { options }
            | QuestionKind::MultiSelect { options } => Some(options),
            QuestionKind::Number(_) | QuestionKind::Range(_) | QuestionKind::YesNo => None,
        }
    }
}

/// Weak link to another question: this one is only asked when the other
/// currently holds `value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dependency {
    pub field: String,
    pub value: AnswerValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sublabel: Option<String>,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Dependency>,
}

impl Question {
    pub fn new(id: &str, label: &str, kind: QuestionKind) -> Self {
        Self {
            id: id.to_owned(),
            label: label.to_owned(),
            sublabel: None,
            kind,
            depends_on: None,
        }
    }

    pub fn with_sublabel(mut self, sublabel: &str) -> Self {
        self.sublabel = Some(sublabel.to_owned());
        self
    }

    pub fn depends_on(mut self, field: &str, value: impl Into<AnswerValue>) -> Self {
        self.depends_on = Some(Dependency {
            field: field.to_owned(),
            value: value.into(),
        });
        self
    }

    /// Value an unanswered question starts with.
    pub fn default_value(&self) -> AnswerValue {
        match &self.kind {
            QuestionKind::Number(domain) | QuestionKind::Range(domain) => {
                AnswerValue::Number(domain.default)
            }
            QuestionKind::MultiSelect { .. } => AnswerValue::List(Vec::new()),
            _ => AnswerValue::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub key: String,
    pub title: String,
    pub icon: String,
    pub questions: Vec<Question>,
}

impl Section {
    pub fn new(key: &str, title: &str, icon: &str, questions: Vec<Question>) -> Self {
        Self {
            key: key.to_owned(),
            title: title.to_owned(),
            icon: icon.to_owned(),
            questions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub sections: Vec<Section>,
}

impl Schema {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Every question, ordered by section then by declaration order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections
            .iter()
            .flat_map(|section| section.questions.iter())
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions().nth(index)
    }

    /// Looks a question up by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions().find(|question| question.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids must be unique across sections and every dependency must name
    /// an existing question.
    pub fn check(&self) -> Result<(), Error> {
        let mut seen = HashSet::new();
        for question in self.questions() {
            if !seen.insert(question.id.as_str()) {
                return Err(Error::DuplicateQuestion(question.id.clone()));
            }
        }
        for question in self.questions() {
            if let Some(dependency) = &question.depends_on {
                if !seen.contains(dependency.field.as_str()) {
                    return Err(Error::DanglingDependency {
                        id: question.id.clone(),
                        field: dependency.field.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn standard() -> Self {
        let hours = |default| NumericDomain::new(0.0, 24.0, 0.5, default);
        Schema::new(vec![
            Section::new(
                "profile",
                "Profile",
                "👤",
                vec![
                    Question::new(
                        "ageRange",
                        "Age Range",
                        QuestionKind::Radio {
                            options: plain(&["<18", "18-24", "25-35", "36+"]),
                        },
                    ),
                    Question::new(
                        "gender",
                        "Gender",
                        QuestionKind::Radio {
                            options: plain(&["Male", "Female"]),
                        },
                    ),
                    Question::new(
                        "currentStatus",
                        "Current Status",
                        QuestionKind::RadioList {
                            options: plain(&["Student", "Employed", "Both", "Neither"]),
                        },
                    ),
                ],
            ),
            Section::new(
                "routine",
                "Routine",
                "🌙",
                vec![
                    Question::new("sleepHours", "Sleep", QuestionKind::Number(hours(7.0)))
                        .with_sublabel("Hours last night"),
                    Question::new(
                        "workStudyHours",
                        "Work/Study",
                        QuestionKind::Number(hours(8.0)),
                    )
                    .with_sublabel("Hours today"),
                    Question::new("hobbiesHours", "Hobbies", QuestionKind::Number(hours(1.0)))
                        .with_sublabel("Me-time hours"),
                    Question::new(
                        "commuteTime",
                        "Commute today (mins)",
                        QuestionKind::RadioChip {
                            options: plain(&["15", "45", "60", "150"]),
                        },
                    )
                    .with_sublabel("Select the closest number"),
                ],
            ),
            Section::new(
                "loadPressure",
                "Load & Pressure",
                "✅",
                vec![
                    Question::new(
                        "tasksToComplete",
                        "Tasks to complete",
                        QuestionKind::Number(NumericDomain::new(0.0, 50.0, 1.0, 5.0).integer()),
                    ),
                    Question::new(
                        "taskDifficulty",
                        "Overall Task Difficulty",
                        QuestionKind::Radio {
                            options: plain(&["Easy", "Moderate", "Hard"]),
                        },
                    ),
                    Question::new(
                        "feelingUnderPressure",
                        "Feeling under pressure?",
                        QuestionKind::Radio {
                            options: plain(&[
                                "Not at all",
                                "Slightly overwhelmed",
                                "Yes, very overwhelmed",
                            ]),
                        },
                    ),
                ],
            ),
            Section::new(
                "socialHome",
                "Social & Home",
                "👥",
                vec![
                    Question::new(
                        "socialInteractionHours",
                        "Interaction (Hrs)",
                        QuestionKind::Number(hours(2.0)),
                    ),
                    Question::new(
                        "interactionQuality",
                        "Quality",
                        QuestionKind::Radio {
                            options: vec![
                                ChoiceOption::labelled("low", "Low (negative or draining)"),
                                ChoiceOption::labelled("medium", "Medium (neutral)"),
                                ChoiceOption::labelled("high", "High (positive, supportive)"),
                            ],
                        },
                    ),
                    Question::new(
                        "homeEnvironment",
                        "Home Environment Satisfaction",
                        QuestionKind::Radio {
                            options: plain(&["Dissatisfied", "Satisfied"]),
                        },
                    )
                    .with_sublabel(
                        "(Consider comfort, support, noise, privacy, and general atmosphere)",
                    ),
                ],
            ),
            Section::new(
                "mentalState",
                "Mental State",
                "🧠",
                vec![
                    Question::new(
                        "stressfulEvents",
                        "Did you experience any challenging moments today?",
                        QuestionKind::YesNo,
                    ),
                    Question::new(
                        "stressTriggers",
                        "Which of these situations apply? (Select all that fit your day)",
                        QuestionKind::MultiSelect {
                            options: plain(&[
                                "Arguing/conflict with someone",
                                "Academic/work failure or poor performance",
                                "Transportation problem / car issue",
                                "Financial stress",
                                "Health-related stress",
                                "Bad weather",
                            ]),
                        },
                    )
                    .depends_on("stressfulEvents", true),
                    Question::new(
                        "overthinkingFrequency",
                        "Overthinking frequency",
                        QuestionKind::Radio {
                            options: plain(&["Never", "Rarely", "Often", "Almost always"]),
                        },
                    ),
                ],
            ),
        ])
    }
}
