//! Weighted-sum stress heuristic.
//!
//! Each factor is a step function of one answer. Bands are tried in order
//! and the first match wins, so `sleepHours = 4` scores 20 and never also
//! the `< 7` band. Bounds are strict: 5 hours of sleep falls through to the
//! `< 7` band. Answers that are missing, null or of the wrong shape match
//! no band and contribute 0.
//!
//! The sum is classified as low below 35, medium below 65, high otherwise.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::answers::{AnswerValue, Answers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressCategory {
    Low,
    Medium,
    High,
}

impl StressCategory {
    pub const ALL: [StressCategory; 3] =
        [StressCategory::Low, StressCategory::Medium, StressCategory::High];

    pub fn from_score(score: i32) -> Self {
        if score < 35 {
            StressCategory::Low
        } else if score < 65 {
            StressCategory::Medium
        } else {
            StressCategory::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StressCategory::Low => "low",
            StressCategory::Medium => "medium",
            StressCategory::High => "high",
        }
    }
}

impl fmt::Display for StressCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stress category: {0}")]
pub struct ParseCategoryError(String);

impl FromStr for StressCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StressCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ParseCategoryError(s.to_owned()))
    }
}

/// Inputs of the heuristic, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Factor {
    SleepHours,
    WorkStudyHours,
    HobbiesHours,
    TasksToComplete,
    TaskDifficulty,
    FeelingUnderPressure,
    SocialInteractionHours,
    InteractionQuality,
    HomeEnvironment,
    StressfulEvents,
    OverthinkingFrequency,
}

impl Factor {
    /// Question id the factor reads.
    pub fn field(&self) -> &'static str {
        match self {
            Factor::SleepHours => "sleepHours",
            Factor::WorkStudyHours => "workStudyHours",
            Factor::HobbiesHours => "hobbiesHours",
            Factor::TasksToComplete => "tasksToComplete",
            Factor::TaskDifficulty => "taskDifficulty",
            Factor::FeelingUnderPressure => "feelingUnderPressure",
            Factor::SocialInteractionHours => "socialInteractionHours",
            Factor::InteractionQuality => "interactionQuality",
            Factor::HomeEnvironment => "homeEnvironment",
            Factor::StressfulEvents => "stressfulEvents",
            Factor::OverthinkingFrequency => "overthinkingFrequency",
        }
    }
}

/// Which option labels the two label-keyed factors are matched against.
///
/// `Legacy` keeps the historical tables, whose pressure labels
/// (`Not stressed`, `Slightly stressed`, `Highly stressed`) and `Medium`
/// difficulty never occur among the questionnaire's options, so those
/// answers score 0. `Corrected` matches the options actually offered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelMapping {
    #[default]
    Legacy,
    Corrected,
}

#[derive(Debug, Clone, Copy)]
enum Band {
    Below(f64),
    Above(f64),
}

impl Band {
    fn matches(&self, value: f64) -> bool {
        match *self {
            Band::Below(bound) => value < bound,
            Band::Above(bound) => value > bound,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    Bands(&'static [(Band, i32)]),
    Labels(&'static [(&'static str, i32)]),
    Events {
        base: i32,
        per_trigger: i32,
        triggers: &'static str,
    },
}

const SLEEP: &[(Band, i32)] = &[
    (Band::Below(5.0), 20),
    (Band::Below(7.0), 10),
    (Band::Above(9.0), 5),
];
const WORK_STUDY: &[(Band, i32)] = &[(Band::Above(10.0), 15), (Band::Above(8.0), 8)];
const HOBBIES: &[(Band, i32)] = &[(Band::Below(0.5), 10), (Band::Below(1.0), 5)];
const TASKS: &[(Band, i32)] = &[(Band::Above(10.0), 15), (Band::Above(7.0), 8)];
const SOCIAL: &[(Band, i32)] = &[(Band::Below(1.0), 8)];

const DIFFICULTY_LEGACY: &[(&str, i32)] = &[("Hard", 12), ("Medium", 6)];
const DIFFICULTY_CORRECTED: &[(&str, i32)] = &[("Hard", 12), ("Moderate", 6)];
const PRESSURE_LEGACY: &[(&str, i32)] = &[
    ("Not stressed", 0),
    ("Slightly stressed", 12),
    ("Highly stressed", 25),
];
const PRESSURE_CORRECTED: &[(&str, i32)] = &[
    ("Not at all", 0),
    ("Slightly overwhelmed", 12),
    ("Yes, very overwhelmed", 25),
];
const QUALITY: &[(&str, i32)] = &[("low", 15), ("medium", 5), ("high", -5)];
const HOME: &[(&str, i32)] = &[("Dissatisfied", 15), ("Satisfied", -5)];
const OVERTHINKING: &[(&str, i32)] = &[
    ("Never", 0),
    ("Rarely", 5),
    ("Often", 12),
    ("Almost always", 20),
];

fn rules(mapping: LabelMapping) -> [(Factor, Rule); 11] {
    let (difficulty, pressure) = match mapping {
        LabelMapping::Legacy => (DIFFICULTY_LEGACY, PRESSURE_LEGACY),
        LabelMapping::Corrected => (DIFFICULTY_CORRECTED, PRESSURE_CORRECTED),
    };
    [
        (Factor::SleepHours, Rule::Bands(SLEEP)),
        (Factor::WorkStudyHours, Rule::Bands(WORK_STUDY)),
        (Factor::HobbiesHours, Rule::Bands(HOBBIES)),
        (Factor::TasksToComplete, Rule::Bands(TASKS)),
        (Factor::TaskDifficulty, Rule::Labels(difficulty)),
        (Factor::FeelingUnderPressure, Rule::Labels(pressure)),
        (Factor::SocialInteractionHours, Rule::Bands(SOCIAL)),
        (Factor::InteractionQuality, Rule::Labels(QUALITY)),
        (Factor::HomeEnvironment, Rule::Labels(HOME)),
        (
            Factor::StressfulEvents,
            Rule::Events {
                base: 10,
                per_trigger: 5,
                triggers: "stressTriggers",
            },
        ),
        (Factor::OverthinkingFrequency, Rule::Labels(OVERTHINKING)),
    ]
}

impl Rule {
    fn points(&self, value: &AnswerValue, answers: &Answers) -> i32 {
        match *self {
            Rule::Bands(bands) => value
                .as_number()
                .and_then(|number| bands.iter().find(|(band, _)| band.matches(number)))
                .map_or(0, |&(_, points)| points),
            Rule::Labels(labels) => value
                .as_text()
                .and_then(|text| labels.iter().find(|(label, _)| *label == text))
                .map_or(0, |&(_, points)| points),
            Rule::Events {
                base,
                per_trigger,
                triggers,
            } => match value {
                AnswerValue::Bool(true) => {
                    let count = answers.get(triggers).as_list().map_or(0, <[String]>::len);
                    base + per_trigger * count as i32
                }
                _ => 0,
            },
        }
    }
}

/// Points one factor added to the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Contribution {
    pub factor: Factor,
    pub points: i32,
}

pub trait Stress {
    fn score(&self) -> i32;
    fn category(&self) -> StressCategory;
}

/// Per-factor breakdown of one answer set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub contributions: Vec<Contribution>,
}

impl Assessment {
    pub fn points(&self, factor: Factor) -> i32 {
        self.contributions
            .iter()
            .filter(|contribution| contribution.factor == factor)
            .map(|contribution| contribution.points)
            .sum()
    }
}

impl Stress for Assessment {
    fn score(&self) -> i32 {
        self.contributions
            .iter()
            .map(|contribution| contribution.points)
            .sum()
    }

    fn category(&self) -> StressCategory {
        StressCategory::from_score(self.score())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer {
    mapping: LabelMapping,
}

impl Scorer {
    pub fn new(mapping: LabelMapping) -> Self {
        Self { mapping }
    }

    pub fn assess(&self, answers: &Answers) -> Assessment {
        let contributions = rules(self.mapping)
            .iter()
            .map(|(factor, rule)| {
                let points = rule.points(answers.get(factor.field()), answers);
                tracing::trace!(factor = factor.field(), points, "factor scored");
                Contribution {
                    factor: *factor,
                    points,
                }
            })
            .collect();
        let assessment = Assessment { contributions };
        tracing::debug!(
            score = assessment.score(),
            category = %assessment.category(),
            mapping = ?self.mapping,
            "assessed answers"
        );
        assessment
    }

    pub fn score(&self, answers: &Answers) -> i32 {
        self.assess(answers).score()
    }

    pub fn classify(&self, answers: &Answers) -> StressCategory {
        self.assess(answers).category()
    }
}

/// Classifies with the historical label tables.
pub fn classify(answers: &Answers) -> StressCategory {
    Scorer::default().classify(answers)
}

#[cfg(test)]
mod test {
    use super::*;

    fn answers(entries: &[(&str, AnswerValue)]) -> Answers {
        entries
            .iter()
            .map(|(id, value)| (id.to_string(), value.clone()))
            .collect()
    }

    fn points(factor: Factor, value: AnswerValue) -> i32 {
        Scorer::default()
            .assess(&answers(&[(factor.field(), value)]))
            .points(factor)
    }

    #[test]
    fn test_from_score() {
        assert_eq!(StressCategory::from_score(-10), StressCategory::Low);
        assert_eq!(StressCategory::from_score(34), StressCategory::Low);
        assert_eq!(StressCategory::from_score(35), StressCategory::Medium);
        assert_eq!(StressCategory::from_score(64), StressCategory::Medium);
        assert_eq!(StressCategory::from_score(65), StressCategory::High);
    }

    #[test]
    fn test_sleep_bands() {
        assert_eq!(points(Factor::SleepHours, 4.5.into()), 20);
        assert_eq!(points(Factor::SleepHours, 5.0.into()), 10);
        assert_eq!(points(Factor::SleepHours, 6.5.into()), 10);
        assert_eq!(points(Factor::SleepHours, 7.0.into()), 0);
        assert_eq!(points(Factor::SleepHours, 9.0.into()), 0);
        assert_eq!(points(Factor::SleepHours, 9.5.into()), 5);
    }

    #[test]
    fn test_numeric_bands() {
        assert_eq!(points(Factor::WorkStudyHours, 10.0.into()), 8);
        assert_eq!(points(Factor::WorkStudyHours, 10.5.into()), 15);
        assert_eq!(points(Factor::WorkStudyHours, 8.0.into()), 0);
        assert_eq!(points(Factor::HobbiesHours, 0.0.into()), 10);
        assert_eq!(points(Factor::HobbiesHours, 0.5.into()), 5);
        assert_eq!(points(Factor::HobbiesHours, 1.0.into()), 0);
        assert_eq!(points(Factor::TasksToComplete, 11.0.into()), 15);
        assert_eq!(points(Factor::TasksToComplete, 8.0.into()), 8);
        assert_eq!(points(Factor::TasksToComplete, 7.0.into()), 0);
        assert_eq!(points(Factor::SocialInteractionHours, 0.5.into()), 8);
        assert_eq!(points(Factor::SocialInteractionHours, 1.0.into()), 0);
    }

    #[test]
    fn test_missing_numbers_score_nothing() {
        assert_eq!(points(Factor::SleepHours, AnswerValue::Null), 0);
        assert_eq!(points(Factor::SleepHours, "4".into()), 0);
        assert_eq!(points(Factor::HobbiesHours, f64::NAN.into()), 0);
        assert_eq!(Scorer::default().score(&Answers::default()), 0);
    }

    #[test]
    fn test_label_tables() {
        assert_eq!(points(Factor::TaskDifficulty, "Hard".into()), 12);
        assert_eq!(points(Factor::TaskDifficulty, "Medium".into()), 6);
        assert_eq!(points(Factor::TaskDifficulty, "Moderate".into()), 0);
        assert_eq!(points(Factor::InteractionQuality, "high".into()), -5);
        assert_eq!(points(Factor::HomeEnvironment, "Satisfied".into()), -5);
        assert_eq!(points(Factor::HomeEnvironment, "Dissatisfied".into()), 15);
        assert_eq!(points(Factor::OverthinkingFrequency, "Often".into()), 12);
        assert_eq!(points(Factor::OverthinkingFrequency, "Sometimes".into()), 0);
    }

    #[test]
    fn test_pressure_mapping() {
        let values = ["Not at all", "Slightly overwhelmed", "Yes, very overwhelmed"];
        for value in values {
            assert_eq!(points(Factor::FeelingUnderPressure, value.into()), 0);
        }
        assert_eq!(points(Factor::FeelingUnderPressure, "Highly stressed".into()), 25);

        let corrected = Scorer::new(LabelMapping::Corrected);
        let scored: Vec<i32> = values
            .iter()
            .map(|&value| {
                corrected
                    .assess(&answers(&[("feelingUnderPressure", value.into())]))
                    .points(Factor::FeelingUnderPressure)
            })
            .collect();
        assert_eq!(scored, vec![0, 12, 25]);
        let moderate = corrected.assess(&answers(&[("taskDifficulty", "Moderate".into())]));
        assert_eq!(moderate.points(Factor::TaskDifficulty), 6);
    }

    #[test]
    fn test_events() {
        let scorer = Scorer::default();
        let with_triggers = answers(&[
            ("stressfulEvents", true.into()),
            (
                "stressTriggers",
                vec!["Bad weather", "Financial stress", "Health-related stress"].into(),
            ),
        ]);
        assert_eq!(scorer.score(&with_triggers), 25);

        let only_event = answers(&[("stressfulEvents", true.into())]);
        assert_eq!(scorer.score(&only_event), 10);

        let stale_triggers = answers(&[
            ("stressfulEvents", false.into()),
            ("stressTriggers", vec!["Bad weather"].into()),
        ]);
        assert_eq!(scorer.score(&stale_triggers), 0);
    }

    #[test]
    fn test_parse_category() {
        assert_eq!("medium".parse::<StressCategory>(), Ok(StressCategory::Medium));
        assert!("Moderate".parse::<StressCategory>().is_err());
        assert_eq!(StressCategory::High.to_string(), "high");
    }
}
