use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::scoring::StressCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// Static copy shown on the result page for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResultContent {
    pub level: &'static str,
    pub color: &'static str,
    pub message: &'static str,
    pub description: &'static str,
    pub suggestions: &'static [Suggestion],
}

static LOW: ResultContent = ResultContent {
    level: "Low",
    color: "#4A7C59",
    message: "You're doing well! Your stress levels appear manageable right now.",
    description: "Keep nurturing your well-being. The balance you've created is something to celebrate.",
    suggestions: &[
        Suggestion {
            icon: "🧘",
            title: "Maintain Balance",
            description: "Continue your healthy routines. They're clearly working for you.",
        },
        Suggestion {
            icon: "🌿",
            title: "Stay Connected",
            description: "Keep nurturing your relationships and support systems.",
        },
        Suggestion {
            icon: "✨",
            title: "Celebrate",
            description: "Acknowledge your efforts in managing life's demands.",
        },
        Suggestion {
            icon: "📖",
            title: "Reflect",
            description: "Journal what's working well so you can return to these habits.",
        },
    ],
};

static MEDIUM: ResultContent = ResultContent {
    level: "Moderate",
    color: "#C4A35A",
    message: "It makes sense that you feel this way given the weight you are carrying.",
    description: "Remember, this is a gentle signal from your body to slow down, not a failure. You are doing the best you can.",
    suggestions: &[
        Suggestion {
            icon: "🫁",
            title: "Breathe",
            description: "Take three deep breaths right now. Inhale for 4s, hold for 4s, exhale for 6s.",
        },
        Suggestion {
            icon: "📱",
            title: "Disconnect",
            description: "Step away from screens for just 5 minutes to let your eyes and mind rest.",
        },
        Suggestion {
            icon: "💧",
            title: "Hydrate",
            description: "Drink a glass of water slowly. Focus on the cool sensation.",
        },
        Suggestion {
            icon: "🚶",
            title: "Move Gently",
            description: "A short 5-minute walk can help clear your mind and reset.",
        },
    ],
};

static HIGH: ResultContent = ResultContent {
    level: "High",
    color: "#A94442",
    message: "We see you. What you're feeling is valid, and you don't have to carry it alone.",
    description: "High stress is your mind's way of asking for support. Please be gentle with yourself today.",
    suggestions: &[
        Suggestion {
            icon: "🤝",
            title: "Reach Out",
            description: "Talk to someone you trust. Sharing your burden can lighten it.",
        },
        Suggestion {
            icon: "🛑",
            title: "Pause",
            description: "Give yourself permission to stop. Rest is not a luxury. It's necessary.",
        },
        Suggestion {
            icon: "💭",
            title: "One Thing",
            description: "Focus on just one small task. Progress doesn't have to be big.",
        },
        Suggestion {
            icon: "🌙",
            title: "Rest Tonight",
            description: "Prioritize sleep today. Your body heals and recovers while you rest.",
        },
    ],
};

pub fn result_content(category: StressCategory) -> &'static ResultContent {
    match category {
        StressCategory::Low => &LOW,
        StressCategory::Medium => &MEDIUM,
        StressCategory::High => &HIGH,
    }
}

/// Percentages supplied from outside for the confidence bars. Display only;
/// nothing here is computed from the answers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Probabilities {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Probabilities {
    pub fn get(&self, category: StressCategory) -> f64 {
        match category {
            StressCategory::Low => self.low,
            StressCategory::Medium => self.medium,
            StressCategory::High => self.high,
        }
    }

    /// Category with the largest share; the earlier one wins a tie.
    pub fn highest(&self) -> StressCategory {
        StressCategory::ALL
            .into_iter()
            .reduce(|best, category| {
                if self.get(category) > self.get(best) {
                    category
                } else {
                    best
                }
            })
            .unwrap_or(StressCategory::Low)
    }

    /// Bar width in percent, clamped to `0..=100`.
    pub fn width(&self, category: StressCategory) -> f64 {
        self.get(category).max(0.0).min(100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected three comma-separated numbers (low,medium,high), got '{0}'")]
pub struct ParseProbabilitiesError(String);

impl FromStr for Probabilities {
    type Err = ParseProbabilitiesError;

    /// Parses `low,medium,high`, e.g. `12.5,30,57.5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseProbabilitiesError(s.to_owned());
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|_| error())?;
        match values.as_slice() {
            &[low, medium, high] => Ok(Probabilities { low, medium, high }),
            _ => Err(error()),
        }
    }
}

/// Everything the result view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPage {
    pub category: StressCategory,
    pub score: i32,
    pub content: &'static ResultContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Probabilities>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<StressCategory>,
}

impl ResultPage {
    pub fn new(category: StressCategory, score: i32, probabilities: Option<Probabilities>) -> Self {
        Self {
            category,
            score,
            content: result_content(category),
            probabilities,
            highlighted: probabilities.map(|probabilities| probabilities.highest()),
        }
    }
}
