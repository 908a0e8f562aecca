//! Threshold branching over similarity scores and the report shape.

use serde::{Deserialize, Serialize};

use crate::semantic::best_match;

pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_RESULTS_FEEDBACK: &str = "No search results found. This title appears to be unique and doesn't match any existing publications.";

/// Embedding scores for identical strings land a few ulps off 1.0
const DUPLICATE_TOLERANCE: f32 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub input: String,
    pub output: AnalysisOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub queried_title: String,
    pub feedback: String,
    pub approval_probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub duplicate: f32,
    pub similar: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            duplicate: 1.0,
            similar: 0.75,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    NoResults,
    Duplicate { title: String },
    HighlySimilar { title: String, score: f32 },
    Unique { title: String, score: f32 },
}

impl Verdict {
    /// Similarity line used in feedback. `None` when there was nothing to compare.
    pub fn reason(&self) -> Option<String> {
        match self {
            Verdict::NoResults => None,
            Verdict::Duplicate { title } => Some(format!("Duplicate of '{title}'.")),
            Verdict::HighlySimilar { title, score } => Some(format!(
                "highly similar to '{title}', similarity score: {score:.2}"
            )),
            Verdict::Unique { .. } => Some("unique".to_string()),
        }
    }

    pub fn queried_title(&self) -> &str {
        match self {
            Verdict::NoResults => NOT_AVAILABLE,
            Verdict::Duplicate { title }
            | Verdict::HighlySimilar { title, .. }
            | Verdict::Unique { title, .. } => title,
        }
    }

    /// Percentage in [0, 100].
    pub fn approval_probability(&self) -> f64 {
        match self {
            Verdict::NoResults => 100.0,
            Verdict::Duplicate { .. } => 0.0,
            Verdict::HighlySimilar { score, .. } | Verdict::Unique { score, .. } => {
                ((1.0 - f64::from(*score)) * 100.0).clamp(0.0, 100.0)
            }
        }
    }

    pub fn into_analysis(self, input: &str, feedback: String) -> Analysis {
        Analysis {
            input: input.to_string(),
            output: AnalysisOutput {
                queried_title: self.queried_title().to_string(),
                feedback,
                approval_probability: self.approval_probability(),
            },
        }
    }
}

/// Classify candidates by score.
///
/// The first candidate (in source order) at or above the duplicate threshold
/// wins outright. Otherwise the best-scoring candidate decides between
/// highly similar and unique. `titles` and `scores` are aligned.
pub fn decide(titles: &[String], scores: &[f32], thresholds: Thresholds) -> Verdict {
    if let Some(idx) = scores
        .iter()
        .position(|&score| score >= thresholds.duplicate - DUPLICATE_TOLERANCE)
    {
        if let Some(title) = titles.get(idx) {
            return Verdict::Duplicate {
                title: title.clone(),
            };
        }
    }

    let Some((idx, score)) = best_match(scores) else {
        return Verdict::NoResults;
    };
    let Some(title) = titles.get(idx).cloned() else {
        return Verdict::NoResults;
    };

    if score >= thresholds.similar {
        Verdict::HighlySimilar { title, score }
    } else {
        Verdict::Unique { title, score }
    }
}

/// Report for a title with no candidates at all.
pub fn no_results(input: &str) -> Analysis {
    Verdict::NoResults.into_analysis(input, NO_RESULTS_FEEDBACK.to_string())
}
