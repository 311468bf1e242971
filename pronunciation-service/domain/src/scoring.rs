//! Heuristic scoring over the aligner's label-count report.
//!
//! The sub-scores are linear in the number of `phone` / `word` occurrences in
//! the inspection text. They are a stand-in for real per-phone confidence and
//! are kept bit-for-bit compatible with the existing clients.

use crate::{ScoreDetails, ScoreReport};

const PHONE_LABEL: &str = "phone";
const WORD_LABEL: &str = "word";

const PHONETIC_BASE: usize = 60;
const PHONETIC_CAP: usize = 95;
const RHYTHM_BASE: usize = 65;
const RHYTHM_CAP: usize = 90;
const STRESS_BASE: usize = 60;
const STRESS_CAP: usize = 85;
const POINTS_PER_LABEL: usize = 5;

// Weights in tenths: 0.6 / 0.2 / 0.2.
const PHONETIC_WEIGHT: u32 = 6;
const RHYTHM_WEIGHT: u32 = 2;
const STRESS_WEIGHT: u32 = 2;

pub const FEEDBACK_EXCELLENT: &str = "Excellent pronunciation! Your German sounds very natural.";
pub const FEEDBACK_VERY_GOOD: &str =
    "Very good pronunciation. Minor improvements in stress patterns would help.";
pub const FEEDBACK_GOOD: &str = "Good pronunciation. Work on rhythm and phonetic accuracy.";
pub const FEEDBACK_FAIR: &str = "Fair pronunciation. Practice the specific German sounds more.";
pub const FEEDBACK_KEEP_PRACTICING: &str =
    "Keep practicing. Focus on basic German sounds and word stress.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    pub phones: usize,
    pub words: usize,
}

impl LabelCounts {
    /// Counts non-overlapping, case-sensitive occurrences of `phone` and `word`.
    pub fn from_inspection(output: &str) -> Self {
        Self {
            phones: output.matches(PHONE_LABEL).count(),
            words: output.matches(WORD_LABEL).count(),
        }
    }
}

impl ScoreDetails {
    pub fn from_counts(counts: LabelCounts) -> Self {
        Self {
            phonetic_accuracy: capped(PHONETIC_BASE, counts.phones, PHONETIC_CAP),
            rhythm_accuracy: capped(RHYTHM_BASE, counts.words, RHYTHM_CAP),
            stress_accuracy: capped(STRESS_BASE, counts.words, STRESS_CAP),
        }
    }
}

fn capped(base: usize, count: usize, cap: usize) -> u8 {
    let value = base
        .saturating_add(count.saturating_mul(POINTS_PER_LABEL))
        .min(cap);
    // cap <= 95
    value as u8
}

/// Floor of `0.6 * phonetic + 0.2 * rhythm + 0.2 * stress`.
pub fn overall_score(details: &ScoreDetails) -> u8 {
    let weighted = PHONETIC_WEIGHT * u32::from(details.phonetic_accuracy)
        + RHYTHM_WEIGHT * u32::from(details.rhythm_accuracy)
        + STRESS_WEIGHT * u32::from(details.stress_accuracy);
    // weights sum to 10, so the quotient is at most 255
    (weighted / 10) as u8
}

pub fn feedback_for(score: u8) -> &'static str {
    match score {
        90.. => FEEDBACK_EXCELLENT,
        80..=89 => FEEDBACK_VERY_GOOD,
        70..=79 => FEEDBACK_GOOD,
        60..=69 => FEEDBACK_FAIR,
        _ => FEEDBACK_KEEP_PRACTICING,
    }
}

pub fn score_counts(counts: LabelCounts) -> ScoreReport {
    let details = ScoreDetails::from_counts(counts);
    let score = overall_score(&details);
    ScoreReport {
        score,
        feedback: feedback_for(score).to_string(),
        details,
        error: None,
    }
}

pub fn score_inspection_output(output: &str) -> ScoreReport {
    score_counts(LabelCounts::from_inspection(output))
}
