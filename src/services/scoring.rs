//! Questionnaire compatibility scoring.
//!
//! Turns roster entries into the score matrix the matching core consumes.
//! The core never learns where its scores came from, so precomputed matrices
//! and questionnaire-derived ones are interchangeable.

use tracing::debug;

use crate::models::{DomainError, ScoreMatrix};
use crate::services::dataset::RosterEntry;

/// Graduation-year gap at which compatibility bottoms out
const YEAR_SPAN: f64 = 6.0;

/// Compatibility of two roster entries, in `[0, 1]`.
///
/// Zero unless each side's accepted genders include the other's identity;
/// otherwise the product of a graduation-year closeness factor and the
/// similarity of the two questionnaire response vectors.
pub fn compatibility(a: &RosterEntry, b: &RosterEntry) -> f64 {
    if !a.accepts(b.gender) || !b.accepts(a.gender) {
        return 0.0;
    }
    let score = year_factor(a.grad_year, b.grad_year) * response_similarity(&a.responses, &b.responses);
    score.clamp(0.0, 1.0)
}

/// Score every unordered pair once and mirror it into a symmetric matrix
/// with a zero diagonal.
pub fn build_score_matrix(roster: &[RosterEntry]) -> Result<ScoreMatrix, DomainError> {
    let n = roster.len();
    let mut rows = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let score = compatibility(&roster[i], &roster[j]);
            rows[i][j] = score;
            rows[j][i] = score;
        }
    }
    debug!("scored {} roster entries pairwise", n);
    ScoreMatrix::from_rows(rows)
}

/// Closeness of two graduation years: 1.0 for classmates, falling off
/// quadratically and hitting 0.0 once the gap reaches `YEAR_SPAN` years
fn year_factor(a: i32, b: i32) -> f64 {
    // Subtract in f64: an i32 gap can exceed i32::MAX for extreme years
    let gap = f64::from(a) - f64::from(b);
    ((YEAR_SPAN * YEAR_SPAN - gap * gap) / (YEAR_SPAN * YEAR_SPAN)).max(0.0)
}

/// Similarity of two response vectors in `[0, 1]`: 1.0 for identical answers,
/// falling as the normalized per-question differences grow. Empty or
/// mismatched vectors score 0.0.
fn response_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let spread = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let scale = x.max(y).max(1.0);
            ((x - y) / scale).powi(2)
        })
        .sum::<f64>()
        / a.len() as f64;
    (1.0 - spread).clamp(0.0, 1.0)
}
