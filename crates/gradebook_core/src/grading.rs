//! Grade-point derivation from final scores.
//!
//! # Responsibility
//! - Map a final score onto the fixed institutional grade-point scale.
//!
//! # Invariants
//! - Thresholds are evaluated high-to-low; the first match wins.
//! - The mapping is total: any input without a matching threshold
//!   (negative, NaN, below 60) yields `0.0`.

/// Score thresholds paired with the grade point they award.
const GRADE_SCALE: &[(f64, f64)] = &[
    (90.0, 4.0),
    (85.0, 3.7),
    (82.0, 3.3),
    (78.0, 3.0),
    (75.0, 2.7),
    (72.0, 2.3),
    (68.0, 2.0),
    (64.0, 1.5),
    (60.0, 1.0),
];

/// Grade point awarded when no threshold matches.
pub const FAILING_GRADE_POINT: f64 = 0.0;

/// Every value `grade_point` can return, highest first.
pub const GRADE_POINTS: [f64; 10] = [4.0, 3.7, 3.3, 3.0, 2.7, 2.3, 2.0, 1.5, 1.0, 0.0];

/// Returns the grade point for `score`.
pub fn grade_point(score: f64) -> f64 {
    GRADE_SCALE
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map_or(FAILING_GRADE_POINT, |(_, points)| *points)
}
