//! Grade derivation and CGPA aggregation.
//!
//! The threshold ladder is fixed policy. Thresholds are inclusive lower bounds
//! checked from the highest band down, so every real total (negative, above
//! 100, or fractional) lands in exactly one band.

use serde::{Deserialize, Serialize};

/// Whether a subject total clears the passing threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    Pass,
    Fail,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PASS" => Some(Self::Pass),
            "FAIL" => Some(Self::Fail),
            _ => None,
        }
    }
}

/// The derived outcome for a single subject total.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Grade {
    /// Letter grade, e.g. `"A+"`.
    pub letter: &'static str,
    /// Grade point on the 0-10 scale.
    pub point: u8,
    pub result: ResultStatus,
}

struct Band {
    min_total: f64,
    letter: &'static str,
    point: u8,
}

const BANDS: &[Band] = &[
    Band { min_total: 90.0, letter: "O", point: 10 },
    Band { min_total: 80.0, letter: "A+", point: 9 },
    Band { min_total: 70.0, letter: "A", point: 8 },
    Band { min_total: 60.0, letter: "B+", point: 7 },
    Band { min_total: 50.0, letter: "B", point: 6 },
    Band { min_total: 45.0, letter: "C", point: 5 },
    Band { min_total: 40.0, letter: "P", point: 4 },
];

const FAIL_GRADE: Grade = Grade {
    letter: "F",
    point: 0,
    result: ResultStatus::Fail,
};

/// Map a subject total (internal + external) onto the grade ladder.
pub fn grade_from_total(total: f64) -> Grade {
    BANDS
        .iter()
        .find(|band| total >= band.min_total)
        .map(|band| Grade {
            letter: band.letter,
            point: band.point,
            result: ResultStatus::Pass,
        })
        .unwrap_or(FAIL_GRADE)
}

/// Mean of the grade points rounded to two decimals. An empty slice yields `0.0`.
pub fn calc_cgpa(grade_points: &[u8]) -> f64 {
    if grade_points.is_empty() {
        return 0.0;
    }
    let sum: u64 = grade_points.iter().map(|&gp| u64::from(gp)).sum();
    let mean = sum as f64 / grade_points.len() as f64;
    (mean * 100.0).round() / 100.0
}
