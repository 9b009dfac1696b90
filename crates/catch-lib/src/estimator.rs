//! Catch-rate estimator
//!
//! Holds the operator's validated inputs and derives the catch score.
//! Every setter is all-or-nothing: a rejected value leaves the previous
//! one in place.

use crate::models::SubjectProfile;
use crate::rates::{ContainerType, StatusCondition};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lowest accepted health percentage and level
pub const MIN_INPUT: u8 = 1;

/// Highest accepted health percentage and level
pub const MAX_INPUT: u8 = 100;

/// Maximum HP term of the formula, with HP expressed as a percentage
const MAX_HP: f64 = 100.0;

/// Fixed divisor normalizing the score
const SCORE_DIVISOR: f64 = 255.0;

/// Marker shown when no score can be computed
pub const UNAVAILABLE_MARKER: &str = "N/A";

/// Rejected estimator input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimatorError {
    #[error("Health % must be in the range 1-100")]
    HealthOutOfRange(i64),

    #[error("Level must be in the range 1-100")]
    LevelOutOfRange(i64),

    #[error("Unknown ball \"{0}\" (expected Poke Ball, Great Ball or Ultra Ball)")]
    UnknownContainer(String),

    #[error("Unknown status \"{0}\" (expected None, Burn, Freeze, Paralysis, Poison or Sleep)")]
    UnknownStatus(String),
}

/// Operator-controlled estimator inputs
///
/// Fields are private so every write goes through a validating setter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimatorInputs {
    health_percent: u8,
    level: u8,
    container: ContainerType,
    status: StatusCondition,
}

impl Default for EstimatorInputs {
    fn default() -> Self {
        Self {
            health_percent: MAX_INPUT,
            level: MIN_INPUT,
            container: ContainerType::default(),
            status: StatusCondition::default(),
        }
    }
}

impl EstimatorInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn health_percent(&self) -> u8 {
        self.health_percent
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn container(&self) -> ContainerType {
        self.container
    }

    pub fn status(&self) -> StatusCondition {
        self.status
    }

    pub fn set_health_percent(&mut self, value: i64) -> Result<(), EstimatorError> {
        self.health_percent = checked_input(value).ok_or(EstimatorError::HealthOutOfRange(value))?;
        Ok(())
    }

    pub fn set_level(&mut self, value: i64) -> Result<(), EstimatorError> {
        self.level = checked_input(value).ok_or(EstimatorError::LevelOutOfRange(value))?;
        Ok(())
    }

    pub fn set_container(&mut self, container: ContainerType) {
        self.container = container;
    }

    pub fn set_status(&mut self, status: StatusCondition) {
        self.status = status;
    }

    /// Select a ball by its label
    pub fn select_container(&mut self, label: &str) -> Result<(), EstimatorError> {
        self.container = label.parse()?;
        Ok(())
    }

    /// Select a status by its label
    pub fn select_status(&mut self, label: &str) -> Result<(), EstimatorError> {
        self.status = label.parse()?;
        Ok(())
    }

    /// Rate multipliers for the current selections
    pub fn multipliers(&self) -> Multipliers {
        Multipliers {
            container_rate: self.container.multiplier(),
            status_rate: self.status.multiplier(),
        }
    }
}

fn checked_input(value: i64) -> Option<u8> {
    u8::try_from(value)
        .ok()
        .filter(|v| (MIN_INPUT..=MAX_INPUT).contains(v))
}

/// The ball/status multiplier pair shown with "show calculations"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    pub container_rate: f64,
    pub status_rate: f64,
}

impl Multipliers {
    pub fn container_display(&self) -> String {
        format!("{}x", self.container_rate)
    }

    pub fn status_display(&self) -> String {
        format!("{}x", self.status_rate)
    }
}

/// Derived catch score
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimate {
    Score(f64),
    Unavailable,
}

impl Estimate {
    pub fn score(&self) -> Option<f64> {
        match self {
            Estimate::Score(score) => Some(*score),
            Estimate::Unavailable => None,
        }
    }

    /// Two-decimal rendering, or the unavailable marker
    pub fn display(&self) -> String {
        match self {
            Estimate::Score(score) => format!("{:.2}", round_half_away(*score, 2)),
            Estimate::Unavailable => UNAVAILABLE_MARKER.to_string(),
        }
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Compute the catch score for the current inputs
///
/// `((3*100 - 2*hp) / (3*100)) * weight * ball * status / 255`, with no
/// clamping. Unavailable when no subject profile is present.
pub fn compute_score(inputs: &EstimatorInputs, profile: Option<&SubjectProfile>) -> Estimate {
    let Some(profile) = profile else {
        return Estimate::Unavailable;
    };

    let hp = f64::from(inputs.health_percent);
    let hp_term = (3.0 * MAX_HP - 2.0 * hp) / (3.0 * MAX_HP);
    let score = hp_term
        * f64::from(profile.mass_units)
        * inputs.container.multiplier()
        * inputs.status.multiplier()
        / SCORE_DIVISOR;

    Estimate::Score(score)
}

fn round_half_away(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
