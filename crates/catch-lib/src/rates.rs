//! Ball and status rate tables
//!
//! Both tables are closed enumerations. Labels outside the enumerated
//! set are rejected when parsed; there is no fallback rate.

use crate::estimator::EstimatorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ball used for the throw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerType {
    #[default]
    PokeBall,
    GreatBall,
    UltraBall,
}

impl ContainerType {
    pub const ALL: [ContainerType; 3] = [
        ContainerType::PokeBall,
        ContainerType::GreatBall,
        ContainerType::UltraBall,
    ];

    /// Ball rate multiplier
    pub fn multiplier(self) -> f64 {
        match self {
            ContainerType::PokeBall => 0.75,
            ContainerType::GreatBall => 1.5,
            ContainerType::UltraBall => 2.25,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContainerType::PokeBall => "Poke Ball",
            ContainerType::GreatBall => "Great Ball",
            ContainerType::UltraBall => "Ultra Ball",
        }
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContainerType {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = compact(s);
        ContainerType::ALL
            .into_iter()
            .find(|ball| compact(ball.label()) == wanted)
            .ok_or_else(|| EstimatorError::UnknownContainer(s.trim().to_string()))
    }
}

/// Status condition afflicting the target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCondition {
    #[default]
    None,
    Burn,
    Freeze,
    Paralysis,
    Poison,
    Sleep,
}

impl StatusCondition {
    pub const ALL: [StatusCondition; 6] = [
        StatusCondition::None,
        StatusCondition::Burn,
        StatusCondition::Freeze,
        StatusCondition::Paralysis,
        StatusCondition::Poison,
        StatusCondition::Sleep,
    ];

    /// Status rate multiplier
    pub fn multiplier(self) -> f64 {
        match self {
            StatusCondition::None => 1.0,
            StatusCondition::Burn | StatusCondition::Paralysis | StatusCondition::Poison => 1.5,
            StatusCondition::Freeze | StatusCondition::Sleep => 2.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusCondition::None => "None",
            StatusCondition::Burn => "Burn",
            StatusCondition::Freeze => "Freeze",
            StatusCondition::Paralysis => "Paralysis",
            StatusCondition::Poison => "Poison",
            StatusCondition::Sleep => "Sleep",
        }
    }
}

impl fmt::Display for StatusCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusCondition {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = compact(s);
        StatusCondition::ALL
            .into_iter()
            .find(|status| compact(status.label()) == wanted)
            .ok_or_else(|| EstimatorError::UnknownStatus(s.trim().to_string()))
    }
}

/// Lower-case and drop separators so "Great Ball", "great-ball" and
/// "greatball" compare equal
fn compact(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
