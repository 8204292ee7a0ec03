use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{AttemptNo, EntryId};
use crate::traits::ClockView;

/// Whether a write goes through the rule checks.
///
/// `Bypassed` is the administrative override used for bulk imports and jury
/// corrections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    #[default]
    Enforced,
    Bypassed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SinclairEdition {
    #[default]
    #[serde(rename = "2020")]
    Y2020,
    #[serde(rename = "2024")]
    Y2024,
}

impl SinclairEdition {
    pub fn year(self) -> &'static str {
        match self {
            Self::Y2020 => "2020",
            Self::Y2024 => "2024",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringSystem {
    #[default]
    Total,
    Sinclair,
    QPoints,
    #[serde(alias = "smm")]
    Smhf,
    Robi,
    Gamx,
    AgeAdjustedTotal,
    Custom,
}

impl ScoringSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::Sinclair => "sinclair",
            Self::QPoints => "q_points",
            Self::Smhf => "smhf",
            Self::Robi => "robi",
            Self::Gamx => "gamx",
            Self::AgeAdjustedTotal => "age_adjusted_total",
            Self::Custom => "custom",
        }
    }

    pub fn all() -> &'static [ScoringSystem] {
        &[
            Self::Total,
            Self::Sinclair,
            Self::QPoints,
            Self::Smhf,
            Self::Robi,
            Self::Gamx,
            Self::AgeAdjustedTotal,
            Self::Custom,
        ]
    }
}

impl FromStr for ScoringSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "total" => Ok(Self::Total),
            "sinclair" => Ok(Self::Sinclair),
            "q_points" | "qpoints" => Ok(Self::QPoints),
            "smhf" | "smm" => Ok(Self::Smhf),
            "robi" => Ok(Self::Robi),
            "gamx" => Ok(Self::Gamx),
            "age_adjusted_total" => Ok(Self::AgeAdjustedTotal),
            "custom" => Ok(Self::Custom),
            _ => Err(format!(
                "Unknown scoring system: '{}'. Available: {}",
                s,
                Self::all()
                    .iter()
                    .map(|system| system.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

impl fmt::Display for ScoringSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Competition-level settings that change how rules are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionRules {
    #[serde(default = "default_true")]
    pub enforce_starting_total: bool,
    /// Round-robin order lifts the bar down between athletes, so the
    /// below-started-clock restriction does not apply.
    #[serde(default)]
    pub round_robin: bool,
    #[serde(default)]
    pub sinclair_edition: SinclairEdition,
    #[serde(default)]
    pub scoring_system: ScoringSystem,
    #[serde(default)]
    pub custom_system: Option<ScoringSystem>,
}

fn default_true() -> bool {
    true
}

impl Default for CompetitionRules {
    fn default() -> Self {
        Self {
            enforce_starting_total: true,
            round_robin: false,
            sinclair_edition: SinclairEdition::default(),
            scoring_system: ScoringSystem::default(),
            custom_system: None,
        }
    }
}

/// Weight on the bar and attempt when the clock was last started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockStart {
    pub entry: EntryId,
    pub weight: i32,
    pub attempt: AttemptNo,
}

/// Field-of-play facts the validator needs besides the cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiftingState {
    pub last_clock_start: Option<ClockStart>,
    /// Set while the clock subsystem is live for the current attempt.
    pub timing_checks: bool,
    /// Entry being edited at the weigh-in table, exempt from lift order.
    pub weigh_in_entry: Option<EntryId>,
}

impl LiftingState {
    pub fn has_started(&self) -> bool {
        self.last_clock_start.is_some_and(|start| start.weight > 0)
    }
}

/// A reading of the competition clock taken at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReading {
    pub remaining_ms: i64,
    pub owner: Option<EntryId>,
    pub initial_ms: i64,
}

impl ClockReading {
    pub const DEFAULT_TIME_ALLOWED_MS: i64 = 60_000;

    pub fn idle() -> Self {
        Self {
            remaining_ms: Self::DEFAULT_TIME_ALLOWED_MS,
            owner: None,
            initial_ms: Self::DEFAULT_TIME_ALLOWED_MS,
        }
    }

    pub fn running(owner: EntryId, initial_ms: i64, remaining_ms: i64) -> Self {
        Self {
            remaining_ms,
            owner: Some(owner),
            initial_ms,
        }
    }
}

impl Default for ClockReading {
    fn default() -> Self {
        Self::idle()
    }
}

impl ClockView for ClockReading {
    fn remaining_time_ms(&self) -> i64 {
        self.remaining_ms
    }

    fn clock_owner(&self) -> Option<EntryId> {
        self.owner
    }

    fn initial_time_allowed_ms(&self) -> i64 {
        self.initial_ms
    }
}
