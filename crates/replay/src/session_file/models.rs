use chrono::NaiveDateTime;
use rules::{Category, CompetitionRules, EntryMeta, Field, Gender, WorldRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const FORMAT_VERSION: &str = "1.0.0";

/// A recorded session: who lifts, under which rules, and every
/// field-of-play event in the order the operators sent them.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionFile {
    #[validate(custom(function = "validate_format_version"))]
    pub format_version: String,

    #[validate(nested)]
    pub session: SessionData,

    #[serde(default)]
    pub rules: CompetitionRules,

    #[validate(length(min = 1, message = "At least one entry is required"))]
    #[validate(nested)]
    pub entries: Vec<EntryData>,

    #[serde(default)]
    pub records: Vec<WorldRecord>,

    #[serde(default)]
    pub events: Vec<EventData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SessionData {
    #[validate(length(min = 1, max = 255, message = "Session id is required"))]
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Timestamp of the first event; later events default to one second apart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EntryData {
    /// Short handle events use to refer to this athlete.
    #[validate(length(min = 1, max = 64))]
    pub key: String,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub gender: Gender,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_weight: Option<Decimal>,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub qualifying_total: i32,

    #[serde(default)]
    pub start_number: u32,

    #[serde(default)]
    pub lot_number: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 120))]
    pub age: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(default)]
    pub participations: Vec<Category>,
}

impl EntryData {
    pub fn to_meta(&self) -> EntryMeta {
        let mut meta = EntryMeta::new(self.name.clone(), self.gender);
        meta.body_weight = self.body_weight;
        meta.qualifying_total = self.qualifying_total;
        meta.start_number = self.start_number;
        meta.lot_number = self.lot_number;
        meta.age = self.age;
        meta.category = self.category.clone();
        meta.participations = self.participations.clone();
        meta
    }
}

/// Timer reading sent along with a proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockData {
    /// Entry key of the athlete the clock runs for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub remaining_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_ms: Option<i64>,
}

/// Weights are kept as the operator typed them: blank clears the field and
/// anything non-numeric counts as 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventData {
    Propose {
        entry: String,
        attempt: u8,
        field: Field,
        value: String,
        #[serde(default)]
        bypass: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        clock: Option<ClockData>,
        #[serde(skip_serializing_if = "Option::is_none")]
        at: Option<NaiveDateTime>,
    },
    StartClock {
        entry: String,
        attempt: u8,
        weight: i32,
    },
    StopClock,
    SetTimingChecks {
        enabled: bool,
    },
    WeighIn {
        #[serde(skip_serializing_if = "Option::is_none")]
        entry: Option<String>,
    },
    Withdraw {
        entry: String,
        #[serde(default)]
        snatch_only: bool,
    },
    Override {
        entry: String,
        attempt: u8,
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        at: Option<NaiveDateTime>,
    },
}

impl EventData {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Propose { .. } => "propose",
            Self::StartClock { .. } => "start_clock",
            Self::StopClock => "stop_clock",
            Self::SetTimingChecks { .. } => "set_timing_checks",
            Self::WeighIn { .. } => "weigh_in",
            Self::Withdraw { .. } => "withdraw",
            Self::Override { .. } => "override",
        }
    }

    /// Entry keys the event refers to.
    pub fn entry_keys(&self) -> Vec<&str> {
        match self {
            Self::Propose { entry, clock, .. } => {
                let mut keys = vec![entry.as_str()];
                if let Some(owner) = clock.as_ref().and_then(|c| c.owner.as_deref()) {
                    keys.push(owner);
                }
                keys
            }
            Self::StartClock { entry, .. }
            | Self::Withdraw { entry, .. }
            | Self::Override { entry, .. } => vec![entry.as_str()],
            Self::WeighIn { entry } => entry.as_deref().into_iter().collect(),
            Self::StopClock | Self::SetTimingChecks { .. } => Vec::new(),
        }
    }

    pub fn attempt(&self) -> Option<u8> {
        match self {
            Self::Propose { attempt, .. }
            | Self::StartClock { attempt, .. }
            | Self::Override { attempt, .. } => Some(*attempt),
            _ => None,
        }
    }
}

fn validate_format_version(version: &str) -> Result<(), validator::ValidationError> {
    if version == FORMAT_VERSION {
        Ok(())
    } else {
        Err(validator::ValidationError::new("unsupported_format_version"))
    }
}
