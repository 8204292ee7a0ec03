use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::AttemptCard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a competition session (group) on a platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(alias = "m", alias = "male")]
    M,
    #[serde(alias = "f", alias = "female")]
    F,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::M => "M",
            Self::F => "F",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "M" | "MALE" | "MEN" => Ok(Self::M),
            "F" | "FEMALE" | "WOMEN" => Ok(Self::F),
            other => Err(format!("Invalid gender '{}'. Must be 'M' or 'F'", other)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A body-weight category an entry is ranked in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub code: String,
    pub gender: Gender,
    pub minimum_weight: Decimal,
    pub maximum_weight: Decimal,
    /// Masters age-group categories use the 80 % starting-total margin.
    #[serde(default)]
    pub masters: bool,
}

/// Registration data the engine reads but never mutates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMeta {
    pub id: EntryId,
    pub name: String,
    pub gender: Gender,
    #[serde(default)]
    pub body_weight: Option<Decimal>,
    #[serde(default)]
    pub qualifying_total: i32,
    #[serde(default)]
    pub start_number: u32,
    #[serde(default)]
    pub lot_number: u32,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub participations: Vec<Category>,
}

impl EntryMeta {
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: EntryId::new(),
            name: name.into(),
            gender,
            body_weight: None,
            qualifying_total: 0,
            start_number: 0,
            lot_number: 0,
            age: None,
            category: None,
            participations: Vec::new(),
        }
    }

    pub fn body_weight_kg(&self) -> Option<f64> {
        self.body_weight
            .and_then(|bw| bw.to_f64())
            .filter(|bw| *bw > 0.0)
    }

    pub fn is_masters(&self) -> bool {
        self.category.as_ref().is_some_and(|c| c.masters)
    }
}

/// An athlete in a session: registration data plus the attempt card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub meta: EntryMeta,
    #[serde(default)]
    pub card: AttemptCard,
}

impl SessionEntry {
    pub fn new(meta: EntryMeta) -> Self {
        Self {
            meta,
            card: AttemptCard::new(),
        }
    }

    pub fn id(&self) -> EntryId {
        self.meta.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_parsing() {
        assert_eq!("male".parse::<Gender>(), Ok(Gender::M));
        assert!("W".parse::<Gender>().is_err());
        assert_eq!("Women".parse::<Gender>(), Ok(Gender::F));
    }

    #[test]
    fn test_body_weight_conversion() {
        let mut meta = EntryMeta::new("Ana", Gender::F);
        assert_eq!(meta.body_weight_kg(), None);
        meta.body_weight = Some(Decimal::new(813, 1));
        assert_eq!(meta.body_weight_kg(), Some(81.3));
        meta.body_weight = Some(Decimal::ZERO);
        assert_eq!(meta.body_weight_kg(), None);
    }

    #[test]
    fn test_masters_flag_comes_from_category() {
        let mut meta = EntryMeta::new("Bo", Gender::M);
        assert!(!meta.is_masters());
        meta.category = Some(Category {
            code: "M45 89".to_string(),
            gender: Gender::M,
            minimum_weight: Decimal::from(81),
            maximum_weight: Decimal::from(89),
            masters: true,
        });
        assert!(meta.is_masters());
    }
}
