use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Gender, SinclairEdition};
use crate::error::{EngineError, Result};

const BUNDLED_COEFFICIENTS: &str = include_str!("../../data/coefficients.json");

/// Edition of the Q-points constants shipped with the engine.
pub const QPOINTS_YEAR: &str = "2023";

/// Published scoring constants, keyed `{formula_year}.{gender}.{constant_name}`.
///
/// Age factors use `{table}.{gender}.{age}` where the table is `smm` for men
/// and `smhf` for women. The table is read once and never modified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTable {
    #[serde(default)]
    pub sinclair: BTreeMap<String, f64>,
    #[serde(default)]
    pub qpoints: BTreeMap<String, f64>,
    #[serde(default)]
    pub age_factors: BTreeMap<String, f64>,
}

impl CoefficientTable {
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_COEFFICIENTS)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn sinclair(&self, edition: SinclairEdition, gender: Gender) -> Result<SinclairConstants> {
        let year = edition.year();
        Ok(SinclairConstants {
            coefficient: lookup("sinclair", &self.sinclair, year, gender, "coefficient")?,
            max_weight: lookup("sinclair", &self.sinclair, year, gender, "max_weight")?,
        })
    }

    pub fn qpoints(&self, gender: Gender) -> Result<QPointsConstants> {
        let get = |name| lookup("qpoints", &self.qpoints, QPOINTS_YEAR, gender, name);
        Ok(QPointsConstants {
            beta0: get("beta0")?,
            beta1: get("beta1")?,
            beta2: get("beta2")?,
            t_max: get("t_max")?,
        })
    }

    pub fn age_factor(&self, gender: Gender, age: u32) -> Result<f64> {
        let table = AgeFactorTable::name_for(gender);
        lookup("age_factors", &self.age_factors, table, gender, &age.to_string())
    }
}

fn lookup(
    section: &'static str,
    values: &BTreeMap<String, f64>,
    prefix: &str,
    gender: Gender,
    name: &str,
) -> Result<f64> {
    let key = format!("{}.{}.{}", prefix, gender.as_str(), name);
    values
        .get(&key)
        .copied()
        .ok_or(EngineError::MissingCoefficient { section, key })
}

/// Sinclair constants for one gender and edition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinclairConstants {
    pub coefficient: f64,
    pub max_weight: f64,
}

/// Q-points constants for one gender.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QPointsConstants {
    pub beta0: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub t_max: f64,
}

/// Per-gender pair of resolved constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenderPair<T> {
    pub men: T,
    pub women: T,
}

impl<T: Copy> GenderPair<T> {
    pub fn resolve(mut load: impl FnMut(Gender) -> Result<T>) -> Result<Self> {
        Ok(Self {
            men: load(Gender::M)?,
            women: load(Gender::F)?,
        })
    }

    pub fn for_gender(&self, gender: Gender) -> T {
        match gender {
            Gender::M => self.men,
            Gender::F => self.women,
        }
    }
}

/// Age-adjustment factors resolved for every age the tables cover.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeFactorTable {
    men: Vec<f64>,
    women: Vec<f64>,
}

impl AgeFactorTable {
    pub const FIRST_ADJUSTED_AGE: u32 = 31;
    pub const MEN_MAX_AGE: u32 = 90;
    pub const WOMEN_MAX_AGE: u32 = 80;

    pub fn name_for(gender: Gender) -> &'static str {
        match gender {
            Gender::M => "smm",
            Gender::F => "smhf",
        }
    }

    pub fn max_age(gender: Gender) -> u32 {
        match gender {
            Gender::M => Self::MEN_MAX_AGE,
            Gender::F => Self::WOMEN_MAX_AGE,
        }
    }

    pub fn resolve(table: &CoefficientTable) -> Result<Self> {
        let load = |gender| {
            (Self::FIRST_ADJUSTED_AGE..=Self::max_age(gender))
                .map(|age| table.age_factor(gender, age))
                .collect::<Result<Vec<f64>>>()
        };
        Ok(Self {
            men: load(Gender::M)?,
            women: load(Gender::F)?,
        })
    }

    /// Factor for an age; 1.0 up to 30, clamped to the oldest tabulated age.
    pub fn factor(&self, gender: Gender, age: u32) -> f64 {
        if age < Self::FIRST_ADJUSTED_AGE {
            return 1.0;
        }
        let clamped = age.min(Self::max_age(gender));
        let values = match gender {
            Gender::M => &self.men,
            Gender::F => &self.women,
        };
        values[(clamped - Self::FIRST_ADJUSTED_AGE) as usize]
    }
}
