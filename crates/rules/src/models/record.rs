use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{EntryMeta, Gender};
use crate::traits::RobiReferences;

/// Official record total for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldRecord {
    pub category_code: String,
    pub gender: Gender,
    /// Upper body-weight bound; `None` for the open (+) category.
    #[serde(default)]
    pub maximum_weight: Option<Decimal>,
    pub total: i32,
    /// IWF senior categories serve as the fallback for categories without
    /// their own record.
    #[serde(default)]
    pub iwf: bool,
    #[serde(default)]
    pub minimum_age: Option<u32>,
    #[serde(default)]
    pub maximum_age: Option<u32>,
}

impl WorldRecord {
    fn covers_age(&self, age: Option<u32>) -> bool {
        match age {
            Some(age) => {
                self.minimum_age.is_none_or(|min| age >= min)
                    && self.maximum_age.is_none_or(|max| age <= max)
            }
            None => self.minimum_age.is_none() && self.maximum_age.is_none(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordTable {
    records: Vec<WorldRecord>,
}

impl RecordTable {
    pub fn new(records: Vec<WorldRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[WorldRecord] {
        &self.records
    }

    fn by_category(&self, code: &str, age: Option<u32>) -> Option<&WorldRecord> {
        self.records
            .iter()
            .find(|record| record.category_code == code && record.covers_age(age))
    }

    /// Lightest IWF category that holds the athlete's body weight, or the
    /// open category when none does.
    fn iwf_equivalent(&self, entry: &EntryMeta, age: Option<u32>) -> Option<&WorldRecord> {
        let body_weight = entry
            .body_weight
            .or_else(|| entry.category.as_ref().map(|c| c.maximum_weight))?;

        let mut candidates: Vec<&WorldRecord> = self
            .records
            .iter()
            .filter(|record| record.iwf && record.gender == entry.gender)
            .filter(|record| record.covers_age(age) || record.minimum_age.is_none())
            .collect();
        candidates.sort_by_key(|record| record.maximum_weight.unwrap_or(Decimal::MAX));

        candidates
            .iter()
            .find(|record| record.maximum_weight.is_some_and(|max| body_weight <= max))
            .or_else(|| candidates.iter().find(|record| record.maximum_weight.is_none()))
            .copied()
    }
}

impl RobiReferences for RecordTable {
    fn find_robi_reference(&self, entry: &EntryMeta, age: Option<u32>) -> Option<i32> {
        let own = entry
            .category
            .iter()
            .chain(entry.participations.iter())
            .find_map(|category| self.by_category(&category.code, age));

        own.or_else(|| self.iwf_equivalent(entry, age))
            .map(|record| record.total)
            .filter(|total| *total > 0)
    }
}
