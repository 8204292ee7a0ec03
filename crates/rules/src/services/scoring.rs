//! Cross-category scores computed from a finished card.
//!
//! Sinclair: total × 10^(A · log10(bw / b)²) below the record-holder weight b.
//! Q-points: total × Tmax / (β0 − β1·(bw/100)⁻² + β2·(bw/100)²).
//! Robi:     1000 / WR^B × total^B.

use tracing::debug;

use crate::error::Result;
use crate::models::{
    AgeFactorTable, AttemptCard, CoefficientTable, CompetitionRules, EntryMeta, GenderPair,
    QPointsConstants, ScoringSystem, SinclairConstants, SinclairEdition,
};
use crate::traits::{ExternalScorer, RobiReferences};

/// Robi exponent, log2(10): a total 10 % under the record scores half.
pub const ROBI_EXPONENT: f64 = 3.321928095;

pub fn sinclair_factor(constants: SinclairConstants, body_weight: f64) -> f64 {
    if body_weight >= constants.max_weight {
        return 1.0;
    }
    let exponent = constants.coefficient * (body_weight / constants.max_weight).log10().powi(2);
    10f64.powf(exponent)
}

pub fn sinclair(constants: SinclairConstants, body_weight: f64, total: f64) -> f64 {
    total * sinclair_factor(constants, body_weight)
}

pub fn qpoints(constants: QPointsConstants, body_weight: f64, total: f64) -> f64 {
    let bw = body_weight / 100.0;
    let denominator =
        constants.beta0 - constants.beta1 * bw.powi(-2) + constants.beta2 * bw.powi(2);
    total * constants.t_max / denominator
}

pub fn robi(world_record: f64, total: f64) -> f64 {
    1000.0 / world_record.powf(ROBI_EXPONENT) * total.powf(ROBI_EXPONENT)
}

/// Scoring service with every constant resolved up front, so computing a
/// score cannot fail.
pub struct ScoringEngine {
    sinclair_2020: GenderPair<SinclairConstants>,
    sinclair: GenderPair<SinclairConstants>,
    qpoints: GenderPair<QPointsConstants>,
    age_factors: AgeFactorTable,
    custom_system: Option<ScoringSystem>,
    records: Option<Box<dyn RobiReferences + Send + Sync>>,
    external: Option<Box<dyn ExternalScorer + Send + Sync>>,
}

impl ScoringEngine {
    pub fn new(table: &CoefficientTable, edition: SinclairEdition) -> Result<Self> {
        Ok(Self {
            sinclair_2020: GenderPair::resolve(|g| table.sinclair(SinclairEdition::Y2020, g))?,
            sinclair: GenderPair::resolve(|g| table.sinclair(edition, g))?,
            qpoints: GenderPair::resolve(|g| table.qpoints(g))?,
            age_factors: AgeFactorTable::resolve(table)?,
            custom_system: None,
            records: None,
            external: None,
        })
    }

    pub fn for_competition(table: &CoefficientTable, rules: &CompetitionRules) -> Result<Self> {
        Ok(Self::new(table, rules.sinclair_edition)?.with_custom_system(rules.custom_system))
    }

    pub fn with_custom_system(mut self, system: Option<ScoringSystem>) -> Self {
        self.custom_system = system;
        self
    }

    pub fn with_records(mut self, records: impl RobiReferences + Send + Sync + 'static) -> Self {
        self.records = Some(Box::new(records));
        self
    }

    pub fn with_external(mut self, external: impl ExternalScorer + Send + Sync + 'static) -> Self {
        self.external = Some(Box::new(external));
        self
    }

    pub fn compute_score(
        &self,
        meta: &EntryMeta,
        card: &AttemptCard,
        system: ScoringSystem,
    ) -> f64 {
        let total = f64::from(card.total());
        let score = match system {
            ScoringSystem::Total => total,
            ScoringSystem::Sinclair => self.sinclair(meta, total),
            ScoringSystem::QPoints => self.qpoints(meta, total),
            ScoringSystem::Smhf => self.smhf(meta, total),
            ScoringSystem::Robi => self.robi(meta, total),
            ScoringSystem::Gamx | ScoringSystem::AgeAdjustedTotal => self
                .external
                .as_ref()
                .and_then(|external| external.score(system, meta, card))
                .unwrap_or(total),
            ScoringSystem::Custom => match self.custom_system {
                Some(configured) if configured != ScoringSystem::Custom => {
                    self.compute_score(meta, card, configured)
                }
                _ => total,
            },
        };
        debug!("{} score for {}: {}", system, meta.name, score);
        score
    }

    /// Sinclair with the competition's edition; 0 until the athlete is weighed in.
    pub fn sinclair(&self, meta: &EntryMeta, total: f64) -> f64 {
        match meta.body_weight_kg() {
            Some(bw) => sinclair(self.sinclair.for_gender(meta.gender), bw, total),
            None => 0.0,
        }
    }

    pub fn sinclair_2020(&self, meta: &EntryMeta, total: f64) -> f64 {
        match meta.body_weight_kg() {
            Some(bw) => sinclair(self.sinclair_2020.for_gender(meta.gender), bw, total),
            None => 0.0,
        }
    }

    pub fn qpoints(&self, meta: &EntryMeta, total: f64) -> f64 {
        match meta.body_weight_kg() {
            Some(bw) if total > 0.0 => qpoints(self.qpoints.for_gender(meta.gender), bw, total),
            _ => 0.0,
        }
    }

    pub fn age_factor(&self, meta: &EntryMeta) -> f64 {
        meta.age
            .map(|age| self.age_factors.factor(meta.gender, age))
            .unwrap_or(1.0)
    }

    /// Age-adjusted Sinclair (SMM for men, SMHF for women), always on the
    /// 2020 Sinclair edition.
    pub fn smhf(&self, meta: &EntryMeta, total: f64) -> f64 {
        self.sinclair_2020(meta, total) * self.age_factor(meta)
    }

    pub fn robi(&self, meta: &EntryMeta, total: f64) -> f64 {
        if total <= 0.0 {
            return 0.0;
        }
        self.records
            .as_ref()
            .and_then(|records| records.find_robi_reference(meta, meta.age))
            .map(|world_record| robi(f64::from(world_record), total))
            .unwrap_or(0.0)
    }
}
