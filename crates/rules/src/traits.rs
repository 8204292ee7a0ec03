use crate::models::{AttemptCard, EntryId, EntryMeta, LiftOrderReference, ScoringSystem};

/// Read side of the competition clock. Remaining time is sampled when a rule
/// is evaluated; the engine never drives the clock.
pub trait ClockView {
    fn remaining_time_ms(&self) -> i64;
    fn clock_owner(&self) -> Option<EntryId>;
    fn initial_time_allowed_ms(&self) -> i64;
}

/// Reconstruction of what has been lifted, and what is about to be.
pub trait LiftHistory {
    fn last_completed_lift(&self) -> Option<LiftOrderReference>;
    fn running_lift_reference(&self, clock_owner: EntryId) -> Option<LiftOrderReference>;
}

/// World-record reference weights used by the Robi score.
pub trait RobiReferences {
    fn find_robi_reference(&self, entry: &EntryMeta, age: Option<u32>) -> Option<i32>;
}

/// Per-competition formulas the engine does not compute itself (GAMX,
/// age-adjusted totals). `None` falls back to the plain total.
pub trait ExternalScorer {
    fn score(&self, system: ScoringSystem, entry: &EntryMeta, card: &AttemptCard) -> Option<f64>;
}
