pub mod attempt_card;
pub mod coefficients;
pub mod competition;
pub mod entry;
pub mod lift_reference;
pub mod record;

pub use attempt_card::{
    AttemptCard, AttemptNo, AttemptSlot, ChangeKind, Field, Stage, parse_weight_input,
};
pub use coefficients::{
    AgeFactorTable, CoefficientTable, GenderPair, QPointsConstants, SinclairConstants,
};
pub use competition::{
    ClockReading, ClockStart, CompetitionRules, LiftingState, ScoringSystem, SinclairEdition,
    ValidationMode,
};
pub use entry::{Category, EntryId, EntryMeta, Gender, SessionEntry, SessionId};
pub use lift_reference::LiftOrderReference;
pub use record::{RecordTable, WorldRecord};
