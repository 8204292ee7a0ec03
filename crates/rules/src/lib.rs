pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod traits;
pub mod violation;

pub use error::{EngineError, Result};
pub use models::{
    AttemptCard, AttemptNo, AttemptSlot, Category, ChangeKind, ClockReading, CoefficientTable,
    CompetitionRules, EntryId, EntryMeta, Field, Gender, LiftOrderReference, LiftingState,
    RecordTable, ScoringSystem, SessionEntry, SessionId, SinclairEdition, Stage,
    ValidationMode, WorldRecord, parse_weight_input,
};
pub use services::{
    AttemptValidator, LiftOrderArbiter, Proposal, RankedEntry, ScoringEngine, SessionSnapshot,
    rank_entries,
};
pub use session::{Session, SessionRegistry};
pub use traits::{ClockView, ExternalScorer, LiftHistory, RobiReferences};
pub use violation::RuleViolation;
