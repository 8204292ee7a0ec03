pub mod history;
pub mod lift_order;
pub mod progression;
pub mod ranking;
pub mod scoring;
pub mod starting_total;
pub mod validator;

pub use history::{SessionSnapshot, reference_for, reference_for_card};
pub use lift_order::{LiftOrderArbiter, compare_with_reference};
pub use progression::{
    automatic_progression, cumulative_progression, next_weight_after, progression,
    requested_weight, value_of,
};
pub use ranking::{RankedEntry, rank_entries};
pub use scoring::ScoringEngine;
pub use starting_total::{check_starting_total, required_starting_total, starting_total_margin};
pub use validator::{AttemptValidator, Proposal};
