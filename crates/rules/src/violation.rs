use thiserror::Error;

use crate::models::{AttemptNo, EntryId, LiftOrderReference};

/// A rejected write. Nothing is applied to the card when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("Declaration {requested} for attempt {attempt} is below the progression {automatic}")]
    DeclarationValueTooSmall {
        entry: EntryId,
        attempt: AttemptNo,
        requested: i32,
        automatic: i32,
    },

    #[error("Change {requested} for attempt {attempt} is below the progression {automatic}")]
    LastChangeTooLow {
        entry: EntryId,
        attempt: AttemptNo,
        requested: i32,
        automatic: i32,
    },

    #[error("Lift {lifted} for attempt {attempt} does not match the requested weight {requested}")]
    LiftValueNotWhatWasRequested {
        entry: EntryId,
        attempt: AttemptNo,
        lifted: i32,
        requested: i32,
    },

    #[error("Requested {requested} for attempt {attempt} is below the progression {automatic}")]
    LiftValueBelowProgression {
        entry: EntryId,
        attempt: AttemptNo,
        requested: i32,
        automatic: i32,
    },

    #[error("Attempt {attempt} is already recorded as {recorded}")]
    ActualLiftAlreadyRecorded {
        entry: EntryId,
        attempt: AttemptNo,
        recorded: i32,
        value: Option<i32>,
    },

    #[error("Attempt {attempt} cannot be recorded before attempt {expected}")]
    LiftOutOfOrder {
        entry: EntryId,
        attempt: AttemptNo,
        expected: AttemptNo,
    },

    #[error("A declaration must be made before changing attempt {attempt} to {requested}")]
    MustDeclareFirst {
        entry: EntryId,
        attempt: AttemptNo,
        requested: i32,
    },

    #[error("Declaration {requested} for attempt {attempt} made {elapsed_ms} ms into the clock")]
    LateDeclaration {
        entry: EntryId,
        attempt: AttemptNo,
        requested: i32,
        elapsed_ms: i64,
    },

    #[error("Change to {requested} for attempt {attempt} after the final warning")]
    MustChangeBeforeFinalWarning {
        entry: EntryId,
        attempt: AttemptNo,
        requested: i32,
        remaining_ms: i64,
    },

    #[error(
        "Weight {requested} is below {} already lifted on attempt {}",
        .reference.weight,
        .reference.attempt
    )]
    WeightBelowAlreadyLifted {
        entry: EntryId,
        attempt: AttemptNo,
        requested: i32,
        reference: LiftOrderReference,
    },

    #[error(
        "Attempt {attempt} at {requested} should have lifted before attempt {} at the same weight",
        .reference.attempt
    )]
    AttemptNumberTooLow {
        entry: EntryId,
        attempt: AttemptNo,
        requested: i32,
        reference: LiftOrderReference,
    },

    #[error(
        "Start number {start_number} would have lifted {requested} before start number {}",
        .reference.start_number
    )]
    StartNumberTooHigh {
        entry: EntryId,
        attempt: AttemptNo,
        requested: i32,
        start_number: u32,
        reference: LiftOrderReference,
    },

    #[error(
        "Lot number {lot_number} would have lifted {requested} before lot number {}",
        .reference.lot_number
    )]
    LotNumberTooHigh {
        entry: EntryId,
        attempt: AttemptNo,
        requested: i32,
        lot_number: u32,
        reference: LiftOrderReference,
    },

    #[error(
        "Progression {progression} to {requested} exceeds {}, it should have lifted earlier",
        .reference.progression
    )]
    LiftedEarlier {
        entry: EntryId,
        attempt: AttemptNo,
        requested: i32,
        progression: i32,
        reference: LiftOrderReference,
    },

    #[error("Weight {requested} is below {weight_at_start}, the weight when the clock started")]
    ValueBelowStartedClock {
        entry: EntryId,
        attempt: AttemptNo,
        requested: i32,
        weight_at_start: i32,
    },

    #[allow(non_camel_case_types)]
    #[error("First attempts total {requested_total}, over {margin} kg below {qualifying_total}")]
    Rule15_20Violated {
        entry: EntryId,
        attempt: AttemptNo,
        qualifying_total: i32,
        requested_total: i32,
        margin: i32,
    },
}

impl RuleViolation {
    pub fn entry(&self) -> EntryId {
        match self {
            Self::DeclarationValueTooSmall { entry, .. }
            | Self::LastChangeTooLow { entry, .. }
            | Self::LiftValueNotWhatWasRequested { entry, .. }
            | Self::LiftValueBelowProgression { entry, .. }
            | Self::ActualLiftAlreadyRecorded { entry, .. }
            | Self::LiftOutOfOrder { entry, .. }
            | Self::MustDeclareFirst { entry, .. }
            | Self::LateDeclaration { entry, .. }
            | Self::MustChangeBeforeFinalWarning { entry, .. }
            | Self::WeightBelowAlreadyLifted { entry, .. }
            | Self::AttemptNumberTooLow { entry, .. }
            | Self::StartNumberTooHigh { entry, .. }
            | Self::LotNumberTooHigh { entry, .. }
            | Self::LiftedEarlier { entry, .. }
            | Self::ValueBelowStartedClock { entry, .. }
            | Self::Rule15_20Violated { entry, .. } => *entry,
        }
    }

    pub fn attempt(&self) -> AttemptNo {
        match self {
            Self::DeclarationValueTooSmall { attempt, .. }
            | Self::LastChangeTooLow { attempt, .. }
            | Self::LiftValueNotWhatWasRequested { attempt, .. }
            | Self::LiftValueBelowProgression { attempt, .. }
            | Self::ActualLiftAlreadyRecorded { attempt, .. }
            | Self::LiftOutOfOrder { attempt, .. }
            | Self::MustDeclareFirst { attempt, .. }
            | Self::LateDeclaration { attempt, .. }
            | Self::MustChangeBeforeFinalWarning { attempt, .. }
            | Self::WeightBelowAlreadyLifted { attempt, .. }
            | Self::AttemptNumberTooLow { attempt, .. }
            | Self::StartNumberTooHigh { attempt, .. }
            | Self::LotNumberTooHigh { attempt, .. }
            | Self::LiftedEarlier { attempt, .. }
            | Self::ValueBelowStartedClock { attempt, .. }
            | Self::Rule15_20Violated { attempt, .. } => *attempt,
        }
    }

    /// The reference athlete for lift-order violations.
    pub fn reference(&self) -> Option<&LiftOrderReference> {
        match self {
            Self::WeightBelowAlreadyLifted { reference, .. }
            | Self::AttemptNumberTooLow { reference, .. }
            | Self::StartNumberTooHigh { reference, .. }
            | Self::LotNumberTooHigh { reference, .. }
            | Self::LiftedEarlier { reference, .. } => Some(reference),
            _ => None,
        }
    }

    /// Stable key for the message catalogue of the presentation layer.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::DeclarationValueTooSmall { .. } => "RuleViolation.declarationValueTooSmall",
            Self::LastChangeTooLow { .. } => "RuleViolation.lastChangeTooLow",
            Self::LiftValueNotWhatWasRequested { .. } => {
                "RuleViolation.liftValueNotWhatWasRequested"
            }
            Self::LiftValueBelowProgression { .. } => "RuleViolation.liftValueBelowProgression",
            Self::ActualLiftAlreadyRecorded { .. } => "RuleViolation.actualLiftAlreadyRecorded",
            Self::LiftOutOfOrder { .. } => "RuleViolation.liftOutOfOrder",
            Self::MustDeclareFirst { .. } => "RuleViolation.mustDeclareFirst",
            Self::LateDeclaration { .. } => "RuleViolation.lateDeclaration",
            Self::MustChangeBeforeFinalWarning { .. } => {
                "RuleViolation.mustChangeBeforeFinalWarning"
            }
            Self::WeightBelowAlreadyLifted { .. } => "RuleViolation.weightBelowAlreadyLifted",
            Self::AttemptNumberTooLow { .. } => "RuleViolation.attemptNumberTooLow",
            Self::StartNumberTooHigh { .. } => "RuleViolation.startNumberTooHigh",
            Self::LotNumberTooHigh { .. } => "RuleViolation.lotNumberTooHigh",
            Self::LiftedEarlier { .. } => "RuleViolation.liftedEarlier",
            Self::ValueBelowStartedClock { .. } => "RuleViolation.valueBelowStartedClock",
            Self::Rule15_20Violated { .. } => "RuleViolation.rule15_20Violated",
        }
    }
}
