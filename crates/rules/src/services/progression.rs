//! Derived weights for an attempt: automatic progression, requested weight,
//! and the progression values used to order athletes at equal weight.

use crate::models::{AttemptCard, AttemptNo, ChangeKind};

/// Minimum weight that may follow a recorded outcome.
///
/// A good lift must be followed by at least one more kilo; after a miss or a
/// declined attempt the athlete may repeat the same weight.
pub fn next_weight_after(actual_lift: Option<i32>) -> i32 {
    match actual_lift {
        Some(value) if value > 0 => value + 1,
        Some(value) => value.abs(),
        None => 0,
    }
}

/// `None` for the first attempt of each stage, where the lifter declares freely.
pub fn automatic_progression(card: &AttemptCard, attempt: AttemptNo) -> Option<i32> {
    attempt
        .previous_in_stage()
        .map(|previous| next_weight_after(card.actual_lift(previous)))
}

/// Last of automatic progression, declaration, change 1, change 2 that is
/// present, or 0 when nothing is.
pub fn requested_weight(card: &AttemptCard, attempt: AttemptNo) -> i32 {
    card.slot(attempt)
        .last_change()
        .or_else(|| automatic_progression(card, attempt))
        .unwrap_or(0)
}

/// Reads any value of a slot, including the computed automatic progression.
pub fn value_of(card: &AttemptCard, attempt: AttemptNo, kind: ChangeKind) -> Option<i32> {
    let slot = card.slot(attempt);
    match kind {
        ChangeKind::Automatic => automatic_progression(card, attempt),
        ChangeKind::Declaration => slot.declaration,
        ChangeKind::Change1 => slot.change1,
        ChangeKind::Change2 => slot.change2,
        ChangeKind::Actual => slot.actual_lift,
    }
}

/// Jump from the previous attempt of the stage to `requested`.
pub fn progression(card: &AttemptCard, requested: i32, attempt: AttemptNo) -> i32 {
    match attempt.previous_in_stage() {
        Some(previous) => requested.abs() - card.actual_lift(previous).unwrap_or(0).abs(),
        None => 0,
    }
}

/// Progression that also folds in the jump between the two earlier attempts
/// for the third attempt of a stage. Only used to break progression ties.
pub fn cumulative_progression(card: &AttemptCard, requested: i32, attempt: AttemptNo) -> i32 {
    let direct = progression(card, requested, attempt);
    if attempt.number_in_stage() != 3 {
        return direct;
    }
    match attempt.previous_in_stage() {
        Some(previous) => {
            let previous_weight = card.actual_lift(previous).unwrap_or(0).abs();
            direct + progression(card, previous_weight, previous)
        }
        None => direct,
    }
}
