use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EngineError;

/// One of the six numbered lift opportunities on a card.
///
/// Attempts 1-3 are the snatch, 4-6 the clean & jerk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AttemptNo(u8);

impl AttemptNo {
    pub const SNATCH_1: Self = Self(1);
    pub const SNATCH_2: Self = Self(2);
    pub const SNATCH_3: Self = Self(3);
    pub const CLEAN_JERK_1: Self = Self(4);
    pub const CLEAN_JERK_2: Self = Self(5);
    pub const CLEAN_JERK_3: Self = Self(6);

    pub fn new(number: u8) -> Option<Self> {
        (1..=6).contains(&number).then_some(Self(number))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = AttemptNo> {
        (1..=6).map(Self)
    }

    pub fn stage(self) -> Stage {
        if self.0 <= 3 {
            Stage::Snatch
        } else {
            Stage::CleanJerk
        }
    }

    /// Position of the attempt within its stage, 1-3.
    pub fn number_in_stage(self) -> u8 {
        (self.0 - 1) % 3 + 1
    }

    pub fn is_first_of_stage(self) -> bool {
        self.number_in_stage() == 1
    }

    pub fn previous_in_stage(self) -> Option<Self> {
        if self.is_first_of_stage() {
            None
        } else {
            Some(Self(self.0 - 1))
        }
    }

    fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for AttemptNo {
    type Error = EngineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(EngineError::InvalidAttempt(value))
    }
}

impl From<AttemptNo> for u8 {
    fn from(value: AttemptNo) -> Self {
        value.0
    }
}

impl fmt::Display for AttemptNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Snatch,
    CleanJerk,
}

impl Stage {
    pub fn attempts(self) -> [AttemptNo; 3] {
        match self {
            Self::Snatch => [AttemptNo::SNATCH_1, AttemptNo::SNATCH_2, AttemptNo::SNATCH_3],
            Self::CleanJerk => [
                AttemptNo::CLEAN_JERK_1,
                AttemptNo::CLEAN_JERK_2,
                AttemptNo::CLEAN_JERK_3,
            ],
        }
    }

    pub fn first_attempt(self) -> AttemptNo {
        self.attempts()[0]
    }
}

/// Every value a slot exposes, in increasing override priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Automatic,
    Declaration,
    Change1,
    Change2,
    Actual,
}

/// The fields an operator can write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Declaration,
    Change1,
    Change2,
    ActualLift,
}

impl Field {
    pub fn is_request(self) -> bool {
        !matches!(self, Self::ActualLift)
    }
}

impl From<Field> for ChangeKind {
    fn from(field: Field) -> Self {
        match field {
            Field::Declaration => Self::Declaration,
            Field::Change1 => Self::Change1,
            Field::Change2 => Self::Change2,
            Field::ActualLift => Self::Actual,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Declaration => "declaration",
            Self::Change1 => "change 1",
            Self::Change2 => "change 2",
            Self::ActualLift => "actual lift",
        };
        f.write_str(name)
    }
}

/// Requested and recorded weights for a single attempt.
///
/// `actual_lift` is signed: positive is a good lift, negative a failed one,
/// and `0` means the athlete declined the attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptSlot {
    pub declaration: Option<i32>,
    pub change1: Option<i32>,
    pub change2: Option<i32>,
    pub actual_lift: Option<i32>,
    pub lift_time: Option<NaiveDateTime>,
}

impl AttemptSlot {
    /// Last of declaration, change 1, change 2 that is present.
    pub fn last_change(&self) -> Option<i32> {
        self.change2.or(self.change1).or(self.declaration)
    }

    pub fn is_lifted(&self) -> bool {
        self.actual_lift.is_some()
    }

    pub fn is_good_lift(&self) -> bool {
        self.actual_lift.is_some_and(|v| v > 0)
    }

    pub fn field(&self, field: Field) -> Option<i32> {
        match field {
            Field::Declaration => self.declaration,
            Field::Change1 => self.change1,
            Field::Change2 => self.change2,
            Field::ActualLift => self.actual_lift,
        }
    }

    /// Copy of the slot with one field replaced, without side effects.
    pub fn with_field(&self, field: Field, value: Option<i32>) -> Self {
        let mut slot = self.clone();
        slot.set_raw(field, value);
        slot
    }

    fn set_raw(&mut self, field: Field, value: Option<i32>) {
        match field {
            Field::Declaration => self.declaration = value,
            Field::Change1 => self.change1 = value,
            Field::Change2 => self.change2 = value,
            Field::ActualLift => self.actual_lift = value,
        }
    }

    fn force_declined(&mut self) {
        self.actual_lift = Some(0);
        self.lift_time = None;
    }
}

/// The six-attempt record of one athlete in a session.
///
/// This is plain data: writes go through [`AttemptCard::record`] only after the
/// validator has accepted them, or through the explicit override/withdraw calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptCard {
    slots: [AttemptSlot; 6],
}

impl AttemptCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, attempt: AttemptNo) -> &AttemptSlot {
        &self.slots[attempt.index()]
    }

    pub fn slots(&self) -> impl Iterator<Item = (AttemptNo, &AttemptSlot)> {
        AttemptNo::all().zip(self.slots.iter())
    }

    pub fn actual_lift(&self, attempt: AttemptNo) -> Option<i32> {
        self.slot(attempt).actual_lift
    }

    /// Number of attempts with a recorded outcome, counted from attempt 1.
    pub fn attempts_done(&self) -> u8 {
        self.slots.iter().take_while(|slot| slot.is_lifted()).count() as u8
    }

    /// The attempt the athlete is due to take next, if any.
    pub fn next_attempt(&self) -> Option<AttemptNo> {
        AttemptNo::new(self.attempts_done() + 1)
    }

    pub fn is_done(&self) -> bool {
        self.slot(AttemptNo::CLEAN_JERK_3).is_lifted()
    }

    pub fn stage_attempts_done(&self, stage: Stage) -> u8 {
        stage
            .attempts()
            .iter()
            .filter(|attempt| self.slot(**attempt).is_lifted())
            .count() as u8
    }

    /// Heaviest good lift of the stage, 0 when there is none.
    pub fn best_lift(&self, stage: Stage) -> i32 {
        stage
            .attempts()
            .iter()
            .filter_map(|attempt| self.actual_lift(*attempt))
            .filter(|value| *value > 0)
            .max()
            .unwrap_or(0)
    }

    pub fn best_snatch(&self) -> i32 {
        self.best_lift(Stage::Snatch)
    }

    pub fn best_clean_jerk(&self) -> i32 {
        self.best_lift(Stage::CleanJerk)
    }

    /// Snatch plus clean & jerk; 0 unless both stages have a good lift.
    pub fn total(&self) -> i32 {
        let snatch = self.best_snatch();
        let clean_jerk = self.best_clean_jerk();
        if snatch > 0 && clean_jerk > 0 {
            snatch + clean_jerk
        } else {
            0
        }
    }

    pub fn last_successful_lift_time(&self) -> Option<NaiveDateTime> {
        self.slots
            .iter()
            .filter(|slot| slot.is_good_lift())
            .filter_map(|slot| slot.lift_time)
            .max()
    }

    /// Applies an accepted write.
    ///
    /// Writing `0` to a declaration or change records a pending attempt as
    /// declined. An outcome already on the slot is kept. A non-zero actual
    /// lift is stamped with `at`.
    pub fn record(
        &mut self,
        attempt: AttemptNo,
        field: Field,
        value: Option<i32>,
        at: NaiveDateTime,
    ) {
        let slot = &mut self.slots[attempt.index()];
        let was_lifted = slot.is_lifted();
        slot.set_raw(field, value);
        match (field, value) {
            (Field::ActualLift, Some(0)) | (Field::ActualLift, None) => slot.lift_time = None,
            (Field::ActualLift, Some(_)) => slot.lift_time = Some(at),
            (_, Some(0)) if !was_lifted => slot.force_declined(),
            _ => {}
        }
    }

    /// Sets the outcome of an attempt without any rule check.
    pub fn override_actual_lift(
        &mut self,
        attempt: AttemptNo,
        value: Option<i32>,
        at: NaiveDateTime,
    ) {
        self.record(attempt, Field::ActualLift, value, at);
    }

    /// Declines every snatch attempt that has no outcome yet.
    pub fn withdraw_from_snatch(&mut self) -> u8 {
        self.withdraw_attempts(Stage::Snatch.attempts().into_iter())
    }

    /// Declines every remaining attempt.
    pub fn withdraw(&mut self) -> u8 {
        self.withdraw_attempts(AttemptNo::all())
    }

    fn withdraw_attempts(&mut self, attempts: impl Iterator<Item = AttemptNo>) -> u8 {
        let mut declined = 0;
        for attempt in attempts {
            let slot = &mut self.slots[attempt.index()];
            if !slot.is_lifted() {
                slot.force_declined();
                declined += 1;
            }
        }
        declined
    }
}

/// Normalizes an operator-entered weight.
///
/// Blank input clears the field; anything that is not an integer counts as 0.
pub fn parse_weight_input(input: &str) -> Option<i32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.parse().unwrap_or(0))
}
