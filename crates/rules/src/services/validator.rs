//! Accepts or rejects a single write to an attempt card.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::history::reference_for_card;
use super::lift_order::LiftOrderArbiter;
use super::progression::{automatic_progression, requested_weight};
use super::starting_total::check_starting_total;
use crate::models::{
    AttemptCard, AttemptNo, CompetitionRules, EntryMeta, Field, LiftingState, ValidationMode,
};
use crate::traits::{ClockView, LiftHistory};
use crate::violation::RuleViolation;

/// Declarations are only accepted during the first 30 seconds of the clock.
pub const DECLARATION_WINDOW_MS: i64 = 30_000;
/// Changes are refused once the final warning sounds.
pub const FINAL_WARNING_MS: i64 = 30_000;

/// One field write requested by an operator. `None` clears the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub attempt: AttemptNo,
    pub field: Field,
    pub value: Option<i32>,
}

impl Proposal {
    pub fn new(attempt: AttemptNo, field: Field, value: Option<i32>) -> Self {
        Self {
            attempt,
            field,
            value,
        }
    }
}

pub struct AttemptValidator<'a> {
    rules: &'a CompetitionRules,
    state: &'a LiftingState,
    clock: &'a dyn ClockView,
    history: &'a dyn LiftHistory,
}

impl<'a> AttemptValidator<'a> {
    pub fn new(
        rules: &'a CompetitionRules,
        state: &'a LiftingState,
        clock: &'a dyn ClockView,
        history: &'a dyn LiftHistory,
    ) -> Self {
        Self {
            rules,
            state,
            clock,
            history,
        }
    }

    /// Returns `Ok` when the write may be applied to `card` as is.
    pub fn propose(
        &self,
        meta: &EntryMeta,
        card: &AttemptCard,
        proposal: &Proposal,
        mode: ValidationMode,
    ) -> Result<(), RuleViolation> {
        if mode == ValidationMode::Bypassed {
            warn!(
                "Validation bypassed for {} attempt {} {} = {:?}",
                meta.name, proposal.attempt, proposal.field, proposal.value
            );
            return Ok(());
        }

        debug!(
            "Validating {} attempt {} {} = {:?}",
            meta.name, proposal.attempt, proposal.field, proposal.value
        );

        match proposal.field {
            Field::Declaration | Field::Change1 | Field::Change2 => {
                self.validate_request(meta, card, proposal)
            }
            Field::ActualLift => self.validate_actual_lift(meta, card, proposal),
        }
    }

    fn validate_request(
        &self,
        meta: &EntryMeta,
        card: &AttemptCard,
        proposal: &Proposal,
    ) -> Result<(), RuleViolation> {
        let attempt = proposal.attempt;
        // requests close once the attempt has an outcome
        if let Some(recorded) = card.actual_lift(attempt) {
            return Err(RuleViolation::ActualLiftAlreadyRecorded {
                entry: meta.id,
                attempt,
                recorded,
                value: proposal.value,
            });
        }
        // blank resets the field, 0 declines the attempt
        let Some(requested) = proposal.value.filter(|v| *v != 0) else {
            return Ok(());
        };

        let automatic = automatic_progression(card, attempt).unwrap_or(0);
        if requested < 0 || requested < automatic {
            return Err(match proposal.field {
                Field::Declaration => RuleViolation::DeclarationValueTooSmall {
                    entry: meta.id,
                    attempt,
                    requested,
                    automatic,
                },
                _ => RuleViolation::LastChangeTooLow {
                    entry: meta.id,
                    attempt,
                    requested,
                    automatic,
                },
            });
        }

        if self.timing_checks_apply(card, attempt) {
            self.check_declaration_was_made(meta, card, proposal, requested)?;
            self.check_change_vs_timer(meta, card, proposal, requested)?;
            self.check_change_vs_lift_order(meta, card, attempt, requested)?;
        }

        check_starting_total(self.rules, meta, card, attempt, proposal.field, proposal.value)
    }

    /// Timing and lift-order rules only concern the attempt the athlete is
    /// due to take, before its outcome is known.
    fn timing_checks_apply(&self, card: &AttemptCard, attempt: AttemptNo) -> bool {
        self.state.timing_checks
            && !card.slot(attempt).is_lifted()
            && card.next_attempt() == Some(attempt)
    }

    fn check_declaration_was_made(
        &self,
        meta: &EntryMeta,
        card: &AttemptCard,
        proposal: &Proposal,
        requested: i32,
    ) -> Result<(), RuleViolation> {
        let is_change = matches!(proposal.field, Field::Change1 | Field::Change2);
        let owns_clock = self.clock.clock_owner() == Some(meta.id);
        if is_change && !owns_clock && card.slot(proposal.attempt).declaration.is_none() {
            return Err(RuleViolation::MustDeclareFirst {
                entry: meta.id,
                attempt: proposal.attempt,
                requested,
            });
        }
        Ok(())
    }

    fn check_change_vs_timer(
        &self,
        meta: &EntryMeta,
        card: &AttemptCard,
        proposal: &Proposal,
        requested: i32,
    ) -> Result<(), RuleViolation> {
        if self.clock.clock_owner() != Some(meta.id) {
            return Ok(());
        }

        let remaining = self.clock.remaining_time_ms();
        match proposal.field {
            Field::Declaration => {
                let elapsed = self.clock.initial_time_allowed_ms() - remaining;
                if elapsed > DECLARATION_WINDOW_MS {
                    return Err(RuleViolation::LateDeclaration {
                        entry: meta.id,
                        attempt: proposal.attempt,
                        requested,
                        elapsed_ms: elapsed,
                    });
                }
            }
            Field::Change1 | Field::Change2 => {
                if !card.slot(proposal.attempt).is_lifted() && remaining < FINAL_WARNING_MS {
                    return Err(RuleViolation::MustChangeBeforeFinalWarning {
                        entry: meta.id,
                        attempt: proposal.attempt,
                        requested,
                        remaining_ms: remaining,
                    });
                }
            }
            Field::ActualLift => {}
        }
        Ok(())
    }

    fn check_change_vs_lift_order(
        &self,
        meta: &EntryMeta,
        card: &AttemptCard,
        attempt: AttemptNo,
        requested: i32,
    ) -> Result<(), RuleViolation> {
        let candidate = reference_for_card(meta, card, attempt, requested);
        LiftOrderArbiter::new(self.rules, self.state, self.clock, self.history).check(&candidate)
    }

    fn validate_actual_lift(
        &self,
        meta: &EntryMeta,
        card: &AttemptCard,
        proposal: &Proposal,
    ) -> Result<(), RuleViolation> {
        let attempt = proposal.attempt;
        if let Some(recorded) = card.actual_lift(attempt) {
            if proposal.value != Some(recorded) {
                return Err(RuleViolation::ActualLiftAlreadyRecorded {
                    entry: meta.id,
                    attempt,
                    recorded,
                    value: proposal.value,
                });
            }
            return Ok(());
        }
        let Some(lifted) = proposal.value else {
            return Ok(());
        };

        if let Some(expected) = card.next_attempt().filter(|next| *next < attempt) {
            return Err(RuleViolation::LiftOutOfOrder {
                entry: meta.id,
                attempt,
                expected,
            });
        }

        if lifted == 0 {
            return Ok(());
        }

        let requested = requested_weight(card, attempt);
        if lifted.abs() != requested {
            return Err(RuleViolation::LiftValueNotWhatWasRequested {
                entry: meta.id,
                attempt,
                lifted,
                requested,
            });
        }

        let automatic = automatic_progression(card, attempt).unwrap_or(0);
        if requested < automatic {
            return Err(RuleViolation::LiftValueBelowProgression {
                entry: meta.id,
                attempt,
                requested,
                automatic,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClockReading, ClockStart, EntryId, Gender, LiftOrderReference};
    use chrono::NaiveDateTime;

    struct NoHistory;

    impl LiftHistory for NoHistory {
        fn last_completed_lift(&self) -> Option<LiftOrderReference> {
            None
        }

        fn running_lift_reference(&self, _clock_owner: EntryId) -> Option<LiftOrderReference> {
            None
        }
    }

    fn lifter() -> EntryMeta {
        let mut meta = EntryMeta::new("Dana", Gender::F);
        meta.start_number = 3;
        meta
    }

    fn card_after_good_snatch(weight: i32) -> AttemptCard {
        let mut card = AttemptCard::new();
        card.record(AttemptNo::SNATCH_1, Field::ActualLift, Some(weight), NaiveDateTime::default());
        card
    }

    fn propose(
        state: &LiftingState,
        clock: &ClockReading,
        meta: &EntryMeta,
        card: &AttemptCard,
        proposal: Proposal,
    ) -> Result<(), RuleViolation> {
        let rules = CompetitionRules::default();
        AttemptValidator::new(&rules, state, clock, &NoHistory).propose(
            meta,
            card,
            &proposal,
            ValidationMode::Enforced,
        )
    }

    fn live_state() -> LiftingState {
        LiftingState {
            last_clock_start: Some(ClockStart {
                entry: EntryId::new(),
                weight: 90,
                attempt: AttemptNo::SNATCH_1,
            }),
            timing_checks: true,
            weigh_in_entry: None,
        }
    }

    #[test]
    fn test_declaration_floor() {
        let meta = lifter();
        let card = card_after_good_snatch(100);
        let state = LiftingState::default();
        let clock = ClockReading::idle();

        let ok = Proposal::new(AttemptNo::SNATCH_2, Field::Declaration, Some(102));
        assert!(propose(&state, &clock, &meta, &card, ok).is_ok());

        let low = Proposal::new(AttemptNo::SNATCH_2, Field::Declaration, Some(100));
        assert_eq!(
            propose(&state, &clock, &meta, &card, low),
            Err(RuleViolation::DeclarationValueTooSmall {
                entry: meta.id,
                attempt: AttemptNo::SNATCH_2,
                requested: 100,
                automatic: 101,
            })
        );
    }

    #[test]
    fn test_blank_and_zero_requests_are_accepted() {
        let meta = lifter();
        let card = card_after_good_snatch(100);
        let state = live_state();
        let clock = ClockReading::idle();

        for value in [None, Some(0)] {
            let proposal = Proposal::new(AttemptNo::SNATCH_2, Field::Change1, value);
            assert!(propose(&state, &clock, &meta, &card, proposal).is_ok());
        }
    }

    #[test]
    fn test_change_below_progression() {
        let meta = lifter();
        let card = card_after_good_snatch(100);
        let state = LiftingState::default();
        let clock = ClockReading::idle();
        let proposal = Proposal::new(AttemptNo::SNATCH_2, Field::Change2, Some(99));
        assert!(matches!(
            propose(&state, &clock, &meta, &card, proposal),
            Err(RuleViolation::LastChangeTooLow { automatic: 101, .. })
        ));
    }

    #[test]
    fn test_negative_declaration_is_too_small() {
        let meta = lifter();
        let card = AttemptCard::new();
        let state = LiftingState::default();
        let clock = ClockReading::idle();
        let proposal = Proposal::new(AttemptNo::SNATCH_1, Field::Declaration, Some(-80));
        assert!(matches!(
            propose(&state, &clock, &meta, &card, proposal),
            Err(RuleViolation::DeclarationValueTooSmall { .. })
        ));
    }

    #[test]
    fn test_change_requires_declaration_when_not_on_clock() {
        let meta = lifter();
        let card = card_after_good_snatch(100);
        let state = live_state();
        let clock = ClockReading::idle();
        let proposal = Proposal::new(AttemptNo::SNATCH_2, Field::Change1, Some(104));
        assert!(matches!(
            propose(&state, &clock, &meta, &card, proposal),
            Err(RuleViolation::MustDeclareFirst { requested: 104, .. })
        ));
    }

    #[test]
    fn test_timing_checks_disabled_skips_declaration_requirement() {
        let meta = lifter();
        let card = card_after_good_snatch(100);
        let state = LiftingState {
            timing_checks: false,
            ..live_state()
        };
        let clock = ClockReading::idle();
        let proposal = Proposal::new(AttemptNo::SNATCH_2, Field::Change1, Some(104));
        assert!(propose(&state, &clock, &meta, &card, proposal).is_ok());
    }

    #[test]
    fn test_late_declaration_for_clock_owner() {
        let meta = lifter();
        let card = card_after_good_snatch(100);
        let state = live_state();

        let early = ClockReading::running(meta.id, 60_000, 35_000);
        let proposal = Proposal::new(AttemptNo::SNATCH_2, Field::Declaration, Some(101));
        assert!(propose(&state, &early, &meta, &card, proposal).is_ok());

        let late = ClockReading::running(meta.id, 60_000, 29_000);
        assert!(matches!(
            propose(&state, &late, &meta, &card, proposal),
            Err(RuleViolation::LateDeclaration { elapsed_ms: 31_000, .. })
        ));
    }

    #[test]
    fn test_declaration_timing_ignored_for_other_athletes() {
        let meta = lifter();
        let card = card_after_good_snatch(100);
        let state = live_state();
        let clock = ClockReading::running(EntryId::new(), 60_000, 5_000);
        let proposal = Proposal::new(AttemptNo::SNATCH_2, Field::Declaration, Some(101));
        assert!(propose(&state, &clock, &meta, &card, proposal).is_ok());
    }

    #[test]
    fn test_change_after_final_warning() {
        let meta = lifter();
        let mut card = card_after_good_snatch(100);
        card.record(AttemptNo::SNATCH_2, Field::Declaration, Some(101), NaiveDateTime::default());
        let state = live_state();

        let before = ClockReading::running(meta.id, 60_000, 30_000);
        let proposal = Proposal::new(AttemptNo::SNATCH_2, Field::Change1, Some(103));
        assert!(propose(&state, &before, &meta, &card, proposal).is_ok());

        let after = ClockReading::running(meta.id, 60_000, 29_999);
        assert!(matches!(
            propose(&state, &after, &meta, &card, proposal),
            Err(RuleViolation::MustChangeBeforeFinalWarning { remaining_ms: 29_999, .. })
        ));
    }

    #[test]
    fn test_actual_lift_must_match_request() {
        let meta = lifter();
        let mut card = card_after_good_snatch(100);
        card.record(AttemptNo::SNATCH_2, Field::Declaration, Some(103), NaiveDateTime::default());
        let state = LiftingState::default();
        let clock = ClockReading::idle();

        let good = Proposal::new(AttemptNo::SNATCH_2, Field::ActualLift, Some(103));
        let miss = Proposal::new(AttemptNo::SNATCH_2, Field::ActualLift, Some(-103));
        let declined = Proposal::new(AttemptNo::SNATCH_2, Field::ActualLift, Some(0));
        let wrong = Proposal::new(AttemptNo::SNATCH_2, Field::ActualLift, Some(101));
        assert!(propose(&state, &clock, &meta, &card, good).is_ok());
        assert!(propose(&state, &clock, &meta, &card, miss).is_ok());
        assert!(propose(&state, &clock, &meta, &card, declined).is_ok());
        assert!(matches!(
            propose(&state, &clock, &meta, &card, wrong),
            Err(RuleViolation::LiftValueNotWhatWasRequested { lifted: 101, requested: 103, .. })
        ));
    }

    #[test]
    fn test_actual_lift_uses_automatic_progression_without_declaration() {
        let meta = lifter();
        let card = card_after_good_snatch(100);
        let state = LiftingState::default();
        let clock = ClockReading::idle();
        let proposal = Proposal::new(AttemptNo::SNATCH_2, Field::ActualLift, Some(-101));
        assert!(propose(&state, &clock, &meta, &card, proposal).is_ok());
    }

    #[test]
    fn test_actual_lift_below_progression_after_override() {
        let meta = lifter();
        let mut card = card_after_good_snatch(100);
        card.record(AttemptNo::SNATCH_2, Field::Declaration, Some(95), NaiveDateTime::default());
        let state = LiftingState::default();
        let clock = ClockReading::idle();
        let proposal = Proposal::new(AttemptNo::SNATCH_2, Field::ActualLift, Some(95));
        assert!(matches!(
            propose(&state, &clock, &meta, &card, proposal),
            Err(RuleViolation::LiftValueBelowProgression { requested: 95, automatic: 101, .. })
        ));
    }

    #[test]
    fn test_recorded_lift_is_immutable() {
        let meta = lifter();
        let card = card_after_good_snatch(100);
        let state = LiftingState::default();
        let clock = ClockReading::idle();
        let same = Proposal::new(AttemptNo::SNATCH_1, Field::ActualLift, Some(100));
        let other = Proposal::new(AttemptNo::SNATCH_1, Field::ActualLift, Some(-100));
        assert!(propose(&state, &clock, &meta, &card, same).is_ok());
        assert!(matches!(
            propose(&state, &clock, &meta, &card, other),
            Err(RuleViolation::ActualLiftAlreadyRecorded { recorded: 100, .. })
        ));
    }

    #[test]
    fn test_recorded_lift_cannot_be_cleared() {
        let meta = lifter();
        let card = card_after_good_snatch(100);
        let state = LiftingState::default();
        let clock = ClockReading::idle();
        let blank = Proposal::new(AttemptNo::SNATCH_1, Field::ActualLift, None);
        assert!(matches!(
            propose(&state, &clock, &meta, &card, blank),
            Err(RuleViolation::ActualLiftAlreadyRecorded { recorded: 100, value: None, .. })
        ));
    }

    #[test]
    fn test_requests_on_lifted_attempt_are_refused() {
        let meta = lifter();
        let card = card_after_good_snatch(100);
        let state = LiftingState::default();
        let clock = ClockReading::idle();
        for (field, value) in [
            (Field::Change1, Some(0)),
            (Field::Change1, Some(130)),
            (Field::Declaration, None),
            (Field::Change2, Some(100)),
        ] {
            let proposal = Proposal::new(AttemptNo::SNATCH_1, field, value);
            assert!(matches!(
                propose(&state, &clock, &meta, &card, proposal),
                Err(RuleViolation::ActualLiftAlreadyRecorded { recorded: 100, .. })
            ));
        }
    }

    #[test]
    fn test_lifts_recorded_in_order() {
        let meta = lifter();
        let card = card_after_good_snatch(100);
        let state = LiftingState::default();
        let clock = ClockReading::idle();
        let proposal = Proposal::new(AttemptNo::SNATCH_3, Field::ActualLift, Some(0));
        assert!(matches!(
            propose(&state, &clock, &meta, &card, proposal),
            Err(RuleViolation::LiftOutOfOrder { expected: AttemptNo::SNATCH_2, .. })
        ));
    }

    #[test]
    fn test_bypassed_mode_accepts_anything() {
        let meta = lifter();
        let card = card_after_good_snatch(100);
        let state = live_state();
        let clock = ClockReading::idle();
        let rules = CompetitionRules::default();
        let validator = AttemptValidator::new(&rules, &state, &clock, &NoHistory);
        let proposal = Proposal::new(AttemptNo::SNATCH_2, Field::Change1, Some(50));
        assert!(validator
            .propose(&meta, &card, &proposal, ValidationMode::Bypassed)
            .is_ok());
    }
}
