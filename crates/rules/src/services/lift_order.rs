//! Keeps athletes from lifting out of turn when they change their weight.

use std::cmp::Ordering;
use tracing::debug;

use crate::models::{CompetitionRules, LiftOrderReference, LiftingState};
use crate::traits::{ClockView, LiftHistory};
use crate::violation::RuleViolation;

pub struct LiftOrderArbiter<'a> {
    rules: &'a CompetitionRules,
    state: &'a LiftingState,
    clock: &'a dyn ClockView,
    history: &'a dyn LiftHistory,
}

impl<'a> LiftOrderArbiter<'a> {
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

    /// Checks `candidate` (the athlete's position if the new weight is
    /// accepted) against the reference point of the session.
    pub fn check(&self, candidate: &LiftOrderReference) -> Result<(), RuleViolation> {
        let Some(clock_start) = self.state.last_clock_start.filter(|start| start.weight > 0) else {
            return Ok(());
        };
        if self.state.weigh_in_entry == Some(candidate.entry) {
            return Ok(());
        }

        if let Some(reference) = self.reference_point(candidate) {
            debug!(
                "Checking {} kg on attempt {} against {} kg on attempt {}",
                candidate.weight, candidate.attempt, reference.weight, reference.attempt
            );
            compare_with_reference(candidate, &reference)?;
        }

        let same_stage = clock_start.attempt.stage() == candidate.attempt.stage();
        if !self.rules.round_robin
            && same_stage
            && candidate.weight > 0
            && candidate.weight < clock_start.weight
        {
            return Err(RuleViolation::ValueBelowStartedClock {
                entry: candidate.entry,
                attempt: candidate.attempt,
                requested: candidate.weight,
                weight_at_start: clock_start.weight,
            });
        }

        Ok(())
    }

    /// The clock owner's pending attempt while the clock runs, otherwise the
    /// most recent lift. An athlete is never compared with themselves.
    fn reference_point(&self, candidate: &LiftOrderReference) -> Option<LiftOrderReference> {
        let running = self
            .clock
            .clock_owner()
            .filter(|owner| *owner != candidate.entry)
            .and_then(|owner| self.history.running_lift_reference(owner));

        running
            .or_else(|| self.history.last_completed_lift())
            .filter(|reference| reference.entry != candidate.entry)
    }
}

/// Decision table for one candidate against one reference.
pub fn compare_with_reference(
    candidate: &LiftOrderReference,
    reference: &LiftOrderReference,
) -> Result<(), RuleViolation> {
    if candidate.attempt.stage() != reference.attempt.stage() {
        return Ok(());
    }

    match candidate.weight.cmp(&reference.weight) {
        Ordering::Greater => Ok(()),
        Ordering::Less if candidate.weight > 0 => Err(RuleViolation::WeightBelowAlreadyLifted {
            entry: candidate.entry,
            attempt: candidate.attempt,
            requested: candidate.weight,
            reference: *reference,
        }),
        Ordering::Less => Ok(()),
        Ordering::Equal => match candidate.attempt.cmp(&reference.attempt) {
            Ordering::Less => Err(RuleViolation::AttemptNumberTooLow {
                entry: candidate.entry,
                attempt: candidate.attempt,
                requested: candidate.weight,
                reference: *reference,
            }),
            Ordering::Greater => Ok(()),
            Ordering::Equal => compare_same_attempt(candidate, reference),
        },
    }
}

fn compare_same_attempt(
    candidate: &LiftOrderReference,
    reference: &LiftOrderReference,
) -> Result<(), RuleViolation> {
    let by_progression = candidate
        .progression
        .cmp(&reference.progression)
        .then(
            candidate
                .cumulative_progression
                .cmp(&reference.cumulative_progression),
        );

    match by_progression {
        // a larger jump means a lighter previous attempt, which lifts first
        Ordering::Greater => Err(RuleViolation::LiftedEarlier {
            entry: candidate.entry,
            attempt: candidate.attempt,
            requested: candidate.weight,
            progression: candidate.progression,
            reference: *reference,
        }),
        Ordering::Less => Ok(()),
        Ordering::Equal => compare_draw_numbers(candidate, reference),
    }
}

/// Start numbers decide; lot numbers stand in until start numbers are drawn.
fn compare_draw_numbers(
    candidate: &LiftOrderReference,
    reference: &LiftOrderReference,
) -> Result<(), RuleViolation> {
    if candidate.start_number > 0 && reference.start_number > 0 {
        if candidate.start_number < reference.start_number {
            return Err(RuleViolation::StartNumberTooHigh {
                entry: candidate.entry,
                attempt: candidate.attempt,
                requested: candidate.weight,
                start_number: candidate.start_number,
                reference: *reference,
            });
        }
        return Ok(());
    }

    if candidate.lot_number < reference.lot_number {
        return Err(RuleViolation::LotNumberTooHigh {
            entry: candidate.entry,
            attempt: candidate.attempt,
            requested: candidate.weight,
            lot_number: candidate.lot_number,
            reference: *reference,
        });
    }
    Ok(())
}
