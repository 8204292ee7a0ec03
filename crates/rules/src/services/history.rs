use chrono::NaiveDateTime;

use super::progression::{cumulative_progression, progression, requested_weight};
use crate::models::{AttemptCard, AttemptNo, EntryId, EntryMeta, LiftOrderReference, SessionEntry};
use crate::traits::LiftHistory;

/// Builds the lift-order position of an athlete requesting `weight` on `attempt`.
pub fn reference_for_card(
    meta: &EntryMeta,
    card: &AttemptCard,
    attempt: AttemptNo,
    weight: i32,
) -> LiftOrderReference {
    LiftOrderReference {
        entry: meta.id,
        weight,
        attempt,
        progression: progression(card, weight, attempt),
        cumulative_progression: cumulative_progression(card, weight, attempt),
        start_number: meta.start_number,
        lot_number: meta.lot_number,
    }
}

pub fn reference_for(entry: &SessionEntry, attempt: AttemptNo, weight: i32) -> LiftOrderReference {
    reference_for_card(&entry.meta, &entry.card, attempt, weight)
}

/// Lift history reconstructed from the cards of one session.
///
/// Only attempts with a non-zero outcome and a lift time count as lifted;
/// declined attempts never reach the platform.
pub struct SessionSnapshot<'a> {
    entries: &'a [SessionEntry],
}

impl<'a> SessionSnapshot<'a> {
    pub fn new(entries: &'a [SessionEntry]) -> Self {
        Self { entries }
    }

    pub fn entry(&self, id: EntryId) -> Option<&'a SessionEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Every completed lift in chronological order.
    pub fn completed_lifts(&self) -> Vec<(NaiveDateTime, LiftOrderReference)> {
        let mut lifts: Vec<_> = self
            .entries
            .iter()
            .flat_map(|entry| {
                entry.card.slots().filter_map(move |(attempt, slot)| {
                    let value = slot.actual_lift.filter(|v| *v != 0)?;
                    let time = slot.lift_time?;
                    Some((time, reference_for(entry, attempt, value.abs())))
                })
            })
            .collect();
        lifts.sort_by_key(|(time, reference)| (*time, reference.attempt));
        lifts
    }
}

impl LiftHistory for SessionSnapshot<'_> {
    fn last_completed_lift(&self) -> Option<LiftOrderReference> {
        self.completed_lifts()
            .pop()
            .map(|(_, reference)| reference)
    }

    fn running_lift_reference(&self, clock_owner: EntryId) -> Option<LiftOrderReference> {
        let entry = self.entry(clock_owner)?;
        let attempt = entry.card.next_attempt()?;
        Some(reference_for(entry, attempt, requested_weight(&entry.card, attempt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryMeta, Field, Gender};
    use chrono::NaiveDate;

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(15, minute, 0)
            .unwrap()
    }

    fn entry(name: &str, start_number: u32) -> SessionEntry {
        let mut meta = EntryMeta::new(name, Gender::M);
        meta.start_number = start_number;
        SessionEntry::new(meta)
    }

    #[test]
    fn test_no_history_before_first_lift() {
        let entries = vec![entry("A", 1), entry("B", 2)];
        let snapshot = SessionSnapshot::new(&entries);
        assert!(snapshot.last_completed_lift().is_none());
    }

    #[test]
    fn test_last_completed_lift_uses_lift_time() {
        let mut a = entry("A", 1);
        let mut b = entry("B", 2);
        a.card.record(AttemptNo::SNATCH_1, Field::ActualLift, Some(100), at(3));
        b.card.record(AttemptNo::SNATCH_1, Field::ActualLift, Some(-98), at(1));
        let entries = vec![a, b];
        let snapshot = SessionSnapshot::new(&entries);

        let last = snapshot.last_completed_lift().unwrap();
        assert_eq!(last.entry, entries[0].id());
        assert_eq!(last.weight, 100);
        assert_eq!(last.attempt, AttemptNo::SNATCH_1);
        assert_eq!(snapshot.completed_lifts().len(), 2);
    }

    #[test]
    fn test_declined_attempts_are_not_history() {
        let mut a = entry("A", 1);
        a.card.record(AttemptNo::SNATCH_1, Field::ActualLift, Some(90), at(1));
        a.card.record(AttemptNo::SNATCH_2, Field::Declaration, Some(0), at(2));
        let entries = vec![a];
        let snapshot = SessionSnapshot::new(&entries);
        assert_eq!(snapshot.last_completed_lift().unwrap().weight, 90);
    }

    #[test]
    fn test_running_reference_for_clock_owner() {
        let mut a = entry("A", 1);
        a.card.record(AttemptNo::SNATCH_1, Field::ActualLift, Some(-100), at(1));
        a.card.record(AttemptNo::SNATCH_2, Field::Declaration, Some(102), at(2));
        let id = a.id();
        let entries = vec![a];
        let snapshot = SessionSnapshot::new(&entries);

        let running = snapshot.running_lift_reference(id).unwrap();
        assert_eq!(running.weight, 102);
        assert_eq!(running.attempt, AttemptNo::SNATCH_2);
        assert_eq!(running.progression, 2);
        assert!(snapshot.running_lift_reference(EntryId::new()).is_none());
    }
}
