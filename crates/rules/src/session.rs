//! One competition session (group) and the registry that keeps sessions
//! independent of each other.
//!
//! Every write is validated and applied while holding the session's own
//! lock, so the lift-order check always sees a consistent set of cards.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::models::{
    AttemptNo, ClockStart, CompetitionRules, EntryId, EntryMeta, Field, LiftingState,
    ScoringSystem, SessionEntry, SessionId, ValidationMode,
};
use crate::services::{
    AttemptValidator, Proposal, RankedEntry, ScoringEngine, SessionSnapshot, rank_entries,
};
use crate::traits::ClockView;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub rules: CompetitionRules,
    entries: Vec<SessionEntry>,
    lifting: LiftingState,
}

impl Session {
    pub fn new(id: SessionId, rules: CompetitionRules) -> Self {
        Self {
            id,
            rules,
            entries: Vec::new(),
            lifting: LiftingState::default(),
        }
    }

    pub fn add_entry(&mut self, meta: EntryMeta) -> EntryId {
        let id = meta.id;
        debug!("Adding {} to session {}", meta.name, self.id);
        self.entries.push(SessionEntry::new(meta));
        id
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    pub fn lifting(&self) -> &LiftingState {
        &self.lifting
    }

    pub fn entry(&self, id: EntryId) -> Result<&SessionEntry> {
        self.entries
            .iter()
            .find(|entry| entry.id() == id)
            .ok_or_else(|| self.unknown_entry(id))
    }

    fn entry_mut(&mut self, id: EntryId) -> Result<&mut SessionEntry> {
        let session = self.id.clone();
        self.entries
            .iter_mut()
            .find(|entry| entry.id() == id)
            .ok_or(EngineError::UnknownEntry { session, entry: id })
    }

    fn unknown_entry(&self, entry: EntryId) -> EngineError {
        EngineError::UnknownEntry {
            session: self.id.clone(),
            entry,
        }
    }

    /// Records the weight on the bar when the clock starts for `entry`, and
    /// turns timing checks on for the running attempt.
    pub fn clock_started(&mut self, entry: EntryId, weight: i32, attempt: AttemptNo) -> Result<()> {
        let name = self.entry(entry)?.meta.name.clone();
        info!("Clock started for {} at {} kg, attempt {}", name, weight, attempt);
        self.lifting.last_clock_start = Some(ClockStart {
            entry,
            weight,
            attempt,
        });
        self.lifting.timing_checks = true;
        Ok(())
    }

    /// The weight at the last clock start is kept for later lift-order checks.
    pub fn clock_stopped(&mut self) {
        debug!("Clock stopped in session {}", self.id);
        self.lifting.timing_checks = false;
    }

    pub fn set_timing_checks(&mut self, enabled: bool) {
        self.lifting.timing_checks = enabled;
    }

    pub fn set_weigh_in_entry(&mut self, entry: Option<EntryId>) {
        self.lifting.weigh_in_entry = entry;
    }

    /// Checks a write without applying it.
    pub fn validate(
        &self,
        entry: EntryId,
        proposal: &Proposal,
        mode: ValidationMode,
        clock: &dyn ClockView,
    ) -> Result<()> {
        let snapshot = SessionSnapshot::new(&self.entries);
        let target = snapshot.entry(entry).ok_or_else(|| self.unknown_entry(entry))?;
        AttemptValidator::new(&self.rules, &self.lifting, clock, &snapshot).propose(
            &target.meta,
            &target.card,
            proposal,
            mode,
        )?;
        Ok(())
    }

    pub fn submit(
        &mut self,
        entry: EntryId,
        proposal: &Proposal,
        mode: ValidationMode,
        clock: &dyn ClockView,
    ) -> Result<()> {
        self.submit_at(entry, proposal, mode, clock, Utc::now().naive_utc())
    }

    /// Validates then applies a write; `at` stamps actual lifts.
    pub fn submit_at(
        &mut self,
        entry: EntryId,
        proposal: &Proposal,
        mode: ValidationMode,
        clock: &dyn ClockView,
        at: NaiveDateTime,
    ) -> Result<()> {
        self.validate(entry, proposal, mode, clock)?;

        let target = self.entry_mut(entry)?;
        target.card.record(proposal.attempt, proposal.field, proposal.value, at);
        info!(
            "Recorded {} attempt {} {} = {:?}",
            target.meta.name, proposal.attempt, proposal.field, proposal.value
        );
        Ok(())
    }

    pub fn withdraw(&mut self, entry: EntryId) -> Result<u8> {
        let target = self.entry_mut(entry)?;
        let declined = target.card.withdraw();
        info!("{} withdrew, {} attempts declined", target.meta.name, declined);
        Ok(declined)
    }

    pub fn withdraw_from_snatch(&mut self, entry: EntryId) -> Result<u8> {
        let target = self.entry_mut(entry)?;
        let declined = target.card.withdraw_from_snatch();
        info!(
            "{} withdrew from snatch, {} attempts declined",
            target.meta.name, declined
        );
        Ok(declined)
    }

    /// Jury decision: sets an outcome with no rule check.
    pub fn override_actual_lift(
        &mut self,
        entry: EntryId,
        attempt: AttemptNo,
        value: Option<i32>,
        at: NaiveDateTime,
    ) -> Result<()> {
        let target = self.entry_mut(entry)?;
        warn!(
            "Actual lift overridden for {} attempt {}: {:?} -> {:?}",
            target.meta.name,
            attempt,
            target.card.slot(attempt).field(Field::ActualLift),
            value
        );
        target.card.override_actual_lift(attempt, value, at);
        Ok(())
    }

    pub fn ranking(&self, engine: &ScoringEngine, system: ScoringSystem) -> Vec<RankedEntry> {
        rank_entries(engine, &self.entries, system)
    }
}

/// Sessions running in parallel on different platforms. Each session has
/// its own lock; the map lock is only held to look a session up.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Session) -> Result<Arc<Mutex<Session>>> {
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        self.sessions
            .write()
            .map_err(|_| EngineError::LockPoisoned(id.clone()))?
            .insert(id, Arc::clone(&handle));
        Ok(handle)
    }

    pub fn session(&self, id: &SessionId) -> Result<Arc<Mutex<Session>>> {
        self.sessions
            .read()
            .map_err(|_| EngineError::LockPoisoned(id.clone()))?
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownSession(id.clone()))
    }

    pub fn session_ids(&self) -> Result<Vec<SessionId>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| EngineError::LockPoisoned(SessionId::new("*")))?;
        let mut ids: Vec<_> = sessions.keys().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(ids)
    }

    /// Runs `f` with exclusive access to one session.
    pub fn with_session<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut Session) -> Result<T>,
    ) -> Result<T> {
        let handle = self.session(id)?;
        let mut session = handle
            .lock()
            .map_err(|_| EngineError::LockPoisoned(id.clone()))?;
        f(&mut session)
    }

    pub fn submit(
        &self,
        session: &SessionId,
        entry: EntryId,
        proposal: &Proposal,
        mode: ValidationMode,
        clock: &dyn ClockView,
    ) -> Result<()> {
        self.with_session(session, |s| s.submit(entry, proposal, mode, clock))
    }
}
