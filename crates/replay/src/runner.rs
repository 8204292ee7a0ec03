use chrono::{Duration, NaiveDateTime};
use rules::{
    AttemptNo, ClockReading, CompetitionRules, EntryId, Proposal, RankedEntry, ScoringEngine,
    ScoringSystem, Session, SessionId, SessionRegistry, ValidationMode, parse_weight_input,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::session_file::{ClockData, EventData, SessionFile};
use crate::{ReplayError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    Rejected { key: String, message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct EventOutcome {
    pub index: usize,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub session: Session,
    pub outcomes: Vec<EventOutcome>,
}

impl ReplayReport {
    pub fn applied_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome == Outcome::Applied)
            .count()
    }

    pub fn rejected(&self) -> impl Iterator<Item = &EventOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Rejected { .. }))
    }

    pub fn ranking(&self, engine: &ScoringEngine, system: ScoringSystem) -> Vec<RankedEntry> {
        self.session.ranking(engine, system)
    }
}

/// Feeds recorded field-of-play events through the engine, one session
/// lock per file.
#[derive(Debug, Default)]
pub struct SessionReplayer {
    registry: SessionRegistry,
}

impl SessionReplayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn replay(&self, file: &SessionFile) -> Result<ReplayReport> {
        let session_id = SessionId::new(file.session.id.clone());
        let (session, keys) = build_session(session_id.clone(), file.rules.clone(), file);
        self.registry.insert(session)?;

        info!(
            "Replaying {} events for session {} ({} entries)",
            file.events.len(),
            session_id,
            keys.len()
        );

        let base_time = file.session.started_at.unwrap_or_default();
        let mut outcomes = Vec::with_capacity(file.events.len());

        for (index, event) in file.events.iter().enumerate() {
            let default_at = base_time + Duration::seconds(index as i64);
            debug!("Event {}: {}", index + 1, event.kind());
            let action = Action::resolve(&keys, event, default_at)?;
            let result = self
                .registry
                .with_session(&session_id, |session| action.apply(session));

            let outcome = match result {
                Ok(()) => Outcome::Applied,
                Err(e) => match e.as_rule_violation() {
                    Some(violation) => {
                        warn!("Event {} rejected: {}", index + 1, violation);
                        Outcome::Rejected {
                            key: violation.message_key().to_string(),
                            message: violation.to_string(),
                        }
                    }
                    None => return Err(e.into()),
                },
            };

            outcomes.push(EventOutcome {
                index: index + 1,
                kind: event.kind(),
                entry: event.entry_keys().first().map(|key| key.to_string()),
                outcome,
            });
        }

        let session = self
            .registry
            .with_session(&session_id, |session| Ok(session.clone()))?;

        let report = ReplayReport { session, outcomes };
        info!(
            "Session {}: {} applied, {} rejected",
            session_id,
            report.applied_count(),
            report.rejected().count()
        );
        Ok(report)
    }
}

fn build_session(
    id: SessionId,
    rules: CompetitionRules,
    file: &SessionFile,
) -> (Session, HashMap<String, EntryId>) {
    let mut session = Session::new(id, rules);
    let keys = file
        .entries
        .iter()
        .map(|entry| (entry.key.clone(), session.add_entry(entry.to_meta())))
        .collect();
    (session, keys)
}

fn resolve(keys: &HashMap<String, EntryId>, key: &str) -> Result<EntryId> {
    keys.get(key)
        .copied()
        .ok_or_else(|| ReplayError::UnknownEntryKey(key.to_string()))
}

fn clock_reading(
    keys: &HashMap<String, EntryId>,
    clock: Option<&ClockData>,
) -> Result<ClockReading> {
    let Some(clock) = clock else {
        return Ok(ClockReading::idle());
    };
    let initial = clock
        .initial_ms
        .unwrap_or(ClockReading::DEFAULT_TIME_ALLOWED_MS);
    Ok(match &clock.owner {
        Some(owner) => ClockReading::running(resolve(keys, owner)?, initial, clock.remaining_ms),
        None => ClockReading {
            remaining_ms: clock.remaining_ms,
            owner: None,
            initial_ms: initial,
        },
    })
}

/// An event with its entry keys and weights resolved, ready to run under
/// the session lock.
enum Action {
    Submit {
        entry: EntryId,
        proposal: Proposal,
        mode: ValidationMode,
        clock: ClockReading,
        at: NaiveDateTime,
    },
    StartClock {
        entry: EntryId,
        attempt: AttemptNo,
        weight: i32,
    },
    StopClock,
    TimingChecks(bool),
    WeighIn(Option<EntryId>),
    Withdraw {
        entry: EntryId,
        snatch_only: bool,
    },
    Override {
        entry: EntryId,
        attempt: AttemptNo,
        value: Option<i32>,
        at: NaiveDateTime,
    },
}

impl Action {
    fn resolve(
        keys: &HashMap<String, EntryId>,
        event: &EventData,
        default_at: NaiveDateTime,
    ) -> Result<Self> {
        Ok(match event {
            EventData::Propose {
                entry,
                attempt,
                field,
                value,
                bypass,
                clock,
                at,
            } => Self::Submit {
                entry: resolve(keys, entry)?,
                proposal: Proposal::new(
                    AttemptNo::try_from(*attempt)?,
                    *field,
                    parse_weight_input(value),
                ),
                mode: if *bypass {
                    ValidationMode::Bypassed
                } else {
                    ValidationMode::Enforced
                },
                clock: clock_reading(keys, clock.as_ref())?,
                at: at.unwrap_or(default_at),
            },
            EventData::StartClock {
                entry,
                attempt,
                weight,
            } => Self::StartClock {
                entry: resolve(keys, entry)?,
                attempt: AttemptNo::try_from(*attempt)?,
                weight: *weight,
            },
            EventData::StopClock => Self::StopClock,
            EventData::SetTimingChecks { enabled } => Self::TimingChecks(*enabled),
            EventData::WeighIn { entry } => Self::WeighIn(
                entry
                    .as_deref()
                    .map(|key| resolve(keys, key))
                    .transpose()?,
            ),
            EventData::Withdraw { entry, snatch_only } => Self::Withdraw {
                entry: resolve(keys, entry)?,
                snatch_only: *snatch_only,
            },
            EventData::Override {
                entry,
                attempt,
                value,
                at,
            } => Self::Override {
                entry: resolve(keys, entry)?,
                attempt: AttemptNo::try_from(*attempt)?,
                value: parse_weight_input(value),
                at: at.unwrap_or(default_at),
            },
        })
    }

    fn apply(&self, session: &mut Session) -> rules::Result<()> {
        match self {
            Self::Submit {
                entry,
                proposal,
                mode,
                clock,
                at,
            } => session.submit_at(*entry, proposal, *mode, clock, *at),
            Self::StartClock {
                entry,
                attempt,
                weight,
            } => session.clock_started(*entry, *weight, *attempt),
            Self::StopClock => {
                session.clock_stopped();
                Ok(())
            }
            Self::TimingChecks(enabled) => {
                session.set_timing_checks(*enabled);
                Ok(())
            }
            Self::WeighIn(entry) => {
                session.set_weigh_in_entry(*entry);
                Ok(())
            }
            Self::Withdraw { entry, snatch_only } => {
                if *snatch_only {
                    session.withdraw_from_snatch(*entry)?;
                } else {
                    session.withdraw(*entry)?;
                }
                Ok(())
            }
            Self::Override {
                entry,
                attempt,
                value,
                at,
            } => session.override_actual_lift(*entry, *attempt, *value, *at),
        }
    }
}
