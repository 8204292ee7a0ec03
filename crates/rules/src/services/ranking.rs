use serde::Serialize;
use std::cmp::Ordering;

use super::scoring::ScoringEngine;
use crate::models::{EntryId, ScoringSystem, SessionEntry};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub entry: EntryId,
    pub name: String,
    pub score: f64,
    /// `None` for athletes without a score (no total, or not weighed in).
    pub rank: Option<u32>,
}

/// Orders entries by score. On a tie the athlete whose last good lift came
/// first ranks higher, then the earlier start number. Like `ROW_NUMBER()`,
/// every ranked entry gets its own position.
pub fn rank_entries(
    engine: &ScoringEngine,
    entries: &[SessionEntry],
    system: ScoringSystem,
) -> Vec<RankedEntry> {
    let mut scored: Vec<(&SessionEntry, f64)> = entries
        .iter()
        .map(|entry| (entry, engine.compute_score(&entry.meta, &entry.card, system)))
        .collect();

    scored.sort_by(|(a, a_score), (b, b_score)| {
        let a_ranked = *a_score > 0.0;
        let b_ranked = *b_score > 0.0;
        b_ranked
            .cmp(&a_ranked)
            .then_with(|| b_score.partial_cmp(a_score).unwrap_or(Ordering::Equal))
            .then_with(|| {
                let reached = |entry: &SessionEntry| entry.card.last_successful_lift_time();
                match (reached(a), reached(b)) {
                    (Some(a_time), Some(b_time)) => a_time.cmp(&b_time),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            })
            .then_with(|| a.meta.start_number.cmp(&b.meta.start_number))
    });

    let mut next_rank = 1;
    scored
        .into_iter()
        .map(|(entry, score)| {
            let rank = (score > 0.0).then(|| {
                let rank = next_rank;
                next_rank += 1;
                rank
            });
            RankedEntry {
                entry: entry.id(),
                name: entry.meta.name.clone(),
                score,
                rank,
            }
        })
        .collect()
}
