//! The 20 kg rule: the first snatch and first clean & jerk requests must add
//! up to within a margin of the entry total. Masters use 20 % of the entry
//! total instead of 20 kg.

use crate::models::{AttemptCard, AttemptNo, CompetitionRules, EntryMeta, Field, Stage};
use crate::violation::RuleViolation;

pub const STANDARD_MARGIN_KG: i32 = 20;
pub const MASTERS_MARGIN_PERCENT: i32 = 20;

/// Allowed shortfall below the entry total. The masters margin rounds down.
pub fn starting_total_margin(meta: &EntryMeta) -> i32 {
    if meta.is_masters() {
        (meta.qualifying_total * MASTERS_MARGIN_PERCENT).div_euclid(100)
    } else {
        STANDARD_MARGIN_KG
    }
}

/// Smallest sum of first requests that satisfies the rule.
pub fn required_starting_total(meta: &EntryMeta) -> i32 {
    (meta.qualifying_total - starting_total_margin(meta)).max(0)
}

/// First request of a stage: last of declaration, change 1, change 2.
pub fn first_request(card: &AttemptCard, stage: Stage) -> i32 {
    card.slot(stage.first_attempt()).last_change().unwrap_or(0)
}

/// Checks the rule as it would stand after writing `value` into `field` of
/// `attempt`. Writes to other attempts, or while either first request is
/// still empty, are not subject to the rule.
pub fn check_starting_total(
    rules: &CompetitionRules,
    meta: &EntryMeta,
    card: &AttemptCard,
    attempt: AttemptNo,
    field: Field,
    value: Option<i32>,
) -> Result<(), RuleViolation> {
    if !rules.enforce_starting_total
        || meta.qualifying_total <= 0
        || !field.is_request()
        || !attempt.is_first_of_stage()
    {
        return Ok(());
    }

    let request_after_write = |stage: Stage| {
        let first = stage.first_attempt();
        if first == attempt {
            card.slot(first).with_field(field, value).last_change().unwrap_or(0)
        } else {
            first_request(card, stage)
        }
    };
    let snatch = request_after_write(Stage::Snatch);
    let clean_jerk = request_after_write(Stage::CleanJerk);
    if snatch <= 0 || clean_jerk <= 0 {
        return Ok(());
    }

    let requested_total = snatch + clean_jerk;
    let margin = starting_total_margin(meta);
    if meta.qualifying_total - requested_total > margin {
        return Err(RuleViolation::Rule15_20Violated {
            entry: meta.id,
            attempt,
            qualifying_total: meta.qualifying_total,
            requested_total,
            margin,
        });
    }
    Ok(())
}
