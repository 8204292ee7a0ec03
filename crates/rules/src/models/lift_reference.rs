use serde::{Deserialize, Serialize};

use super::{AttemptNo, EntryId};

/// Where an athlete stands in the lift order for one requested attempt.
///
/// Built either for the last completed lift of the session, for the athlete
/// who owns the running clock, or for the write being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiftOrderReference {
    pub entry: EntryId,
    pub weight: i32,
    pub attempt: AttemptNo,
    pub progression: i32,
    pub cumulative_progression: i32,
    pub start_number: u32,
    pub lot_number: u32,
}
