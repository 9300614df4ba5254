use serde::{Deserialize, Serialize};

use crate::model::ids::EntryId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: EntryId,
    pub name: String,
    pub weekly_points: u32,
    pub all_time_points: u32,
    pub avatar: String,
}
