use std::sync::Arc;

use lex_core::leaderboard::WeeklyCountdown;
use lex_core::model::LeaderboardEntry;
use storage::LeaderboardRepository;

use crate::error::ActivityError;
use crate::Clock;

#[derive(Clone)]
pub struct LeaderboardService {
    clock: Clock,
    entries: Arc<dyn LeaderboardRepository>,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(clock: Clock, entries: Arc<dyn LeaderboardRepository>) -> Self {
        Self { clock, entries }
    }

    /// Participants in stored order; rank them with `lex_core::leaderboard::rank`.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::Storage` if repository access fails.
    pub fn entries(&self) -> Result<Vec<LeaderboardEntry>, ActivityError> {
        Ok(self.entries.list_entries()?)
    }

    #[must_use]
    pub fn countdown(&self) -> WeeklyCountdown {
        WeeklyCountdown::until_reset(self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lex_core::leaderboard::{rank, Standing};
    use lex_core::time::fixed_now;
    use storage::Storage;

    #[test]
    fn seeded_board_ranks_and_counts_down() {
        let storage = Storage::seeded(1, fixed_now()).unwrap();
        let service = LeaderboardService::new(Clock::fixed(fixed_now()), storage.leaderboard);

        let entries = service.entries().unwrap();
        let weekly = rank(&entries, Standing::Weekly);
        assert_eq!(weekly.podium[0].entry.name, "Davis Curtis");
        assert_eq!(weekly.rest.len(), 2);

        assert_eq!(service.countdown().to_string(), "4d 1h 46m");
    }
}
