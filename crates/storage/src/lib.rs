pub mod repository;
pub mod seed;

pub use repository::{
    BudgetRepository, CourseEdit, CourseRepository, EventRepository, FitnessRepository,
    InMemoryRepository, LeaderboardRepository, Storage, StorageError, TransactionRepository,
};
pub use seed::SeedError;
