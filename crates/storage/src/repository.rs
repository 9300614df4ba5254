use lex_core::model::{
    CalendarEvent, CategoryBudgets, Course, CourseError, CourseId, EventId, FitnessStat, LeaderboardEntry,
    SpendCategory, StatKind, Transaction, ValidatedEvent,
};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    InvalidCourse(#[from] CourseError),
}

/// In-place course change applied by [`CourseRepository::update_course`].
pub type CourseEdit<'a> = dyn FnMut(&mut Course) -> Result<(), CourseError> + 'a;

/// Repository contract for courses.
pub trait CourseRepository: Send + Sync {
    /// All courses in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store is unavailable.
    fn list_courses(&self) -> Result<Vec<Course>, StorageError>;

    /// Fetch a course by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    fn get_course(&self, id: &CourseId) -> Result<Course, StorageError>;

    /// Persist or replace a course, keeping its position when it already exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the course cannot be stored.
    fn upsert_course(&self, course: &Course) -> Result<(), StorageError>;

    /// Read, edit and write back one course as a single step, returning the
    /// stored result. A rejected edit leaves the stored course unchanged.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, `StorageError::InvalidCourse`
    /// when `edit` rejects the change, or other storage errors.
    fn update_course(
        &self,
        id: &CourseId,
        edit: &mut CourseEdit<'_>,
    ) -> Result<Course, StorageError>;
}

/// Repository contract for timetable events. The store assigns event ids.
pub trait EventRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store is unavailable.
    fn list_events(&self) -> Result<Vec<CalendarEvent>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    fn get_event(&self, id: EventId) -> Result<CalendarEvent, StorageError>;

    /// Stores a new event under the next free id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the event cannot be stored.
    fn insert_event(&self, event: ValidatedEvent) -> Result<CalendarEvent, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    fn delete_event(&self, id: EventId) -> Result<CalendarEvent, StorageError>;
}

pub trait TransactionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store is unavailable.
    fn list_transactions(&self) -> Result<Vec<Transaction>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a transaction with the same id exists.
    fn insert_transaction(&self, transaction: &Transaction) -> Result<(), StorageError>;
}

pub trait BudgetRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store is unavailable.
    fn get_budgets(&self) -> Result<CategoryBudgets, StorageError>;

    /// Sets one category's monthly budget, returning the previous amount.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the budget cannot be stored.
    fn set_budget(&self, category: SpendCategory, amount: u64) -> Result<u64, StorageError>;
}

pub trait FitnessRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store is unavailable.
    fn list_stats(&self) -> Result<Vec<FitnessStat>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the stat is not tracked.
    fn get_stat(&self, kind: StatKind) -> Result<FitnessStat, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the stat cannot be stored.
    fn upsert_stat(&self, stat: &FitnessStat) -> Result<(), StorageError>;
}

pub trait LeaderboardRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store is unavailable.
    fn list_entries(&self) -> Result<Vec<LeaderboardEntry>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if an entry with the same id exists.
    fn insert_entry(&self, entry: &LeaderboardEntry) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

#[derive(Default)]
struct EventTable {
    next_id: u64,
    rows: Vec<CalendarEvent>,
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Collections are `Vec`s so listings come back in insertion order.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    courses: Arc<Mutex<Vec<Course>>>,
    events: Arc<Mutex<EventTable>>,
    transactions: Arc<Mutex<Vec<Transaction>>>,
    budgets: Arc<Mutex<CategoryBudgets>>,
    stats: Arc<Mutex<Vec<FitnessStat>>>,
    leaderboard: Arc<Mutex<Vec<LeaderboardEntry>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

impl CourseRepository for InMemoryRepository {
    fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        Ok(lock(&self.courses)?.clone())
    }

    fn get_course(&self, id: &CourseId) -> Result<Course, StorageError> {
        let guard = lock(&self.courses)?;
        guard
            .iter()
            .find(|c| c.id() == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut guard = lock(&self.courses)?;
        match guard.iter_mut().find(|c| c.id() == course.id()) {
            Some(existing) => *existing = course.clone(),
            None => guard.push(course.clone()),
        }
        Ok(())
    }

    fn update_course(
        &self,
        id: &CourseId,
        edit: &mut CourseEdit<'_>,
    ) -> Result<Course, StorageError> {
        let mut guard = lock(&self.courses)?;
        let stored = guard
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or(StorageError::NotFound)?;
        let mut updated = stored.clone();
        edit(&mut updated)?;
        *stored = updated.clone();
        Ok(updated)
    }
}

impl EventRepository for InMemoryRepository {
    fn list_events(&self) -> Result<Vec<CalendarEvent>, StorageError> {
        Ok(lock(&self.events)?.rows.clone())
    }

    fn get_event(&self, id: EventId) -> Result<CalendarEvent, StorageError> {
        let guard = lock(&self.events)?;
        guard
            .rows
            .iter()
            .find(|e| e.id() == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    fn insert_event(&self, event: ValidatedEvent) -> Result<CalendarEvent, StorageError> {
        let mut guard = lock(&self.events)?;
        guard.next_id += 1;
        let stored = event.assign_id(EventId::new(guard.next_id));
        guard.rows.push(stored.clone());
        Ok(stored)
    }

    fn delete_event(&self, id: EventId) -> Result<CalendarEvent, StorageError> {
        let mut guard = lock(&self.events)?;
        let index = guard
            .rows
            .iter()
            .position(|e| e.id() == id)
            .ok_or(StorageError::NotFound)?;
        Ok(guard.rows.remove(index))
    }
}

impl TransactionRepository for InMemoryRepository {
    fn list_transactions(&self) -> Result<Vec<Transaction>, StorageError> {
        Ok(lock(&self.transactions)?.clone())
    }

    fn insert_transaction(&self, transaction: &Transaction) -> Result<(), StorageError> {
        let mut guard = lock(&self.transactions)?;
        if guard.iter().any(|t| t.id() == transaction.id()) {
            return Err(StorageError::Conflict);
        }
        guard.push(transaction.clone());
        Ok(())
    }
}

impl BudgetRepository for InMemoryRepository {
    fn get_budgets(&self) -> Result<CategoryBudgets, StorageError> {
        Ok(lock(&self.budgets)?.clone())
    }

    fn set_budget(&self, category: SpendCategory, amount: u64) -> Result<u64, StorageError> {
        Ok(lock(&self.budgets)?.set(category, amount))
    }
}

impl FitnessRepository for InMemoryRepository {
    fn list_stats(&self) -> Result<Vec<FitnessStat>, StorageError> {
        Ok(lock(&self.stats)?.clone())
    }

    fn get_stat(&self, kind: StatKind) -> Result<FitnessStat, StorageError> {
        let guard = lock(&self.stats)?;
        guard
            .iter()
            .find(|s| s.kind == kind)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    fn upsert_stat(&self, stat: &FitnessStat) -> Result<(), StorageError> {
        let mut guard = lock(&self.stats)?;
        match guard.iter_mut().find(|s| s.kind == stat.kind) {
            Some(existing) => *existing = stat.clone(),
            None => guard.push(stat.clone()),
        }
        Ok(())
    }
}

impl LeaderboardRepository for InMemoryRepository {
    fn list_entries(&self) -> Result<Vec<LeaderboardEntry>, StorageError> {
        Ok(lock(&self.leaderboard)?.clone())
    }

    fn insert_entry(&self, entry: &LeaderboardEntry) -> Result<(), StorageError> {
        let mut guard = lock(&self.leaderboard)?;
        if guard.iter().any(|e| e.id == entry.id) {
            return Err(StorageError::Conflict);
        }
        guard.push(entry.clone());
        Ok(())
    }
}

/// Aggregates the domain repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseRepository>,
    pub events: Arc<dyn EventRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub budgets: Arc<dyn BudgetRepository>,
    pub fitness: Arc<dyn FitnessRepository>,
    pub leaderboard: Arc<dyn LeaderboardRepository>,
}

impl Storage {
    /// Empty in-memory storage with the starter budgets.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    #[must_use]
    pub fn from_repository(repo: InMemoryRepository) -> Self {
        let courses: Arc<dyn CourseRepository> = Arc::new(repo.clone());
        let events: Arc<dyn EventRepository> = Arc::new(repo.clone());
        let transactions: Arc<dyn TransactionRepository> = Arc::new(repo.clone());
        let budgets: Arc<dyn BudgetRepository> = Arc::new(repo.clone());
        let fitness: Arc<dyn FitnessRepository> = Arc::new(repo.clone());
        let leaderboard: Arc<dyn LeaderboardRepository> = Arc::new(repo);
        Self {
            courses,
            events,
            transactions,
            budgets,
            fitness,
            leaderboard,
        }
    }
}
