//! Storage for wallets and validators
//!
//! Domain code only sees the [`Repository`] trait. The service ships with an
//! in-memory implementation; state lives for the process lifetime.

mod memory;

pub use memory::InMemoryRepository;

/// Keyed storage for one entity type.
///
/// `get` hands out an owned copy; changes become visible only after `set`.
pub trait Repository<T>: Send + Sync {
    fn get(&self, id: &str) -> Option<T>;

    fn set(&self, id: &str, value: T);

    /// Remove and return the entity stored under `id`
    fn remove(&self, id: &str) -> Option<T>;

    /// Number of stored entities
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
