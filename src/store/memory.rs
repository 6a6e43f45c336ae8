use dashmap::DashMap;

use crate::store::Repository;

/// Process-lifetime repository backed by a concurrent map
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    entries: DashMap<String, T>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> Repository<T> for InMemoryRepository<T> {
    fn get(&self, id: &str) -> Option<T> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    fn set(&self, id: &str, value: T) {
        self.entries.insert(id.to_string(), value);
    }

    fn remove(&self, id: &str) -> Option<T> {
        self.entries.remove(id).map(|(_, value)| value)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
