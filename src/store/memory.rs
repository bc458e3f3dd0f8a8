use std::sync::Mutex;

use super::HeroStore;
use crate::error::{HeroNetError, Result};
use crate::graph::{HeroRecord, LinkRecord, Tables};

/// Tables held in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(tables: Tables) -> Self {
        Self {
            tables: Mutex::new(tables),
        }
    }

    /// Copy of the last saved tables.
    pub fn snapshot(&self) -> Result<Tables> {
        self.tables
            .lock()
            .map(|t| t.clone())
            .map_err(|_| HeroNetError::LockPoisoned)
    }
}

impl HeroStore for MemoryStore {
    fn load(&self) -> Result<Tables> {
        self.snapshot()
    }

    fn save_heroes(&self, heroes: &[HeroRecord]) -> Result<()> {
        let mut guard = self.tables.lock().map_err(|_| HeroNetError::LockPoisoned)?;
        guard.heroes = heroes.to_vec();
        Ok(())
    }

    fn save_links(&self, links: &[LinkRecord]) -> Result<()> {
        let mut guard = self.tables.lock().map_err(|_| HeroNetError::LockPoisoned)?;
        guard.links = links.to_vec();
        Ok(())
    }
}
