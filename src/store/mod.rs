//! Durable store — the two tables that are heronet's source of truth.
//!
//! [`HeroStore`] is the seam between the network and the filesystem.
//! [`CsvStore`] keeps each table as comma-delimited text with a header
//! row; [`MemoryStore`] keeps them in memory for tests and dry runs.

mod csv;
mod memory;

pub use self::csv::CsvStore;
pub use self::memory::MemoryStore;

use crate::error::Result;
use crate::graph::{HeroRecord, LinkRecord, Tables};

/// Column names of the hero table, in order.
pub const HERO_COLUMNS: &[&str] = &["id", "name", "created_at"];

/// Column names of the link table, in order.
pub const LINK_COLUMNS: &[&str] = &["source", "target"];

/// Load and persist both tables.
///
/// Each mutation changes exactly one table, so the service commits it
/// with a single `save_heroes` or `save_links` call.
pub trait HeroStore: Send {
    /// Read both tables in table order.
    fn load(&self) -> Result<Tables>;

    /// Replace the hero table. Either the whole table is replaced or
    /// nothing is.
    fn save_heroes(&self, heroes: &[HeroRecord]) -> Result<()>;

    /// Replace the link table. Either the whole table is replaced or
    /// nothing is.
    fn save_links(&self, links: &[LinkRecord]) -> Result<()>;

    /// Replace both tables, heroes first. Not atomic across the pair.
    fn save(&self, tables: &Tables) -> Result<()> {
        self.save_heroes(&tables.heroes)?;
        self.save_links(&tables.links)
    }
}
