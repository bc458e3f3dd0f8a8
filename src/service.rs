//! The hero service — one owned network plus its store, shared by every caller.
//!
//! Mutations validate against the current network, save the staged
//! tables, and only then apply the change in memory. A failed save
//! returns the error with memory untouched, so the network never holds
//! rows the store does not.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::HeroNetConfig;
use crate::error::{HeroNetError, Result};
use crate::export::{self, GraphJson, ImageFormat, LayoutConfig, RenderOptions};
use crate::graph::{load_network, today, ConnectionOutcome, HeroId, HeroNetwork};
use crate::query::{self, HeroInfo, StatsOptions, StatsResponse};
use crate::store::{CsvStore, HeroStore};

/// The service behind the process-wide lock.
pub type SharedService = Arc<Mutex<HeroService>>;

/// Reply to a successful `add_hero`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddHeroResponse {
    pub success: bool,
    pub id: HeroId,
    pub message: String,
}

/// Reply to `add_connection`. `success` is false for unknown, duplicate
/// or self connections; `reason` then says which.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub struct HeroService {
    network: HeroNetwork,
    store: Box<dyn HeroStore>,
    stats: StatsOptions,
    render: RenderOptions,
    snapshot_file: PathBuf,
}

impl HeroService {
    /// Load the network from `store` with default options.
    pub fn open(store: Box<dyn HeroStore>) -> Result<Self> {
        let network = load_network(store.as_ref())?;
        Ok(Self {
            network,
            store,
            stats: StatsOptions::default(),
            render: RenderOptions::default(),
            snapshot_file: PathBuf::from("superhero_network.png"),
        })
    }

    /// Open the CSV store named by `config` and apply its options.
    pub fn from_config(config: &HeroNetConfig) -> Result<Self> {
        let store = CsvStore::from_config(config)?;
        info!(
            heroes = %store.heroes_path().display(),
            links = %store.links_path().display(),
            "opening hero store"
        );
        Ok(Self::open(Box::new(store))?.configure(config))
    }

    /// Apply stats, render and snapshot settings from `config`.
    pub fn configure(mut self, config: &HeroNetConfig) -> Self {
        self.stats = StatsOptions {
            recent_days: config.recent_days,
            top_k: config.top_k,
        };
        self.render = RenderOptions {
            width: config.canvas_width,
            height: config.canvas_height,
            raster_scale: config.raster_scale,
            layout: LayoutConfig::with_seed(config.layout_seed),
        };
        self.snapshot_file = config.snapshot_file.clone();
        self
    }

    pub fn into_shared(self) -> SharedService {
        Arc::new(Mutex::new(self))
    }

    pub fn network(&self) -> &HeroNetwork {
        &self.network
    }

    pub fn stats_options(&self) -> StatsOptions {
        self.stats
    }

    // ─── Reads ──────────────────────────────────────────────────

    pub fn get_stats(&self) -> StatsResponse {
        self.stats_at(today())
    }

    /// Stats with an explicit "today".
    pub fn stats_at(&self, today: NaiveDate) -> StatsResponse {
        query::network_stats(&self.network, today, self.stats)
    }

    pub fn get_hero(&self, name: &str) -> Option<HeroInfo> {
        query::hero_info(&self.network, name)
    }

    pub fn get_graph(&self) -> GraphJson {
        export::graph_json(&self.network)
    }

    pub fn render_image(&self, format: ImageFormat) -> Result<Vec<u8>> {
        export::render(&self.network, format, &self.render, &mut rand::thread_rng())
    }

    /// Write an image of the network to `path`, or to the configured
    /// snapshot file. Returns the path written.
    pub fn write_snapshot(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = path.unwrap_or(self.snapshot_file.as_path()).to_path_buf();
        export::write_snapshot(&self.network, &path, &self.render, &mut rand::thread_rng())?;
        Ok(path)
    }

    // ─── Mutations ──────────────────────────────────────────────

    /// Add a hero. `created_at` accepts `YYYY-MM-DD` or an RFC 3339
    /// timestamp; blank or absent means today.
    pub fn add_hero(&mut self, name: &str, created_at: Option<&str>) -> Result<AddHeroResponse> {
        let created_at = match created_at.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_created_at(raw)?),
            None => None,
        };
        let record = self.network.plan_hero(name, created_at)?;

        let mut staged = self.network.heroes().to_vec();
        staged.push(record.clone());
        self.store.save_heroes(&staged)?;

        let name = record.name.clone();
        let id = self.network.apply_hero(record);
        info!(id, name = %name, "hero added");

        Ok(AddHeroResponse {
            success: true,
            id,
            message: format!("Hero {} added successfully! 🎉", name),
        })
    }

    /// Befriend two heroes by name. Unknown names, existing friendships and
    /// self connections come back as `success: false`, not as errors.
    pub fn add_connection(&mut self, source: &str, target: &str) -> Result<ConnectionResponse> {
        if source.trim().is_empty() || target.trim().is_empty() {
            return Err(HeroNetError::Validation(
                "Both source and target are required".to_string(),
            ));
        }

        let link = match self.network.plan_connection(source, target) {
            Ok(link) => link,
            Err(outcome) => {
                warn!(source, target, reason = %outcome, "connection rejected");
                return Ok(ConnectionResponse::rejected(&outcome));
            }
        };

        let mut staged = self.network.links().to_vec();
        staged.push(link);
        self.store.save_links(&staged)?;

        let outcome = self.network.apply_connection(link);
        debug_assert!(self.network.is_consistent());
        info!(source, target, outcome = %outcome, "connection added");

        Ok(ConnectionResponse {
            success: true,
            message: format!("Connection between {} and {} created! 🤝", source, target),
            reason: None,
        })
    }
}

impl ConnectionResponse {
    fn rejected(outcome: &ConnectionOutcome) -> Self {
        Self {
            success: false,
            message: "Connection already exists or heroes not found ⚠️".to_string(),
            reason: Some(outcome.to_string()),
        }
    }
}

/// Run `f` with the service locked.
pub fn with_service<T>(shared: &SharedService, f: impl FnOnce(&mut HeroService) -> T) -> Result<T> {
    let mut guard = shared.lock().map_err(|_| HeroNetError::LockPoisoned)?;
    Ok(f(&mut guard))
}

/// Parse a creation date given as `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_created_at(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| {
            HeroNetError::Validation(format!(
                "created_at must be YYYY-MM-DD or RFC 3339, got {}",
                raw
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{HeroRecord, LinkRecord, Tables};
    use crate::store::MemoryStore;

    fn refused(table: &str) -> HeroNetError {
        HeroNetError::io(
            table,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only table"),
        )
    }

    /// Loads like a memory store, refuses every save.
    struct ReadOnlyStore(Tables);

    impl HeroStore for ReadOnlyStore {
        fn load(&self) -> Result<Tables> {
            Ok(self.0.clone())
        }

        fn save_heroes(&self, _heroes: &[HeroRecord]) -> Result<()> {
            Err(refused("heroes"))
        }

        fn save_links(&self, _links: &[LinkRecord]) -> Result<()> {
            Err(refused("links"))
        }
    }

    /// Writable hero table, read-only link table.
    struct LockedLinks(Arc<MemoryStore>);

    impl HeroStore for LockedLinks {
        fn load(&self) -> Result<Tables> {
            self.0.load()
        }

        fn save_heroes(&self, heroes: &[HeroRecord]) -> Result<()> {
            self.0.save_heroes(heroes)
        }

        fn save_links(&self, _links: &[LinkRecord]) -> Result<()> {
            Err(refused("links"))
        }
    }

    fn seeded_tables() -> Tables {
        let created_at = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Tables::new(
            vec![
                HeroRecord::new(1, "Thor", created_at),
                HeroRecord::new(2, "Hulk", created_at),
            ],
            vec![],
        )
    }

    #[test]
    fn test_mutations_reach_the_store() {
        let store = Arc::new(MemoryStore::new());
        let mut service = HeroService::open(Box::new(SharedMemory(Arc::clone(&store)))).unwrap();

        let added = service.add_hero("A", Some("2024-02-03")).unwrap();
        assert_eq!(added.id, 1);
        assert!(added.success);
        assert_eq!(added.message, "Hero A added successfully! 🎉");
        service.add_hero("B", None).unwrap();

        let reply = service.add_connection("A", "B").unwrap();
        assert!(reply.success);

        let saved = store.snapshot().unwrap();
        assert_eq!(saved, *service.network().tables());
        assert_eq!(saved.links, vec![LinkRecord::new(1, 2)]);
        assert_eq!(
            saved.heroes[0].created_at,
            NaiveDate::from_ymd_opt(2024, 2, 3).unwrap()
        );
    }

    #[test]
    fn test_failed_save_leaves_memory_untouched() {
        let mut service = HeroService::open(Box::new(ReadOnlyStore(seeded_tables()))).unwrap();

        let err = service.add_hero("Loki", None).unwrap_err();
        assert!(matches!(err, HeroNetError::StoreIo { .. }));
        assert_eq!(service.network().heroes().len(), 2);
        assert!(service.get_hero("Loki").is_none());

        let err = service.add_connection("Thor", "Hulk").unwrap_err();
        assert!(matches!(err, HeroNetError::StoreIo { .. }));
        assert!(service.network().links().is_empty());
        assert!(service.get_hero("Thor").unwrap().friends.is_empty());
    }

    #[test]
    fn test_each_mutation_commits_one_table() {
        let store = Arc::new(MemoryStore::with_tables(seeded_tables()));
        let mut service = HeroService::open(Box::new(LockedLinks(Arc::clone(&store)))).unwrap();

        let added = service.add_hero("Loki", Some("2024-01-05")).unwrap();
        assert_eq!(added.id, 3);
        assert_eq!(store.snapshot().unwrap(), *service.network().tables());

        let err = service.add_connection("Thor", "Loki").unwrap_err();
        assert!(matches!(err, HeroNetError::StoreIo { .. }));
        assert_eq!(store.snapshot().unwrap(), *service.network().tables());
        assert!(service.get_hero("Loki").unwrap().friends.is_empty());
    }

    #[test]
    fn test_new_hero_matches_restart_when_stored_link_names_its_id() {
        let created_at = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let store = Arc::new(MemoryStore::with_tables(Tables::new(
            vec![HeroRecord::new(1, "Thor", created_at)],
            vec![LinkRecord::new(1, 2)],
        )));
        let mut service = HeroService::open(Box::new(SharedMemory(Arc::clone(&store)))).unwrap();

        assert_eq!(service.add_hero("Loki", None).unwrap().id, 2);

        let restarted = HeroService::open(Box::new(SharedMemory(Arc::clone(&store)))).unwrap();
        let friends = |svc: &HeroService| -> Vec<String> {
            let info = svc.get_hero("Loki").unwrap();
            info.friends.into_iter().map(|f| f.name).collect()
        };
        assert_eq!(friends(&service), vec!["Thor"]);
        assert_eq!(friends(&service), friends(&restarted));

        let again = service.add_connection("Thor", "Loki").unwrap();
        assert!(!again.success);
        assert_eq!(store.snapshot().unwrap().links, vec![LinkRecord::new(1, 2)]);
    }

    #[test]
    fn test_rejected_connection_is_not_an_error() {
        let store = MemoryStore::with_tables(seeded_tables());
        let mut service = HeroService::open(Box::new(store)).unwrap();

        assert!(service.add_connection("Thor", "Hulk").unwrap().success);
        let again = service.add_connection("Hulk", "Thor").unwrap();
        assert!(!again.success);
        assert_eq!(again.reason.as_deref(), Some("already connected"));

        let unknown = service.add_connection("Thor", "Nobody").unwrap();
        assert!(!unknown.success);
        assert_eq!(service.network().links().len(), 1);
    }

    #[test]
    fn test_validation_errors() {
        let mut service = HeroService::open(Box::new(MemoryStore::new())).unwrap();
        assert!(matches!(
            service.add_hero("", None),
            Err(HeroNetError::Validation(_))
        ));
        assert!(matches!(
            service.add_hero("Thor", Some("03/04/2024")),
            Err(HeroNetError::Validation(_))
        ));
        assert!(matches!(
            service.add_connection("Thor", " "),
            Err(HeroNetError::Validation(_))
        ));
        assert!(service.network().is_empty());
    }

    #[test]
    fn test_parse_created_at_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 7, 9).unwrap();
        assert_eq!(parse_created_at("2024-07-09").unwrap(), expected);
        assert_eq!(parse_created_at("2024-07-09T10:30:00+02:00").unwrap(), expected);
        assert!(parse_created_at("tomorrow").is_err());
    }

    #[test]
    fn test_with_service_locks_shared_instance() {
        let shared = HeroService::open(Box::new(MemoryStore::new())).unwrap().into_shared();
        let id = with_service(&shared, |s| s.add_hero("Wasp", None))
            .unwrap()
            .unwrap()
            .id;
        assert_eq!(id, 1);
        let total = with_service(&shared, |s| s.get_stats().total_heroes).unwrap();
        assert_eq!(total, 1);
    }

    /// Lets a test keep a handle on the memory store the service owns.
    struct SharedMemory(Arc<MemoryStore>);

    impl HeroStore for SharedMemory {
        fn load(&self) -> Result<Tables> {
            self.0.load()
        }

        fn save_heroes(&self, heroes: &[HeroRecord]) -> Result<()> {
            self.0.save_heroes(heroes)
        }

        fn save_links(&self, links: &[LinkRecord]) -> Result<()> {
            self.0.save_links(links)
        }
    }
}
