//! # heronet
//!
//! A small hero social graph: heroes, mutual friendships between them,
//! and the views built on top.
//!
//! ## Key Features
//!
//! - **Durable**: two CSV tables are the source of truth across restarts
//! - **Consistent**: every mutation is saved before memory changes
//! - **Queryable**: totals, recent heroes, top-connected ranking, lookups
//! - **Renderable**: node/link JSON and a force-directed PNG/SVG image
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use heronet::{CsvStore, HeroService};
//!
//! let store = CsvStore::open("data/superheroes.csv", "data/links.csv")?;
//! let mut service = HeroService::open(Box::new(store))?;
//!
//! service.add_hero("Thor", None)?;
//! service.add_hero("Hulk", Some("2024-05-01"))?;
//! service.add_connection("Thor", "Hulk")?;
//!
//! let stats = service.get_stats();
//! assert_eq!(stats.total_connections, 1);
//! # Ok::<(), heronet::HeroNetError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod mcp;
pub mod query;
pub mod report;
pub mod service;
pub mod store;

// Re-exports for convenience
pub use config::HeroNetConfig;
pub use error::{HeroNetError, Result};

// Graph re-exports
pub use graph::{ConnectionOutcome, HeroId, HeroNetwork, HeroNode, HeroRecord, LinkRecord, Tables};
pub use query::{HeroInfo, StatsOptions, StatsResponse, TopHero};

// Storage
pub use store::{CsvStore, HeroStore, MemoryStore};

// Views and the service facade
pub use export::{GraphJson, ImageFormat, RenderOptions};
pub use report::NetworkReport;
pub use service::{AddHeroResponse, ConnectionResponse, HeroService, SharedService};
