//! Hero network module — the in-memory model at the center of heronet.
//!
//! Provides the table and node types, the network engine with its
//! plan/apply mutations, the theming tables, and the store-backed builder.

pub mod builder;
pub mod engine;
pub mod theme;
pub mod types;

pub use builder::load_network;
pub use engine::{today, HeroNetwork};
pub use theme::{emoji_for, DEFAULT_EMOJI, NEW_EMOJI, PALETTE};
pub use types::{ConnectionOutcome, HeroId, HeroNode, HeroRecord, LinkRecord, Tables};
