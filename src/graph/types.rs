//! Core types for the hero network.
//!
//! Table rows as they are stored on disk, the per-hero node kept in
//! memory, and the outcome of a connection request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a hero. Unique and immutable once assigned.
pub type HeroId = i64;

/// One row of the hero table (`id,name,created_at`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroRecord {
    pub id: HeroId,
    pub name: String,
    pub created_at: NaiveDate,
}

impl HeroRecord {
    pub fn new(id: HeroId, name: impl Into<String>, created_at: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
        }
    }
}

/// One row of the link table (`source,target`). Unordered in meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source: HeroId,
    pub target: HeroId,
}

impl LinkRecord {
    pub fn new(source: HeroId, target: HeroId) -> Self {
        Self { source, target }
    }

    /// True when this row joins `a` and `b`, in either direction.
    pub fn joins(&self, a: HeroId, b: HeroId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Both tables, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub heroes: Vec<HeroRecord>,
    pub links: Vec<LinkRecord>,
}

impl Tables {
    pub fn new(heroes: Vec<HeroRecord>, links: Vec<LinkRecord>) -> Self {
        Self { heroes, links }
    }
}

/// A hero as held in the in-memory network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeroNode {
    pub name: String,
    pub created_at: NaiveDate,
    pub emoji: &'static str,
    /// Friend ids in the order the friendships were seen. No duplicates.
    pub friends: Vec<HeroId>,
}

impl HeroNode {
    pub fn new(name: String, created_at: NaiveDate, emoji: &'static str) -> Self {
        Self {
            name,
            created_at,
            emoji,
            friends: Vec::new(),
        }
    }

    pub fn connections(&self) -> usize {
        self.friends.len()
    }

    /// Append `friend` unless already present. Returns whether it was added.
    pub(crate) fn befriend(&mut self, friend: HeroId) -> bool {
        if self.friends.contains(&friend) {
            return false;
        }
        self.friends.push(friend);
        true
    }
}

/// Result of asking for a new friendship between two named heroes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// A new link row was appended.
    Created { source: HeroId, target: HeroId },
    /// The pair is already linked, in either direction.
    AlreadyConnected,
    /// No hero carries this name.
    UnknownHero(String),
    /// Both names resolve to the same hero.
    SelfConnection,
}

impl ConnectionOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, ConnectionOutcome::Created { .. })
    }
}

impl fmt::Display for ConnectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionOutcome::Created { source, target } => {
                write!(f, "linked {} and {}", source, target)
            }
            ConnectionOutcome::AlreadyConnected => write!(f, "already connected"),
            ConnectionOutcome::UnknownHero(name) => write!(f, "hero not found: {}", name),
            ConnectionOutcome::SelfConnection => write!(f, "a hero cannot befriend themself"),
        }
    }
}
