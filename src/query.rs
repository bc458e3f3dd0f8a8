//! Read-only queries over the hero network.
//!
//! Nothing here mutates or touches storage. "Today" is passed in so the
//! recency window can be pinned in tests.

use std::cmp::Reverse;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::graph::HeroNetwork;

/// Knobs for [`network_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsOptions {
    /// Heroes created on or after `today - recent_days` are recent.
    pub recent_days: i64,
    /// Length of the top-connected ranking.
    pub top_k: usize,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            recent_days: 3,
            top_k: 3,
        }
    }
}

/// Summary of the whole network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_heroes: usize,
    pub total_connections: usize,
    pub recent_heroes: Vec<String>,
    pub top_connected: Vec<TopHero>,
}

/// One entry of the top-connected ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopHero {
    pub name: String,
    pub connections: usize,
    pub emoji: String,
}

/// A single hero with its friends resolved to names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroInfo {
    pub name: String,
    pub emoji: String,
    pub created_at: NaiveDate,
    pub friends: Vec<FriendRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRef {
    pub name: String,
    pub emoji: String,
}

/// Totals come from the raw tables; the ranking comes from the adjacency.
pub fn network_stats(network: &HeroNetwork, today: NaiveDate, opts: StatsOptions) -> StatsResponse {
    StatsResponse {
        total_heroes: network.heroes().len(),
        total_connections: network.links().len(),
        recent_heroes: recent_heroes(network, today, opts.recent_days),
        top_connected: top_connected(network, opts.top_k),
    }
}

/// Names of heroes created within the last `days` calendar days, inclusive,
/// in table order.
pub fn recent_heroes(network: &HeroNetwork, today: NaiveDate, days: i64) -> Vec<String> {
    // A window wider than the calendar covers everything, or nothing
    // when negative.
    let cutoff = Duration::try_days(days)
        .and_then(|window| today.checked_sub_signed(window))
        .unwrap_or(if days > 0 { NaiveDate::MIN } else { NaiveDate::MAX });
    network
        .heroes()
        .iter()
        .filter(|hero| hero.created_at >= cutoff)
        .map(|hero| hero.name.clone())
        .collect()
}

/// The `k` heroes with the most friends. Ties keep network order.
pub fn top_connected(network: &HeroNetwork, k: usize) -> Vec<TopHero> {
    let mut ranked: Vec<TopHero> = network
        .nodes()
        .map(|(_, node)| TopHero {
            name: node.name.clone(),
            connections: node.connections(),
            emoji: node.emoji.to_string(),
        })
        .collect();
    // sort_by_key is stable
    ranked.sort_by_key(|hero| Reverse(hero.connections));
    ranked.truncate(k);
    ranked
}

/// Look up a hero by name. `None` when no hero carries it.
pub fn hero_info(network: &HeroNetwork, name: &str) -> Option<HeroInfo> {
    let (_, node) = network.find_by_name(name)?;
    let friends = node
        .friends
        .iter()
        .filter_map(|&id| network.node(id))
        .map(|friend| FriendRef {
            name: friend.name.clone(),
            emoji: friend.emoji.to_string(),
        })
        .collect();

    Some(HeroInfo {
        name: node.name.clone(),
        emoji: node.emoji.to_string(),
        created_at: node.created_at,
        friends,
    })
}
