//! Plain-text network report, printed when a process starts.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::query::{HeroInfo, StatsResponse};
use crate::service::HeroService;

/// Totals, recent heroes, the top ranking and one spotlighted hero.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkReport {
    pub stats: StatsResponse,
    pub recent_days: i64,
    pub spotlight_name: String,
    pub spotlight: Option<HeroInfo>,
}

impl NetworkReport {
    pub fn build(service: &HeroService, spotlight: &str, today: NaiveDate) -> Self {
        Self {
            stats: service.stats_at(today),
            recent_days: service.stats_options().recent_days,
            spotlight_name: spotlight.to_string(),
            spotlight: service.get_hero(spotlight),
        }
    }
}

impl fmt::Display for NetworkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== SUPERHERO NETWORK REPORT ===")?;
        writeln!(f)?;
        writeln!(f, "1. Total Superheroes: {}", self.stats.total_heroes)?;
        writeln!(f, "2. Total Connections: {}", self.stats.total_connections)?;
        writeln!(
            f,
            "3. Recently Added (last {} days): {}",
            self.recent_days,
            join_or_none(&self.stats.recent_heroes)
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "4. Top {} Most Connected Superheroes:",
            self.stats.top_connected.len()
        )?;
        for hero in &self.stats.top_connected {
            writeln!(f, "   - {}: {} connections", hero.name, hero.connections)?;
        }
        writeln!(f)?;

        let title = capitalize(&self.spotlight_name);
        match &self.spotlight {
            Some(info) => {
                writeln!(f, "5. {} Details:", title)?;
                writeln!(f, "   - Added on: {}", info.created_at)?;
                let friends: Vec<String> = info.friends.iter().map(|fr| fr.name.clone()).collect();
                writeln!(f, "   - Friends: {}", join_or_none(&friends))
            }
            None => writeln!(f, "5. {} not found in the network", title),
        }
    }
}

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
