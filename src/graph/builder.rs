//! Network builder — loads both tables from a store and assembles the network.

use tracing::info;

use super::engine::HeroNetwork;
use crate::error::Result;
use crate::store::HeroStore;

/// Load the tables from `store` and build the in-memory network from them.
pub fn load_network(store: &dyn HeroStore) -> Result<HeroNetwork> {
    let tables = store.load()?;
    let network = HeroNetwork::build(tables);
    info!(
        heroes = network.heroes().len(),
        links = network.links().len(),
        "hero network loaded"
    );
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{HeroRecord, LinkRecord, Tables};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    #[test]
    fn test_load_network_from_store() {
        let created_at = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let store = MemoryStore::with_tables(Tables::new(
            vec![
                HeroRecord::new(1, "Thor", created_at),
                HeroRecord::new(2, "Hulk", created_at),
            ],
            vec![LinkRecord::new(1, 2)],
        ));

        let network = load_network(&store).unwrap();
        assert_eq!(network.len(), 2);
        assert_eq!(network.find_by_name("Hulk").unwrap().1.friends, vec![1]);
    }

    #[test]
    fn test_load_empty_store() {
        let network = load_network(&MemoryStore::new()).unwrap();
        assert!(network.is_empty());
        assert_eq!(network.next_id(), 1);
    }
}
