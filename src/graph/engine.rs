//! The in-memory hero network.
//!
//! Holds the two tables exactly as stored plus the derived adjacency
//! (an insertion-ordered map of id → node) and a name → id index.
//! Mutations are split into a `plan_*` step that validates against the
//! current state without touching it and an `apply_*` step that cannot
//! fail, so callers can persist between the two.

use std::collections::HashMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use tracing::{debug, warn};

use super::theme::{emoji_for, NEW_EMOJI};
use super::types::*;
use crate::error::{HeroNetError, Result};

/// The authoritative in-memory network.
#[derive(Debug, Clone, Default)]
pub struct HeroNetwork {
    /// Rows as they are (or are about to be) persisted.
    tables: Tables,
    /// Adjacency, iterated in hero-table order.
    nodes: IndexMap<HeroId, HeroNode>,
    /// Name -> id. First row wins when a loaded table repeats a name.
    name_index: HashMap<String, HeroId>,
}

impl HeroNetwork {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the network from stored tables: every hero first, then
    /// every link whose endpoints both exist. Dangling or repeated link
    /// rows are kept in the table but add nothing to the adjacency.
    pub fn build(tables: Tables) -> Self {
        let mut nodes: IndexMap<HeroId, HeroNode> = IndexMap::with_capacity(tables.heroes.len());
        let mut name_index = HashMap::with_capacity(tables.heroes.len());

        for hero in &tables.heroes {
            if nodes.contains_key(&hero.id) {
                warn!(
                    id = hero.id,
                    name = %hero.name,
                    "duplicate hero id in table, keeping first row"
                );
                continue;
            }
            nodes.insert(
                hero.id,
                HeroNode::new(hero.name.clone(), hero.created_at, emoji_for(&hero.name)),
            );
            name_index.entry(hero.name.clone()).or_insert(hero.id);
        }

        for link in &tables.links {
            if !nodes.contains_key(&link.source) || !nodes.contains_key(&link.target) {
                debug!(source = link.source, target = link.target, "dropping dangling link");
                continue;
            }
            if let Some(node) = nodes.get_mut(&link.source) {
                node.befriend(link.target);
            }
            if let Some(node) = nodes.get_mut(&link.target) {
                node.befriend(link.source);
            }
        }

        debug!(
            heroes = nodes.len(),
            links = tables.links.len(),
            "built hero network"
        );

        Self {
            tables,
            nodes,
            name_index,
        }
    }

    // ─── Accessors ──────────────────────────────────────────────

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn heroes(&self) -> &[HeroRecord] {
        &self.tables.heroes
    }

    pub fn links(&self) -> &[LinkRecord] {
        &self.tables.links
    }

    /// Nodes in network order.
    pub fn nodes(&self) -> impl Iterator<Item = (HeroId, &HeroNode)> {
        self.nodes.iter().map(|(&id, node)| (id, node))
    }

    pub fn node(&self, id: HeroId) -> Option<&HeroNode> {
        self.nodes.get(&id)
    }

    pub fn id_of(&self, name: &str) -> Option<HeroId> {
        self.name_index.get(name).copied()
    }

    /// Resolve a hero by name through the name index.
    pub fn find_by_name(&self, name: &str) -> Option<(HeroId, &HeroNode)> {
        let id = self.id_of(name)?;
        self.nodes.get(&id).map(|node| (id, node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Id the next added hero will receive: max existing id + 1, or 1.
    pub fn next_id(&self) -> HeroId {
        self.tables
            .heroes
            .iter()
            .map(|h| h.id)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Check that every friend reference points at a live node and is
    /// mirrored on the other side.
    pub fn is_consistent(&self) -> bool {
        self.nodes.iter().all(|(&id, node)| {
            node.friends.iter().all(|friend| {
                self.nodes
                    .get(friend)
                    .is_some_and(|other| other.friends.contains(&id))
            })
        })
    }

    // ─── Hero Mutations ─────────────────────────────────────────

    /// Validate a new hero and produce the row it would add.
    /// Names are trimmed; blank and already-taken names are rejected.
    pub fn plan_hero(&self, name: &str, created_at: Option<NaiveDate>) -> Result<HeroRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HeroNetError::Validation("Name is required".to_string()));
        }
        if self.name_index.contains_key(name) {
            return Err(HeroNetError::Validation(format!(
                "Hero {} already exists",
                name
            )));
        }
        Ok(HeroRecord::new(
            self.next_id(),
            name,
            created_at.unwrap_or_else(today),
        ))
    }

    /// Apply a planned hero row. New heroes carry [`NEW_EMOJI`].
    ///
    /// Stored link rows that already name the new id become live, the
    /// same way a rebuild from the tables would wire them.
    pub fn apply_hero(&mut self, record: HeroRecord) -> HeroId {
        let id = record.id;
        self.nodes.insert(
            id,
            HeroNode::new(record.name.clone(), record.created_at, NEW_EMOJI),
        );
        self.name_index.entry(record.name.clone()).or_insert(id);
        self.tables.heroes.push(record);

        let revived: Vec<HeroId> = self
            .tables
            .links
            .iter()
            .filter_map(|link| match (link.source == id, link.target == id) {
                (true, _) => Some(link.target),
                (false, true) => Some(link.source),
                (false, false) => None,
            })
            .filter(|other| self.nodes.contains_key(other))
            .collect();
        for other in revived {
            debug!(id, friend = other, "stored link now joins two live heroes");
            if let Some(node) = self.nodes.get_mut(&id) {
                node.befriend(other);
            }
            if let Some(node) = self.nodes.get_mut(&other) {
                node.befriend(id);
            }
        }
        id
    }

    /// Add a hero in memory only. The service persists between plan and apply instead.
    pub fn add_hero(&mut self, name: &str, created_at: Option<NaiveDate>) -> Result<HeroId> {
        let record = self.plan_hero(name, created_at)?;
        Ok(self.apply_hero(record))
    }

    // ─── Connection Mutations ───────────────────────────────────

    /// Validate a friendship between two named heroes and produce the link
    /// row it would add, or the reason it cannot be added.
    pub fn plan_connection(
        &self,
        source_name: &str,
        target_name: &str,
    ) -> std::result::Result<LinkRecord, ConnectionOutcome> {
        let source = self
            .id_of(source_name)
            .ok_or_else(|| ConnectionOutcome::UnknownHero(source_name.to_string()))?;
        let target = self
            .id_of(target_name)
            .ok_or_else(|| ConnectionOutcome::UnknownHero(target_name.to_string()))?;

        if source == target {
            return Err(ConnectionOutcome::SelfConnection);
        }

        let already = self
            .nodes
            .get(&source)
            .is_some_and(|node| node.friends.contains(&target));
        if already {
            return Err(ConnectionOutcome::AlreadyConnected);
        }

        Ok(LinkRecord::new(source, target))
    }

    /// Apply a planned link row to both friend lists and the link table.
    pub fn apply_connection(&mut self, link: LinkRecord) -> ConnectionOutcome {
        if let Some(node) = self.nodes.get_mut(&link.source) {
            node.befriend(link.target);
        }
        if let Some(node) = self.nodes.get_mut(&link.target) {
            node.befriend(link.source);
        }
        self.tables.links.push(link);
        ConnectionOutcome::Created {
            source: link.source,
            target: link.target,
        }
    }

    /// Connect two heroes in memory only.
    pub fn add_connection(&mut self, source_name: &str, target_name: &str) -> ConnectionOutcome {
        match self.plan_connection(source_name, target_name) {
            Ok(link) => self.apply_connection(link),
            Err(outcome) => outcome,
        }
    }
}

/// Today's local calendar date.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::theme::DEFAULT_EMOJI;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn hero(id: HeroId, name: &str) -> HeroRecord {
        HeroRecord {
            id,
            name: name.to_string(),
            created_at: date("2024-01-01"),
        }
    }

    fn sample_tables() -> Tables {
        Tables::new(
            vec![hero(1, "Thor"), hero(2, "Hulk"), hero(3, "Squirrel Girl")],
            vec![LinkRecord::new(1, 2), LinkRecord::new(2, 3)],
        )
    }

    fn friend_sets(network: &HeroNetwork) -> Vec<(HeroId, Vec<HeroId>)> {
        network
            .nodes()
            .map(|(id, node)| {
                let mut friends = node.friends.clone();
                friends.sort_unstable();
                (id, friends)
            })
            .collect()
    }

    // ─── Build Tests ────────────────────────────────────────────

    #[test]
    fn test_build_assigns_emoji_and_friends() {
        let network = HeroNetwork::build(sample_tables());

        assert_eq!(network.len(), 3);
        assert_eq!(network.node(1).unwrap().emoji, "⚡");
        assert_eq!(network.node(3).unwrap().emoji, DEFAULT_EMOJI);
        assert_eq!(network.node(2).unwrap().friends, vec![1, 3]);
        assert_eq!(network.node(1).unwrap().friends, vec![2]);
        assert!(network.is_consistent());
    }

    #[test]
    fn test_build_is_idempotent() {
        let a = HeroNetwork::build(sample_tables());
        let b = HeroNetwork::build(sample_tables());
        assert_eq!(friend_sets(&a), friend_sets(&b));
    }

    #[test]
    fn test_build_drops_dangling_and_duplicate_links() {
        let mut tables = sample_tables();
        tables.links.push(LinkRecord::new(2, 1));
        tables.links.push(LinkRecord::new(1, 2));
        tables.links.push(LinkRecord::new(1, 99));

        let network = HeroNetwork::build(tables);

        assert_eq!(network.node(1).unwrap().friends, vec![2]);
        assert_eq!(network.node(2).unwrap().friends, vec![1, 3]);
        // The raw table keeps every row.
        assert_eq!(network.links().len(), 5);
        assert!(network.is_consistent());
    }

    #[test]
    fn test_build_duplicate_names_resolve_to_first_row() {
        let tables = Tables::new(vec![hero(4, "Thor"), hero(9, "Thor")], vec![]);
        let network = HeroNetwork::build(tables);
        assert_eq!(network.id_of("Thor"), Some(4));
        assert_eq!(network.len(), 2);
    }

    // ─── Hero Tests ─────────────────────────────────────────────

    #[test]
    fn test_first_hero_gets_id_one() {
        let mut network = HeroNetwork::new();
        let id = network.add_hero("A", None).unwrap();
        assert_eq!(id, 1);
        assert_eq!(network.node(1).unwrap().emoji, NEW_EMOJI);
        assert_eq!(network.node(1).unwrap().created_at, today());
        assert_eq!(network.heroes().len(), 1);
    }

    #[test]
    fn test_next_id_skips_past_gaps() {
        let heroes = vec![hero(3, "Thor"), hero(10, "Hulk"), hero(7, "Ant-Man")];
        let tables = Tables::new(heroes, vec![]);
        let mut network = HeroNetwork::build(tables);
        let id = network.add_hero("Wasp", Some(date("2024-05-05"))).unwrap();
        assert_eq!(id, 11);
        assert_eq!(network.node(11).unwrap().created_at, date("2024-05-05"));
    }

    #[test]
    fn test_known_name_still_gets_new_emoji() {
        let mut network = HeroNetwork::new();
        let id = network.add_hero("Thor", None).unwrap();
        assert_eq!(network.node(id).unwrap().emoji, NEW_EMOJI);
    }

    #[test]
    fn test_blank_or_taken_name_rejected() {
        let mut network = HeroNetwork::build(sample_tables());
        assert!(matches!(
            network.add_hero("   ", None),
            Err(HeroNetError::Validation(_))
        ));
        assert!(matches!(
            network.add_hero("Thor", None),
            Err(HeroNetError::Validation(_))
        ));
        assert_eq!(network.heroes().len(), 3);
    }

    // ─── Connection Tests ───────────────────────────────────────

    #[test]
    fn test_connection_created_once() {
        let mut network = HeroNetwork::build(sample_tables());

        let first = network.add_connection("Thor", "Squirrel Girl");
        assert_eq!(first, ConnectionOutcome::Created { source: 1, target: 3 });

        let again = network.add_connection("Squirrel Girl", "Thor");
        assert_eq!(again, ConnectionOutcome::AlreadyConnected);

        let rows = network.links().iter().filter(|l| l.joins(1, 3)).count();
        assert_eq!(rows, 1);
        assert_eq!(network.node(1).unwrap().friends, vec![2, 3]);
        assert_eq!(network.node(3).unwrap().friends, vec![2, 1]);
        assert!(network.is_consistent());
    }

    #[test]
    fn test_unknown_name_changes_nothing() {
        let mut network = HeroNetwork::build(sample_tables());
        let before = friend_sets(&network);

        let outcome = network.add_connection("Thor", "Nobody");
        assert_eq!(outcome, ConnectionOutcome::UnknownHero("Nobody".to_string()));
        assert!(!outcome.is_created());
        assert_eq!(network.links().len(), 2);
        assert_eq!(friend_sets(&network), before);
    }

    #[test]
    fn test_self_connection_rejected() {
        let mut network = HeroNetwork::build(sample_tables());
        assert_eq!(
            network.add_connection("Hulk", "Hulk"),
            ConnectionOutcome::SelfConnection
        );
        assert_eq!(network.links().len(), 2);
    }

    #[test]
    fn test_new_hero_takes_over_stored_links_to_its_id() {
        let mut network = HeroNetwork::build(Tables::new(
            vec![hero(1, "Thor")],
            vec![LinkRecord::new(1, 2), LinkRecord::new(2, 9)],
        ));

        assert_eq!(network.add_hero("Loki", None).unwrap(), 2);
        assert_eq!(network.node(2).unwrap().friends, vec![1]);
        assert_eq!(network.node(1).unwrap().friends, vec![2]);
        assert!(network.is_consistent());

        let rebuilt = HeroNetwork::build(network.tables().clone());
        assert_eq!(friend_sets(&network), friend_sets(&rebuilt));

        assert_eq!(
            network.add_connection("Thor", "Loki"),
            ConnectionOutcome::AlreadyConnected
        );
        assert_eq!(network.links().len(), 2);
    }

    #[test]
    fn test_plan_does_not_mutate() {
        let network = HeroNetwork::build(sample_tables());
        let link = network.plan_connection("Thor", "Squirrel Girl").unwrap();
        assert_eq!(link, LinkRecord::new(1, 3));
        assert_eq!(network.links().len(), 2);
        assert_eq!(network.node(1).unwrap().friends, vec![2]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Hero(u8),
        Connect(u8, u8),
    }

    fn op() -> impl proptest::strategy::Strategy<Value = Op> {
        use proptest::prelude::*;
        prop_oneof![
            (0u8..8).prop_map(Op::Hero),
            (0u8..8, 0u8..8).prop_map(|(a, b)| Op::Connect(a, b)),
        ]
    }

    fn distinct_pairs(links: &[LinkRecord]) -> usize {
        let mut pairs: Vec<(HeroId, HeroId)> = links
            .iter()
            .map(|l| (l.source.min(l.target), l.source.max(l.target)))
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs.len()
    }

    proptest::proptest! {
        #[test]
        fn prop_mutations_match_rebuild(
            stored in proptest::collection::vec((1i64..10, 1i64..10), 0..6),
            ops in proptest::collection::vec(op(), 0..60),
        ) {
            // Start from link rows whose heroes do not exist yet.
            let stored: Vec<LinkRecord> =
                stored.into_iter().map(|(a, b)| LinkRecord::new(a, b)).collect();
            let mut network = HeroNetwork::build(Tables::new(vec![], stored.clone()));

            for op in ops {
                match op {
                    Op::Hero(n) => {
                        let _ = network.add_hero(&format!("hero-{}", n), None);
                    }
                    Op::Connect(a, b) => {
                        network.add_connection(&format!("hero-{}", a), &format!("hero-{}", b));
                    }
                }
                proptest::prop_assert!(network.is_consistent());
                let rebuilt = HeroNetwork::build(network.tables().clone());
                proptest::prop_assert_eq!(friend_sets(&rebuilt), friend_sets(&network));
            }

            // Every added row is a pair the table did not hold before.
            let added = network.links().len() - stored.len();
            proptest::prop_assert_eq!(
                distinct_pairs(network.links()),
                distinct_pairs(&stored) + added
            );
        }
    }
}
