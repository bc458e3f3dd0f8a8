//! Force-directed layout of the hero network.
//!
//! The network is first projected into an undirected petgraph graph whose
//! node weights carry what the renderer draws. Positions come from a
//! Fruchterman–Reingold simulation started from seeded random points,
//! so the same network and seed always produce the same picture.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::graph::{HeroId, HeroNetwork, PALETTE};

const BASE_NODE_SIZE: f64 = 50.0;
const SIZE_PER_FRIEND: f64 = 10.0;

/// What the renderer needs to draw one hero.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualNode {
    pub name: String,
    pub emoji: String,
    /// Marker area, grows with the friend count.
    pub size: f64,
    pub color: &'static str,
}

impl VisualNode {
    pub fn label(&self) -> String {
        format!("{} {}", self.emoji, self.name)
    }
}

pub type VisualGraph = UnGraph<VisualNode, ()>;

/// Project the network into an undirected graph. Each friendship becomes
/// exactly one edge; node colors are drawn from [`PALETTE`] with `rng`.
pub fn visual_graph<R: Rng + ?Sized>(network: &HeroNetwork, rng: &mut R) -> VisualGraph {
    let mut graph = VisualGraph::with_capacity(network.len(), network.links().len());
    let mut index: HashMap<HeroId, NodeIndex> = HashMap::with_capacity(network.len());

    for (id, node) in network.nodes() {
        let idx = graph.add_node(VisualNode {
            name: node.name.clone(),
            emoji: node.emoji.to_string(),
            size: BASE_NODE_SIZE + SIZE_PER_FRIEND * node.connections() as f64,
            color: PALETTE.choose(rng).copied().unwrap_or(PALETTE[0]),
        });
        index.insert(id, idx);
    }

    for (id, node) in network.nodes() {
        for friend in &node.friends {
            if let (Some(&a), Some(&b)) = (index.get(&id), index.get(friend)) {
                graph.update_edge(a, b, ());
            }
        }
    }

    graph
}

/// Parameters of the spring simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub seed: u64,
    /// Optimal distance between nodes.
    pub k: f64,
    pub iterations: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            k: 0.3,
            iterations: 50,
        }
    }
}

impl LayoutConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

/// Fruchterman–Reingold layout. Returns one `(x, y)` per node, indexed by
/// `NodeIndex::index()`, centered on the origin and scaled into `[-1, 1]`.
pub fn spring_layout<N, E>(graph: &UnGraph<N, E>, config: LayoutConfig) -> Vec<(f64, f64)> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut pos: Vec<(f64, f64)> = (0..n).map(|_| (rng.gen::<f64>(), rng.gen::<f64>())).collect();

    let mut adjacent = vec![vec![false; n]; n];
    for edge in graph.edge_references() {
        let (a, b) = (edge.source().index(), edge.target().index());
        adjacent[a][b] = true;
        adjacent[b][a] = true;
    }

    let k = config.k;
    let mut temperature = 0.1 * span(&pos);
    let cooling = temperature / (config.iterations as f64 + 1.0);

    for _ in 0..config.iterations {
        let mut moves = vec![(0.0, 0.0); n];
        for i in 0..n {
            let (mut dx_total, mut dy_total) = (0.0, 0.0);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i].0 - pos[j].0;
                let dy = pos[i].1 - pos[j].1;
                let distance = (dx * dx + dy * dy).sqrt().max(0.01);
                let attraction = if adjacent[i][j] { distance / k } else { 0.0 };
                let force = k * k / (distance * distance) - attraction;
                dx_total += dx * force;
                dy_total += dy * force;
            }
            let length = (dx_total * dx_total + dy_total * dy_total).sqrt().max(0.01);
            moves[i] = (dx_total * temperature / length, dy_total * temperature / length);
        }
        for (p, m) in pos.iter_mut().zip(&moves) {
            p.0 += m.0;
            p.1 += m.1;
        }
        temperature -= cooling;
    }

    rescale(&mut pos);
    pos
}

fn span(pos: &[(f64, f64)]) -> f64 {
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in pos {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    (max_x - min_x).max(max_y - min_y)
}

fn rescale(pos: &mut [(f64, f64)]) {
    let n = pos.len() as f64;
    let mean_x = pos.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pos.iter().map(|p| p.1).sum::<f64>() / n;
    let mut limit: f64 = 0.0;
    for p in pos.iter_mut() {
        p.0 -= mean_x;
        p.1 -= mean_y;
        limit = limit.max(p.0.abs()).max(p.1.abs());
    }
    if limit > 0.0 {
        for p in pos.iter_mut() {
            p.0 /= limit;
            p.1 /= limit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{HeroRecord, LinkRecord, Tables};
    use chrono::NaiveDate;

    fn network(names: &[&str], links: &[(HeroId, HeroId)]) -> HeroNetwork {
        let created_at = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let heroes = names
            .iter()
            .enumerate()
            .map(|(i, name)| HeroRecord {
                id: i as HeroId + 1,
                name: name.to_string(),
                created_at,
            })
            .collect();
        let links = links.iter().map(|&(a, b)| LinkRecord::new(a, b)).collect();
        HeroNetwork::build(Tables::new(heroes, links))
    }

    #[test]
    fn test_visual_graph_one_edge_per_friendship() {
        let net = network(&["Thor", "Hulk", "Loki"], &[(1, 2), (2, 1), (2, 3), (3, 9)]);
        let graph = visual_graph(&net, &mut ChaCha8Rng::seed_from_u64(7));

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        let hulk = &graph[NodeIndex::new(1)];
        assert_eq!(hulk.size, 70.0);
        assert_eq!(hulk.label(), "💪 Hulk");
        assert!(PALETTE.contains(&hulk.color));
    }

    #[test]
    fn test_layout_is_deterministic_for_seed() {
        let net = network(&["A", "B", "C", "D"], &[(1, 2), (2, 3), (3, 4)]);
        let graph = visual_graph(&net, &mut ChaCha8Rng::seed_from_u64(1));

        let first = spring_layout(&graph, LayoutConfig::default());
        let second = spring_layout(&graph, LayoutConfig::default());
        assert_eq!(first, second);

        let other = spring_layout(&graph, LayoutConfig::with_seed(43));
        assert_ne!(first, other);
    }

    #[test]
    fn test_layout_fits_unit_box() {
        let net = network(&["A", "B", "C", "D", "E"], &[(1, 2), (1, 3), (4, 5)]);
        let graph = visual_graph(&net, &mut ChaCha8Rng::seed_from_u64(1));
        let pos = spring_layout(&graph, LayoutConfig::default());

        assert_eq!(pos.len(), 5);
        let max = pos
            .iter()
            .map(|p| p.0.abs().max(p.1.abs()))
            .fold(0.0, f64::max);
        assert!((max - 1.0).abs() < 1e-9);
        assert!(pos.iter().all(|p| p.0.is_finite() && p.1.is_finite()));
    }

    #[test]
    fn test_layout_single_and_empty() {
        let empty: VisualGraph = VisualGraph::default();
        assert!(spring_layout(&empty, LayoutConfig::default()).is_empty());

        let net = network(&["Solo"], &[]);
        let graph = visual_graph(&net, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(spring_layout(&graph, LayoutConfig::default()), vec![(0.0, 0.0)]);
    }
}
