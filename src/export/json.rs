//! Node/link projection for interactive front ends.

use serde::{Deserialize, Serialize};

use crate::graph::{HeroId, HeroNetwork, LinkRecord};

/// `{nodes, links}` as consumed by force-directed front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphJson {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<LinkRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: HeroId,
    pub name: String,
    pub emoji: String,
    pub connections: usize,
}

/// Every node of the network plus the link table verbatim. Link rows are
/// not deduplicated or checked against the node set.
pub fn graph_json(network: &HeroNetwork) -> GraphJson {
    let nodes = network
        .nodes()
        .map(|(id, node)| GraphNode {
            id,
            name: node.name.clone(),
            emoji: node.emoji.to_string(),
            connections: node.connections(),
        })
        .collect();

    GraphJson {
        nodes,
        links: network.links().to_vec(),
    }
}
