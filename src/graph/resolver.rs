use tracing::{debug, error, info};

use crate::graph::{edge_label, ConfigGraph, Node, NodeId};

/// Maps a name, address or display label to the node it identifies.
///
/// Lookup is a linear scan in insertion order; the first node whose label,
/// name or address equals the token wins.
pub struct IdentityResolver<'a> {
    nodes: &'a [Node],
}

impl<'a> IdentityResolver<'a> {
    #[must_use]
    pub fn new(nodes: &'a [Node]) -> Self {
        Self { nodes }
    }

    /// An empty token never matches, so empty fields cannot alias each other.
    #[must_use]
    pub fn find(&self, token: &str) -> Option<NodeId> {
        if token.is_empty() {
            return None;
        }
        self.nodes.iter().position(|n| n.matches(token)).map(NodeId)
    }
}

/// Rewrite every edge against the final node set.
///
/// Endpoints are re-resolved (nodes may have been completed by later lines),
/// empty port/protocol are inherited from the `from` node, and endpoints are
/// replaced by the nodes' current labels. Edges with an endpoint that no
/// longer resolves are dropped. Returns the number of dropped edges.
pub fn resolve_edges(graph: &mut ConfigGraph) -> usize {
    debug!("update edges");
    let edges = std::mem::take(&mut graph.edges);
    let total = edges.len();
    let resolver = IdentityResolver::new(&graph.nodes);

    let resolved: Vec<_> = edges
        .into_iter()
        .filter_map(|mut edge| {
            let Some(from) = resolver.find(&edge.from) else {
                error!(?edge, "from node not found");
                return None;
            };
            let Some(to) = resolver.find(&edge.to) else {
                error!(?edge, "to node not found");
                return None;
            };
            let from = &graph.nodes[from.0];
            let to = &graph.nodes[to.0];
            if edge.port.is_none() {
                edge.port.clone_from(&from.port);
            }
            if edge.protocol.is_none() {
                edge.protocol.clone_from(&from.protocol);
            }
            edge.from.clone_from(&from.label);
            edge.to.clone_from(&to.label);
            edge.label = edge_label(edge.port.as_deref(), edge.protocol.as_deref());
            Some(edge)
        })
        .collect();

    let dropped = total - resolved.len();
    if dropped > 0 {
        info!(dropped, "dropped unresolvable edges");
    }
    graph.edges = resolved;
    dropped
}
