//! Post-resolution filters that shrink a `ConfigGraph`.
//!
//! `IgnoreFilter` drops nodes by name or kind; `IsolateFilter` keeps only
//! what is reachable from or into a set of seed nodes. `ConfigGraph` applies
//! them in that order so isolation never re-admits an ignored node.
use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::graph::{ConfigGraph, IdentityResolver, NodeKind};

/// A pass that mutates a resolved graph in place.
pub trait GraphFilter {
    fn apply(&self, graph: &mut ConfigGraph);
}

/// Removes nodes matching an ignored name (by name, address or label) or an
/// ignored kind, along with edges that touch them.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    pub names: Vec<String>,
    pub kinds: Vec<NodeKind>,
}

impl IgnoreFilter {
    #[must_use]
    pub fn new(names: Vec<String>, kinds: Vec<NodeKind>) -> Self {
        Self { names, kinds }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.kinds.is_empty()
    }

    fn ignores_name(&self, token: &str) -> bool {
        self.names.iter().any(|n| n == token)
    }
}

impl GraphFilter for IgnoreFilter {
    fn apply(&self, graph: &mut ConfigGraph) {
        if self.is_empty() {
            return;
        }
        info!("prune ignored");

        let mut removed: Vec<String> = Vec::new();
        let nodes = std::mem::take(&mut graph.nodes);
        graph.nodes = nodes
            .into_iter()
            .filter(|n| {
                let ignored = self.kinds.contains(&n.kind)
                    || self.ignores_name(&n.label)
                    || n.name.as_deref().is_some_and(|s| self.ignores_name(s))
                    || n.address.as_deref().is_some_and(|s| self.ignores_name(s));
                if ignored {
                    debug!(node = %n.label, kind = %n.kind, "ignoring node");
                    removed.push(n.label.clone());
                }
                !ignored
            })
            .collect();

        // Edge endpoints are labels by now; an edge to a removed node would dangle.
        let gone = |token: &str| self.ignores_name(token) || removed.iter().any(|l| l == token);
        let before = graph.edges.len();
        graph.edges.retain(|e| !gone(&e.from) && !gone(&e.to));
        info!(
            nodes = removed.len(),
            edges = before - graph.edges.len(),
            "ignored nodes and edges removed"
        );
    }
}

/// Keeps the subgraph reachable forward from, or backward into, any seed.
#[derive(Debug, Clone, Default)]
pub struct IsolateFilter {
    pub seeds: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl IsolateFilter {
    #[must_use]
    pub fn new(seeds: Vec<String>) -> Self {
        Self { seeds }
    }
}

/// Resolved endpoints of every edge, by position in `graph.edges`.
fn edge_endpoints(graph: &ConfigGraph) -> Vec<Option<(usize, usize)>> {
    let resolver = IdentityResolver::new(&graph.nodes);
    graph
        .edges
        .iter()
        .map(|e| Some((resolver.find(&e.from)?.0, resolver.find(&e.to)?.0)))
        .collect()
}

/// Breadth-first walk from `seed`, keeping every edge leaving the frontier in
/// `direction`. Nodes already marked isolated, by this walk or any earlier
/// one, are never expanded again.
fn expand(
    graph: &mut ConfigGraph,
    endpoints: &[Option<(usize, usize)>],
    kept: &mut [bool],
    seed: usize,
    direction: Direction,
) {
    let mut frontier = VecDeque::from([seed]);

    while let Some(current) = frontier.pop_front() {
        for (i, ends) in endpoints.iter().enumerate() {
            let Some((from, to)) = *ends else { continue };
            let (near, far) = match direction {
                Direction::Forward => (from, to),
                Direction::Backward => (to, from),
            };
            if near != current {
                continue;
            }
            kept[i] = true;
            if !graph.nodes[far].isolated {
                graph.nodes[far].isolated = true;
                frontier.push_back(far);
            }
        }
    }
}

impl GraphFilter for IsolateFilter {
    fn apply(&self, graph: &mut ConfigGraph) {
        if self.seeds.is_empty() {
            return;
        }
        info!("isolate nodes");

        let seeds: Vec<usize> = self
            .seeds
            .iter()
            .filter_map(|seed| {
                let id = graph.find(seed);
                if id.is_none() {
                    warn!(seed = %seed, "isolation seed not found");
                }
                id.map(|id| id.0)
            })
            .collect();
        if seeds.is_empty() {
            warn!("no isolation seed resolved; keeping the full graph");
            return;
        }

        // Marks from a previous run would stop the walks short.
        for node in &mut graph.nodes {
            node.isolated = false;
            node.highlighted = false;
        }
        for &seed in &seeds {
            let node = &mut graph.nodes[seed];
            node.isolated = true;
            node.highlighted = true;
        }

        let endpoints = edge_endpoints(graph);
        let mut kept = vec![false; graph.edges.len()];
        for &seed in &seeds {
            debug!(seed = %graph.nodes[seed].label, "expanding from seed");
            expand(graph, &endpoints, &mut kept, seed, Direction::Forward);
            expand(graph, &endpoints, &mut kept, seed, Direction::Backward);
        }

        let edges = std::mem::take(&mut graph.edges);
        graph.edges = edges.into_iter().zip(kept).filter_map(|(e, k)| k.then_some(e)).collect();
        graph.nodes.retain(|n| n.isolated);
        info!(nodes = graph.nodes.len(), edges = graph.edges.len(), "isolation complete");
    }
}
