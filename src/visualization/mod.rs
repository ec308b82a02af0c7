//! Text renderers for a finished `ConfigGraph`.
//!
//! Each generator takes the graph plus an immutable style table and returns
//! the rendered document as a `String`; writing it anywhere is the caller's
//! job.
use crate::errors::GraphError;
use crate::graph::{ConfigGraph, Node};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub mod dot;
pub mod mermaid;

pub use dot::{DotGenerator, DotNodeStyle, DotStyles};
pub use mermaid::{MermaidGenerator, MermaidNodeStyle, MermaidShape, MermaidStyles};

/// Layout direction of the rendered graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankDir {
    #[default]
    Tb,
    Bt,
    Lr,
    Rl,
}

impl RankDir {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RankDir::Tb => "TB",
            RankDir::Bt => "BT",
            RankDir::Lr => "LR",
            RankDir::Rl => "RL",
        }
    }
}

impl fmt::Display for RankDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankDir {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TB" => Ok(RankDir::Tb),
            "BT" => Ok(RankDir::Bt),
            "LR" => Ok(RankDir::Lr),
            "RL" => Ok(RankDir::Rl),
            _ => Err(GraphError::InvalidRankDir(s.to_string())),
        }
    }
}

/// Edge color keyed by port or protocol value. The first entry matching
/// either field wins.
pub const EDGE_COLORS: &[(&str, &str)] = &[
    ("*", "red"),
    ("ANY", "red"),
    ("25", "darkorange"),
    ("SMTP", "darkorange"),
    ("HTTP", "red"),
    ("443", "green"),
    ("HTTPS", "green"),
    ("SSL", "green"),
    ("SSL_TCP", "green"),
    ("SAML", "green"),
    ("53", "hotpink"),
    ("DNS", "hotpink"),
    ("389", "orange"),
    ("LDAP", "orange"),
    ("636", "navy"),
    ("1812", "magenta"),
    ("RADIUS", "magenta"),
    ("CERT", "greenyellow"),
    ("STA", "cadetblue"),
    ("BASETHEME", "black"),
    ("LOGINSCHEMA", "violet"),
    ("NFACTOR", "pink"),
];

pub const DEFAULT_EDGE_COLOR: &str = "black";
pub const HIGHLIGHT_COLOR: &str = "magenta";

/// Resolve an edge color from an ordered `(value, color)` table.
#[must_use]
pub fn edge_color<'a>(
    table: &[(&'a str, &'a str)],
    port: Option<&str>,
    protocol: Option<&str>,
) -> Option<&'a str> {
    table
        .iter()
        .find(|(value, _)| Some(*value) == port || Some(*value) == protocol)
        .map(|(_, color)| *color)
}

/// Node position by display label; the first node carrying a label wins.
pub(crate) fn label_index(nodes: &[Node]) -> HashMap<&str, usize> {
    let mut index = HashMap::with_capacity(nodes.len());
    for (i, n) in nodes.iter().enumerate() {
        index.entry(n.label.as_str()).or_insert(i);
    }
    index
}

/// Serializes the graph (nodes and resolved edges) as pretty JSON.
#[derive(Debug, Default)]
pub struct JsonGenerator;

impl JsonGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }

    /// # Errors
    /// Returns `GraphError::Visualization` if serialization fails.
    pub fn generate_json(&self, graph: &ConfigGraph) -> Result<String, GraphError> {
        serde_json::to_string_pretty(graph)
            .map_err(|e| GraphError::Visualization(format!("JSON encode error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeKind, NodeSpec};

    #[test]
    fn test_rankdir_parse_and_display() {
        for s in ["TB", "BT", "LR", "RL"] {
            assert_eq!(s.parse::<RankDir>().unwrap().to_string(), s);
        }
        assert_eq!("lr".parse::<RankDir>().unwrap(), RankDir::Lr);
        assert!(matches!("XY".parse::<RankDir>(), Err(GraphError::InvalidRankDir(_))));
        assert_eq!(RankDir::default(), RankDir::Tb);
    }

    #[test]
    fn test_edge_color_prefers_table_order() {
        assert_eq!(edge_color(EDGE_COLORS, Some("443"), Some("HTTP")), Some("red"));
        assert_eq!(edge_color(EDGE_COLORS, Some("636"), None), Some("navy"));
        assert_eq!(edge_color(EDGE_COLORS, None, Some("NFACTOR")), Some("pink"));
        assert_eq!(edge_color(EDGE_COLORS, Some("8080"), Some("TCP")), None);
        assert_eq!(edge_color(EDGE_COLORS, None, None), None);
    }

    #[test]
    fn test_json_contains_kinds_and_labels() {
        let mut g = ConfigGraph::default();
        g.add_node(NodeSpec::named(NodeKind::LbVServer, "lb1")).unwrap();
        let json = JsonGenerator::new().generate_json(&g).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["nodes"][0]["kind"], "LBVServer");
        assert_eq!(v["nodes"][0]["label"], "lb1");
        assert!(v.get("filters").is_none());
    }
}
