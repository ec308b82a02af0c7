use crate::errors::GraphError;
use crate::graph::{ConfigGraph, NodeKind};
use crate::visualization::{edge_color, label_index, DEFAULT_EDGE_COLOR, EDGE_COLORS, HIGHLIGHT_COLOR};
use std::fmt::Write as _;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotNodeStyle {
    pub fillcolor: &'static str,
    pub shape: &'static str,
    pub style: &'static str,
}

const fn node(fillcolor: &'static str, shape: &'static str, style: &'static str) -> DotNodeStyle {
    DotNodeStyle { fillcolor, shape, style }
}

const UNKNOWN: DotNodeStyle = node("magenta", "rectangle", "rounded,filled");

/// Graphviz attributes per node kind and edge color table.
#[derive(Debug, Clone)]
pub struct DotStyles {
    pub nodes: Vec<(NodeKind, DotNodeStyle)>,
    pub edges: Vec<(&'static str, &'static str)>,
}

impl Default for DotStyles {
    fn default() -> Self {
        use NodeKind as K;
        let nodes = vec![
            (K::Unknown, node("magenta", "rectangle", "rounded")),
            (K::AuthAction, node("lightcoral", "invhouse", "rounded,filled")),
            (K::AuthPolicy, node("lightcoral", "house", "rounded,filled")),
            (K::AuthVServer, node("lightcoral", "house", "rounded,filled")),
            (K::Cert, node("greenyellow", "cds", "rounded,filled")),
            (K::CsAction, node("lightsalmon", "invhouse", "rounded,filled")),
            (K::CsPolicy, node("lightsalmon", "house", "rounded,filled")),
            (K::CsVServer, node("lightsalmon", "house", "rounded,filled")),
            (K::DomainName, node("aqua", "house", "rounded,filled")),
            (K::GslbService, node("lightblue", "rectangle", "rounded,filled")),
            (K::GslbGroup, node("lightblue", "rectangle", "rounded,filled")),
            (K::GslbVServer, node("lightblue", "house", "rounded,filled")),
            (K::LbGroup, node("lightgoldenrodyellow", "rectangle", "rounded,filled")),
            (K::LbVServer, node("lightgoldenrodyellow", "house", "rounded,filled")),
            (K::Netscaler, node("aqua", "doublecircle", "filled")),
            (K::Policy, node("lightpink", "folder", "rounded,filled")),
            (K::PolicyLabel, node("lightpink", "tab", "rounded,filled")),
            (K::PortalTheme, node("turquoise", "note", "rounded,filled")),
            (K::ResponderAction, node("lightyellow", "invhouse", "rounded,filled")),
            (K::ResponderPolicy, node("lightyellow", "house", "rounded,filled")),
            (K::RewriteAction, node("lightgreen", "invhouse", "rounded,filled")),
            (K::RewritePolicy, node("lightgreen", "house", "rounded,filled")),
            (K::Server, node("white", "rectangle", "rounded")),
            (K::Service, node("white", "rectangle", "rounded")),
            (K::ServiceGroup, node("lightgrey", "rectangle", "rounded,filled")),
            (K::SessionAction, node("palegreen", "invhouse", "rounded,filled")),
            (K::SessionPolicy, node("palegreen", "house", "rounded,filled")),
            (K::Sta, node("lightblue", "rectangle", "rounded,filled")),
            (K::VpnVServer, node("turquoise", "house", "rounded,filled")),
            (K::Wi, node("turquoise", "polygon", "rounded,filled")),
            (K::Vip, node("yellow", "doublecircle", "filled")),
        ];
        Self { nodes, edges: EDGE_COLORS.to_vec() }
    }
}

impl DotStyles {
    /// Style for `kind`, falling back to the generic unknown-object look.
    #[must_use]
    pub fn node_style(&self, kind: NodeKind) -> DotNodeStyle {
        self.nodes.iter().find(|(k, _)| *k == kind).map_or(UNKNOWN, |(_, s)| *s)
    }

    #[must_use]
    pub fn edge_color(&self, port: Option<&str>, protocol: Option<&str>) -> &'static str {
        edge_color(&self.edges, port, protocol).unwrap_or(DEFAULT_EDGE_COLOR)
    }
}

#[derive(Debug, Default)]
pub struct DotGenerator {
    styles: DotStyles,
}

impl DotGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_styles(styles: DotStyles) -> Self {
        Self { styles }
    }

    /// Render `graph` as a Graphviz `digraph`.
    ///
    /// # Errors
    /// Currently infallible; the `Result` mirrors the other generators.
    pub fn generate_dot(&self, graph: &ConfigGraph) -> Result<String, GraphError> {
        let mut s = String::new();
        s.push_str("digraph NetScaler {\n");
        let _ = writeln!(s, "  rankdir={};", graph.rankdir);
        s.push_str("  node [fontname=Helvetica, fontsize=10];\n");
        s.push_str("  edge [fontname=Helvetica, fontsize=9];\n");

        for (i, n) in graph.nodes.iter().enumerate() {
            let st = self.styles.node_style(n.kind);
            let label = escape_label(&n.label);
            if n.highlighted {
                let _ = writeln!(
                    s,
                    "  \"n{i}\" [label=\"{label}\", fillcolor=\"{}\", color=\"{HIGHLIGHT_COLOR}\", shape=\"{}\", style=\"{},bold\"];",
                    st.fillcolor, st.shape, st.style
                );
            } else {
                let _ = writeln!(
                    s,
                    "  \"n{i}\" [label=\"{label}\", fillcolor=\"{}\", shape=\"{}\", style=\"{}\"];",
                    st.fillcolor, st.shape, st.style
                );
            }
        }

        let index = label_index(&graph.nodes);
        for e in &graph.edges {
            let (Some(from), Some(to)) = (index.get(e.from.as_str()), index.get(e.to.as_str())) else {
                debug!(from = %e.from, to = %e.to, "edge endpoint not rendered, skipping");
                continue;
            };
            let color = self.styles.edge_color(e.port.as_deref(), e.protocol.as_deref());
            let _ = writeln!(
                s,
                "  \"n{from}\" -> \"n{to}\" [label=\"{}\", color=\"{color}\"];",
                escape_label(&e.label)
            );
        }

        s.push_str("}\n");
        Ok(s)
    }
}

fn escape_label(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
