use crate::errors::GraphError;
use crate::graph::{ConfigGraph, NodeKind};
use crate::visualization::{edge_color, label_index, DEFAULT_EDGE_COLOR, EDGE_COLORS, HIGHLIGHT_COLOR};
use std::fmt::Write as _;
use tracing::debug;

/// Flowchart node shapes in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MermaidShape {
    Stadium,
    Trapezoid,
    TrapezoidAlt,
    Hexagon,
    Asymmetric,
    Box,
    Circle,
    Subroutine,
}

impl MermaidShape {
    /// Opening and closing delimiters around a node's text.
    #[must_use]
    pub fn delimiters(self) -> (&'static str, &'static str) {
        match self {
            MermaidShape::Stadium => ("([", "])"),
            MermaidShape::Trapezoid => ("[/", "\\]"),
            MermaidShape::TrapezoidAlt => ("[\\", "/]"),
            MermaidShape::Hexagon => ("{{", "}}"),
            MermaidShape::Asymmetric => (">", "]"),
            MermaidShape::Box => ("[", "]"),
            MermaidShape::Circle => ("((", "))"),
            MermaidShape::Subroutine => ("[[", "]]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MermaidNodeStyle {
    pub shape: MermaidShape,
    pub fill: &'static str,
}

const fn node(shape: MermaidShape, fill: &'static str) -> MermaidNodeStyle {
    MermaidNodeStyle { shape, fill }
}

const UNKNOWN: MermaidNodeStyle = node(MermaidShape::Stadium, "#ff00ff");

/// Flowchart shape/fill per node kind and edge color table.
#[derive(Debug, Clone)]
pub struct MermaidStyles {
    pub nodes: Vec<(NodeKind, MermaidNodeStyle)>,
    pub edges: Vec<(&'static str, &'static str)>,
}

impl Default for MermaidStyles {
    fn default() -> Self {
        use MermaidShape as S;
        use NodeKind as K;
        let nodes = vec![
            (K::Unknown, node(S::Stadium, "#ff00ff")),
            (K::AuthAction, node(S::TrapezoidAlt, "#ffcc99")),
            (K::AuthPolicy, node(S::Trapezoid, "#ffcc99")),
            (K::AuthVServer, node(S::Hexagon, "#ffcc99")),
            (K::Cert, node(S::Asymmetric, "#00ff00")),
            (K::CsAction, node(S::TrapezoidAlt, "#ffb366")),
            (K::CsPolicy, node(S::Trapezoid, "#ffb366")),
            (K::CsVServer, node(S::Hexagon, "#ffb366")),
            (K::DomainName, node(S::Stadium, "#ff00ff")),
            (K::GslbService, node(S::Box, "#66ccff")),
            (K::GslbGroup, node(S::Box, "#66ccff")),
            (K::GslbVServer, node(S::Hexagon, "#66ccff")),
            (K::LbGroup, node(S::Stadium, "#ffff99")),
            (K::LbVServer, node(S::Hexagon, "#ffff99")),
            (K::Netscaler, node(S::Circle, "#00ffff")),
            (K::Policy, node(S::Subroutine, "#ff99ff")),
            (K::PolicyLabel, node(S::Subroutine, "#ff99ff")),
            (K::PortalTheme, node(S::Subroutine, "#33ccff")),
            (K::ResponderAction, node(S::TrapezoidAlt, "#ffffcc")),
            (K::ResponderPolicy, node(S::Trapezoid, "#ffffcc")),
            (K::RewriteAction, node(S::TrapezoidAlt, "#99ff99")),
            (K::RewritePolicy, node(S::Trapezoid, "#99ff99")),
            (K::Server, node(S::Box, "#ffffff")),
            (K::Service, node(S::Box, "#f2f2f2")),
            (K::ServiceGroup, node(S::Box, "#e6e6e6")),
            (K::SessionAction, node(S::TrapezoidAlt, "#00ff99")),
            (K::SessionPolicy, node(S::Trapezoid, "#00ff99")),
            (K::Sta, node(S::Box, "#66ccff")),
            (K::VpnVServer, node(S::Hexagon, "#33ccff")),
            (K::Wi, node(S::Hexagon, "#33ccff")),
            (K::Vip, node(S::Circle, "#ffff00")),
        ];
        Self { nodes, edges: EDGE_COLORS.to_vec() }
    }
}

impl MermaidStyles {
    #[must_use]
    pub fn node_style(&self, kind: NodeKind) -> MermaidNodeStyle {
        self.nodes.iter().find(|(k, _)| *k == kind).map_or(UNKNOWN, |(_, s)| *s)
    }

    #[must_use]
    pub fn edge_color(&self, port: Option<&str>, protocol: Option<&str>) -> &'static str {
        edge_color(&self.edges, port, protocol).unwrap_or(DEFAULT_EDGE_COLOR)
    }
}

#[derive(Debug, Default)]
pub struct MermaidGenerator {
    styles: MermaidStyles,
}

impl MermaidGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_styles(styles: MermaidStyles) -> Self {
        Self { styles }
    }

    /// Render `graph` as a Mermaid `flowchart`.
    ///
    /// # Errors
    /// Currently infallible; the `Result` mirrors the other generators.
    pub fn generate_mermaid(&self, graph: &ConfigGraph) -> Result<String, GraphError> {
        let mut s = String::new();
        let _ = writeln!(s, "flowchart {}", graph.rankdir);

        for (i, n) in graph.nodes.iter().enumerate() {
            let (open, close) = self.styles.node_style(n.kind).shape.delimiters();
            let _ = writeln!(s, "    n{i}{open}\"{}\"{close}", escape_label(&n.label));
        }

        let index = label_index(&graph.nodes);
        let mut links: Vec<&'static str> = Vec::new();
        for e in &graph.edges {
            let (Some(from), Some(to)) = (index.get(e.from.as_str()), index.get(e.to.as_str())) else {
                debug!(from = %e.from, to = %e.to, "edge endpoint not rendered, skipping");
                continue;
            };
            if e.label.is_empty() {
                let _ = writeln!(s, "    n{from} --> n{to}");
            } else {
                let _ = writeln!(s, "    n{from} -->|\"{}\"| n{to}", escape_label(&e.label));
            }
            links.push(self.styles.edge_color(e.port.as_deref(), e.protocol.as_deref()));
        }

        for (i, n) in graph.nodes.iter().enumerate() {
            let fill = self.styles.node_style(n.kind).fill;
            if n.highlighted {
                let _ = writeln!(s, "    style n{i} fill:{fill},stroke:{HIGHLIGHT_COLOR},stroke-width:3px");
            } else {
                let _ = writeln!(s, "    style n{i} fill:{fill}");
            }
        }
        for (i, color) in links.iter().enumerate() {
            let _ = writeln!(s, "    linkStyle {i} stroke:{color}");
        }
        Ok(s)
    }
}

// Mermaid has no backslash escapes inside quoted text; entity codes only.
fn escape_label(s: &str) -> String {
    s.replace('"', "#quot;")
}
