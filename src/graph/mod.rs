//! Graph model for a parsed NetScaler configuration.
//!
//! This module defines the data structures (`NodeKind`, `Node`, `Edge`,
//! `ConfigGraph`) and the two registries that ingestion writes through:
//! `ConfigGraph::add_node` (insert-or-merge keyed by identity) and
//! `ConfigGraph::add_edge` (append, materializing both endpoints).
//!
//! You typically construct a graph via `ConfigGraph::build_from_file` and then
//! hand it to a generator in `crate::visualization`.
use crate::errors::{GraphError, ParseError};
use crate::visualization::RankDir;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::BufRead;
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

pub mod resolver;

pub use resolver::IdentityResolver;

/// Name and address of the synthetic node standing for "reachable from anywhere".
pub const GLOBAL_NAME: &str = "Global";
pub const GLOBAL_ADDRESS: &str = "0.0.0.0";

/// Category of a configuration object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Unknown,
    AuthAction,
    AuthPolicy,
    AuthVServer,
    Cert,
    CsAction,
    CsPolicy,
    CsVServer,
    DomainName,
    GslbService,
    GslbGroup,
    GslbVServer,
    LbGroup,
    LbVServer,
    Netscaler,
    Policy,
    PolicyLabel,
    PortalTheme,
    ResponderAction,
    ResponderPolicy,
    RewriteAction,
    RewritePolicy,
    Server,
    Service,
    ServiceGroup,
    SessionAction,
    SessionPolicy,
    Sta,
    VpnVServer,
    Wi,
    Vip,
}

impl NodeKind {
    pub const ALL: [NodeKind; 31] = [
        NodeKind::Unknown,
        NodeKind::AuthAction,
        NodeKind::AuthPolicy,
        NodeKind::AuthVServer,
        NodeKind::Cert,
        NodeKind::CsAction,
        NodeKind::CsPolicy,
        NodeKind::CsVServer,
        NodeKind::DomainName,
        NodeKind::GslbService,
        NodeKind::GslbGroup,
        NodeKind::GslbVServer,
        NodeKind::LbGroup,
        NodeKind::LbVServer,
        NodeKind::Netscaler,
        NodeKind::Policy,
        NodeKind::PolicyLabel,
        NodeKind::PortalTheme,
        NodeKind::ResponderAction,
        NodeKind::ResponderPolicy,
        NodeKind::RewriteAction,
        NodeKind::RewritePolicy,
        NodeKind::Server,
        NodeKind::Service,
        NodeKind::ServiceGroup,
        NodeKind::SessionAction,
        NodeKind::SessionPolicy,
        NodeKind::Sta,
        NodeKind::VpnVServer,
        NodeKind::Wi,
        NodeKind::Vip,
    ];

    /// Canonical name as it appears on the command line and in output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Unknown => "Unknown",
            NodeKind::AuthAction => "AuthAction",
            NodeKind::AuthPolicy => "AuthPolicy",
            NodeKind::AuthVServer => "AuthVServer",
            NodeKind::Cert => "Cert",
            NodeKind::CsAction => "CSAction",
            NodeKind::CsPolicy => "CSPolicy",
            NodeKind::CsVServer => "CSVServer",
            NodeKind::DomainName => "DomainName",
            NodeKind::GslbService => "GSLBService",
            NodeKind::GslbGroup => "GSLBGroup",
            NodeKind::GslbVServer => "GSLBVServer",
            NodeKind::LbGroup => "LBGroup",
            NodeKind::LbVServer => "LBVServer",
            NodeKind::Netscaler => "Netscaler",
            NodeKind::Policy => "Policy",
            NodeKind::PolicyLabel => "PolicyLabel",
            NodeKind::PortalTheme => "PortalTheme",
            NodeKind::ResponderAction => "ResponderAction",
            NodeKind::ResponderPolicy => "ResponderPolicy",
            NodeKind::RewriteAction => "RewriteAction",
            NodeKind::RewritePolicy => "RewritePolicy",
            NodeKind::Server => "Server",
            NodeKind::Service => "Service",
            NodeKind::ServiceGroup => "ServiceGroup",
            NodeKind::SessionAction => "SessionAction",
            NodeKind::SessionPolicy => "SessionPolicy",
            NodeKind::Sta => "STA",
            NodeKind::VpnVServer => "VPNVServer",
            NodeKind::Wi => "WI",
            NodeKind::Vip => "VIP",
        }
    }

    /// Comma-separated list of every kind name, for error messages.
    #[must_use]
    pub fn valid_names() -> String {
        Self::ALL.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
    }

    /// Whether a node of kind `self` should be re-typed when merged with `incoming`.
    ///
    /// Only placeholders are ever re-typed: `Unknown` takes any concrete kind and
    /// the generic `Server` takes `VIP`. Populated kinds are never overwritten.
    #[must_use]
    pub fn upgrades_to(self, incoming: NodeKind) -> bool {
        match self {
            NodeKind::Unknown => incoming != NodeKind::Unknown,
            NodeKind::Server => incoming == NodeKind::Vip,
            _ => false,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::InvalidKind(s.to_string()))
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Stable index of a node in `ConfigGraph::nodes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub name: Option<String>,
    pub address: Option<String>,
    pub port: Option<String>,
    pub protocol: Option<String>,
    pub label: String,
    pub isolated: bool,
    pub highlighted: bool,
}

impl Node {
    /// Whether `token` identifies this node by label, name or address.
    #[must_use]
    pub fn matches(&self, token: &str) -> bool {
        self.label == token
            || self.name.as_deref() == Some(token)
            || self.address.as_deref() == Some(token)
    }

    fn relabel(&mut self) -> bool {
        let label = node_label(self.name.as_deref(), self.address.as_deref());
        if label == self.label {
            return false;
        }
        self.label = label;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub port: Option<String>,
    pub protocol: Option<String>,
    pub label: String,
}

/// Arguments of a node insert-or-merge. Empty strings count as absent.
#[derive(Debug, Clone, Copy)]
pub struct NodeSpec<'a> {
    pub kind: NodeKind,
    pub name: &'a str,
    pub address: &'a str,
    pub port: &'a str,
    pub protocol: &'a str,
}

impl<'a> NodeSpec<'a> {
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self { kind, name: "", address: "", port: "", protocol: "" }
    }

    #[must_use]
    pub fn named(kind: NodeKind, name: &'a str) -> Self {
        Self::new(kind).name(name)
    }

    #[must_use]
    pub fn name(mut self, name: &'a str) -> Self {
        self.name = name;
        self
    }

    #[must_use]
    pub fn address(mut self, address: &'a str) -> Self {
        self.address = address;
        self
    }

    #[must_use]
    pub fn port(mut self, port: &'a str) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn protocol(mut self, protocol: &'a str) -> Self {
        self.protocol = protocol;
        self
    }
}

/// Active filter configuration of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub ignore_names: Vec<String>,
    pub ignore_kinds: Vec<NodeKind>,
    pub isolate_names: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(skip)]
    pub filters: FilterOptions,
    #[serde(skip)]
    pub rankdir: RankDir,
}

impl ConfigGraph {
    /// Empty graph with the given filters and render orientation.
    #[must_use]
    pub fn new(filters: FilterOptions, rankdir: RankDir) -> Self {
        for name in &filters.ignore_names {
            info!(name = %name, "adding to ignore list");
        }
        for kind in &filters.ignore_kinds {
            info!(kind = %kind, "adding to ignore list");
        }
        for name in &filters.isolate_names {
            info!(name = %name, "adding to isolation list");
        }
        Self { nodes: Vec::new(), edges: Vec::new(), filters, rankdir }
    }

    /// Read, resolve and filter the configuration file at `path`.
    ///
    /// An input file that cannot be opened is logged and yields a graph with
    /// no ingested lines; only node-construction failures abort.
    ///
    /// # Errors
    /// Returns `GraphError::Parse` when a statement produces an invalid node.
    pub fn build_from_file(
        path: &Path,
        filters: FilterOptions,
        rankdir: RankDir,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new(filters, rankdir);
        crate::parser::ConfigParser::new().parse_file(path, &mut graph)?;
        graph.finish();
        Ok(graph)
    }

    /// Same as `build_from_file` over any line-oriented reader.
    ///
    /// # Errors
    /// Returns `GraphError::Parse` when a statement produces an invalid node.
    pub fn build_from_reader<R: BufRead>(
        reader: R,
        filters: FilterOptions,
        rankdir: RankDir,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new(filters, rankdir);
        crate::parser::ConfigParser::new().parse_reader(reader, &mut graph)?;
        graph.finish();
        Ok(graph)
    }

    // Post-ingestion phases, strictly in this order.
    fn finish(&mut self) {
        use crate::filter::{GraphFilter, IgnoreFilter, IsolateFilter};

        resolver::resolve_edges(self);
        let ignore = IgnoreFilter::new(
            self.filters.ignore_names.clone(),
            self.filters.ignore_kinds.clone(),
        );
        ignore.apply(self);
        IsolateFilter::new(self.filters.isolate_names.clone()).apply(self);
        info!(nodes = self.nodes.len(), edges = self.edges.len(), "parse complete");
    }

    /// Add the synthetic `Global` VIP that all-zero virtual IPs point at.
    ///
    /// # Errors
    /// Never fails: the node always carries a name.
    pub fn add_global(&mut self) -> Result<NodeId, ParseError> {
        debug!("adding global ({GLOBAL_ADDRESS}) node");
        self.add_node(NodeSpec::named(NodeKind::Vip, GLOBAL_NAME).address(GLOBAL_ADDRESS))
    }

    /// First node identified by `token`, see `IdentityResolver::find`.
    #[must_use]
    pub fn find(&self, token: &str) -> Option<NodeId> {
        IdentityResolver::new(&self.nodes).find(token)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Insert a node, or merge into the node it is identical to.
    ///
    /// A name that parses as an IP address is treated as the address. Merging
    /// only fills fields that are still empty and only re-types placeholder
    /// kinds (see `NodeKind::upgrades_to`).
    ///
    /// # Errors
    /// `ParseError::MissingIdentity` when both name and address are empty.
    pub fn add_node(&mut self, spec: NodeSpec<'_>) -> Result<NodeId, ParseError> {
        let mut name = non_empty(spec.name);
        let mut address = non_empty(spec.address);
        if name.is_none() && address.is_none() {
            return Err(ParseError::MissingIdentity);
        }
        if let Some(n) = name {
            if is_ip_address(n) {
                address = Some(n);
                name = None;
            }
        }
        let port = non_empty(spec.port);
        let protocol = non_empty(spec.protocol).map(str::to_uppercase);

        let existing = name.and_then(|n| self.find(n)).or_else(|| address.and_then(|a| self.find(a)));

        let Some(id) = existing else {
            let node = Node {
                kind: spec.kind,
                name: name.map(str::to_string),
                address: address.map(str::to_string),
                port: port.map(str::to_string),
                protocol,
                label: node_label(name, address),
                isolated: false,
                highlighted: false,
            };
            debug!(?node, "add new node");
            self.nodes.push(node);
            return Ok(NodeId(self.nodes.len() - 1));
        };

        let node = &mut self.nodes[id.0];
        if node.kind.upgrades_to(spec.kind) {
            node.kind = spec.kind;
            debug!(?node, "update kind");
        }
        if node.name.is_none() {
            if let Some(n) = name {
                node.name = Some(n.to_string());
                debug!(?node, "update name");
            }
        }
        if node.address.is_none() {
            if let Some(a) = address {
                node.address = Some(a.to_string());
                debug!(?node, "update address");
            }
        }
        if node.port.is_none() {
            if let Some(p) = port {
                node.port = Some(p.to_string());
                debug!(?node, "update port");
            }
        }
        if node.protocol.is_none() && protocol.is_some() {
            node.protocol = protocol;
            debug!(?node, "update protocol");
        }
        if node.relabel() {
            debug!(?node, "update label");
        }
        Ok(id)
    }

    /// Append an edge, first making sure both endpoints exist as nodes.
    ///
    /// Endpoints are kept as the raw tokens until `resolver::resolve_edges`
    /// rewrites them. Duplicate edges are kept.
    ///
    /// # Errors
    /// `ParseError::MissingIdentity` when an endpoint token is empty.
    pub fn add_edge(
        &mut self,
        from: &str,
        to: &str,
        port: Option<&str>,
        protocol: Option<&str>,
    ) -> Result<(), ParseError> {
        self.add_node(NodeSpec::named(NodeKind::Unknown, from))?;
        self.add_node(NodeSpec::named(NodeKind::Unknown, to))?;

        let port = port.and_then(non_empty).map(str::to_string);
        let protocol = protocol.and_then(non_empty).map(str::to_uppercase);
        let edge = Edge {
            from: from.to_string(),
            to: to.to_string(),
            label: edge_label(port.as_deref(), protocol.as_deref()),
            port,
            protocol,
        };
        debug!(?edge, "add new edge");
        self.edges.push(edge);
        Ok(())
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}

/// Whether `s` is an IPv4 or IPv6 literal.
#[must_use]
pub fn is_ip_address(s: &str) -> bool {
    s.parse::<IpAddr>().is_ok()
}

/// `"name | address"`, or whichever of the two is present.
#[must_use]
pub fn node_label(name: Option<&str>, address: Option<&str>) -> String {
    match (name, address) {
        (Some(n), Some(a)) => format!("{n} | {a}"),
        (Some(n), None) => n.to_string(),
        (None, Some(a)) => a.to_string(),
        (None, None) => String::new(),
    }
}

/// `"port | protocol"`, or whichever of the two is present.
#[must_use]
pub fn edge_label(port: Option<&str>, protocol: Option<&str>) -> String {
    node_label(port, protocol)
}
