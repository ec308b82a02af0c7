//! netscaler-graph: NetScaler configuration graph generator
//!
//! Read an `ns.conf` file, turn its statements into a graph of configuration
//! objects (virtual servers, services, policies, certificates, addresses) and
//! render it as Graphviz DOT, a Mermaid flowchart or JSON.
//!
//! # Pipeline
//! 1. `parser` feeds each line through a prefix table of statement handlers,
//!    which insert or merge nodes and append edges.
//! 2. `graph::resolver` re-resolves every edge against the final nodes.
//! 3. `filter` drops ignored objects, then isolates the seeds' neighborhood.
//! 4. `visualization` renders the result.
//!
//! # Quickstart (Library)
//! ```no_run
//! use netscaler_graph::graph::{ConfigGraph, FilterOptions};
//! use netscaler_graph::visualization::{DotGenerator, RankDir};
//!
//! let graph = ConfigGraph::build_from_file(
//!     std::path::Path::new("ns.conf"),
//!     FilterOptions::default(),
//!     RankDir::Lr,
//! )
//! .expect("build graph");
//! println!("{}", DotGenerator::new().generate_dot(&graph).expect("render"));
//! ```
//!
//! # Quickstart (CLI)
//! ```text
//! netscaler-graph dot -i ns.conf -o graph.dot
//! netscaler-graph mermaid --stdout --isolate-name lb_vs_web --ignore-type Cert
//! ```
pub mod app;
pub mod cli;
pub mod errors;
pub mod filter;
pub mod graph;
pub mod parser;
pub mod utils;
pub mod visualization;
