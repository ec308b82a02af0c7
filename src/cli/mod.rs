use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "netscaler-graph",
    version,
    about = "Generate a graph of NetScaler configuration objects",
    long_about = "Read an ns.conf file and render the relationships between its virtual servers, services, policies, certificates and addresses as Graphviz DOT, Mermaid or JSON. Options can also be set through NSGRAPH_* environment variables or a TOML config file (--config, ./netscaler-graph.toml, ~/.config/netscaler-graph/config.toml)."
)]
pub struct Cli {
    /// Layout direction (TB, BT, LR or RL) [default: TB]
    #[arg(long, global = true, env = "NSGRAPH_RANKDIR", value_parser = ["TB", "BT", "LR", "RL"])]
    pub rankdir: Option<String>,

    /// NetScaler configuration file to read [default: ns.conf]
    #[arg(short, long, global = true, env = "NSGRAPH_INPUT_FILE")]
    pub input_file: Option<String>,

    /// File to write the graph to [default: graph.out]
    #[arg(short, long, global = true, env = "NSGRAPH_OUTPUT_FILE")]
    pub output_file: Option<String>,

    /// Write the graph to standard output instead of the output file
    #[arg(long, global = true, env = "NSGRAPH_STDOUT", default_value_t = false)]
    pub stdout: bool,

    /// Drop objects with this name, address or label (repeatable, comma-separated)
    #[arg(long, global = true, env = "NSGRAPH_IGNORE_NAME", value_delimiter = ',')]
    pub ignore_name: Vec<String>,

    /// Drop objects of this type, e.g. Cert or Server (repeatable, comma-separated)
    #[arg(long, global = true, env = "NSGRAPH_IGNORE_TYPE", value_delimiter = ',')]
    pub ignore_type: Vec<String>,

    /// Only keep objects connected to this one (repeatable, comma-separated)
    #[arg(long, global = true, env = "NSGRAPH_ISOLATE_NAME", value_delimiter = ',')]
    pub isolate_name: Vec<String>,

    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "NSGRAPH_CONFIG")]
    pub config: Option<String>,

    /// Log every node, edge and filter decision
    #[arg(short, long, global = true, env = "NSGRAPH_VERBOSE", conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress all log output
    #[arg(short, long, global = true, env = "NSGRAPH_QUIET")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render the graph as Graphviz DOT
    #[command(visible_alias = "graphviz")]
    Dot,
    /// Render the graph as a Mermaid flowchart
    Mermaid,
    /// Dump the final nodes and edges as JSON
    Json,
    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
