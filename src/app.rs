use crate::cli::{Cli, Commands};
use crate::errors::GraphError;
use crate::graph::{ConfigGraph, FilterOptions, NodeKind};
use crate::utils::config::{load_config_at, load_config_near, Config};
use crate::utils::logging;
use crate::visualization::{DotGenerator, JsonGenerator, MermaidGenerator, RankDir};
use clap::CommandFactory;
use clap_complete::generate;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_INPUT_FILE: &str = "ns.conf";
pub const DEFAULT_OUTPUT_FILE: &str = "graph.out";

/// Effective options of a run after merging CLI/env, config file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub rankdir: RankDir,
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub stdout: bool,
    pub filters: FilterOptions,
}

impl Settings {
    /// Merge `cli` over `config` over the built-in defaults.
    ///
    /// # Errors
    /// `GraphError::InvalidKind` for an unknown ignore type and
    /// `GraphError::InvalidRankDir` for an unknown layout direction.
    pub fn resolve(cli: &Cli, config: Option<&Config>) -> Result<Self, GraphError> {
        let cfg = config.cloned().unwrap_or_default();
        let pick = |flag: &Vec<String>, file: Option<Vec<String>>| {
            if flag.is_empty() { file.unwrap_or_default() } else { flag.clone() }
        };

        let rankdir = match cli.rankdir.clone().or(cfg.rankdir) {
            Some(r) => r.parse::<RankDir>()?,
            None => RankDir::default(),
        };
        let input_file = cli.input_file.clone().or(cfg.input_file).unwrap_or_else(|| DEFAULT_INPUT_FILE.into());
        let output_file =
            cli.output_file.clone().or(cfg.output_file).unwrap_or_else(|| DEFAULT_OUTPUT_FILE.into());
        let ignore_kinds = parse_kinds(&pick(&cli.ignore_type, cfg.ignore_type))?;

        Ok(Self {
            rankdir,
            input_file: input_file.into(),
            output_file: output_file.into(),
            stdout: cli.stdout || cfg.stdout.unwrap_or(false),
            filters: FilterOptions {
                ignore_names: pick(&cli.ignore_name, cfg.ignore_name),
                ignore_kinds,
                isolate_names: pick(&cli.isolate_name, cfg.isolate_name),
            },
        })
    }
}

/// Validate ignore-type values against the known node kinds.
///
/// # Errors
/// `GraphError::InvalidKind` naming the first unknown value.
pub fn parse_kinds(values: &[String]) -> Result<Vec<NodeKind>, GraphError> {
    values
        .iter()
        .map(|v| {
            v.parse::<NodeKind>().map_err(|_| GraphError::InvalidKind {
                kind: v.clone(),
                valid: NodeKind::valid_names(),
            })
        })
        .collect()
}

fn load_config(cli: &Cli) -> Result<Option<Config>, GraphError> {
    if let Some(path) = &cli.config {
        return load_config_at(Path::new(path)).map(Some);
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let home = std::env::var_os("HOME").map(PathBuf::from);
    Ok(load_config_near(&cwd, home.as_deref()))
}

/// Render `graph` in the format selected by `command`.
///
/// # Errors
/// Propagates generator failures.
pub fn render(command: &Commands, graph: &ConfigGraph) -> Result<String, GraphError> {
    match command {
        Commands::Dot => DotGenerator::new().generate_dot(graph),
        Commands::Mermaid => MermaidGenerator::new().generate_mermaid(graph),
        Commands::Json => JsonGenerator::new().generate_json(graph),
        Commands::Completions { .. } => {
            Err(GraphError::Visualization("completions are not a graph format".into()))
        }
    }
}

fn write_output(settings: &Settings, rendered: &str) -> Result<(), GraphError> {
    if settings.stdout {
        info!("writing graph to stdout");
        let mut out = io::stdout().lock();
        out.write_all(rendered.as_bytes())?;
        out.flush()?;
        return Ok(());
    }
    info!(output_file = %settings.output_file.display(), "writing graph");
    fs::write(&settings.output_file, rendered)
        .map_err(|source| GraphError::Output { path: settings.output_file.clone(), source })
}

/// Build, filter and render the graph described by `cli`.
///
/// # Errors
/// Any configuration, parse or output failure.
pub fn run(cli: &Cli) -> Result<(), GraphError> {
    let config = load_config(cli)?;
    let settings = Settings::resolve(cli, config.as_ref())?;
    let graph =
        ConfigGraph::build_from_file(&settings.input_file, settings.filters.clone(), settings.rankdir)?;
    let rendered = render(&cli.command, &graph)?;
    write_output(&settings, &rendered)
}

/// Run the CLI logic in-process.
///
/// Returns an exit code (0 = success).
#[must_use]
pub fn run_cli(cli: Cli) -> i32 {
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        let bin_name = env!("CARGO_PKG_NAME");
        generate(shell, &mut cmd, bin_name, &mut io::stdout());
        return 0;
    }

    logging::init(cli.verbose, cli.quiet);
    match run(&cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("netscaler-graph").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let s = Settings::resolve(&cli(&["dot"]), None).unwrap();
        assert_eq!(s.rankdir, RankDir::Tb);
        assert_eq!(s.input_file, PathBuf::from("ns.conf"));
        assert_eq!(s.output_file, PathBuf::from("graph.out"));
        assert!(!s.stdout);
        assert_eq!(s.filters, FilterOptions::default());
    }

    #[test]
    fn test_cli_beats_config_beats_default() {
        let cfg = Config {
            rankdir: Some("LR".into()),
            input_file: Some("from-file.conf".into()),
            ignore_name: Some(vec!["a".into()]),
            ignore_type: Some(vec!["cert".into()]),
            stdout: Some(true),
            ..Config::default()
        };
        let s = Settings::resolve(&cli(&["mermaid", "-i", "cli.conf", "--ignore-name", "b,c"]), Some(&cfg)).unwrap();
        assert_eq!(s.input_file, PathBuf::from("cli.conf"));
        assert_eq!(s.rankdir, RankDir::Lr);
        assert_eq!(s.filters.ignore_names, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(s.filters.ignore_kinds, vec![NodeKind::Cert]);
        assert!(s.stdout);
    }

    #[test]
    fn test_invalid_ignore_type_names_valid_kinds() {
        let err = Settings::resolve(&cli(&["dot", "--ignore-type", "Bogus"]), None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("invalid ignore-type: Bogus"));
        assert!(msg.contains("LBVServer"));
    }

    #[test]
    fn test_invalid_rankdir_from_config() {
        let cfg = Config { rankdir: Some("sideways".into()), ..Config::default() };
        assert!(matches!(
            Settings::resolve(&cli(&["dot"]), Some(&cfg)),
            Err(GraphError::InvalidRankDir(_))
        ));
    }
}
