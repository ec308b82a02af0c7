use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid node kind: {0}")]
    InvalidKind(String),
    #[error("node has neither a name nor an address")]
    MissingIdentity,
    #[error("statement '{prefix}' is missing token {index}")]
    Truncated { prefix: &'static str, index: usize },
}

impl ParseError {
    /// Whether the interpreter can drop the offending line and keep going.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("invalid ignore-type: {kind}. value must be one of {valid}")]
    InvalidKind { kind: String, valid: String },

    #[error("invalid rankdir: {0}. value must be one of TB, BT, LR, RL")]
    InvalidRankDir(String),

    #[error("Cannot write output {path}: {source}")]
    Output { path: PathBuf, source: std::io::Error },

    #[error("Visualization error: {0}")]
    Visualization(String),
}
