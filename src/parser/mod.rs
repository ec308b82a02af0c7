//! Line-oriented interpreter for `ns.conf` statements.
//!
//! Each line is tokenized, matched against a table of statement prefixes
//! (longest literal prefix wins) and handed to that family's handler, which
//! turns positional tokens and `-flag value` pairs into node and edge
//! registry calls. Lines matching no prefix are ignored.
use crate::errors::ParseError;
use crate::graph::ConfigGraph;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, error, info, warn};

pub mod statements;

pub use statements::{StatementRule, RULES};

#[derive(Debug)]
pub struct Tokenizer {
    token: Regex,
}

impl Tokenizer {
    #[must_use]
    pub fn new() -> Self {
        // A quoted string with backslash escapes, or a run of non-whitespace.
        let token = Regex::new(r#""((?:\\.|[^"\\])*)"|(\S+)"#).unwrap();
        Self { token }
    }

    /// Split a line into tokens. Quotes around a token are stripped; escape
    /// sequences inside quoted strings are kept verbatim.
    #[must_use]
    pub fn tokenize(&self, line: &str) -> Vec<String> {
        self.token
            .captures_iter(line)
            .map(|cap| match (cap.get(1), cap.get(2)) {
                (Some(quoted), _) => quoted.as_str().to_string(),
                (None, Some(bare)) => bare.as_str().trim_matches('"').to_string(),
                (None, None) => String::new(),
            })
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// A tokenized line together with the prefix it was dispatched on.
#[derive(Debug)]
pub struct Statement<'a> {
    pub line: &'a str,
    pub prefix: &'static str,
    pub tokens: Vec<String>,
}

impl<'a> Statement<'a> {
    #[must_use]
    pub fn new(line: &'a str, prefix: &'static str, tokens: Vec<String>) -> Self {
        Self { line, prefix, tokens }
    }

    /// Positional token `index`.
    ///
    /// # Errors
    /// `ParseError::Truncated` when the line is too short; the interpreter
    /// treats this as "skip the statement".
    pub fn arg(&self, index: usize) -> Result<&str, ParseError> {
        self.get(index).ok_or(ParseError::Truncated { prefix: self.prefix, index })
    }

    /// Positional token `index`; an empty quoted token (`""`) counts as absent.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str).filter(|t| !t.is_empty())
    }

    /// Index of the first token exactly equal to `flag`.
    #[must_use]
    pub fn position(&self, flag: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t == flag)
    }

    /// The token following `flag`, if both are present and non-empty.
    #[must_use]
    pub fn flag(&self, flag: &str) -> Option<&str> {
        self.position(flag).and_then(|i| self.get(i + 1))
    }

    /// Whether the raw line mentions `needle` anywhere.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.line.contains(needle)
    }
}

/// Dispatches lines to statement handlers by longest literal prefix.
#[derive(Debug)]
pub struct LineInterpreter {
    tokenizer: Tokenizer,
    rules: Vec<&'static StatementRule>,
}

impl LineInterpreter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(RULES)
    }

    #[must_use]
    pub fn with_rules(rules: &'static [StatementRule]) -> Self {
        let mut rules: Vec<&'static StatementRule> = rules.iter().collect();
        // Longest prefix first; ties keep table order
        rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self { tokenizer: Tokenizer::new(), rules }
    }

    /// The rule a line dispatches to, if any.
    #[must_use]
    pub fn rule_for(&self, line: &str) -> Option<&'static StatementRule> {
        self.rules.iter().copied().find(|r| line.starts_with(r.prefix))
    }

    /// Apply one configuration line to `graph`. Returns whether a rule matched.
    ///
    /// # Errors
    /// Only node-construction failures propagate; a truncated statement is
    /// logged and skipped.
    pub fn interpret(&self, line: &str, graph: &mut ConfigGraph) -> Result<bool, ParseError> {
        let Some(rule) = self.rule_for(line) else {
            return Ok(false);
        };
        let stmt = Statement::new(line, rule.prefix, self.tokenizer.tokenize(line));
        match (rule.handler)(&stmt, graph) {
            Ok(()) => Ok(true),
            Err(e) if e.is_recoverable() => {
                debug!(line, error = %e, "skipping statement");
                Ok(true)
            }
            Err(e) => {
                error!(line, error = %e, "invalid statement");
                Err(e)
            }
        }
    }
}

impl Default for LineInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Feeds a configuration stream through the `LineInterpreter`.
#[derive(Debug, Default)]
pub struct ConfigParser {
    interpreter: LineInterpreter,
}

impl ConfigParser {
    #[must_use]
    pub fn new() -> Self {
        Self { interpreter: LineInterpreter::new() }
    }

    /// Ingest the file at `path`. A file that cannot be opened is logged and
    /// ingests nothing; the graph still receives the `Global` node.
    ///
    /// # Errors
    /// Propagates fatal node-construction errors from the interpreter.
    pub fn parse_file(&self, path: &Path, graph: &mut ConfigGraph) -> Result<usize, ParseError> {
        match File::open(path) {
            Ok(file) => self.parse_reader(BufReader::new(file), graph),
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot open input file");
                graph.add_global()?;
                Ok(0)
            }
        }
    }

    /// Ingest every line of `reader`. Returns the number of lines that
    /// matched a statement.
    ///
    /// # Errors
    /// Propagates fatal node-construction errors from the interpreter.
    pub fn parse_reader<R: BufRead>(
        &self,
        reader: R,
        graph: &mut ConfigGraph,
    ) -> Result<usize, ParseError> {
        graph.add_global()?;
        let mut matched = 0usize;
        for (number, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!(line = number + 1, error = %e, "stopping ingestion at unreadable line");
                    break;
                }
            };
            if self.interpreter.interpret(&line, graph)? {
                matched += 1;
            }
        }
        info!(matched, nodes = graph.nodes.len(), edges = graph.edges.len(), "ingestion complete");
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_quoted_and_bare() {
        let t = Tokenizer::new();
        let toks = t.tokenize(r#"add lb vserver "my vs" HTTP 10.0.0.1 80 -comment "a \"b\"""#);
        assert_eq!(toks, vec!["add", "lb", "vserver", "my vs", "HTTP", "10.0.0.1", "80", "-comment", r#"a \"b\""#]);
    }

    #[test]
    fn test_tokenize_empty_and_whitespace() {
        let t = Tokenizer::new();
        assert!(t.tokenize("").is_empty());
        assert!(t.tokenize("   \t ").is_empty());
        assert_eq!(t.tokenize(r#"x """#), vec!["x", ""]);
    }

    #[test]
    fn test_statement_flag_lookup() {
        let t = Tokenizer::new();
        let line = "bind vpn vserver vpn1 -policy pol1 -priority 100";
        let st = Statement::new(line, "bind vpn vserver ", t.tokenize(line));
        assert_eq!(st.flag("-policy"), Some("pol1"));
        assert_eq!(st.flag("-portaltheme"), None);
        assert_eq!(st.arg(3).unwrap(), "vpn1");
        assert!(st.arg(42).unwrap_err().is_recoverable());
    }

    #[test]
    fn test_dangling_flag_has_no_value() {
        let t = Tokenizer::new();
        let line = "bind vpn vserver vpn1 -policy";
        let st = Statement::new(line, "bind vpn vserver ", t.tokenize(line));
        assert_eq!(st.position("-policy"), Some(4));
        assert_eq!(st.flag("-policy"), None);
    }

    #[test]
    fn test_empty_quoted_token_is_absent() {
        let t = Tokenizer::new();
        let line = r#"add vpn sessionAction "" -wihome "" -ntDomain x"#;
        let st = Statement::new(line, "add vpn sessionAction ", t.tokenize(line));
        assert_eq!(st.flag("-wihome"), None);
        assert_eq!(st.flag("-ntDomain"), Some("x"));
        assert!(st.arg(3).unwrap_err().is_recoverable());
    }

    #[test]
    fn test_longest_prefix_wins() {
        let li = LineInterpreter::new();
        assert_eq!(li.rule_for("add serviceGroup sg1 HTTP").map(|r| r.prefix), Some("add serviceGroup "));
        assert_eq!(li.rule_for("add service svc1 srv1 HTTP 80").map(|r| r.prefix), Some("add service "));
        assert_eq!(
            li.rule_for("bind responder cs vserver cs1 -policyName p").map(|r| r.prefix),
            Some("bind responder cs vserver ")
        );
        assert!(li.rule_for("set system parameter -x 1").is_none());
    }

    #[test]
    fn test_unmatched_and_truncated_lines_are_noops() {
        let li = LineInterpreter::new();
        let mut g = ConfigGraph::default();
        assert!(!li.interpret("set audit syslogParams -x", &mut g).unwrap());
        assert!(li.interpret("add server ", &mut g).unwrap());
        assert!(g.nodes.is_empty());
        assert!(g.edges.is_empty());
    }

    #[test]
    fn test_parse_reader_seeds_global() {
        let input = "add server srv1 10.1.1.1\n# comment\n";
        let mut g = ConfigGraph::default();
        let matched = ConfigParser::new().parse_reader(input.as_bytes(), &mut g).unwrap();
        assert_eq!(matched, 1);
        assert_eq!(g.nodes[0].label, "Global | 0.0.0.0");
        assert_eq!(g.nodes[1].label, "srv1 | 10.1.1.1");
    }

    #[test]
    fn test_missing_file_ingests_nothing() {
        let mut g = ConfigGraph::default();
        let matched = ConfigParser::new()
            .parse_file(Path::new("/definitely/not/here/ns.conf"), &mut g)
            .unwrap();
        assert_eq!(matched, 0);
        assert_eq!(g.nodes.len(), 1);
    }
}
