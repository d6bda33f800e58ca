use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::parser::symbols::Span;

/// Source position printed as `file:line:column`, 1-based.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(file: impl Into<PathBuf>, span: Span) -> Self {
        Self {
            file: file.into(),
            line: span.line,
            column: span.column,
        }
    }

    /// Strips `root` from the file path; paths outside `root` are left alone.
    pub fn relative_to(&self, root: &Path) -> Position {
        let file = self
            .file
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| self.file.clone());
        Position { file, ..self.clone() }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    Track1,
    PandoraMismatch,
}

impl RuleKind {
    /// Prefix used in text output.
    pub fn label(&self) -> &'static str {
        match self {
            RuleKind::Track1 => "Track 1 Hit",
            RuleKind::PandoraMismatch => "Pandora Hit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Confidence {
    #[default]
    Definite,
    LikelyFalsePositive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub rule: RuleKind,
    pub position: Position,
    pub confidence: Confidence,
    /// Fully qualified callee, e.g. `example.com/sdk/virtualnetworks.VirtualNetworksClient.Delete`.
    pub callee: String,
    /// Names bound by the enclosing assignment, for the confidence heuristic.
    #[serde(skip)]
    pub targets: Vec<String>,
}

impl Finding {
    pub fn new(rule: RuleKind, position: Position, callee: impl Into<String>) -> Self {
        Self {
            rule,
            position,
            confidence: Confidence::Definite,
            callee: callee.into(),
            targets: Vec::new(),
        }
    }

    pub fn with_targets(mut self, targets: Vec<String>) -> Self {
        self.targets = targets;
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule.label(), self.position)?;
        if self.confidence == Confidence::LikelyFalsePositive {
            write!(f, " (likely false positive)")?;
        }
        Ok(())
    }
}
