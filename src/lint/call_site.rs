use crate::analyzer::types::{ReceiverType, Signature};
use crate::config::PandoraConfig;
use crate::lint::finding::Position;

/// A resolved call through a selector, together with the assignment it sits in.
#[derive(Debug, Clone)]
pub struct CallSite {
    /// Import path of the package containing the call.
    pub package: String,
    /// Selected name, `Create` in `client.Create(ctx, id)`.
    pub selector: String,
    pub callee: Signature,
    /// Left-hand targets in order. `None` marks a target that is not a plain
    /// identifier (`resp.Future`, `x[i]`). Empty for a bare call statement.
    pub targets: Vec<Option<String>>,
    pub statement_pos: Position,
    pub selector_pos: Position,
}

impl CallSite {
    pub fn receiver(&self) -> Option<&ReceiverType> {
        self.callee.receiver.as_ref()
    }

    /// One entry per left-hand target; targets that are not identifiers are empty.
    pub fn target_labels(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.clone().unwrap_or_default()).collect()
    }
}

/// Surface shapes both rules look for, checked before any type resolution.
#[derive(Debug, Clone)]
pub struct CallShapes {
    pub sync_keywords: Vec<String>,
    pub async_suffix: String,
}

impl CallShapes {
    pub fn from_config(config: &PandoraConfig) -> Self {
        Self {
            sync_keywords: config.sync_keywords.clone(),
            async_suffix: config.async_suffix.clone(),
        }
    }

    /// `_, err := x.Call(...)`
    pub fn is_track1_shape(&self, targets: &[Option<String>]) -> bool {
        matches!(targets, [Some(first), _] if first == "_")
    }

    /// Selector names a synchronous mutation: it contains a keyword and lacks the suffix.
    pub fn is_pandora_shape(&self, selector: &str) -> bool {
        self.is_sync_name(selector) && !self.is_async_name(selector)
    }

    pub fn is_sync_name(&self, name: &str) -> bool {
        self.sync_keywords.iter().any(|keyword| name.contains(keyword.as_str()))
    }

    pub fn is_async_name(&self, name: &str) -> bool {
        name.ends_with(&self.async_suffix)
    }

    pub fn async_name(&self, sync_name: &str) -> String {
        format!("{}{}", sync_name, self.async_suffix)
    }
}

impl Default for CallShapes {
    fn default() -> Self {
        Self::from_config(&PandoraConfig::default())
    }
}
