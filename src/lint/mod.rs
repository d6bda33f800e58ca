pub mod call_site;
pub mod classifier;
pub mod finding;
pub mod heuristics;
pub mod inventory;
pub mod pandora;
pub mod rules;
pub mod scanner;
pub mod track1;

use thiserror::Error;

use crate::analyzer::LoadError;

pub use call_site::{CallShapes, CallSite};
pub use classifier::Classifier;
pub use finding::{Confidence, Finding, Position, RuleKind};
pub use heuristics::FalsePositivePolicy;
pub use inventory::{is_publicly_visible, InventoryCache, MethodInventory};
pub use pandora::PandoraRule;
pub use rules::LroRule;
pub use scanner::Scanner;
pub use track1::Track1Rule;

#[derive(Error, Debug, Clone)]
pub enum ScanError {
    #[error("failed to load package {package} for its method inventory: {source}")]
    InventoryLoad { package: String, source: LoadError },

    #[error("failed to build scan thread pool: {0}")]
    ThreadPool(String),
}
