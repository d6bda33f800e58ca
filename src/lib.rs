pub mod analyzer;
pub mod config;
pub mod lint;
pub mod parser;
pub mod workspace;

pub use analyzer::{GoPackageLoader, LoadError, Package, PackageSource, ProgramModel};
pub use config::Config;
pub use lint::{Finding, Scanner, ScanError};
pub use parser::GoParser;
pub use workspace::{GoModule, GoWorkspace};

#[cfg(test)]
mod tests;
