pub mod loader;
pub mod package;
pub mod program;
pub mod scope;
pub mod types;

pub use loader::{GoPackageLoader, LoadError, PackageSource};
pub use package::Package;
pub use program::ProgramModel;
pub use scope::FunctionScope;
pub use types::{NamedType, ReceiverType, ResolvedField, Signature, TypeRef};
