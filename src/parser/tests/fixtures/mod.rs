// Go sources shared by parser, analyzer and scanner tests.
//
// The integration tests under tests/ pull these in with include!, so the
// fixture files hold nothing but constants.

pub mod provider_packages;
pub mod sdk_packages;

pub use provider_packages::*;
pub use sdk_packages::*;
