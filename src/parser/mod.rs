pub mod go_parser;
pub mod symbols;
pub mod ast_utils;

pub use go_parser::GoParser;
pub use symbols::*;

#[cfg(test)]
pub(crate) mod tests;
