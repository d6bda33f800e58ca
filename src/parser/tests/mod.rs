// Parser regression tests against trimmed copies of real SDK and provider code

pub mod fixtures;
