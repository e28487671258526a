//! CLI command implementations.

pub(crate) mod run;
pub(crate) mod timer;
