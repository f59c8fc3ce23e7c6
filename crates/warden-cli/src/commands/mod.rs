//! Subcommand implementations.

pub(crate) mod ls;
pub(crate) mod serve;
