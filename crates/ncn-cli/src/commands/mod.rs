//! Subcommand implementations. Each returns a serializable report that
//! `main` prints as JSON.

pub mod simulate;
pub mod tree;
pub mod verify;
