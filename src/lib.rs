//! Heart Match (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so integration tests and
//! downstream users can write `heart_match::{core,adapter,types}`.

pub use heart_match_adapter as adapter;
pub use heart_match_core as core;
pub use heart_match_types as types;
