//! Shared domain types and errors for the Artellico backend.

pub mod error;
pub mod types;
