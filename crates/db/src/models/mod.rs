//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - Safe `Serialize` projections for external-facing output

pub mod note;
pub mod session;
pub mod user;
