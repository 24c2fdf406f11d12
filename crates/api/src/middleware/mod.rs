//! Request-gate middleware and authentication extractors.
//!
//! - [`gate::gate`] -- per-request session validation and route policy.
//! - [`auth::CurrentUser`] -- extracts the identity the gate attached.

pub mod auth;
pub mod gate;
