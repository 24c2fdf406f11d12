//! Authentication building blocks.
//!
//! - [`password`] -- scrypt credential hashing and verification.
//! - [`token`] -- session token generation and fingerprinting.
//! - [`service`] -- user registration, login, logout, and account lifecycle.

pub mod password;
pub mod service;
pub mod token;
