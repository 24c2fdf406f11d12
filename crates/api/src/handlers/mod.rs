//! HTTP handlers, grouped by resource.

pub mod account;
pub mod auth;
pub mod notes;
pub mod pages;
