//! Identity domain integration.
//!
//! This module provides:
//! - The `IdentityStore` seam the audit engine runs against
//! - A SCIM REST client implementing it for identity domains
//! - User and status-change models

pub mod client;
pub mod models;
pub mod store;

pub use client::{ClientOptions, IdentityDomainClient};
pub use models::{StatusChange, UserRecord};
pub use store::IdentityStore;
