//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared HTTP plumbing for the BFF:
//! - Refresh cookie construction, parsing and mirroring
//! - Header filtering and URL joining for request forwarding

pub mod cookie;
pub mod forward;
