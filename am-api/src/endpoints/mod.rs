//! API endpoint modules, one per AppMetrica API family.
//!
//! Each module provides a typed client for a group of related endpoints.

pub mod export;
pub mod push;
pub mod stat;
