//! API endpoint handlers.
//!
//! Listing handlers read the local record store; the timeline goes through
//! the configured record source and the reconciliation engine.

pub mod health;
pub mod records;
pub mod timeline;
