//! Reconciliation engine: turns a snapshot of prescription records into
//! an enriched, recency-ordered view with anomaly flags.
//!
//! Stages: range filter → chronological sort → priority scoring and tiering
//! → cohort grouping by (patient, medication name) → conflict detection over
//! each cohort's active members. Every stage is a pure function; nothing here
//! fails or keeps state between runs.

mod chronology;
mod cohort;
mod conflict;
mod level;
mod pipeline;
mod priority;
mod range;
mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use chronology::*;
pub use cohort::*;
pub use conflict::*;
pub use level::*;
pub use pipeline::*;
pub use priority::*;
pub use range::*;
pub use types::*;

// ── Tests ──────────────────────────────────────────────────────────────────
