//! Intent classification, routing, and the four assistant workflows.
//!
//! The pipeline per user turn:
//!
//! ```text
//! user text → classify → route → one workflow
//!           → (optional store read/write) → gateway → response text
//! ```
//!
//! Workflows are free functions taking their dependencies explicitly;
//! [`Assistant`] wires them to a gateway and store and owns the
//! user-facing error mapping.

pub mod assistant;
pub mod general;
pub mod log;
pub mod prompts;
pub mod query;
pub mod recovery;
pub mod report;

pub use assistant::{Assistant, TurnOutcome};

/// Onboarding nudge returned by QUERY and REPORT when the user has no
/// records yet. No gateway call is made in that case.
pub(crate) const NO_DATA_GUIDANCE: &str = "⚠️ No activity logged yet. Log something first, \
     for example: \"I sold 50 pounds of tomatoes for $75\".";
