//! Rule engine and intake service for land registration applications.
//!
//! The [`registration`] module carries the engine itself: the static policy
//! table mapping registration types to document requirements and fee bases,
//! the requirement resolver, the fee calculator, parcel geometry capture,
//! payment field rendering, and submission validation. The surrounding
//! modules provide configuration, telemetry, and error plumbing for the
//! HTTP binary.

pub mod config;
pub mod error;
pub mod registration;
pub mod telemetry;
