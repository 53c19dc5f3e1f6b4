//! Signal generators over stored positioning history.
//!
//! Generators are pure: they take a history window and return candidate
//! alerts. Persistence and deduplication live in [`crate::engine`].

mod positioning;

pub use positioning::{CandidateAlert, PositioningSignal};
