//! Trip itinerary date engine.
//!
//! Computes, validates and propagates the start/end dates of an ordered
//! list of stops as stops are inserted, edited, shifted, reordered or
//! removed. Storage, transport and rendering belong to the caller.

pub mod clock;
pub mod domain;
pub mod engine;
pub mod snapshot;
