//! Thread management for the grid engine.
//!
//! - `MapperWorker`: single writer thread draining batches and loop-closure
//!   signals in order, with concurrent read access for grid queries

mod worker;

pub use worker::{MapperWorker, SharedMapper};
