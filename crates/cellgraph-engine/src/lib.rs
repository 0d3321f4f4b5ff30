//! cellgraph_engine - Addresses, values and the constrained formula evaluator.

pub mod engine;
