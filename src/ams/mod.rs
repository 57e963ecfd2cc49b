//! Adaptive Multi-stage Sampling (AMS).
//!
//! A non-tree recursive sampler: every level samples each legal move once,
//! spends its remaining budget on the move with the best upper confidence
//! bound, and reports the visit-weighted (EXIT) estimate to the level above.
//! Nothing is stored between levels except the values they return.

pub mod config;
pub mod sampler;
