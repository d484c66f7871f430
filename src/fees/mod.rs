//! Fee Estimation Module
//!
//! Gas-price based fee tiers for value transfers, cached per engine.

mod estimator;

pub use estimator::*;
