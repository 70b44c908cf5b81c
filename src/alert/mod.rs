//! Regulatory exceedance checking and status classification.

pub mod exceedance;
pub mod rules;
pub mod status;
