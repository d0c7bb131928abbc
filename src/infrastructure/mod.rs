//! Infrastructure layer - store implementations and services

pub mod exact;
pub mod logging;
pub mod remote;
pub mod semantic_index;
pub mod services;
pub mod tiers;
