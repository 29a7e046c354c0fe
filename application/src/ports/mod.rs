//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that provider and presentation adapters must
//! implement.

pub mod ai_provider;
pub mod progress;
