//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies. Each sub-module groups adapters by
//! infrastructure concern.
//!
//! Adapter categories:
//! - `chain`: Sui full node access, signing and BCS encoding
//! - `metrics`: Prometheus metrics export and health checks

pub mod chain;
pub mod metrics;
