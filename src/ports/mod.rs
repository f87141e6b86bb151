//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use-case layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `ChainGateway`: read-only ledger calls and transaction submission
//! - `OrderCanceller` / `OrderObserver`: order lifecycle extension points
//! - `Clock`: wall-clock time for expiry computation
//! - `QuoteTelemetry`: per-visit measurements for metrics export

pub mod chain_gateway;
pub mod clock;
pub mod order_hooks;
pub mod telemetry;
