//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the quoter's workflow.
//!
//! Use cases:
//! - `VaultBalanceReader`: Read-only balance sampling per vault
//! - `SpreadOrderBuilder`: Proof + spread order transaction assembly
//! - `QuoteScheduler`: Round-robin quoting loop with error backoff

pub mod balance_reader;
pub mod quote_scheduler;
pub mod spread_order_builder;

pub use balance_reader::VaultBalanceReader;
pub use quote_scheduler::{QuoteScheduler, SchedulerState, StepOutcome, StepReport};
pub use spread_order_builder::SpreadOrderBuilder;
