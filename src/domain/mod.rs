//! Domain layer - vaults, spread orders and transaction plans.
//!
//! Pure data types with no I/O (hexagonal architecture inner ring).

pub mod move_type;
pub mod order;
pub mod transaction;
pub mod vault;

pub use order::{ActiveOrderRecord, OrderType, SelfMatchingOption, SpreadOrderRequest};
pub use transaction::{CallInput, MoveCall, TransactionPlan, CLOCK_OBJECT_ID};
pub use vault::{BalanceSnapshot, MoveType, ObjectId, OrderId, Vault};
