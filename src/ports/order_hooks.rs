//! Order Hooks Port - Cancellation and Tracking Extension Points
//!
//! The quoting loop does not cancel orders and does not act on the
//! orders it creates. These traits are the seams where that behaviour
//! plugs in; the default implementations are inert.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::order::ActiveOrderRecord;
use crate::domain::vault::OrderId;

/// Capability to cancel a resting order.
#[async_trait]
pub trait OrderCanceller: Send + Sync + 'static {
  /// Cancel a single order by ID.
  async fn cancel_order(&self, order_id: &OrderId) -> anyhow::Result<()>;
}

/// Notified after a spread order is confirmed and decoded.
pub trait OrderObserver: Send + Sync + 'static {
  fn on_order_created(&self, record: &ActiveOrderRecord);
}

/// Canceller that performs no action.
#[derive(Debug, Default, Clone, Copy)]
pub struct InertOrderCanceller;

#[async_trait]
impl OrderCanceller for InertOrderCanceller {
  async fn cancel_order(&self, order_id: &OrderId) -> anyhow::Result<()> {
    debug!(order_id = %order_id, "Order cancellation not wired, ignoring");
    Ok(())
  }
}

/// Observer that ignores every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct InertOrderObserver;

impl OrderObserver for InertOrderObserver {
  fn on_order_created(&self, _record: &ActiveOrderRecord) {}
}
