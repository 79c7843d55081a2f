//! Outbound message dispatch over the gateway seam.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::interfaces::{GameStore, MessageSender};

use super::{Result, ServiceError};

/// Counts from flushing the pending message queue.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FlushSummary {
    pub sent: i64,
    pub failed: i64,
}

/// Delivery of coach messages and ad-hoc texts.
pub struct DispatchService {
    store: Arc<dyn GameStore>,
    sender: Arc<dyn MessageSender>,
}

impl DispatchService {
    pub fn new(store: Arc<dyn GameStore>, sender: Arc<dyn MessageSender>) -> Self {
        Self { store, sender }
    }

    /// Send one message straight to a salesperson's phone.
    pub async fn send_to(&self, salesperson_id: i64, message: &str) -> Result<()> {
        let sp = self.store.salesperson(salesperson_id).await?;
        self.sender
            .send_text(&sp.phone, message)
            .await
            .map_err(ServiceError::Delivery)?;

        info!(salesperson = salesperson_id, "direct message delivered");
        Ok(())
    }

    /// Deliver every pending coach message. Failures are counted and left
    /// pending for the next flush; they never abort the batch.
    pub async fn flush_pending(&self) -> Result<FlushSummary> {
        let pending = self.store.pending_messages().await?;
        let mut summary = FlushSummary::default();

        for message in pending {
            let sp = match self.store.salesperson(message.salesperson_id).await {
                Ok(sp) => sp,
                Err(err) => {
                    warn!(
                        message_id = message.id,
                        salesperson = message.salesperson_id,
                        error = %err,
                        "skipping message without a deliverable salesperson"
                    );
                    summary.failed += 1;
                    continue;
                }
            };

            match self.sender.send_text(&sp.phone, &message.body).await {
                Ok(()) => {
                    self.store.mark_message_sent(message.id).await?;
                    summary.sent += 1;
                }
                Err(err) => {
                    warn!(
                        message_id = message.id,
                        salesperson = message.salesperson_id,
                        error = %err,
                        "message delivery failed"
                    );
                    summary.failed += 1;
                }
            }
        }

        info!(sent = summary.sent, failed = summary.failed, "pending messages flushed");
        Ok(summary)
    }
}
