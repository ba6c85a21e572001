use async_trait::async_trait;
use std::error::Error;
use tracing::info;

use lodgia_domain::events::{NotificationSink, ReservationConfirmed};

/// Delivery sink that records confirmations in the log stream. Mail and
/// document generation hang off this seam in deployment; admission only
/// requires that delivery is best effort and never blocks the commit.
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(
        &self,
        event: ReservationConfirmed,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        info!(
            reference = %event.reference_no,
            user = %event.user_id,
            room = %event.room_id,
            "reservation confirmation queued for delivery"
        );
        Ok(())
    }
}
