use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use uuid::Uuid;

use crate::reservation::Reservation;

/// Emitted after a reservation commits. Downstream delivery (confirmation
/// mail, document generation) hangs off this event and is best effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationConfirmed {
    pub reservation_id: Uuid,
    pub reference_no: String,
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub price_cents: i32,
    pub confirmed_at: DateTime<Utc>,
}

impl From<&Reservation> for ReservationConfirmed {
    fn from(r: &Reservation) -> Self {
        Self {
            reservation_id: r.id,
            reference_no: r.reference_no.clone(),
            room_id: r.room_id,
            user_id: r.user_id,
            check_in: r.span.check_in,
            check_out: r.span.check_out,
            price_cents: r.price_cents,
            confirmed_at: Utc::now(),
        }
    }
}

/// Best-effort delivery seam. Failures are logged by the caller and
/// never roll back the committed reservation.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(
        &self,
        event: ReservationConfirmed,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
