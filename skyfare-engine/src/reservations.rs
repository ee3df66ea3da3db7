use skyfare_core::{Reservation, Session};
use skyfare_store::retry::TxMode;
use skyfare_store::ReservationRepository;

use crate::error::{Action, EngineError};
use crate::{render_failure, ReservationEngine};

impl ReservationEngine {
    /// Lists the caller's reservations in id order, each replaying the
    /// itinerary text captured when it was booked.
    pub async fn reservations(&self, session: &Session) -> String {
        match self.reservations_tx(session).await {
            Ok(rows) => render_reservations(&rows),
            Err(err) => render_failure(err, "Failed to retrieve reservations\n".to_string()),
        }
    }

    async fn reservations_tx(&self, session: &Session) -> Result<Vec<Reservation>, EngineError> {
        let username = session
            .username()
            .ok_or(EngineError::NotLoggedIn(Action::ViewReservations))?;

        let rows = self
            .transact(TxMode::ReadOnly, |conn| {
                let username = username.to_string();
                Box::pin(
                    async move { Ok(ReservationRepository::list_for_user(conn, &username).await?) },
                )
            })
            .await?;

        if rows.is_empty() {
            return Err(EngineError::NoReservationsFound);
        }
        Ok(rows)
    }
}

fn render_reservations(rows: &[Reservation]) -> String {
    let mut out = String::new();
    for reservation in rows {
        out.push_str(&format!(
            "Reservation {} paid: {}:\n",
            reservation.id, reservation.paid
        ));
        out.push_str(&reservation.itinerary);
    }
    out
}
