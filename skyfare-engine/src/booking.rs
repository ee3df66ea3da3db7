use skyfare_core::Session;
use skyfare_store::retry::TxMode;
use skyfare_store::{FlightRepository, ReservationRepository};

use crate::error::{Action, EngineError};
use crate::{render_failure, ReservationEngine};

impl ReservationEngine {
    /// Books an itinerary from the session's current search by index. The
    /// reservation starts unpaid; its id comes from the monotonic counter
    /// and is never reused, even after cancellation.
    pub async fn book(&self, session: &Session, itinerary_index: usize) -> String {
        match self.book_tx(session, itinerary_index).await {
            Ok(reservation_id) => {
                format!("Booked flight(s), reservation ID: {}\n", reservation_id)
            }
            Err(err) => render_failure(err, "Booking failed\n".to_string()),
        }
    }

    async fn book_tx(
        &self,
        session: &Session,
        itinerary_index: usize,
    ) -> Result<i64, EngineError> {
        let username = session
            .username()
            .ok_or(EngineError::NotLoggedIn(Action::Book))?;
        let itinerary = session
            .itinerary(itinerary_index)
            .ok_or(EngineError::UnknownItinerary(itinerary_index))?;

        let date = itinerary.date();
        let fid1 = itinerary.fid1();
        let fid2 = itinerary.fid2();
        let total_price = itinerary.total_price();
        let leg_text = itinerary.leg_text();

        self.transact(TxMode::ReadWrite, |conn| {
            let username = username.to_string();
            let leg_text = leg_text.clone();
            Box::pin(async move {
                if ReservationRepository::has_booking_on_day(conn, &username, date).await? {
                    return Err(EngineError::SameDayConflict);
                }

                let booked = ReservationRepository::booked_count(conn, fid1).await?;
                if booked >= FlightRepository::capacity(conn, fid1).await? {
                    return Err(EngineError::CapacityExceeded);
                }
                if let Some(second) = fid2 {
                    let booked = ReservationRepository::booked_count(conn, second).await?;
                    if booked >= FlightRepository::capacity(conn, second).await? {
                        return Err(EngineError::CapacityExceeded);
                    }
                }

                let reservation_id = ReservationRepository::next_reservation_id(conn).await?;
                ReservationRepository::insert(
                    conn,
                    reservation_id,
                    &leg_text,
                    date,
                    fid1,
                    fid2,
                    total_price,
                    &username,
                )
                .await?;
                ReservationRepository::advance_reservation_id(conn, reservation_id + 1).await?;

                ReservationRepository::record_booked_leg(conn, fid1).await?;
                if let Some(second) = fid2 {
                    ReservationRepository::record_booked_leg(conn, second).await?;
                }

                Ok(reservation_id)
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::offline_engine;
    use skyfare_core::{Flight, Itinerary, Session};

    fn cached_itinerary() -> Itinerary {
        Itinerary::direct(Flight {
            fid: 42,
            day_of_month: 17,
            carrier_id: "WN".to_string(),
            flight_num: "88".to_string(),
            origin_city: "Portland OR".to_string(),
            dest_city: "Oakland CA".to_string(),
            duration: 95,
            capacity: 8,
            price: 65,
        })
    }

    #[tokio::test]
    async fn test_booking_requires_login() {
        let engine = offline_engine();
        let session = Session::new();
        let reply = engine.book(&session, 0).await;
        assert_eq!(reply, "Cannot book reservations, not logged in\n");
    }

    #[tokio::test]
    async fn test_booking_unknown_index_is_refused() {
        let engine = offline_engine();
        let mut session = Session::new();
        session.log_in("alice");

        // Nothing searched yet, so every index is out of range.
        let reply = engine.book(&session, 5).await;
        assert_eq!(reply, "No such itinerary 5\n");
    }

    #[tokio::test]
    async fn test_booking_against_dead_store_fails_generically() {
        let engine = offline_engine();
        let mut session = Session::new();
        session.log_in("alice");
        session.set_itineraries(vec![cached_itinerary()]);

        let reply = engine.book(&session, 0).await;
        assert_eq!(reply, "Booking failed\n");
    }
}
