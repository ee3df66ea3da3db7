use skyfare_core::Session;
use skyfare_store::retry::TxMode;
use skyfare_store::{ReservationRepository, UserRepository};

use crate::error::{Action, EngineError};
use crate::{render_failure, ReservationEngine};

impl ReservationEngine {
    /// Pays for one of the caller's unpaid reservations from their account
    /// balance. The funds check and the debit sit in the same transaction,
    /// so a concurrent payment cannot drive the balance negative.
    pub async fn pay(&self, session: &Session, reservation_id: i64) -> String {
        match self.pay_tx(session, reservation_id).await {
            Ok(remaining) => format!(
                "Paid reservation: {} remaining balance: {}\n",
                reservation_id, remaining
            ),
            Err(err) => render_failure(
                err,
                format!("Failed to pay for reservation {}\n", reservation_id),
            ),
        }
    }

    async fn pay_tx(&self, session: &Session, reservation_id: i64) -> Result<i64, EngineError> {
        let username = session
            .username()
            .ok_or(EngineError::NotLoggedIn(Action::Pay))?;

        self.transact(TxMode::ReadWrite, |conn| {
            let username = username.to_string();
            Box::pin(async move {
                let reservation =
                    ReservationRepository::find_unpaid(conn, reservation_id, &username)
                        .await?
                        .ok_or_else(|| EngineError::ReservationNotFound {
                            id: reservation_id,
                            username: username.clone(),
                        })?;

                let balance = UserRepository::balance(conn, &username).await?;
                let cost = reservation.total_price;
                if balance < cost {
                    return Err(EngineError::InsufficientFunds { balance, cost });
                }

                ReservationRepository::mark_paid(conn, reservation_id).await?;
                UserRepository::adjust_balance(conn, &username, -cost).await?;

                Ok(balance - cost)
            })
        })
        .await
    }

    /// Cancels one of the caller's reservations: refunds it when paid,
    /// releases its seats, and deletes the row. The id is spent for good;
    /// the counter never rewinds.
    pub async fn cancel(&self, session: &Session, reservation_id: i64) -> String {
        match self.cancel_tx(session, reservation_id).await {
            Ok(()) => format!("Canceled reservation {}\n", reservation_id),
            Err(err) => render_failure(
                err,
                format!("Failed to cancel reservation {}\n", reservation_id),
            ),
        }
    }

    async fn cancel_tx(&self, session: &Session, reservation_id: i64) -> Result<(), EngineError> {
        let username = session
            .username()
            .ok_or(EngineError::NotLoggedIn(Action::Cancel))?;

        self.transact(TxMode::ReadWrite, |conn| {
            let username = username.to_string();
            Box::pin(async move {
                let reservation = ReservationRepository::find(conn, reservation_id, &username)
                    .await?
                    .ok_or(EngineError::CancellationFailed(reservation_id))?;

                if reservation.paid {
                    UserRepository::adjust_balance(conn, &username, reservation.total_price)
                        .await?;
                }

                for fid in reservation.flight_ids() {
                    ReservationRepository::release_booked_leg(conn, fid).await?;
                }

                ReservationRepository::delete(conn, reservation_id).await?;
                Ok(())
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::offline_engine;
    use skyfare_core::Session;

    #[tokio::test]
    async fn test_pay_requires_login() {
        let engine = offline_engine();
        let session = Session::new();
        let reply = engine.pay(&session, 1).await;
        assert_eq!(reply, "Cannot pay, not logged in\n");
    }

    #[tokio::test]
    async fn test_cancel_requires_login() {
        let engine = offline_engine();
        let session = Session::new();
        let reply = engine.cancel(&session, 1).await;
        assert_eq!(reply, "Cannot cancel reservations, not logged in\n");
    }

    #[tokio::test]
    async fn test_pay_against_dead_store_reports_the_reservation() {
        let engine = offline_engine();
        let mut session = Session::new();
        session.log_in("alice");

        let reply = engine.pay(&session, 9).await;
        assert_eq!(reply, "Failed to pay for reservation 9\n");
    }

    #[tokio::test]
    async fn test_cancel_against_dead_store_reports_the_reservation() {
        let engine = offline_engine();
        let mut session = Session::new();
        session.log_in("alice");

        let reply = engine.cancel(&session, 3).await;
        assert_eq!(reply, "Failed to cancel reservation 3\n");
    }
}
