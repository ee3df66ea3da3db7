use chrono::{DateTime, Utc};
use skyfare_core::Reservation;
use sqlx::PgConnection;

/// No second leg, as stored. Kept off every Rust surface; the row mapping
/// translates to and from `Option<i32>`.
const NO_SECOND_LEG: i32 = -1;

pub struct ReservationRepository;

#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    id: i64,
    itinerary: String,
    date: i32,
    fid1: i32,
    fid2: i32,
    total_price: i64,
    paid: bool,
    username: String,
    created_at: DateTime<Utc>,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Reservation {
            id: row.id,
            itinerary: row.itinerary,
            date: row.date,
            fid1: row.fid1,
            fid2: if row.fid2 == NO_SECOND_LEG {
                None
            } else {
                Some(row.fid2)
            },
            total_price: row.total_price,
            paid: row.paid,
            username: row.username,
            created_at: row.created_at,
        }
    }
}

impl ReservationRepository {
    /// Whether the user already holds any reservation, paid or not,
    /// departing on the given day of month.
    pub async fn has_booking_on_day(
        conn: &mut PgConnection,
        username: &str,
        day_of_month: i32,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM reservations WHERE username = $1 AND date = $2)",
        )
        .bind(username)
        .bind(day_of_month)
        .fetch_one(&mut *conn)
        .await?;

        Ok(row.0)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        conn: &mut PgConnection,
        id: i64,
        itinerary: &str,
        date: i32,
        fid1: i32,
        fid2: Option<i32>,
        total_price: i64,
        username: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO reservations (id, itinerary, date, fid1, fid2, total_price, paid, username)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7)
            "#,
        )
        .bind(id)
        .bind(itinerary)
        .bind(date)
        .bind(fid1)
        .bind(fid2.unwrap_or(NO_SECOND_LEG))
        .bind(total_price)
        .bind(username)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn find_unpaid(
        conn: &mut PgConnection,
        id: i64,
        username: &str,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let row: Option<ReservationRow> = sqlx::query_as(
            r#"
            SELECT id, itinerary, date, fid1, fid2, total_price, paid, username, created_at
            FROM reservations
            WHERE id = $1 AND username = $2 AND paid = FALSE
            "#,
        )
        .bind(id)
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(Reservation::from))
    }

    pub async fn find(
        conn: &mut PgConnection,
        id: i64,
        username: &str,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let row: Option<ReservationRow> = sqlx::query_as(
            r#"
            SELECT id, itinerary, date, fid1, fid2, total_price, paid, username, created_at
            FROM reservations
            WHERE id = $1 AND username = $2
            "#,
        )
        .bind(id)
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(Reservation::from))
    }

    pub async fn mark_paid(conn: &mut PgConnection, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE reservations SET paid = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    pub async fn list_for_user(
        conn: &mut PgConnection,
        username: &str,
    ) -> Result<Vec<Reservation>, sqlx::Error> {
        let rows: Vec<ReservationRow> = sqlx::query_as(
            r#"
            SELECT id, itinerary, date, fid1, fid2, total_price, paid, username, created_at
            FROM reservations
            WHERE username = $1
            ORDER BY id
            "#,
        )
        .bind(username)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(Reservation::from).collect())
    }

    /// Seats taken on a flight. A flight nobody ever booked has no row,
    /// which reads as zero.
    pub async fn booked_count(conn: &mut PgConnection, fid: i32) -> Result<i32, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT booked FROM booked_counts WHERE fid = $1")
            .bind(fid)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.map_or(0, |r| r.0))
    }

    pub async fn record_booked_leg(conn: &mut PgConnection, fid: i32) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO booked_counts (fid, booked)
            VALUES ($1, 1)
            ON CONFLICT (fid) DO UPDATE SET booked = booked_counts.booked + 1
            "#,
        )
        .bind(fid)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Returns a seat taken by a canceled reservation. Only called for legs
    /// that were recorded at booking time, so the row exists.
    pub async fn release_booked_leg(conn: &mut PgConnection, fid: i32) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE booked_counts SET booked = booked - 1 WHERE fid = $1")
            .bind(fid)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Next reservation id to hand out. The counter row is created lazily by
    /// the first booking, which gets id 1.
    pub async fn next_reservation_id(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT next_id FROM id_counter")
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some((next_id,)) => Ok(next_id),
            None => {
                sqlx::query("INSERT INTO id_counter (next_id) VALUES (1)")
                    .execute(&mut *conn)
                    .await?;
                Ok(1)
            }
        }
    }

    pub async fn advance_reservation_id(
        conn: &mut PgConnection,
        next_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE id_counter SET next_id = $1")
            .bind(next_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
