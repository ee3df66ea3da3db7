use skyfare_core::{Flight, Itinerary};
use sqlx::PgConnection;

pub struct FlightRepository;

#[derive(Debug, sqlx::FromRow)]
struct FlightRow {
    fid: i32,
    day_of_month: i32,
    carrier_id: String,
    flight_num: String,
    origin_city: String,
    dest_city: String,
    duration: i32,
    capacity: i32,
    price: i32,
}

impl From<FlightRow> for Flight {
    fn from(row: FlightRow) -> Self {
        Flight {
            fid: row.fid,
            day_of_month: row.day_of_month,
            carrier_id: row.carrier_id,
            flight_num: row.flight_num,
            origin_city: row.origin_city,
            dest_city: row.dest_city,
            duration: row.duration,
            capacity: row.capacity,
            price: row.price,
        }
    }
}

/// One two-leg candidate: both flights flattened into a single row.
#[derive(Debug, sqlx::FromRow)]
struct ConnectingRow {
    f1_fid: i32,
    f1_day_of_month: i32,
    f1_carrier_id: String,
    f1_flight_num: String,
    f1_origin_city: String,
    f1_dest_city: String,
    f1_duration: i32,
    f1_capacity: i32,
    f1_price: i32,
    f2_fid: i32,
    f2_day_of_month: i32,
    f2_carrier_id: String,
    f2_flight_num: String,
    f2_origin_city: String,
    f2_dest_city: String,
    f2_duration: i32,
    f2_capacity: i32,
    f2_price: i32,
}

impl From<ConnectingRow> for Itinerary {
    fn from(row: ConnectingRow) -> Self {
        Itinerary::connecting(
            Flight {
                fid: row.f1_fid,
                day_of_month: row.f1_day_of_month,
                carrier_id: row.f1_carrier_id,
                flight_num: row.f1_flight_num,
                origin_city: row.f1_origin_city,
                dest_city: row.f1_dest_city,
                duration: row.f1_duration,
                capacity: row.f1_capacity,
                price: row.f1_price,
            },
            Flight {
                fid: row.f2_fid,
                day_of_month: row.f2_day_of_month,
                carrier_id: row.f2_carrier_id,
                flight_num: row.f2_flight_num,
                origin_city: row.f2_origin_city,
                dest_city: row.f2_dest_city,
                duration: row.f2_duration,
                capacity: row.f2_capacity,
                price: row.f2_price,
            },
        )
    }
}

impl FlightRepository {
    /// Direct candidates for a route and day, shortest first, fid breaking
    /// ties. Canceled flights never match.
    pub async fn search_direct(
        conn: &mut PgConnection,
        origin_city: &str,
        dest_city: &str,
        day_of_month: i32,
        limit: i64,
    ) -> Result<Vec<Itinerary>, sqlx::Error> {
        let rows: Vec<FlightRow> = sqlx::query_as(
            r#"
            SELECT fid, day_of_month, carrier_id, flight_num, origin_city, dest_city,
                   duration, capacity, price
            FROM flights
            WHERE origin_city = $1
              AND dest_city = $2
              AND day_of_month = $3
              AND canceled = 0
            ORDER BY duration, fid
            LIMIT $4
            "#,
        )
        .bind(origin_city)
        .bind(dest_city)
        .bind(day_of_month)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Itinerary::direct(Flight::from(row)))
            .collect())
    }

    /// Two-leg candidates: first leg out of the origin, second leg into the
    /// destination, connecting at a shared city on the same day. Ordered by
    /// combined duration, then first fid, then second fid.
    pub async fn search_connecting(
        conn: &mut PgConnection,
        origin_city: &str,
        dest_city: &str,
        day_of_month: i32,
        limit: i64,
    ) -> Result<Vec<Itinerary>, sqlx::Error> {
        let rows: Vec<ConnectingRow> = sqlx::query_as(
            r#"
            SELECT f1.fid          AS f1_fid,
                   f1.day_of_month AS f1_day_of_month,
                   f1.carrier_id   AS f1_carrier_id,
                   f1.flight_num   AS f1_flight_num,
                   f1.origin_city  AS f1_origin_city,
                   f1.dest_city    AS f1_dest_city,
                   f1.duration     AS f1_duration,
                   f1.capacity     AS f1_capacity,
                   f1.price        AS f1_price,
                   f2.fid          AS f2_fid,
                   f2.day_of_month AS f2_day_of_month,
                   f2.carrier_id   AS f2_carrier_id,
                   f2.flight_num   AS f2_flight_num,
                   f2.origin_city  AS f2_origin_city,
                   f2.dest_city    AS f2_dest_city,
                   f2.duration     AS f2_duration,
                   f2.capacity     AS f2_capacity,
                   f2.price        AS f2_price
            FROM flights f1
            JOIN flights f2
              ON f1.dest_city = f2.origin_city
             AND f1.day_of_month = f2.day_of_month
            WHERE f1.origin_city = $1
              AND f2.dest_city = $2
              AND f1.day_of_month = $3
              AND f1.canceled = 0
              AND f2.canceled = 0
            ORDER BY f1.duration + f2.duration, f1.fid, f2.fid
            LIMIT $4
            "#,
        )
        .bind(origin_city)
        .bind(dest_city)
        .bind(day_of_month)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(Itinerary::from).collect())
    }

    pub async fn capacity(conn: &mut PgConnection, fid: i32) -> Result<i32, sqlx::Error> {
        let row: (i32,) = sqlx::query_as("SELECT capacity FROM flights WHERE fid = $1")
            .bind(fid)
            .fetch_one(&mut *conn)
            .await?;

        Ok(row.0)
    }
}
