use skyfare_core::{rank, Itinerary, Session};
use skyfare_store::retry::TxMode;
use skyfare_store::FlightRepository;

use crate::error::EngineError;
use crate::{render_failure, ReservationEngine};

impl ReservationEngine {
    /// Searches one-way itineraries for a route and day of month: direct
    /// flights first, then two-leg combinations filling whatever is left of
    /// the quota, ranked together by total duration. The session's itinerary
    /// cache is replaced by the result; indices in the rendered output are
    /// the indices book() accepts. No login is required.
    pub async fn search(
        &self,
        session: &mut Session,
        origin_city: &str,
        dest_city: &str,
        direct_only: bool,
        day_of_month: i32,
        max_itineraries: usize,
    ) -> String {
        // Whatever happens next, indices from an older search must not
        // survive it.
        session.clear_itineraries();

        let found = self
            .search_tx(
                origin_city,
                dest_city,
                direct_only,
                day_of_month,
                max_itineraries,
            )
            .await;

        match found {
            Ok(itineraries) => {
                let rendered = render_itineraries(&itineraries);
                session.set_itineraries(itineraries);
                rendered
            }
            Err(err) => render_failure(err, "Failed to search\n".to_string()),
        }
    }

    async fn search_tx(
        &self,
        origin_city: &str,
        dest_city: &str,
        direct_only: bool,
        day_of_month: i32,
        max_itineraries: usize,
    ) -> Result<Vec<Itinerary>, EngineError> {
        let mut candidates = self
            .transact(TxMode::ReadOnly, |conn| {
                let origin = origin_city.to_string();
                let dest = dest_city.to_string();
                Box::pin(async move {
                    let mut found = FlightRepository::search_direct(
                        conn,
                        &origin,
                        &dest,
                        day_of_month,
                        max_itineraries as i64,
                    )
                    .await?;

                    // Two-leg candidates only compete for quota the direct
                    // ones left unused.
                    if !direct_only && found.len() < max_itineraries {
                        let remaining = (max_itineraries - found.len()) as i64;
                        let connecting = FlightRepository::search_connecting(
                            conn,
                            &origin,
                            &dest,
                            day_of_month,
                            remaining,
                        )
                        .await?;
                        found.extend(connecting);
                    }

                    Ok(found)
                })
            })
            .await?;

        if candidates.is_empty() {
            return Err(EngineError::NoMatchingFlights);
        }

        rank(&mut candidates);
        Ok(candidates)
    }
}

fn render_itineraries(itineraries: &[Itinerary]) -> String {
    let mut out = String::new();
    for (index, itinerary) in itineraries.iter().enumerate() {
        out.push_str(&format!(
            "Itinerary {}: {} flight(s), {} minutes\n",
            index,
            itinerary.flight_count(),
            itinerary.total_duration()
        ));
        out.push_str(&itinerary.leg_text());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::offline_engine;
    use skyfare_core::Flight;

    fn flight(fid: i32, duration: i32, price: i32) -> Flight {
        Flight {
            fid,
            day_of_month: 9,
            carrier_id: "UA".to_string(),
            flight_num: "305".to_string(),
            origin_city: "Seattle WA".to_string(),
            dest_city: "Chicago IL".to_string(),
            duration,
            capacity: 20,
            price,
        }
    }

    #[test]
    fn test_rendering_numbers_itineraries_from_zero() {
        let list = vec![
            Itinerary::direct(flight(10, 200, 100)),
            Itinerary::connecting(flight(11, 150, 90), flight(12, 100, 80)),
        ];

        let text = render_itineraries(&list);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Itinerary 0: 1 flight(s), 200 minutes");
        assert!(lines[1].starts_with("ID: 10 "));
        assert_eq!(lines[2], "Itinerary 1: 2 flight(s), 250 minutes");
        assert!(lines[3].starts_with("ID: 11 "));
        assert!(lines[4].starts_with("ID: 12 "));
        assert!(text.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_search_against_dead_store_clears_cache_and_reports() {
        let engine = offline_engine();
        let mut session = Session::new();
        session.set_itineraries(vec![Itinerary::direct(flight(1, 100, 50))]);

        let reply = engine
            .search(&mut session, "Seattle WA", "Chicago IL", false, 9, 5)
            .await;

        assert_eq!(reply, "Failed to search\n");
        // Indices from the previous search are gone either way.
        assert_eq!(session.itinerary_count(), 0);
    }
}
