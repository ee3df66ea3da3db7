use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored booking. The itinerary field keeps the rendered leg lines from
/// the search that produced it, so listings replay exactly what the user saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub itinerary: String,
    pub date: i32,
    pub fid1: i32,
    pub fid2: Option<i32>,
    pub total_price: i64,
    pub paid: bool,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn flight_ids(&self) -> Vec<i32> {
        match self.fid2 {
            Some(second) => vec![self.fid1, second],
            None => vec![self.fid1],
        }
    }
}
