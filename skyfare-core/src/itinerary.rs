use crate::flight::Flight;
use serde::{Deserialize, Serialize};

/// A bookable journey: one direct flight or two connecting flights on the
/// same day. Candidates come out of search; booking consumes one by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub first: Flight,
    pub second: Option<Flight>,
}

impl Itinerary {
    pub fn direct(first: Flight) -> Self {
        Self {
            first,
            second: None,
        }
    }

    pub fn connecting(first: Flight, second: Flight) -> Self {
        Self {
            first,
            second: Some(second),
        }
    }

    /// Day of month this itinerary departs. Both legs of a connecting
    /// itinerary share it.
    pub fn date(&self) -> i32 {
        self.first.day_of_month
    }

    pub fn flight_count(&self) -> usize {
        if self.second.is_some() {
            2
        } else {
            1
        }
    }

    pub fn total_duration(&self) -> i32 {
        self.first.duration + self.second.as_ref().map_or(0, |f| f.duration)
    }

    /// Combined price of all legs, widened so two near-max fares cannot
    /// overflow.
    pub fn total_price(&self) -> i64 {
        self.first.price as i64 + self.second.as_ref().map_or(0, |f| f.price as i64)
    }

    pub fn fid1(&self) -> i32 {
        self.first.fid
    }

    pub fn fid2(&self) -> Option<i32> {
        self.second.as_ref().map(|f| f.fid)
    }

    pub fn flight_ids(&self) -> Vec<i32> {
        match self.fid2() {
            Some(second) => vec![self.fid1(), second],
            None => vec![self.fid1()],
        }
    }

    /// One display line per leg, each newline-terminated.
    pub fn leg_text(&self) -> String {
        let mut out = format!("{}\n", self.first);
        if let Some(second) = &self.second {
            out.push_str(&format!("{}\n", second));
        }
        out
    }
}

/// Orders candidates by total duration, then first-leg fid, then second-leg
/// fid. Direct itineraries sort ahead of connecting ones on a full tie since
/// they have no second leg. The order is total, so ranking is deterministic
/// for any input order.
pub fn rank(itineraries: &mut [Itinerary]) {
    itineraries.sort_by_key(|it| (it.total_duration(), it.fid1(), it.fid2()));
}
