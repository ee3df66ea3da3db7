use crate::itinerary::Itinerary;

/// Per-caller conversation state: who is logged in and which itineraries the
/// most recent search produced. One session belongs to exactly one caller;
/// it is never shared across users.
#[derive(Debug, Default, Clone)]
pub struct Session {
    user: Option<String>,
    itineraries: Vec<Itinerary>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Marks the session authenticated. Any cached itineraries belong to the
    /// pre-login conversation and are dropped.
    pub fn log_in(&mut self, username: &str) {
        self.user = Some(username.to_string());
        self.itineraries.clear();
    }

    pub fn log_out(&mut self) {
        self.user = None;
        self.itineraries.clear();
    }

    pub fn clear_itineraries(&mut self) {
        self.itineraries.clear();
    }

    /// Replaces the cache with a freshly ranked result set. Index i in the
    /// rendered output is index i here.
    pub fn set_itineraries(&mut self, itineraries: Vec<Itinerary>) {
        self.itineraries = itineraries;
    }

    pub fn itinerary(&self, index: usize) -> Option<&Itinerary> {
        self.itineraries.get(index)
    }

    pub fn itinerary_count(&self) -> usize {
        self.itineraries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::Flight;

    fn sample_itinerary() -> Itinerary {
        Itinerary::direct(Flight {
            fid: 11,
            day_of_month: 2,
            carrier_id: "DL".to_string(),
            flight_num: "7".to_string(),
            origin_city: "Seattle WA".to_string(),
            dest_city: "Denver CO".to_string(),
            duration: 150,
            capacity: 3,
            price: 80,
        })
    }

    #[test]
    fn test_fresh_session_is_logged_out() {
        let session = Session::new();
        assert!(!session.is_logged_in());
        assert_eq!(session.username(), None);
        assert_eq!(session.itinerary_count(), 0);
    }

    #[test]
    fn test_login_records_user_and_drops_cache() {
        let mut session = Session::new();
        session.set_itineraries(vec![sample_itinerary()]);

        session.log_in("alice");
        assert!(session.is_logged_in());
        assert_eq!(session.username(), Some("alice"));
        assert_eq!(session.itinerary_count(), 0);
    }

    #[test]
    fn test_logout_clears_everything() {
        let mut session = Session::new();
        session.log_in("alice");
        session.set_itineraries(vec![sample_itinerary()]);

        session.log_out();
        assert!(!session.is_logged_in());
        assert_eq!(session.itinerary_count(), 0);
    }

    #[test]
    fn test_itinerary_lookup_by_index() {
        let mut session = Session::new();
        session.set_itineraries(vec![sample_itinerary()]);

        assert!(session.itinerary(0).is_some());
        assert!(session.itinerary(1).is_none());
    }
}
