pub mod flight;
pub mod itinerary;
pub mod reservation;
pub mod session;

pub use flight::Flight;
pub use itinerary::{rank, Itinerary};
pub use reservation::Reservation;
pub use session::Session;
