use skyfare_store::StoreError;
use std::fmt;
use thiserror::Error;

/// The operation a logged-out caller attempted. The phrase completes the
/// "Cannot {}, not logged in" refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Book,
    Pay,
    ViewReservations,
    Cancel,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            Action::Book => "book reservations",
            Action::Pay => "pay",
            Action::ViewReservations => "view reservations",
            Action::Cancel => "cancel reservations",
        };
        write!(f, "{}", phrase)
    }
}

/// Every caller-visible failure of an engine operation. Display strings are
/// the exact response texts, without the trailing newline the operation
/// wrappers append.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("User already logged in")]
    AlreadyLoggedIn,

    #[error("Login failed")]
    AuthenticationFailed,

    #[error("Failed to create user")]
    InvalidSignupInput,

    #[error("Cannot {0}, not logged in")]
    NotLoggedIn(Action),

    #[error("No such itinerary {0}")]
    UnknownItinerary(usize),

    #[error("You cannot book two flights in the same day")]
    SameDayConflict,

    #[error("Booking failed")]
    CapacityExceeded,

    #[error("Cannot find unpaid reservation {id} under user: {username}")]
    ReservationNotFound { id: i64, username: String },

    #[error("User has only {balance} in account but itinerary costs {cost}")]
    InsufficientFunds { balance: i64, cost: i64 },

    #[error("No flights match your selection")]
    NoMatchingFlights,

    #[error("No reservations found")]
    NoReservationsFound,

    #[error("Failed to cancel reservation {0}")]
    CancellationFailed(i64),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// True when the underlying store aborted the transaction and a fresh
    /// attempt may succeed. Every other variant is a definitive outcome.
    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::Store(err) if err.is_conflict())
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Store(StoreError::from(err))
    }
}
