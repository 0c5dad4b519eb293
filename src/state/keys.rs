//! Well-known keys in a session's state record.

/// Local timestamp of the first bootstrap.
pub const SYSTEM_TIME: &str = "_time";
/// Set once the profile has been merged into the session.
pub const ITIN_INITIALIZED: &str = "_itin_initialized";

pub const ITIN_KEY: &str = "itinerary";
pub const PROF_KEY: &str = "user_profile";

pub const ITIN_START_DATE: &str = "itinerary_start_date";
pub const ITIN_END_DATE: &str = "itinerary_end_date";
pub const ITIN_DATETIME: &str = "itinerary_datetime";

pub const START_DATE: &str = "start_date";
pub const END_DATE: &str = "end_date";
