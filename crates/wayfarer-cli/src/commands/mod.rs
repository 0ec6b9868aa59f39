pub mod auth;
pub mod itinerary;
pub mod remind;
pub mod trip;
pub mod vault;

mod common;
