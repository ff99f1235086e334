mod entity;
mod listing;

pub use entity::{EntityRecord, NOT_RATED, ReviewRecord, UNKNOWN};
pub use listing::{BackdropResult, ListingTarget};
