pub mod booking;
pub mod media;
