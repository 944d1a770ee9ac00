pub mod compare;
pub mod summary;
pub mod surf;
pub mod tides;
pub mod wind;
