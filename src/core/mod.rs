pub mod alerts;
pub mod merge;
pub mod rate_limiter;
pub mod scheduler;
pub mod timeseries;
