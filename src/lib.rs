//! CycleTraining - structured interval workouts for indoor cycling
//!
//! Imports and builds Zwift-style (.zwo) workouts, plays them back on a real-time
//! clock with FTP-scaled power targets, and compares those targets with a live
//! power meter reading.

pub mod sensors;
pub mod storage;
pub mod workouts;

// Re-export commonly used types
pub use sensors::sink::PowerSink;
pub use storage::config::AppConfig;
pub use workouts::engine::PlaybackClock;
pub use workouts::session::RideSession;
pub use workouts::types::Workout;
