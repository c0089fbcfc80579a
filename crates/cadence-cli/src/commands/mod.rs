pub mod config;
pub mod goal;
pub mod habit;
pub mod schedule;
pub mod serve;
pub mod stats;
pub mod token;
