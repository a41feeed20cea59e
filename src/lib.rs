pub mod config;
pub mod detector;
pub mod error;
pub mod gemini;
pub mod indicator;
pub mod model;
pub mod report;
pub mod runner;
