pub mod analyzer;
pub mod cache;
pub mod collector;
pub mod config;
pub mod correlation;
pub mod errors;
pub mod exclusions;
pub mod insights;
pub mod logger;
pub mod normalizer;
pub mod providers;
pub mod resolver;
pub mod scoring;
pub mod types;
