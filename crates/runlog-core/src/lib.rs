pub mod config;
pub mod errors;
pub mod event;
pub mod outcome;
pub mod properties;
pub mod recorder;
pub mod storage;
