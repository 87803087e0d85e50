pub mod classify;
pub mod cli;
pub mod config;
pub mod export;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod timestamp;
pub mod util;
