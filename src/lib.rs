pub mod args;
pub mod config;
pub mod error;
pub mod ffmpeg;
pub mod processor;
pub mod runlog;
pub mod runner;
pub mod scanner;
