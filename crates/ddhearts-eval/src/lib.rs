pub mod config;
pub mod evaluator;
pub mod hands;
pub mod logging;
pub mod output;
pub mod runner;
