pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod exit;
pub mod foreman;
pub mod logging;
pub mod notify;
pub mod reconcile;
pub mod report;
pub mod ui;
pub mod vmware;
