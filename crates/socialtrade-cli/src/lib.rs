//! SocialTrade CLI — inspect recovered user records from the command line.

pub mod config;
pub mod repl;
pub mod report;

pub use config::Settings;
pub use report::AuditReport;
