//! SocialTrade — recovery of typed user records from social-feed and portfolio text exports.

pub mod holdings;
pub mod ledger;
pub mod lines;
pub mod loader;
pub mod mentions;
pub mod numeric;
pub mod portfolio;
pub mod social;
pub mod types;

pub use holdings::classify_entry;
pub use lines::{tokenize, Line};
pub use loader::{ExportLayout, Registry, UserLoader, DEFAULT_MAX_PARALLEL};
pub use mentions::{extract_mentions, profile_mentions};
pub use portfolio::{parse_portfolio, read_portfolio};
pub use social::{parse_social, read_social};
pub use types::*;
