//! Core data types for recovered social and portfolio records.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Text substituted when a social export yields no recoverable posts.
pub const NO_POSTS_TEXT: &str = "No tweets found";

/// A user's recovered social-feed export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialProfile {
    pub display_name: String,
    /// Handle including the leading `@`, or empty when the export has none.
    pub handle: String,
    /// Never empty: holds the sentinel post when nothing was recovered.
    pub posts: Vec<Post>,
}

impl SocialProfile {
    /// Profile for an export with no lines at all.
    pub fn empty() -> Self {
        Self {
            display_name: String::new(),
            handle: String::new(),
            posts: vec![Post::sentinel()],
        }
    }

    /// Whether at least one real (non-sentinel) post was recovered.
    pub fn has_posts(&self) -> bool {
        self.posts.iter().any(|p| !p.is_sentinel())
    }
}

/// One recovered post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub author: String,
    pub handle: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<u64>,
}

impl Post {
    /// Placeholder post for feeds with no recoverable entries.
    pub fn sentinel() -> Self {
        Self {
            author: String::new(),
            handle: String::new(),
            text: NO_POSTS_TEXT.to_string(),
            date: None,
            likes: None,
            shares: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.author.is_empty()
            && self.text == NO_POSTS_TEXT
            && self.date.is_none()
            && self.likes.is_none()
            && self.shares.is_none()
    }
}

/// One owned asset position, classified by how it is valued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Holding {
    Fungible { amount: f64, value_usd: f64 },
    /// Test-network token. Carries no real value.
    TestnetAsset { amount: f64 },
    NonFungible { quantity: u64, value_usd: f64 },
}

impl Holding {
    /// Dollar value of the position; zero for testnet assets.
    pub fn value_usd(&self) -> f64 {
        match self {
            Holding::Fungible { value_usd, .. } | Holding::NonFungible { value_usd, .. } => {
                *value_usd
            }
            Holding::TestnetAsset { .. } => 0.0,
        }
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Holding::TestnetAsset { .. })
    }

    pub fn is_nft(&self) -> bool {
        matches!(self, Holding::NonFungible { .. })
    }
}

/// Profit/loss figures. A field stays `None` until its line is seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitLoss {
    pub total: Option<f64>,
    pub realized: Option<f64>,
    pub unrealized: Option<f64>,
}

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

/// One line of the recent-trades section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// `YYYY-MM-DD HH:MM:SS`, kept verbatim.
    pub timestamp: String,
    pub action: TradeAction,
    pub asset: String,
    pub amount: f64,
    pub currency: String,
    pub value_usd: f64,
}

/// A user's recovered portfolio export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioExport {
    /// Keyed by asset label. A later entry for the same label replaces the
    /// earlier one, whatever shape either entry had.
    pub holdings: BTreeMap<String, Holding>,
    pub profit_loss: ProfitLoss,
    /// File order, no dedup.
    pub trades: Vec<Trade>,
}

impl PortfolioExport {
    pub fn holding(&self, label: &str) -> Option<&Holding> {
        self.holdings.get(label)
    }

    /// Total dollar value of holdings, testnet assets excluded.
    pub fn real_value_usd(&self) -> f64 {
        self.holdings
            .values()
            .filter(|h| !h.is_testnet())
            .map(Holding::value_usd)
            .sum()
    }
}

/// Everything recovered for one registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub social: SocialProfile,
    pub portfolio: PortfolioExport,
    /// Fragments dropped while parsing this user's exports.
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// Connection records loaded for one user, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Connections {
    pub records: Vec<UserRecord>,
    /// Ids whose load failed; they are left out of `records`.
    pub skipped: Vec<SkippedConnection>,
}

impl Connections {
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedConnection {
    pub id: String,
    pub reason: String,
}

/// Result of a pure parse: the recovered value plus what was dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parsed<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Parsed<T> {
    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.value, self.diagnostics)
    }
}

/// Region of a portfolio export a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Preamble,
    Holdings,
    ProfitLoss,
    RecentTrades,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Preamble => "preamble",
            Section::Holdings => "holdings",
            Section::ProfitLoss => "profit_loss",
            Section::RecentTrades => "recent_trades",
        }
    }
}

/// A fragment that could not be classified and was dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based line number in the source export.
    pub line: usize,
    pub section: Section,
    /// The dropped text, verbatim.
    pub fragment: String,
    pub error: EntryError,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {} ({}): {:?}: {}",
            self.line,
            self.section.as_str(),
            self.fragment,
            self.error
        )
    }
}

/// Why a single entry was dropped. Recoverable: never fails a parse.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum EntryError {
    #[error("no holding shape matched")]
    UnrecognizedHolding,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("no dollar value found")]
    MissingValue,

    #[error("invalid profit/loss figure: {0}")]
    InvalidProfitLoss(String),

    #[error("unrecognized profit/loss line")]
    UnrecognizedProfitLoss,

    #[error("line does not match the trade shape")]
    UnrecognizedTrade,
}

impl EntryError {
    /// Stable short name, used when tallying drop reasons.
    pub fn kind(&self) -> &'static str {
        match self {
            EntryError::UnrecognizedHolding => "unrecognized_holding",
            EntryError::InvalidAmount(_) => "invalid_amount",
            EntryError::InvalidValue(_) => "invalid_value",
            EntryError::MissingValue => "missing_value",
            EntryError::InvalidProfitLoss(_) => "invalid_profit_loss",
            EntryError::UnrecognizedProfitLoss => "unrecognized_profit_loss",
            EntryError::UnrecognizedTrade => "unrecognized_trade",
        }
    }
}

/// Errors that fail a whole load.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Export file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// True for the missing-user and missing-file cases.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ExportError::UserNotFound(_) | ExportError::FileNotFound(_)
        )
    }
}

/// Convenience result type.
pub type ExportResult<T> = Result<T, ExportError>;
