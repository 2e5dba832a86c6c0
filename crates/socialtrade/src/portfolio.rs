//! Portfolio export parser.
//!
//! The export is split into sections by fixed header lines:
//!
//! ```text
//! Birth Time: ...                      <- preamble, ignored
//! Holdings: ETH: 2.5 ($4,000.00), Foo #123 (1 NFT, $50,000.00)
//! Profit/Loss:
//! Total: $1,200.00
//! Realized: $200.00
//! Unrealized: $1,000.00
//! Recent Trades:
//! 2024-01-01 12:00:00 buy 1.5 ETH with USD, $3,000.00
//! ```
//!
//! Entries that match no known shape are dropped and reported as
//! [`Diagnostic`]s; they never fail the parse.

use std::path::Path;

use crate::holdings::classify_entries;
use crate::ledger::{parse_profit_loss_line, parse_trade_line};
use crate::lines::{read_text, tokenize, Line};
use crate::types::{Diagnostic, EntryError, ExportResult, Parsed, PortfolioExport, Section};

pub const HOLDINGS_HEADER: &str = "Holdings:";
pub const PROFIT_LOSS_HEADER: &str = "Profit/Loss:";
pub const TRADES_HEADER: &str = "Recent Trades:";

/// Banner lines skipped wherever they appear.
const PREAMBLE_PREFIXES: &[&str] = &["Birth Time", "Birthplace", "Gender", "User's actual"];

/// Parse a portfolio export from its text.
pub fn parse_portfolio(text: &str) -> Parsed<PortfolioExport> {
    let parsed = tokenize(text)
        .iter()
        .filter(|l| !l.is_blank())
        .fold(PortfolioState::new(), PortfolioState::step)
        .finish();

    tracing::debug!(
        "Parsed portfolio export: {} holdings, {} trades, {} dropped",
        parsed.value.holdings.len(),
        parsed.value.trades.len(),
        parsed.diagnostics.len()
    );
    parsed
}

/// Read and parse a portfolio export file.
pub fn read_portfolio(path: &Path) -> ExportResult<Parsed<PortfolioExport>> {
    let text = read_text(path)?;
    Ok(parse_portfolio(&text))
}

fn is_preamble(text: &str) -> bool {
    PREAMBLE_PREFIXES.iter().any(|p| text.starts_with(p))
}

/// Parser state between lines.
#[derive(Debug)]
struct PortfolioState {
    section: Section,
    export: PortfolioExport,
    diagnostics: Vec<Diagnostic>,
}

impl PortfolioState {
    fn new() -> Self {
        Self {
            section: Section::Preamble,
            export: PortfolioExport::default(),
            diagnostics: Vec::new(),
        }
    }

    fn step(mut self, line: &Line<'_>) -> Self {
        let text = line.text;
        if is_preamble(text) {
            return self;
        }

        // The holdings header carries its first entries inline.
        if let Some(rest) = text.strip_prefix(HOLDINGS_HEADER) {
            self.section = Section::Holdings;
            self.apply_holdings(line.number, rest);
            return self;
        }
        if text.starts_with(PROFIT_LOSS_HEADER) {
            self.section = Section::ProfitLoss;
            return self;
        }
        if text.starts_with(TRADES_HEADER) {
            self.section = Section::RecentTrades;
            return self;
        }

        match self.section {
            Section::Preamble => {
                tracing::trace!("Ignoring line {} before any section", line.number);
            }
            Section::Holdings => self.apply_holdings(line.number, text),
            Section::ProfitLoss => match parse_profit_loss_line(text) {
                Ok((field, value)) => self.export.profit_loss.set(field, value),
                Err(err) => self.drop_fragment(line.number, text, err),
            },
            Section::RecentTrades => match parse_trade_line(text) {
                Ok(trade) => self.export.trades.push(trade),
                Err(err) => self.drop_fragment(line.number, text, err),
            },
        }
        self
    }

    fn apply_holdings(&mut self, line_number: usize, list: &str) {
        for (entry, result) in classify_entries(list) {
            match result {
                // Last write wins for repeated labels.
                Ok((label, holding)) => {
                    self.export.holdings.insert(label, holding);
                }
                Err(err) => self.drop_fragment(line_number, entry, err),
            }
        }
    }

    fn drop_fragment(&mut self, line: usize, fragment: &str, error: EntryError) {
        let diagnostic = Diagnostic {
            line,
            section: self.section,
            fragment: fragment.to_string(),
            error,
        };
        tracing::debug!("Dropped {diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    fn finish(self) -> Parsed<PortfolioExport> {
        Parsed {
            value: self.export,
            diagnostics: self.diagnostics,
        }
    }
}
