//! Profit/loss and recent-trade line parsers.

use std::sync::LazyLock;

use regex::Regex;

use crate::numeric::{parse_decimal, parse_money};
use crate::types::{EntryError, ProfitLoss, Trade, TradeAction};

static TRADE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}) (buy|sell) ([\d.,]+) (\w+).*?\b(?:with|for) (\w+), \$(\d[\d,]*(?:\.\d+)?)",
    )
    .expect("trade regex is valid")
});

/// Which profit/loss figure a line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfitLossField {
    Total,
    Realized,
    Unrealized,
}

const PROFIT_LOSS_PREFIXES: &[(&str, ProfitLossField)] = &[
    ("Total:", ProfitLossField::Total),
    ("Realized:", ProfitLossField::Realized),
    ("Unrealized:", ProfitLossField::Unrealized),
];

/// Parse a `Total: $1,234.00` style line.
pub fn parse_profit_loss_line(line: &str) -> Result<(ProfitLossField, f64), EntryError> {
    for (prefix, field) in PROFIT_LOSS_PREFIXES {
        if let Some(rest) = line.strip_prefix(*prefix) {
            let rest = rest.trim();
            return parse_money(rest)
                .map(|value| (*field, value))
                .ok_or_else(|| EntryError::InvalidProfitLoss(rest.to_string()));
        }
    }
    Err(EntryError::UnrecognizedProfitLoss)
}

impl ProfitLoss {
    /// Record one figure. A repeated line replaces the earlier value.
    pub fn set(&mut self, field: ProfitLossField, value: f64) {
        match field {
            ProfitLossField::Total => self.total = Some(value),
            ProfitLossField::Realized => self.realized = Some(value),
            ProfitLossField::Unrealized => self.unrealized = Some(value),
        }
    }
}

/// Parse `<timestamp> <buy|sell> <amount> <asset> (with|for) <currency>, $<value>`.
pub fn parse_trade_line(line: &str) -> Result<Trade, EntryError> {
    let caps = TRADE_RE
        .captures(line)
        .ok_or(EntryError::UnrecognizedTrade)?;

    let action = match &caps[2] {
        "buy" => TradeAction::Buy,
        _ => TradeAction::Sell,
    };
    let amount =
        parse_decimal(&caps[3]).ok_or_else(|| EntryError::InvalidAmount(caps[3].to_string()))?;
    let value_usd =
        parse_decimal(&caps[6]).ok_or_else(|| EntryError::InvalidValue(caps[6].to_string()))?;

    Ok(Trade {
        timestamp: caps[1].to_string(),
        action,
        asset: caps[4].to_string(),
        amount,
        currency: caps[5].to_string(),
        value_usd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_trade() {
        let trade = parse_trade_line("2024-01-01 12:00:00 buy 1.5 ETH with USD, $3,000.00").unwrap();
        assert_eq!(
            trade,
            Trade {
                timestamp: "2024-01-01 12:00:00".into(),
                action: TradeAction::Buy,
                asset: "ETH".into(),
                amount: 1.5,
                currency: "USD".into(),
                value_usd: 3000.0,
            }
        );
    }

    #[test]
    fn test_sell_trade_with_extra_words() {
        let trade =
            parse_trade_line("2024-03-09 08:15:00 sell 300 SOL on Jupiter for USDC, $45,000.50")
                .unwrap();
        assert_eq!(trade.action, TradeAction::Sell);
        assert_eq!(trade.asset, "SOL");
        assert_eq!(trade.currency, "USDC");
        assert_eq!(trade.value_usd, 45000.5);
    }

    #[test]
    fn test_malformed_trades() {
        for line in [
            "yesterday buy 1 ETH with USD, $10.00",
            "2024-01-01 12:00 buy 1 ETH with USD, $10.00",
            "2024-01-01 12:00:00 hold 1 ETH with USD, $10.00",
            "2024-01-01 12:00:00 buy 1 ETH with USD",
            "2024-01-01 12:00:00 buy some ETH with USD, $10.00",
        ] {
            assert_eq!(parse_trade_line(line), Err(EntryError::UnrecognizedTrade), "{line}");
        }
        assert_eq!(
            parse_trade_line("2024-01-01 12:00:00 buy 1.2.3 ETH with USD, $10.00"),
            Err(EntryError::InvalidAmount("1.2.3".into()))
        );
    }

    #[test]
    fn test_profit_loss_lines() {
        assert_eq!(
            parse_profit_loss_line("Total: $12,345.67"),
            Ok((ProfitLossField::Total, 12345.67))
        );
        assert_eq!(
            parse_profit_loss_line("Realized: -$1,000.00"),
            Ok((ProfitLossField::Realized, -1000.0))
        );
        assert_eq!(
            parse_profit_loss_line("Unrealized: $-50.00"),
            Ok((ProfitLossField::Unrealized, -50.0))
        );
        assert_eq!(
            parse_profit_loss_line("Total: unknown"),
            Err(EntryError::InvalidProfitLoss("unknown".into()))
        );
        assert_eq!(
            parse_profit_loss_line("ROI: 12%"),
            Err(EntryError::UnrecognizedProfitLoss)
        );
    }

    #[test]
    fn test_profit_loss_set() {
        let mut pl = ProfitLoss::default();
        pl.set(ProfitLossField::Realized, 5.0);
        assert_eq!(pl.realized, Some(5.0));
        assert_eq!(pl.total, None);
        assert_eq!(pl.unrealized, None);
    }
}
