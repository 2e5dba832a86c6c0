//! JSON summaries printed by the CLI and REPL.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use socialtrade::{Connections, UserLoader, UserRecord};

/// Registered ids as JSON.
pub fn users_report(loader: &UserLoader) -> Value {
    let users: Vec<&str> = loader.registry().iter().collect();
    json!({
        "social_dir": loader.layout().social_dir.display().to_string(),
        "count": users.len(),
        "users": users,
    })
}

/// Compact per-record summary.
pub fn record_summary(record: &UserRecord) -> Value {
    let holdings = &record.portfolio.holdings;
    json!({
        "id": record.id,
        "display_name": record.social.display_name,
        "handle": record.social.handle,
        "posts": record.social.posts.iter().filter(|p| !p.is_sentinel()).count(),
        "holdings": holdings.len(),
        "nft_holdings": holdings.values().filter(|h| h.is_nft()).count(),
        "testnet_holdings": holdings.values().filter(|h| h.is_testnet()).count(),
        "real_value_usd": record.portfolio.real_value_usd(),
        "profit_loss": record.portfolio.profit_loss,
        "trades": record.portfolio.trades.len(),
        "dropped": record.diagnostics.len(),
    })
}

/// Summary of a connection load.
pub fn connections_report(user: &str, connections: &Connections, mentioned: bool) -> Value {
    json!({
        "user": user,
        "mode": if mentioned { "mentioned" } else { "all" },
        "loaded": connections.records.iter().map(record_summary).collect::<Vec<_>>(),
        "skipped": connections.skipped,
        "generated_at": chrono::Utc::now().to_rfc3339(),
    })
}

/// Drop counts for one successfully loaded user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub id: String,
    pub dropped: usize,
    pub by_kind: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditFailure {
    pub id: String,
    pub error: String,
}

/// Diagnostic tallies across every registered user.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub users: Vec<AuditEntry>,
    pub failures: Vec<AuditFailure>,
    /// Dropped fragments per error kind, summed over all users.
    pub totals: BTreeMap<String, usize>,
}

impl AuditReport {
    /// Load every registered user and tally what was dropped.
    pub fn collect(loader: &UserLoader) -> Self {
        let mut report = Self {
            generated_at: chrono::Utc::now(),
            users: Vec::new(),
            failures: Vec::new(),
            totals: BTreeMap::new(),
        };

        for id in loader.registry().iter() {
            match loader.load(id) {
                Ok(record) => report.add(&record),
                Err(e) => {
                    tracing::warn!("Audit: failed to load '{id}': {e}");
                    report.failures.push(AuditFailure {
                        id: id.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }

    fn add(&mut self, record: &UserRecord) {
        let mut by_kind = BTreeMap::new();
        for d in &record.diagnostics {
            *by_kind.entry(d.error.kind().to_string()).or_insert(0) += 1;
            *self.totals.entry(d.error.kind().to_string()).or_insert(0) += 1;
        }
        self.users.push(AuditEntry {
            id: record.id.clone(),
            dropped: record.diagnostics.len(),
            by_kind,
        });
    }

    pub fn total_dropped(&self) -> usize {
        self.totals.values().sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socialtrade::{parse_portfolio, parse_social};

    fn record(id: &str, portfolio: &str) -> UserRecord {
        let (portfolio, diagnostics) = parse_portfolio(portfolio).into_parts();
        UserRecord {
            id: id.to_string(),
            social: parse_social("Ann\n@ann\nAnn\ngm\n"),
            portfolio,
            diagnostics,
        }
    }

    #[test]
    fn test_record_summary_counts() {
        let r = record(
            "ann",
            "Holdings: ETH: 1 ($10.00), Foo #1 (1 NFT, $5.00), Fuji AVAX: 3 (Testnet), ???\n",
        );
        let summary = record_summary(&r);
        assert_eq!(summary["posts"], 1);
        assert_eq!(summary["holdings"], 3);
        assert_eq!(summary["nft_holdings"], 1);
        assert_eq!(summary["testnet_holdings"], 1);
        assert_eq!(summary["real_value_usd"], 15.0);
        assert_eq!(summary["dropped"], 1);
    }

    #[test]
    fn test_audit_tallies_by_kind() {
        let mut report = AuditReport {
            generated_at: chrono::Utc::now(),
            users: Vec::new(),
            failures: Vec::new(),
            totals: BTreeMap::new(),
        };
        report.add(&record("ann", "Holdings: ???, ETH: x ($1.00)\n"));
        report.add(&record("bob", "Recent Trades:\nnothing here\n"));

        assert_eq!(report.users.len(), 2);
        assert_eq!(report.users[0].dropped, 2);
        assert_eq!(report.totals.get("unrecognized_holding"), Some(&1));
        assert_eq!(report.totals.get("invalid_amount"), Some(&1));
        assert_eq!(report.totals.get("unrecognized_trade"), Some(&1));
        assert_eq!(report.total_dropped(), 3);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_connections_report_mode() {
        let value = connections_report("ann", &Connections::default(), true);
        assert_eq!(value["mode"], "mentioned");
        assert_eq!(value["loaded"], json!([]));
    }
}
