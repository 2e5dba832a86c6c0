//! Holdings entry classification.
//!
//! A holdings list is a comma-separated run of entries in several competing
//! shapes:
//!
//! ```text
//! ETH: 2.5 ($4,000.00), Foo #123 (1 NFT, $50,000.00), Fuji AVAX: 12 (Testnet), BTC 0.1 ($6,000.00)
//! ```
//!
//! Each entry goes through [`MATCHERS`] in priority order. A matcher either
//! claims the entry (producing a holding or a rejection) or passes it on.
//! Entries nobody claims are reported as unrecognized.

use std::sync::LazyLock;

use regex::Regex;

use crate::numeric::{parse_count, parse_decimal};
use crate::types::{EntryError, Holding};

/// Marker for test-network assets. Such entries never carry real value.
pub const TESTNET_MARKER: &str = "(Testnet)";

static NFT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([\w\s]+) #(\d+) \((\d[\d,]*) NFTs?, \$(\d[\d,]*(?:\.\d+)?)\)")
        .expect("nft regex is valid")
});
static TESTNET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\d.,]+)\s+\(Testnet\)").expect("testnet regex is valid")
});
static VALUED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\d.,]+)\s+\(\$(\d[\d,]*(?:\.\d+)?)\)").expect("valued regex is valid")
});
static DOLLAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(\d[\d,]*(?:\.\d+)?)").expect("dollar regex is valid"));

/// Outcome of one matcher against one entry.
#[derive(Debug, PartialEq)]
pub enum Match {
    /// The entry has this matcher's shape and yielded a holding.
    Matched(String, Holding),
    /// The entry has this matcher's shape but its numbers are unusable.
    Rejected(EntryError),
    /// Not this matcher's shape; try the next one.
    NoMatch,
}

pub type Matcher = fn(&str) -> Match;

/// Entry shapes in priority order.
pub const MATCHERS: &[(&str, Matcher)] = &[
    ("non_fungible", match_non_fungible),
    ("colon_delimited", match_colon_delimited),
    ("space_delimited", match_space_delimited),
];

/// Classify one entry with the first matcher that claims it.
pub fn classify_entry(entry: &str) -> Result<(String, Holding), EntryError> {
    for (name, matcher) in MATCHERS {
        match matcher(entry) {
            Match::NoMatch => continue,
            Match::Matched(label, holding) => {
                tracing::trace!("Holding {entry:?} matched {name}");
                return Ok((label, holding));
            }
            Match::Rejected(err) => return Err(err),
        }
    }
    Err(EntryError::UnrecognizedHolding)
}

/// Split a holdings list into entries.
///
/// Splits on `", "` outside parentheses so `Foo #1 (1 NFT, $5.00)` stays one
/// entry. Falls back to a plain split when parentheses never balance.
pub fn split_entries(list: &str) -> Vec<&str> {
    let bytes = list.as_bytes();
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b',' if depth == 0 && bytes.get(i + 1) == Some(&b' ') => {
                entries.push(&list[start..i]);
                start = i + 2;
                i += 2;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    entries.push(&list[start..]);

    if depth > 0 {
        entries = list.split(", ").collect();
    }

    entries
        .into_iter()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect()
}

/// Classify every entry of a holdings list, in order.
pub fn classify_entries(list: &str) -> Vec<(&str, Result<(String, Holding), EntryError>)> {
    split_entries(list)
        .into_iter()
        .map(|entry| (entry, classify_entry(entry)))
        .collect()
}

/// `<collection> #<id> (<qty> NFT, $<value>)`
pub fn match_non_fungible(entry: &str) -> Match {
    if entry.contains(TESTNET_MARKER) {
        return Match::NoMatch;
    }
    let Some(caps) = NFT_RE.captures(entry) else {
        return Match::NoMatch;
    };
    let collection = caps[1].trim();
    if collection.is_empty() {
        return Match::NoMatch;
    }

    let Some(quantity) = parse_count(&caps[3]) else {
        return Match::Rejected(EntryError::InvalidAmount(caps[3].to_string()));
    };
    let Some(value_usd) = parse_decimal(&caps[4]) else {
        return Match::Rejected(EntryError::InvalidValue(caps[4].to_string()));
    };

    Match::Matched(
        format!("{collection} #{}", &caps[2]),
        Holding::NonFungible {
            quantity,
            value_usd,
        },
    )
}

/// `<asset>: <amount> ...` with the remainder tried as testnet, valued, then
/// a generic amount-plus-descriptor.
pub fn match_colon_delimited(entry: &str) -> Match {
    let Some(colon) = entry.find(':') else {
        return Match::NoMatch;
    };
    let label = entry[..colon].trim();
    if label.is_empty() {
        return Match::NoMatch;
    }
    let remaining = entry[colon + 1..].trim();
    let label = label.to_string();

    if let Some(caps) = TESTNET_RE.captures(remaining) {
        return match parse_decimal(&caps[1]) {
            Some(amount) => Match::Matched(label, Holding::TestnetAsset { amount }),
            None => Match::Rejected(EntryError::InvalidAmount(caps[1].to_string())),
        };
    }

    if !remaining.contains(TESTNET_MARKER) {
        if let Some(caps) = VALUED_RE.captures(remaining) {
            return valued(label, &caps[1], &caps[2]);
        }
    }

    let (amount_raw, descriptor) = remaining.split_once(' ').unwrap_or((remaining, ""));
    let Some(amount) = parse_decimal(amount_raw) else {
        return Match::Rejected(EntryError::InvalidAmount(amount_raw.to_string()));
    };
    if descriptor.contains(TESTNET_MARKER) {
        return Match::Matched(label, Holding::TestnetAsset { amount });
    }
    match DOLLAR_RE.captures(descriptor) {
        Some(caps) => match parse_decimal(&caps[1]) {
            Some(value_usd) => Match::Matched(label, Holding::Fungible { amount, value_usd }),
            None => Match::Rejected(EntryError::InvalidValue(caps[1].to_string())),
        },
        None => Match::Rejected(EntryError::MissingValue),
    }
}

/// Older `<asset> <amount> ($<value>)` layout without a colon.
pub fn match_space_delimited(entry: &str) -> Match {
    let tokens: Vec<&str> = entry.split(' ').collect();
    if tokens.len() < 3 || tokens[0].is_empty() {
        return Match::NoMatch;
    }

    let amount_raw = tokens[1].replace(':', "");
    let Some(amount) = parse_decimal(&amount_raw) else {
        return Match::Rejected(EntryError::InvalidAmount(tokens[1].to_string()));
    };
    if entry.contains(TESTNET_MARKER) {
        return Match::Matched(tokens[0].to_string(), Holding::TestnetAsset { amount });
    }

    let value_raw = tokens[2]
        .replace("($", "")
        .replace("),", "")
        .replace(')', "");
    match parse_decimal(&value_raw) {
        Some(value_usd) => Match::Matched(tokens[0].to_string(), Holding::Fungible { amount, value_usd }),
        None => Match::Rejected(EntryError::InvalidValue(tokens[2].to_string())),
    }
}

fn valued(label: String, amount_raw: &str, value_raw: &str) -> Match {
    let Some(amount) = parse_decimal(amount_raw) else {
        return Match::Rejected(EntryError::InvalidAmount(amount_raw.to_string()));
    };
    let Some(value_usd) = parse_decimal(value_raw) else {
        return Match::Rejected(EntryError::InvalidValue(value_raw.to_string()));
    };
    Match::Matched(label, Holding::Fungible { amount, value_usd })
}
