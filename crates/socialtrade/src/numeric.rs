//! Number formats found in exports: thousands separators, `$` markers, signs.

/// Parse an unsigned decimal such as `2.5` or `4,000.00`.
///
/// Thousands separators are dropped before conversion. Anything other than
/// digits and a decimal point is rejected, so `1e5`, `inf` and `-3` fail.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned = strip_separators(raw.trim());
    if !is_plain_decimal(&cleaned) {
        return None;
    }
    cleaned.parse().ok()
}

/// Parse an unsigned integer count such as `1` or `1,200`.
pub fn parse_count(raw: &str) -> Option<u64> {
    let cleaned = strip_separators(raw.trim());
    if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

/// Parse a signed dollar figure: `$1,234.50`, `-$12.00` or `$-12.00`.
///
/// The `$` is optional; a minus sign on either side of it is kept.
pub fn parse_money(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let (mut negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    };
    let s = s.strip_prefix('$').unwrap_or(s).trim_start();
    let s = match s.strip_prefix('-') {
        Some(rest) if !negative => {
            negative = true;
            rest
        }
        _ => s,
    };
    let value = parse_decimal(s)?;
    Some(if negative { -value } else { value })
}

fn strip_separators(s: &str) -> String {
    s.chars().filter(|c| *c != ',').collect()
}

fn is_plain_decimal(s: &str) -> bool {
    let mut digits = 0;
    let mut points = 0;
    for b in s.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}
