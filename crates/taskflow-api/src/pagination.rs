//! Offset pagination for list endpoints

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

const MAX_OFFSET: u64 = i64::MAX as u64;

/// Resolved page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Resolve raw query values
    ///
    /// Missing, non-numeric, zero or negative values fall back to the defaults and `limit`
    /// is capped at [`MAX_LIMIT`]. Leading digits are honoured (`"3rd"` reads as 3) and
    /// numbers too long for `i64` saturate.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(parse_leading_int)
            .filter(|p| *p > 0)
            .map_or(DEFAULT_PAGE, |p| p as u64);

        let limit = limit
            .and_then(parse_leading_int)
            .filter(|l| *l > 0)
            .map_or(DEFAULT_LIMIT, |l| (l as u64).min(MAX_LIMIT));

        Self { page, limit }
    }

    /// Rows to skip, clamped to what a signed 64-bit SQL OFFSET can hold
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit)
            .min(MAX_OFFSET)
    }

    /// Number of pages needed for `total` rows
    pub fn pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return None;
    }
    // Only ASCII digits remain, so a parse failure is an overflow
    let value: i64 = digits.parse().unwrap_or(i64::MAX);

    Some(if negative { -value } else { value })
}
