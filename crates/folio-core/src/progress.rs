#![forbid(unsafe_code)]

//! Progress bar configuration parsing.

/// Parse a `data-percentage` value the way `parseInt(value, 10)` does: optional
/// leading whitespace and sign, then the longest run of ASCII digits. Anything
/// unparseable yields `0`. The result is clamped to `0..=100`, so
/// `data-percentage="150"` renders as a full bar rather than overflowing its
/// track.
///
/// The controller calls this when a bar starts animating, not at attach time,
/// so edits to the attribute before the skills section is revealed are honored.
#[must_use]
pub fn parse_percentage(raw: Option<&str>) -> u8 {
    let Some(raw) = raw else {
        return 0;
    };
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 || negative {
        return 0;
    }
    // Long digit runs saturate rather than fail.
    let value = digits[..end].parse::<u64>().unwrap_or(u64::MAX);
    value.min(100) as u8
}
