//! Text to timestamp conversion for DATE and TIMESTAMP columns.

use chrono::{NaiveDate, NaiveDateTime};

/// Accepted date formats, tried in order. The first that parses wins.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d/%m/%Y",
    "%d/%m/%Y %H:%M:%S",
    "%Y/%m/%d",
    "%Y/%m/%d %H:%M:%S",
    "%d-%m-%Y",
    "%d-%m-%Y %H:%M:%S",
];

/// Parse `text` with [`DATE_FORMATS`]. Date-only formats yield midnight.
///
/// The text is matched as is: surrounding whitespace, or a year that is not
/// exactly four digits, leaves it unparsed.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    DATE_FORMATS.iter().find_map(|fmt| parse_with(text, fmt))
}

fn parse_with(text: &str, fmt: &str) -> Option<NaiveDateTime> {
    // chrono's %Y takes fewer digits (and a sign), so "24/01/15" would
    // otherwise become year 15.
    if !has_four_digit_year(text, fmt) {
        return None;
    }
    if fmt.contains("%H") {
        NaiveDateTime::parse_from_str(text, fmt).ok()
    } else {
        NaiveDate::parse_from_str(text, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }
}

/// The year is the first numeric field of `%Y...` formats and the third of
/// the day-first ones.
fn has_four_digit_year(text: &str, fmt: &str) -> bool {
    let field = if fmt.starts_with("%Y") { 0 } else { 2 };
    text.split(|c: char| !c.is_ascii_digit())
        .nth(field)
        .is_some_and(|year| year.len() == 4)
}
