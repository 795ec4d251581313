use time::{Month, OffsetDateTime, UtcOffset};

use crate::domain::types::Locale;

/// Long-form display date in UTC calendar terms: `January 5, 2024` / `5 janvier 2024`.
pub fn format_date(date: OffsetDateTime, locale: Locale) -> String {
    let date = date.to_offset(UtcOffset::UTC).date();
    let day = date.day();
    let year = date.year();

    match locale {
        Locale::En => format!("{} {day}, {year}", date.month()),
        Locale::Fr => format!("{day} {} {year}", french_month(date.month())),
    }
}

fn french_month(month: Month) -> &'static str {
    match month {
        Month::January => "janvier",
        Month::February => "février",
        Month::March => "mars",
        Month::April => "avril",
        Month::May => "mai",
        Month::June => "juin",
        Month::July => "juillet",
        Month::August => "août",
        Month::September => "septembre",
        Month::October => "octobre",
        Month::November => "novembre",
        Month::December => "décembre",
    }
}
