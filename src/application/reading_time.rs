//! Reading-time estimate derived from the raw body word count.

use crate::domain::types::Locale;

pub const WORDS_PER_MINUTE: usize = 200;

/// Whole minutes needed to read `body`, rounded up and never below one.
pub fn reading_minutes(body: &str) -> usize {
    let words = body.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

pub fn reading_time(body: &str, locale: Locale) -> String {
    let minutes = reading_minutes(body);
    match locale {
        Locale::En => format!("{minutes} min read"),
        Locale::Fr => format!("{minutes} min de lecture"),
    }
}
