//! Age-over-18 computation.

use chrono::{Datelike, NaiveDate};

/// Whether a person born on `date_of_birth` is 18 or older on `on`.
///
/// Exact year/month/day comparison, not floor-year subtraction: the year
/// difference is reduced by one when `on`'s `(month, day)` falls before the
/// birthday's. Someone verified on their 18th birthday is over 18.
pub fn is_over_18(date_of_birth: NaiveDate, on: NaiveDate) -> bool {
    let mut age = on.year() - date_of_birth.year();
    if (on.month(), on.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age >= 18
}
