//! # Working days
//!
//! Statutory deadlines are counted in Slovak working days: weekdays which are not public
//! holidays.

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};

/// Fixed-date public holidays as `(month, day, first year observed)`.
const FIXED_HOLIDAYS: [(u32, u32, i32); 13] = [
    (1, 1, 1994),   // Deň vzniku Slovenskej republiky
    (1, 6, 1994),   // Zjavenie Pána
    (5, 1, 1994),   // Sviatok práce
    (5, 8, 1997),   // Deň víťazstva nad fašizmom
    (7, 5, 1994),   // Sviatok svätého Cyrila a Metoda
    (8, 29, 1994),  // Výročie SNP
    (9, 1, 1994),   // Deň Ústavy Slovenskej republiky
    (9, 15, 1994),  // Sedembolestná Panna Mária
    (11, 1, 1994),  // Sviatok všetkých svätých
    (11, 17, 2001), // Deň boja za slobodu a demokraciu
    (12, 24, 1994), // Štedrý deň
    (12, 25, 1994), // Prvý sviatok vianočný
    (12, 26, 1994), // Druhý sviatok vianočný
];

/// Good Friday and Easter Monday, relative to Easter Sunday.
const EASTER_HOLIDAYS: [i64; 2] = [-2, 1];

/// Current date in the server's time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Easter Sunday of `year` in the Gregorian calendar.
pub fn easter(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month.try_into().ok()?, day.try_into().ok()?)
}

pub fn is_holiday(date: NaiveDate) -> bool {
    let fixed = FIXED_HOLIDAYS.iter().any(|&(month, day, since)| {
        date.month() == month && date.day() == day && date.year() >= since
    });
    fixed
        || easter(date.year()).is_some_and(|easter| {
            EASTER_HOLIDAYS.contains(&(date - easter).num_days())
        })
}

pub fn is_workday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !is_holiday(date)
}

/// Number of working days in the interval `(after, before]`, negative if `before` comes
/// first.
///
/// If something was submitted on `after`, a deadline of `n` working days has its last day
/// on the date for which `between(after, date) == n`.
pub fn between(after: NaiveDate, before: NaiveDate) -> i64 {
    if after > before {
        return -between(before, after);
    }
    after
        .iter_days()
        .skip(1)
        .take_while(|day| *day <= before)
        .filter(|day| is_workday(*day))
        .map(|_| 1)
        .sum()
}

/// The date `count` working days after `date`. Counts below one return `date` itself.
pub fn add(date: NaiveDate, count: i64) -> NaiveDate {
    let mut day = date;
    let mut remaining = count;
    while remaining > 0 {
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
        if is_workday(day) {
            remaining -= 1;
        }
    }
    day
}
