//! Calendar-derived defaults, used only when no active period can be resolved.
//!
//! These values are advisory and only good for display. They must never gate a write.

use crate::domain::model::Semester;
use chrono::{Datelike, NaiveDate};

/// 七月起算新學年
const SCHOOL_YEAR_START_MONTH: u32 = 7;

pub fn fallback_year(today: NaiveDate) -> String {
    let year = today.year();
    if today.month() >= SCHOOL_YEAR_START_MONTH {
        format!("{}/{}", year, year + 1)
    } else {
        format!("{}/{}", year - 1, year)
    }
}

pub fn fallback_semester(today: NaiveDate) -> Semester {
    if today.month() >= SCHOOL_YEAR_START_MONTH {
        Semester::First
    } else {
        Semester::Second
    }
}

/// "2025/2026" -> "2026/2027"；無法解析時回傳 None
pub fn next_year_label(year: &str) -> Option<String> {
    let (start, end) = year.split_once('/')?;
    let start: i32 = start.trim().parse().ok()?;
    let end: i32 = end.trim().parse().ok()?;
    let next_start = start.checked_add(1)?;
    let next_end = end.checked_add(1)?;
    if end != next_start {
        return None;
    }
    Some(format!("{}/{}", next_start, next_end))
}
