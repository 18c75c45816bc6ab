use time::Weekday;

use super::validation::ValidationError;

pub const WEEK: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

pub fn as_str(day: Weekday) -> &'static str {
    match day {
        Weekday::Monday => "monday",
        Weekday::Tuesday => "tuesday",
        Weekday::Wednesday => "wednesday",
        Weekday::Thursday => "thursday",
        Weekday::Friday => "friday",
        Weekday::Saturday => "saturday",
        Weekday::Sunday => "sunday",
    }
}

pub fn parse(raw: &str) -> Result<Weekday, ValidationError> {
    let normalized = raw.trim().to_ascii_lowercase();
    WEEK.into_iter()
        .find(|day| {
            let name = as_str(*day);
            normalized == name || (normalized.len() == 3 && name.starts_with(&normalized))
        })
        .ok_or_else(|| {
            ValidationError::new(
                "day",
                format!("'{}' is not a weekday (monday..sunday or mon..sun)", raw.trim()),
            )
        })
}

/// Deduplicated and in calendar order starting on Monday.
pub fn normalize(raw_days: &[String]) -> Result<Vec<Weekday>, ValidationError> {
    let mut days = Vec::new();
    for raw in raw_days {
        let day = parse(raw)?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    days.sort_by_key(|day| day.number_days_from_monday());
    Ok(days)
}

pub fn sort_names(names: &mut [String]) {
    names.sort_by_key(|name| {
        parse(name)
            .map(|day| day.number_days_from_monday())
            .unwrap_or(u8::MAX)
    });
}
