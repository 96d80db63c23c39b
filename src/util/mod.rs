const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Current time as an ISO-8601 string (browser clock).
pub(crate) fn now_iso() -> String {
    js_sys::Date::new_0().to_iso_string().into()
}

/// `2024-03-05T10:00:00.000Z` -> `Mar 5, 2024`. Anything unparseable is returned as is.
pub(crate) fn format_short_date(iso: &str) -> String {
    short_date(iso.get(..10).unwrap_or(iso)).unwrap_or_else(|| iso.to_string())
}

fn short_date(date: &str) -> Option<String> {
    let mut parts = date.splitn(3, '-');
    let y: u32 = parts.next()?.parse().ok()?;
    let m: usize = parts.next()?.parse().ok()?;
    let d: u32 = parts.next()?.parse().ok()?;
    let month = MONTHS.get(m.checked_sub(1)?)?;
    (1..=31).contains(&d).then(|| format!("{month} {d}, {y}"))
}
