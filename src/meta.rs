use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Timelike, Utc};

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Western Indonesia Time (WIB) is UTC+7 all year.
const WIB_OFFSET_HOURS: i64 = 7;

/// `Anamnesis_<name>_<YYYY-MM-DD>.pdf`, with every run of whitespace in `name` replaced by a
/// single underscore.
pub fn export_filename(name: &str, date: NaiveDate) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_ws = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_ws {
                slug.push('_');
            }
            in_ws = true;
        } else {
            slug.push(ch);
            in_ws = false;
        }
    }
    format!("Anamnesis_{slug}_{}.pdf", date.format("%Y-%m-%d"))
}

/// Indonesian long-form timestamp in WIB, e.g. `19 Oktober 2026 pukul 14.30 WIB`.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    let local = instant.naive_utc() + TimeDelta::hours(WIB_OFFSET_HOURS);
    format!(
        "{} {} {} pukul {:02}.{:02} WIB",
        local.day(),
        MONTHS_ID[local.month0() as usize],
        local.year(),
        local.hour(),
        local.minute(),
    )
}
