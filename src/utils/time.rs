//! Calendar boundaries, differences and predicates on `chrono` times.

use chrono::{
    DateTime, Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime,
    ParseResult, TimeZone, Utc, Weekday,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

pub fn now_unix_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn format_time<Tz>(t: &DateTime<Tz>, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    t.format(format).to_string()
}

pub fn format_now(format: &str) -> String {
    Local::now().format(format).to_string()
}

pub fn parse_datetime(format: &str, value: &str) -> ParseResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, format)
}

pub fn parse_date(format: &str, value: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(value, format)
}

fn last_nanosecond() -> NaiveTime {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN)
}

/// Local wall time in `tz`; gaps from DST transitions resolve as UTC.
fn at_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

fn on_date<Tz: TimeZone>(t: &DateTime<Tz>, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    at_local(&t.timezone(), date.and_time(time))
}

pub fn start_of_day<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    on_date(t, t.date_naive(), NaiveTime::MIN)
}

pub fn end_of_day<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    on_date(t, t.date_naive(), last_nanosecond())
}

/// Weeks start on Monday.
pub fn start_of_week<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    let date = t.date_naive();
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    on_date(t, monday, NaiveTime::MIN)
}

pub fn end_of_week<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    let date = t.date_naive();
    let sunday = date + Duration::days(6 - date.weekday().num_days_from_monday() as i64);
    on_date(t, sunday, last_nanosecond())
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn start_of_month<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    on_date(t, first_of_month(t.date_naive()), NaiveTime::MIN)
}

pub fn end_of_month<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    let first = first_of_month(t.date_naive());
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first);
    on_date(t, last, last_nanosecond())
}

pub fn start_of_year<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    let date = NaiveDate::from_ymd_opt(t.year(), 1, 1).unwrap_or_else(|| t.date_naive());
    on_date(t, date, NaiveTime::MIN)
}

pub fn end_of_year<Tz: TimeZone>(t: &DateTime<Tz>) -> DateTime<Tz> {
    let date = NaiveDate::from_ymd_opt(t.year(), 12, 31).unwrap_or_else(|| t.date_naive());
    on_date(t, date, last_nanosecond())
}

/// Whole days between two instants, order-insensitive.
pub fn diff_in_days<Tz: TimeZone>(a: &DateTime<Tz>, b: &DateTime<Tz>) -> i64 {
    (b.clone() - a.clone()).num_days().abs()
}

pub fn diff_in_hours<Tz: TimeZone>(a: &DateTime<Tz>, b: &DateTime<Tz>) -> i64 {
    (b.clone() - a.clone()).num_hours().abs()
}

pub fn diff_in_minutes<Tz: TimeZone>(a: &DateTime<Tz>, b: &DateTime<Tz>) -> i64 {
    (b.clone() - a.clone()).num_minutes().abs()
}

fn today_in<Tz: TimeZone>(t: &DateTime<Tz>) -> NaiveDate {
    Utc::now().with_timezone(&t.timezone()).date_naive()
}

pub fn is_today<Tz: TimeZone>(t: &DateTime<Tz>) -> bool {
    t.date_naive() == today_in(t)
}

pub fn is_yesterday<Tz: TimeZone>(t: &DateTime<Tz>) -> bool {
    today_in(t).pred_opt() == Some(t.date_naive())
}

pub fn is_tomorrow<Tz: TimeZone>(t: &DateTime<Tz>) -> bool {
    today_in(t).succ_opt() == Some(t.date_naive())
}

pub fn is_weekend<Tz: TimeZone>(t: &DateTime<Tz>) -> bool {
    matches!(t.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_workday<Tz: TimeZone>(t: &DateTime<Tz>) -> bool {
    !is_weekend(t)
}

/// Completed years between `birth` and `on`.
pub fn age_on(birth: NaiveDate, on: NaiveDate) -> i32 {
    let mut age = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

pub fn age(birth: NaiveDate) -> i32 {
    age_on(birth, Local::now().date_naive())
}

/// Seconds and minutes as integers, hours and days to one decimal.
pub fn human_duration(d: Duration) -> String {
    let seconds = d.num_milliseconds() as f64 / 1000.0;
    if d < Duration::minutes(1) {
        format!("{seconds:.0}秒")
    } else if d < Duration::hours(1) {
        format!("{:.0}分钟", seconds / 60.0)
    } else if d < Duration::days(1) {
        format!("{:.1}小时", seconds / 3600.0)
    } else {
        format!("{:.1}天", seconds / 86400.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn at(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).unwrap().and_utc()
    }

    #[test]
    fn day_and_week_bounds() {
        let t = at("2025-03-13 15:04:05");
        assert_eq!(start_of_day(&t), at("2025-03-13 00:00:00"));
        assert_eq!(end_of_day(&t).nanosecond(), 999_999_999);
        assert_eq!(start_of_week(&t), at("2025-03-10 00:00:00"));
        assert_eq!(end_of_week(&t).date_naive().to_string(), "2025-03-16");

        let sunday = at("2025-03-16 08:00:00");
        assert_eq!(start_of_week(&sunday), at("2025-03-10 00:00:00"));
    }

    #[test]
    fn month_and_year_bounds() {
        let t = at("2024-02-10 12:00:00");
        assert_eq!(start_of_month(&t), at("2024-02-01 00:00:00"));
        assert_eq!(end_of_month(&t).date_naive().to_string(), "2024-02-29");
        assert_eq!(start_of_year(&t), at("2024-01-01 00:00:00"));
        assert_eq!(end_of_year(&t).date_naive().to_string(), "2024-12-31");

        let december = at("2024-12-05 00:00:00");
        assert_eq!(end_of_month(&december).date_naive().to_string(), "2024-12-31");
    }

    #[test]
    fn differences_are_symmetric() {
        let a = at("2025-01-01 00:00:00");
        let b = at("2025-01-03 06:30:00");
        assert_eq!(diff_in_days(&a, &b), 2);
        assert_eq!(diff_in_days(&b, &a), 2);
        assert_eq!(diff_in_hours(&a, &b), 54);
        assert_eq!(diff_in_minutes(&b, &a), 54 * 60 + 30);
    }

    #[test]
    fn relative_days() {
        let now = Utc::now();
        assert!(is_today(&now));
        assert!(is_yesterday(&(now - Duration::days(1))));
        assert!(is_tomorrow(&(now + Duration::days(1))));
        assert!(is_weekend(&at("2025-03-15 10:00:00")));
        assert!(is_workday(&at("2025-03-14 10:00:00")));
    }

    #[test]
    fn ages() {
        let birth = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2025, 6, 14).unwrap()), 24);
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()), 25);
    }

    #[test]
    fn human_durations() {
        assert_eq!(human_duration(Duration::seconds(42)), "42秒");
        assert_eq!(human_duration(Duration::minutes(5)), "5分钟");
        assert_eq!(human_duration(Duration::minutes(90)), "1.5小时");
        assert_eq!(human_duration(Duration::hours(36)), "1.5天");
    }

    #[test]
    fn parsing_and_formatting() {
        let t = parse_datetime(DATETIME_FORMAT, "2025-03-13 15:04:05").unwrap().and_utc();
        assert_eq!(format_time(&t, DATE_FORMAT), "2025-03-13");
        assert_eq!(format_time(&t, TIME_FORMAT), "15:04:05");
        assert!(parse_date(DATE_FORMAT, "2025-13-01").is_err());
    }
}
