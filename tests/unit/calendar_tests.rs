use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use optionchain_rs::prelude::*;

fn ist(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(330 * 60)
        .unwrap()
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
}

#[test]
fn test_bundled_calendar_messages() {
    let calendar = TradingCalendar::nse().unwrap();

    assert_eq!(
        calendar.is_session_open(&ist(2025, 10, 20, 10, 0)),
        (true, "Market open - Monday".to_string())
    );
    assert_eq!(
        calendar.is_session_open(&ist(2025, 10, 18, 10, 0)),
        (false, "Market closed - Saturday (Weekend)".to_string())
    );
    assert_eq!(
        calendar.is_session_open(&ist(2025, 12, 25, 10, 0)).1,
        "Market closed - Thursday (Christmas) (Holiday)"
    );
    assert_eq!(
        calendar.is_session_open(&ist(2025, 10, 20, 8, 10)).1,
        "Market opens in 1h 5m at 09:15"
    );
    assert_eq!(
        calendar.is_session_open(&ist(2025, 10, 20, 15, 41)).1,
        "Market closed for the day"
    );
}

#[test]
fn test_utc_instant_is_converted() {
    let calendar = TradingCalendar::nse().unwrap();
    // 04:00 UTC is 09:30 IST
    let now = Utc.with_ymd_and_hms(2025, 10, 20, 4, 0, 0).unwrap();
    assert!(calendar.session_status(&now).is_open());
}

#[test]
fn test_weekly_expiry_steps_back_over_holiday() {
    let calendar = TradingCalendar::nse().unwrap();
    let close = chrono::NaiveTime::from_hms_opt(15, 30, 0).unwrap();

    let expiry =
        next_weekly_expiry(&calendar, &ist(2026, 10, 16, 12, 0), chrono::Weekday::Tue, 16, close)
            .unwrap();
    assert_eq!(expiry.date(), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    assert_eq!(expiry.label(), "19-OCT-2026");
}

#[test]
fn test_expiry_rolls_after_cutoff() {
    let calendar = TradingCalendar::nse().unwrap();
    let close = chrono::NaiveTime::from_hms_opt(15, 30, 0).unwrap();

    let before = next_weekly_expiry(&calendar, &ist(2025, 10, 14, 15, 59), chrono::Weekday::Tue, 16, close)
        .unwrap();
    assert_eq!(before.label(), "14-OCT-2025");

    let after = next_weekly_expiry(&calendar, &ist(2025, 10, 14, 16, 0), chrono::Weekday::Tue, 16, close)
        .unwrap();
    // 21 October is a holiday
    assert_eq!(after.label(), "20-OCT-2025");
}

#[test]
fn test_custom_calendar_from_json() {
    let calendar = TradingCalendar::from_json(
        r#"{"utc_offset_minutes": 0, "open": "08:00:00", "close": "16:30:00",
            "holidays": [{"date": "2025-12-26"}]}"#,
    )
    .unwrap();
    let boxing_day = Utc.with_ymd_and_hms(2025, 12, 26, 10, 0, 0).unwrap();
    assert_eq!(
        calendar.session_status(&boxing_day).to_string(),
        "Market closed - Friday (2025-12-26) (Holiday)"
    );
}
