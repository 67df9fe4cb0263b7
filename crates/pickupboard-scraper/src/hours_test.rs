use chrono::NaiveDate;

use super::*;

/// 2026-10-19 is a Monday.
fn at(day_offset: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19 + day_offset)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn entry(days: &str, timings: &str) -> RawHoursEntry {
    RawHoursEntry {
        store_days: Some(days.to_string()),
        store_timings: Some(timings.to_string()),
    }
}

fn weekdays(set: DaySet) -> Vec<Weekday> {
    [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ]
    .into_iter()
    .filter(|d| set.contains(*d))
    .collect()
}

#[test]
fn parse_days_english_range() {
    assert_eq!(
        weekdays(parse_days("Mon - Fri:")),
        vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri
        ]
    );
}

#[test]
fn parse_days_full_names_and_lists() {
    assert_eq!(
        weekdays(parse_days("Saturday and Sunday")),
        vec![Weekday::Sat, Weekday::Sun]
    );
    assert_eq!(
        weekdays(parse_days("Tues, Thurs")),
        vec![Weekday::Tue, Weekday::Thu]
    );
}

#[test]
fn parse_days_chinese_range_and_bare_numerals() {
    assert_eq!(
        weekdays(parse_days("週一至週五：")),
        vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri
        ]
    );
    assert_eq!(
        weekdays(parse_days("星期一至四")),
        vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu]
    );
    assert_eq!(
        weekdays(parse_days("星期六、日")),
        vec![Weekday::Sat, Weekday::Sun]
    );
}

#[test]
fn parse_days_wrapping_range() {
    assert_eq!(
        weekdays(parse_days("Sat - Mon")),
        vec![Weekday::Mon, Weekday::Sat, Weekday::Sun]
    );
}

#[test]
fn parse_days_every_day() {
    assert_eq!(parse_days("Daily"), DaySet::ALL);
    assert_eq!(parse_days("每日"), DaySet::ALL);
}

#[test]
fn parse_days_unreadable_is_empty() {
    assert!(parse_days("Holiday hours").is_empty());
}

#[test]
fn parse_window_24_hour() {
    assert_eq!(
        parse_window("10:00 - 21:00"),
        Some(TimeWindow {
            open: 600,
            close: 1260
        })
    );
}

#[test]
fn parse_window_meridiem_suffixes() {
    assert_eq!(
        parse_window("10:00 a.m. - 9:30 p.m."),
        Some(TimeWindow {
            open: 600,
            close: 1290
        })
    );
    assert_eq!(
        parse_window("12 PM – 8 PM"),
        Some(TimeWindow {
            open: 720,
            close: 1200
        })
    );
}

#[test]
fn parse_window_chinese_meridiem_prefixes() {
    assert_eq!(
        parse_window("上午11:00 - 晚上9:30"),
        Some(TimeWindow {
            open: 660,
            close: 1290
        })
    );
}

#[test]
fn parse_window_evening_twelve_is_midnight() {
    assert_eq!(
        parse_window("上午10:00 - 晚上12:00"),
        Some(TimeWindow {
            open: 600,
            close: 1440
        })
    );
    assert_eq!(
        parse_window("下午6:00 - 凌晨12:30"),
        Some(TimeWindow {
            open: 1080,
            close: 1470
        })
    );
}

#[test]
fn store_open_until_midnight_is_open_mid_afternoon() {
    let rules = parse_hours(&[entry("每日", "上午10:00 - 晚上12:00")]);
    assert!(evaluate_hours(&rules, at(0, 15, 0)).is_open);
    assert!(evaluate_hours(&rules, at(0, 23, 59)).is_open);
    assert!(!evaluate_hours(&rules, at(1, 0, 0)).is_open);
}

#[test]
fn parse_window_wraps_past_midnight() {
    assert_eq!(
        parse_window("8:00 PM - 2:00 AM"),
        Some(TimeWindow {
            open: 1200,
            close: 1560
        })
    );
}

#[test]
fn parse_window_closed_is_none() {
    assert_eq!(parse_window("Closed"), None);
    assert_eq!(parse_window("休息"), None);
    assert_eq!(parse_window(""), None);
}

#[test]
fn store_open_ten_to_nine_is_open_mid_afternoon() {
    let rules = parse_hours(&[entry("Daily", "10:00 - 21:00")]);
    let status = evaluate_hours(&rules, at(0, 15, 0));
    assert!(status.is_open);
    assert_eq!(status.today_hours.as_deref(), Some("10:00 - 21:00"));
}

#[test]
fn store_open_ten_to_nine_is_closed_late_evening() {
    let rules = parse_hours(&[entry("Daily", "10:00 - 21:00")]);
    assert!(!evaluate_hours(&rules, at(0, 22, 0)).is_open);
    assert!(!evaluate_hours(&rules, at(0, 21, 0)).is_open);
    assert!(evaluate_hours(&rules, at(0, 10, 0)).is_open);
}

#[test]
fn no_rule_for_today_is_closed_without_hours() {
    let rules = parse_hours(&[entry("Mon - Fri", "10:00 - 21:00")]);
    let saturday = at(5, 15, 0);
    let status = evaluate_hours(&rules, saturday);
    assert!(!status.is_open);
    assert!(status.today_hours.is_none());
}

#[test]
fn first_matching_rule_decides_today() {
    let rules = parse_hours(&[
        entry("週一至週五", "11:00 - 21:30"),
        entry("週六至週日", "10:00 - 22:00"),
    ]);
    let saturday = at(5, 10, 30);
    let status = evaluate_hours(&rules, saturday);
    assert!(status.is_open);
    assert_eq!(status.today_hours.as_deref(), Some("10:00 - 22:00"));

    let monday = at(0, 10, 30);
    assert!(!evaluate_hours(&rules, monday).is_open);
}

#[test]
fn late_window_carries_into_next_morning() {
    let rules = parse_hours(&[entry("Daily", "6:00 PM - 2:00 AM")]);
    let tuesday_early = at(1, 1, 30);
    assert!(evaluate_hours(&rules, tuesday_early).is_open);
    assert!(!evaluate_hours(&rules, at(1, 2, 30)).is_open);
}

#[test]
fn closed_day_reports_label_but_not_open() {
    let rules = parse_hours(&[entry("Sun", "Closed"), entry("Mon-Sat", "10:00 - 21:00")]);
    let sunday = at(6, 12, 0);
    let status = evaluate_hours(&rules, sunday);
    assert!(!status.is_open);
    assert_eq!(status.today_hours.as_deref(), Some("Closed"));
}

#[test]
fn entries_without_days_are_dropped() {
    let rules = parse_hours(&[RawHoursEntry {
        store_days: None,
        store_timings: Some("10:00 - 21:00".to_string()),
    }]);
    assert!(rules.is_empty());
}
