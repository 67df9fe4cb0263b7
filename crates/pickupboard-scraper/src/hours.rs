//! Store opening hours.
//!
//! Parsing turns the upstream's locale-formatted `storeDays` / `storeTimings`
//! strings into [`HoursRule`]s; evaluation is a pure function of those rules
//! and a local wall-clock time. Both English and Traditional Chinese
//! phrasings are understood.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use regex::Regex;

use crate::types::RawHoursEntry;

const MINUTES_PER_DAY: u32 = 24 * 60;

const ENGLISH_DAYS: &[(&str, Weekday)] = &[
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("saturday", Weekday::Sat),
    ("tuesday", Weekday::Tue),
    ("monday", Weekday::Mon),
    ("friday", Weekday::Fri),
    ("sunday", Weekday::Sun),
    ("thurs", Weekday::Thu),
    ("tues", Weekday::Tue),
    ("thur", Weekday::Thu),
    ("mon", Weekday::Mon),
    ("tue", Weekday::Tue),
    ("wed", Weekday::Wed),
    ("thu", Weekday::Thu),
    ("fri", Weekday::Fri),
    ("sat", Weekday::Sat),
    ("sun", Weekday::Sun),
];

const CHINESE_DAY_PREFIXES: &[&str] = &["星期", "禮拜", "週", "周"];
const EVERY_DAY: &[&str] = &["every day", "everyday", "daily", "每日", "每天", "天天"];
const RANGE_SEPARATORS: &[&str] = &["–", "—", "-", "~", "～", "至", "到", " to "];
const LIST_SEPARATORS: &[&str] = &[",", "，", "、", "&", "/", " and "];
const CLOSED_MARKERS: &[&str] = &["closed", "休息", "公休", "不營業", "暫停營業"];

/// A set of weekdays, bit `n` = `n` days from Monday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DaySet(u8);

impl DaySet {
    pub const ALL: DaySet = DaySet(0b111_1111);

    #[must_use]
    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    /// Inclusive, wrapping past Sunday (`Sat-Mon` = Sat, Sun, Mon).
    fn insert_range(&mut self, start: Weekday, end: Weekday) {
        let mut day = start;
        loop {
            self.insert(day);
            if day == end {
                break;
            }
            day = day.succ();
        }
    }
}

/// Minutes since local midnight; `close` exceeds 1440 when the window runs
/// past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub open: u32,
    pub close: u32,
}

impl TimeWindow {
    fn new(open: u32, close: u32) -> Self {
        let close = if close <= open {
            close + MINUTES_PER_DAY
        } else {
            close
        };
        Self { open, close }
    }

    #[must_use]
    pub fn contains(self, minute: u32) -> bool {
        self.open <= minute && minute < self.close
    }
}

/// One line of a store's weekly hours table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoursRule {
    pub days: DaySet,
    /// `None` when the line says the store is closed or the time is unreadable.
    pub window: Option<TimeWindow>,
    /// The upstream's own phrasing, shown to readers as today's hours.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoursStatus {
    pub is_open: bool,
    pub today_hours: Option<String>,
}

/// Converts the upstream hours table to rules, dropping lines whose days
/// cannot be read.
#[must_use]
pub fn parse_hours(entries: &[RawHoursEntry]) -> Vec<HoursRule> {
    entries
        .iter()
        .filter_map(|entry| {
            let days = parse_days(entry.store_days.as_deref()?);
            if days.is_empty() {
                return None;
            }
            let label = entry.store_timings.as_deref().unwrap_or_default().trim();
            Some(HoursRule {
                days,
                window: parse_window(label),
                label: label.to_string(),
            })
        })
        .collect()
}

/// Evaluates `rules` at the local time `now`.
///
/// The first rule covering today's weekday decides `today_hours`. A store with
/// no rule for today is closed. Yesterday's window still counts while it runs
/// past midnight.
#[must_use]
pub fn evaluate_hours(rules: &[HoursRule], now: NaiveDateTime) -> HoursStatus {
    let today = now.weekday();
    let minute = now.hour() * 60 + now.minute();

    let Some(rule) = rules.iter().find(|r| r.days.contains(today)) else {
        return HoursStatus {
            is_open: false,
            today_hours: None,
        };
    };

    let open_today = rule.window.is_some_and(|w| w.contains(minute));
    let open_from_yesterday = rules
        .iter()
        .find(|r| r.days.contains(today.pred()))
        .and_then(|r| r.window)
        .is_some_and(|w| w.close > MINUTES_PER_DAY && minute + MINUTES_PER_DAY < w.close);

    HoursStatus {
        is_open: open_today || open_from_yesterday,
        today_hours: Some(rule.label.clone()).filter(|s| !s.is_empty()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayToken {
    Day(Weekday),
    Range,
    List,
    All,
}

/// Parses a day expression such as `"Mon - Fri:"`, `"週一至週五"` or `"星期六、日"`.
#[must_use]
pub fn parse_days(raw: &str) -> DaySet {
    let mut set = DaySet::default();
    let mut last_day: Option<Weekday> = None;
    let mut in_range = false;

    for token in tokenize_days(&raw.to_lowercase()) {
        match token {
            DayToken::All => set = DaySet::ALL,
            DayToken::Day(day) => {
                match last_day {
                    Some(start) if in_range => set.insert_range(start, day),
                    _ => set.insert(day),
                }
                last_day = Some(day);
                in_range = false;
            }
            DayToken::Range => in_range = last_day.is_some(),
            DayToken::List => in_range = false,
        }
    }
    set
}

fn tokenize_days(lower: &str) -> Vec<DayToken> {
    let mut tokens = Vec::new();
    let mut rest = lower;

    while let Some(ch) = rest.chars().next() {
        if let Some(len) = EVERY_DAY
            .iter()
            .find(|m| rest.starts_with(**m))
            .map(|m| m.len())
        {
            tokens.push(DayToken::All);
            rest = &rest[len..];
            continue;
        }

        if let Some((day, len)) = match_chinese_day(rest, tokens.last().copied()) {
            tokens.push(DayToken::Day(day));
            rest = &rest[len..];
            continue;
        }

        if let Some((word, day)) = ENGLISH_DAYS.iter().find(|(w, _)| rest.starts_with(*w)) {
            tokens.push(DayToken::Day(*day));
            rest = &rest[word.len()..];
            continue;
        }

        if let Some(sep) = RANGE_SEPARATORS.iter().find(|s| rest.starts_with(**s)) {
            tokens.push(DayToken::Range);
            rest = &rest[sep.len()..];
            continue;
        }

        if let Some(sep) = LIST_SEPARATORS.iter().find(|s| rest.starts_with(**s)) {
            tokens.push(DayToken::List);
            rest = &rest[sep.len()..];
            continue;
        }

        rest = &rest[ch.len_utf8()..];
    }

    tokens
}

/// Matches `星期一`, `週六`, or a bare numeral such as the `五` in `週一至五`
/// (bare numerals only count right after a range or list separator).
fn match_chinese_day(rest: &str, previous: Option<DayToken>) -> Option<(Weekday, usize)> {
    for prefix in CHINESE_DAY_PREFIXES {
        if let Some(after) = rest.strip_prefix(prefix) {
            let numeral = after.chars().next()?;
            if let Some(day) = chinese_numeral_day(numeral) {
                return Some((day, prefix.len() + numeral.len_utf8()));
            }
        }
    }

    if matches!(previous, Some(DayToken::Range | DayToken::List)) {
        let numeral = rest.chars().next()?;
        if let Some(day) = chinese_numeral_day(numeral) {
            return Some((day, numeral.len_utf8()));
        }
    }
    None
}

fn chinese_numeral_day(c: char) -> Option<Weekday> {
    match c {
        '一' => Some(Weekday::Mon),
        '二' => Some(Weekday::Tue),
        '三' => Some(Weekday::Wed),
        '四' => Some(Weekday::Thu),
        '五' => Some(Weekday::Fri),
        '六' => Some(Weekday::Sat),
        '日' | '天' => Some(Weekday::Sun),
        _ => None,
    }
}

fn time_regex() -> &'static Regex {
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    TIME_RE.get_or_init(|| {
        Regex::new(
            r"(?i)(上午|下午|中午|晚上|凌晨)?\s*(\d{1,2})(?:\s*[:：]\s*(\d{2}))?\s*(a\.?\s?m\.?|p\.?\s?m\.?)?",
        )
        .expect("valid regex")
    })
}

/// Parses a time range such as `"10:00 - 21:00"`, `"10:00 a.m. - 9:00 p.m."`
/// or `"上午10:00 - 下午9:00"`. Returns `None` for closed days or unreadable text.
#[must_use]
pub fn parse_window(raw: &str) -> Option<TimeWindow> {
    let lower = raw.to_lowercase();
    if CLOSED_MARKERS.iter().any(|m| lower.contains(m)) {
        return None;
    }

    let mut times = time_regex().captures_iter(&lower).filter_map(|cap| {
        let prefix = cap.get(1).map(|m| m.as_str());
        let hour = cap.get(2)?.as_str().parse::<u32>().ok()?;
        let minute = cap.get(3).map(|m| m.as_str());
        let suffix = cap.get(4).map(|m| m.as_str());
        // A bare number without a colon or meridiem is not a time of day.
        if minute.is_none() && prefix.is_none() && suffix.is_none() {
            return None;
        }
        let minute = minute.map_or(Some(0), |m| m.parse::<u32>().ok())?;
        to_minutes(hour, minute, prefix, suffix)
    });

    let open = times.next()?;
    let close = times.next()?;
    Some(TimeWindow::new(open, close))
}

fn to_minutes(hour: u32, minute: u32, prefix: Option<&str>, suffix: Option<&str>) -> Option<u32> {
    if hour > 24 || minute >= 60 {
        return None;
    }

    let is_pm = suffix.is_some_and(|s| s.starts_with('p')) || matches!(prefix, Some("下午" | "晚上"));
    let is_am = suffix.is_some_and(|s| s.starts_with('a')) || matches!(prefix, Some("上午" | "凌晨"));
    let is_noon = matches!(prefix, Some("中午"));
    // 晚上12點 is midnight; a closing midnight wraps to 24:00 in TimeWindow::new.
    let is_midnight = hour == 12 && (is_am || matches!(prefix, Some("晚上")));

    let hour = if (is_pm && hour < 12) || (is_noon && hour < 11) {
        hour + 12
    } else if is_midnight {
        0
    } else {
        hour
    };

    let total = hour * 60 + minute;
    (total <= MINUTES_PER_DAY).then_some(total)
}

#[cfg(test)]
#[path = "hours_test.rs"]
mod tests;
