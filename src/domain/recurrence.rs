//! Recurrence rules for repeating tasks
//!
//! A rule set is stored in the `rrule` tag as clauses joined by `;;`:
//!
//! ```text
//! RRULE:FREQ=WEEKLY;BYDAY=MO,TH;;EXDATE:2021-01-14;;RDATE:2021-01-16
//! ```
//!
//! | Clause   | Meaning                                 |
//! |----------|-----------------------------------------|
//! | `RRULE`  | dates produced by a recurrence rule     |
//! | `EXRULE` | dates removed by a recurrence rule      |
//! | `RDATE`  | one extra date                          |
//! | `EXDATE` | one removed date                        |
//!
//! Rule fields follow RFC 5545 (`FREQ`, `INTERVAL`, `COUNT`, `UNTIL`,
//! `BYMONTH`, `BYMONTHDAY`, `BYDAY`) restricted to whole days. Every rule is
//! anchored at a start date, normally the task's `due` date.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Serialize, Serializer};
use std::fmt;

use super::date::DateValue;
use super::error::FormatError;

/// Separator between clauses of a rule set
pub const CLAUSE_SEPARATOR: &str = ";;";

/// Upper bound on periods scanned for one occurrence
const MAX_PERIODS: i64 = 50_000;

/// Upper bound on excluded candidates skipped in one `next` call
const MAX_SKIPPED: usize = 10_000;

/// Base frequency of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "DAILY" => Some(Frequency::Daily),
            "WEEKLY" => Some(Frequency::Weekly),
            "MONTHLY" => Some(Frequency::Monthly),
            "YEARLY" => Some(Frequency::Yearly),
            _ => None,
        }
    }
}

/// A `BYDAY` entry such as `MO`, `2TU` or `-1FR`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByDay {
    pub ordinal: Option<i32>,
    pub weekday: Weekday,
}

impl fmt::Display for ByDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{}", n)?;
        }
        f.write_str(weekday_code(self.weekday))
    }
}

fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn parse_weekday(code: &str) -> Option<Weekday> {
    match code {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

/// A single RRULE/EXRULE, anchored at a start date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    anchor: DateValue,
    freq: Frequency,
    interval: u32,
    count: Option<u32>,
    until: Option<DateValue>,
    by_month: Vec<u32>,
    by_month_day: Vec<i32>,
    by_day: Vec<ByDay>,
}

impl Rule {
    /// Parses the `KEY=VALUE;...` part of a clause. `clause` is only used
    /// in error messages.
    fn parse(spec: &str, clause: &str, anchor: DateValue) -> Result<Self, FormatError> {
        let mut freq = None;
        let mut interval = None;
        let mut count = None;
        let mut until = None;
        let mut by_month = None;
        let mut by_month_day = None;
        let mut by_day = None;

        for field in spec.split(';').map(str::trim).filter(|f| !f.is_empty()) {
            let (key, value) = field
                .split_once('=')
                .ok_or_else(|| FormatError::recurrence(clause, format!("expected KEY=VALUE, got '{}'", field)))?;
            let key = key.trim().to_ascii_uppercase();
            let value = value.trim().to_ascii_uppercase();

            let duplicate = match key.as_str() {
                "FREQ" => freq
                    .replace(Frequency::parse(&value).ok_or_else(|| {
                        FormatError::recurrence(clause, format!("unsupported frequency '{}'", value))
                    })?)
                    .is_some(),
                "INTERVAL" => interval.replace(parse_positive(&value, clause, "INTERVAL")?).is_some(),
                "COUNT" => count.replace(parse_positive(&value, clause, "COUNT")?).is_some(),
                "UNTIL" => until.replace(parse_until(&value, clause)?).is_some(),
                "BYMONTH" => by_month.replace(parse_by_month(&value, clause)?).is_some(),
                "BYMONTHDAY" => by_month_day.replace(parse_by_month_day(&value, clause)?).is_some(),
                "BYDAY" => by_day.replace(parse_by_day(&value, clause)?).is_some(),
                _ => {
                    return Err(FormatError::recurrence(
                        clause,
                        format!("unsupported field '{}'", key),
                    ))
                }
            };
            if duplicate {
                return Err(FormatError::recurrence(clause, format!("duplicate field '{}'", key)));
            }
        }

        let freq = freq.ok_or_else(|| FormatError::recurrence(clause, "missing FREQ"))?;
        if count.is_some() && until.is_some() {
            return Err(FormatError::recurrence(clause, "COUNT and UNTIL are exclusive"));
        }

        let rule = Self {
            anchor,
            freq,
            interval: interval.unwrap_or(1),
            count,
            until,
            by_month: by_month.unwrap_or_default(),
            by_month_day: by_month_day.unwrap_or_default(),
            by_day: by_day.unwrap_or_default(),
        };
        rule.validate(clause)?;
        Ok(rule)
    }

    fn validate(&self, clause: &str) -> Result<(), FormatError> {
        if self.freq == Frequency::Weekly && !self.by_month_day.is_empty() {
            return Err(FormatError::recurrence(clause, "BYMONTHDAY is not allowed with WEEKLY"));
        }

        let max_ordinal = match self.freq {
            Frequency::Daily | Frequency::Weekly => 0,
            Frequency::Monthly => 5,
            Frequency::Yearly if self.by_month.is_empty() => 53,
            Frequency::Yearly => 5,
        };
        for day in &self.by_day {
            if let Some(n) = day.ordinal {
                if n == 0 || n.abs() > max_ordinal {
                    return Err(FormatError::recurrence(
                        clause,
                        format!("ordinal '{}' is not allowed with {}", day, self.freq.as_str()),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn anchor(&self) -> DateValue {
        self.anchor
    }

    pub fn frequency(&self) -> Frequency {
        self.freq
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn count(&self) -> Option<u32> {
        self.count
    }

    pub fn until(&self) -> Option<DateValue> {
        self.until
    }

    /// Moves the rule to a new start date
    pub fn rebind(&mut self, anchor: DateValue) {
        self.anchor = anchor;
    }

    /// The first occurrence strictly after `after`
    pub fn next_after(&self, after: DateValue) -> Option<DateValue> {
        if matches!(self.until, Some(until) if until <= after) {
            return None;
        }

        // COUNT needs every earlier occurrence, so only unbounded rules may
        // skip ahead to the period containing `after`.
        let first = if self.count.is_none() {
            self.period_containing(after)
        } else {
            0
        };

        let mut emitted = 0u32;
        for period in first..first.saturating_add(MAX_PERIODS) {
            let mut days = self.expand(period)?;
            days.sort_unstable();
            days.dedup();

            for day in days {
                if day < self.anchor.naive() {
                    continue;
                }
                if matches!(self.until, Some(until) if day > until.naive()) {
                    return None;
                }
                if let Some(count) = self.count {
                    if emitted >= count {
                        return None;
                    }
                    emitted += 1;
                }
                if day > after.naive() {
                    return Some(DateValue::from(day));
                }
            }
        }
        None
    }

    /// True if the rule produces `date`
    pub fn occurs_on(&self, date: DateValue) -> bool {
        date.pred()
            .and_then(|before| self.next_after(before))
            .is_some_and(|next| next == date)
    }

    /// Index of the period that contains `date` (0 when before the anchor)
    fn period_containing(&self, date: DateValue) -> i64 {
        if date <= self.anchor {
            return 0;
        }
        let step = i64::from(self.interval);
        let start = self.anchor.naive();
        let date = date.naive();
        let elapsed = match self.freq {
            Frequency::Daily => (date - start).num_days(),
            Frequency::Weekly => (week_start(date) - week_start(start)).num_days() / 7,
            Frequency::Monthly => month_index(date) - month_index(start),
            Frequency::Yearly => i64::from(date.year() - start.year()),
        };
        elapsed / step
    }

    /// Candidate days of one period, unsorted. `None` once the calendar runs out.
    fn expand(&self, period: i64) -> Option<Vec<NaiveDate>> {
        let offset = period.checked_mul(i64::from(self.interval))?;
        let start = self.anchor.naive();

        let days = match self.freq {
            Frequency::Daily => {
                let day = start.checked_add_signed(Duration::try_days(offset)?)?;
                if self.matches_day(day) {
                    vec![day]
                } else {
                    vec![]
                }
            }
            Frequency::Weekly => {
                let monday = week_start(start).checked_add_signed(Duration::try_weeks(offset)?)?;
                let weekdays: Vec<Weekday> = if self.by_day.is_empty() {
                    vec![start.weekday()]
                } else {
                    self.by_day.iter().map(|d| d.weekday).collect()
                };
                (0..7)
                    .filter_map(|i| monday.checked_add_signed(Duration::days(i)))
                    .filter(|d| weekdays.contains(&d.weekday()))
                    .filter(|d| self.by_month.is_empty() || self.by_month.contains(&d.month()))
                    .collect()
            }
            Frequency::Monthly => {
                let index = month_index(start).checked_add(offset)?;
                let (year, month) = from_month_index(index)?;
                if !self.by_month.is_empty() && !self.by_month.contains(&month) {
                    vec![]
                } else {
                    self.expand_month(year, month)
                }
            }
            Frequency::Yearly => {
                let year = i32::try_from(i64::from(start.year()).checked_add(offset)?).ok()?;
                NaiveDate::from_ymd_opt(year, 1, 1)?;
                self.expand_year(year)
            }
        };
        Some(days)
    }

    /// BYxxx filters applied to a single day (DAILY)
    fn matches_day(&self, day: NaiveDate) -> bool {
        if !self.by_month.is_empty() && !self.by_month.contains(&day.month()) {
            return false;
        }
        if !self.by_month_day.is_empty() {
            let len = month_len(day.year(), day.month());
            let resolved = self
                .by_month_day
                .iter()
                .filter_map(|&d| resolve_month_day(d, len));
            if !resolved.into_iter().any(|d| d == day.day()) {
                return false;
            }
        }
        self.by_day.is_empty() || self.by_day.iter().any(|d| d.weekday == day.weekday())
    }

    /// Days of one month selected by BYMONTHDAY/BYDAY, defaulting to the
    /// anchor's day of month
    fn expand_month(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        let len = month_len(year, month);
        let date = |d: u32| NaiveDate::from_ymd_opt(year, month, d);

        if self.by_month_day.is_empty() && self.by_day.is_empty() {
            return date(self.anchor.day()).into_iter().collect();
        }

        let month_days: Option<Vec<u32>> = (!self.by_month_day.is_empty()).then(|| {
            self.by_month_day
                .iter()
                .filter_map(|&d| resolve_month_day(d, len))
                .collect()
        });
        let weekday_days: Option<Vec<u32>> = (!self.by_day.is_empty()).then(|| {
            let days: Vec<NaiveDate> = (1..=len).filter_map(date).collect();
            select_weekdays(&days, &self.by_day)
                .into_iter()
                .map(|d| d.day())
                .collect()
        });

        intersect(month_days, weekday_days)
            .into_iter()
            .filter_map(date)
            .collect()
    }

    /// Days of one year for YEARLY rules
    fn expand_year(&self, year: i32) -> Vec<NaiveDate> {
        if !self.by_month.is_empty() {
            return self
                .by_month
                .iter()
                .flat_map(|&m| self.expand_month(year, m))
                .collect();
        }

        let has_ordinal = self.by_day.iter().any(|d| d.ordinal.is_some());
        if has_ordinal {
            // Ordinals count across the whole year, e.g. 20MO = the 20th Monday
            let days: Vec<NaiveDate> = NaiveDate::from_ymd_opt(year, 1, 1)
                .map(|first| first.iter_days().take_while(|d| d.year() == year).collect())
                .unwrap_or_default();
            let selected = select_weekdays(&days, &self.by_day);
            if self.by_month_day.is_empty() {
                return selected;
            }
            return selected
                .into_iter()
                .filter(|d| {
                    let len = month_len(d.year(), d.month());
                    self.by_month_day
                        .iter()
                        .any(|&md| resolve_month_day(md, len) == Some(d.day()))
                })
                .collect();
        }

        if !self.by_month_day.is_empty() || !self.by_day.is_empty() {
            return (1..=12).flat_map(|m| self.expand_month(year, m)).collect();
        }

        NaiveDate::from_ymd_opt(year, self.anchor.month(), self.anchor.day())
            .into_iter()
            .collect()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={}", self.freq.as_str())?;
        if self.interval != 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={}", count)?;
        }
        if let Some(until) = self.until {
            write!(f, ";UNTIL={}", until.naive().format("%Y%m%d"))?;
        }
        if !self.by_month.is_empty() {
            write!(f, ";BYMONTH={}", join(&self.by_month))?;
        }
        if !self.by_month_day.is_empty() {
            write!(f, ";BYMONTHDAY={}", join(&self.by_month_day))?;
        }
        if !self.by_day.is_empty() {
            write!(f, ";BYDAY={}", join(&self.by_day))?;
        }
        Ok(())
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_positive(value: &str, clause: &str, field: &str) -> Result<u32, FormatError> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(FormatError::recurrence(
            clause,
            format!("{} must be a positive integer, got '{}'", field, value),
        )),
    }
}

fn parse_until(value: &str, clause: &str) -> Result<DateValue, FormatError> {
    let day = value.split('T').next().unwrap_or(value);
    let parsed = if day.contains('-') {
        NaiveDate::parse_from_str(day, "%Y-%m-%d")
    } else {
        NaiveDate::parse_from_str(day, "%Y%m%d")
    };
    parsed
        .map(DateValue::from)
        .map_err(|_| FormatError::recurrence(clause, format!("invalid UNTIL '{}'", value)))
}

fn parse_by_month(value: &str, clause: &str) -> Result<Vec<u32>, FormatError> {
    value
        .split(',')
        .map(|m| match m.trim().parse::<u32>() {
            Ok(n) if (1..=12).contains(&n) => Ok(n),
            _ => Err(FormatError::recurrence(clause, format!("invalid BYMONTH '{}'", m))),
        })
        .collect()
}

fn parse_by_month_day(value: &str, clause: &str) -> Result<Vec<i32>, FormatError> {
    value
        .split(',')
        .map(|d| match d.trim().parse::<i32>() {
            Ok(n) if n != 0 && n.abs() <= 31 => Ok(n),
            _ => Err(FormatError::recurrence(clause, format!("invalid BYMONTHDAY '{}'", d))),
        })
        .collect()
}

fn parse_by_day(value: &str, clause: &str) -> Result<Vec<ByDay>, FormatError> {
    value
        .split(',')
        .map(|entry| {
            let entry = entry.trim();
            let invalid = || FormatError::recurrence(clause, format!("invalid BYDAY '{}'", entry));
            if entry.len() < 2 || !entry.is_char_boundary(entry.len() - 2) {
                return Err(invalid());
            }
            let (ordinal, code) = entry.split_at(entry.len() - 2);
            let weekday = parse_weekday(code).ok_or_else(invalid)?;
            let ordinal = match ordinal {
                "" => None,
                n => Some(n.trim_start_matches('+').parse::<i32>().map_err(|_| invalid())?),
            };
            Ok(ByDay { ordinal, weekday })
        })
        .collect()
}

/// Monday of the week containing `day`
fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

fn month_index(day: NaiveDate) -> i64 {
    i64::from(day.year()) * 12 + i64::from(day.month0())
}

fn from_month_index(index: i64) -> Option<(i32, u32)> {
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}

fn month_len(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// Resolves a signed BYMONTHDAY (-1 = last day) against a month length
fn resolve_month_day(day: i32, len: u32) -> Option<u32> {
    let len = i32::try_from(len).ok()?;
    let resolved = if day > 0 { day } else { len + 1 + day };
    if (1..=len).contains(&resolved) {
        u32::try_from(resolved).ok()
    } else {
        None
    }
}

/// Picks the days of a sorted span matching BYDAY entries; ordinals index
/// into the matches of each weekday (negative counts from the end).
fn select_weekdays(span: &[NaiveDate], by_day: &[ByDay]) -> Vec<NaiveDate> {
    let mut selected = Vec::new();
    for entry in by_day {
        let matches: Vec<NaiveDate> = span
            .iter()
            .copied()
            .filter(|d| d.weekday() == entry.weekday)
            .collect();
        match entry.ordinal {
            None => selected.extend(matches),
            Some(n) if n > 0 => selected.extend(matches.get(n as usize - 1)),
            Some(n) => {
                let back = n.unsigned_abs() as usize;
                if back <= matches.len() {
                    selected.push(matches[matches.len() - back]);
                }
            }
        }
    }
    selected
}

fn intersect(a: Option<Vec<u32>>, b: Option<Vec<u32>>) -> Vec<u32> {
    match (a, b) {
        (Some(a), Some(b)) => a.into_iter().filter(|d| b.contains(d)).collect(),
        (Some(days), None) | (None, Some(days)) => days,
        (None, None) => vec![],
    }
}

/// A set of inclusion/exclusion rules and dates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurrenceRule {
    rrules: Vec<Rule>,
    rdates: Vec<DateValue>,
    exrules: Vec<Rule>,
    exdates: Vec<DateValue>,
}

impl RecurrenceRule {
    /// Parses a `;;`-separated clause list. Rules are anchored at `anchor`.
    ///
    /// Fails on the first malformed clause.
    pub fn parse(text: &str, anchor: DateValue) -> Result<Self, FormatError> {
        let mut set = Self::default();

        for clause in text.split(CLAUSE_SEPARATOR).map(str::trim) {
            if clause.is_empty() {
                continue;
            }
            let (kind, body) = clause
                .split_once(':')
                .ok_or_else(|| FormatError::recurrence(clause, "expected KIND:VALUE"))?;
            let body = body.trim();

            match kind.trim().to_ascii_uppercase().as_str() {
                "RRULE" => set.rrules.push(Rule::parse(body, clause, anchor)?),
                "EXRULE" => set.exrules.push(Rule::parse(body, clause, anchor)?),
                "RDATE" => set.rdates.push(parse_clause_date(body, clause)?),
                "EXDATE" => set.exdates.push(parse_clause_date(body, clause)?),
                other => {
                    return Err(FormatError::recurrence(
                        clause,
                        format!("unknown clause kind '{}'", other),
                    ))
                }
            }
        }

        if set.is_empty() {
            return Err(FormatError::recurrence(text, "no clauses"));
        }
        Ok(set)
    }

    /// Returns true if the set has no clauses at all
    pub fn is_empty(&self) -> bool {
        self.rrules.is_empty()
            && self.rdates.is_empty()
            && self.exrules.is_empty()
            && self.exdates.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rrules
    }

    pub fn exclusion_rules(&self) -> &[Rule] {
        &self.exrules
    }

    pub fn dates(&self) -> &[DateValue] {
        &self.rdates
    }

    pub fn exclusion_dates(&self) -> &[DateValue] {
        &self.exdates
    }

    /// The earliest date strictly after `after` that is included and not
    /// excluded. `None` means the set has no further occurrence.
    pub fn next(&self, after: DateValue) -> Option<DateValue> {
        let mut cursor = after;

        for _ in 0..MAX_SKIPPED {
            let from_rules = self.rrules.iter().filter_map(|r| r.next_after(cursor));
            let from_dates = self.rdates.iter().copied().filter(|d| *d > cursor);
            let candidate = from_rules.chain(from_dates).min()?;

            if !self.is_excluded(candidate) {
                return Some(candidate);
            }
            cursor = candidate;
        }
        None
    }

    fn is_excluded(&self, date: DateValue) -> bool {
        self.exdates.contains(&date) || self.exrules.iter().any(|r| r.occurs_on(date))
    }

    /// Re-anchors every rule on `anchor`. Explicit dates are absolute and
    /// stay where they are.
    pub fn rebind(&mut self, anchor: DateValue) {
        for rule in self.rrules.iter_mut().chain(self.exrules.iter_mut()) {
            rule.rebind(anchor);
        }
    }

    /// Canonical clause text
    pub fn format(&self) -> String {
        self.to_string()
    }
}

fn parse_clause_date(body: &str, clause: &str) -> Result<DateValue, FormatError> {
    DateValue::parse(body)
        .map_err(|_| FormatError::recurrence(clause, format!("invalid date '{}'", body)))
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses = self
            .rrules
            .iter()
            .map(|r| format!("RRULE:{}", r))
            .chain(self.rdates.iter().map(|d| format!("RDATE:{}", d)))
            .chain(self.exrules.iter().map(|r| format!("EXRULE:{}", r)))
            .chain(self.exdates.iter().map(|d| format!("EXDATE:{}", d)));

        let mut first = true;
        for clause in clauses {
            if !first {
                f.write_str(CLAUSE_SEPARATOR)?;
            }
            f.write_str(&clause)?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for RecurrenceRule {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> DateValue {
        DateValue::parse(s).unwrap()
    }

    fn rule(text: &str, anchor: &str) -> RecurrenceRule {
        RecurrenceRule::parse(text, day(anchor)).unwrap()
    }

    #[test]
    fn weekly_from_friday() {
        let set = rule("RRULE:FREQ=WEEKLY", "2021-01-01");
        assert_eq!(set.next(day("2021-01-01")), Some(day("2021-01-08")));
        assert_eq!(set.next(day("2021-01-05")), Some(day("2021-01-08")));
    }

    #[test]
    fn next_is_strictly_after() {
        let set = rule("RRULE:FREQ=DAILY", "2021-01-01");
        assert_eq!(set.next(day("2021-01-01")), Some(day("2021-01-02")));
        assert_eq!(set.next(day("2020-12-25")), Some(day("2021-01-01")));
    }

    #[test]
    fn daily_interval() {
        let set = rule("RRULE:FREQ=DAILY;INTERVAL=3", "2021-01-01");
        assert_eq!(set.next(day("2021-01-01")), Some(day("2021-01-04")));
        assert_eq!(set.next(day("2021-01-05")), Some(day("2021-01-07")));
    }

    #[test]
    fn weekly_by_day() {
        // 2021-01-04 is a Monday
        let set = rule("RRULE:FREQ=WEEKLY;BYDAY=MO,TH", "2021-01-04");
        assert_eq!(set.next(day("2021-01-04")), Some(day("2021-01-07")));
        assert_eq!(set.next(day("2021-01-07")), Some(day("2021-01-11")));
    }

    #[test]
    fn biweekly_skips_odd_weeks() {
        let set = rule("RRULE:FREQ=WEEKLY;INTERVAL=2;BYDAY=TU", "2021-01-04");
        assert_eq!(set.next(day("2021-01-04")), Some(day("2021-01-05")));
        assert_eq!(set.next(day("2021-01-05")), Some(day("2021-01-19")));
    }

    #[test]
    fn monthly_keeps_day_of_month_and_skips_short_months() {
        let set = rule("RRULE:FREQ=MONTHLY", "2021-01-31");
        assert_eq!(set.next(day("2021-01-31")), Some(day("2021-03-31")));
        assert_eq!(set.next(day("2021-03-31")), Some(day("2021-05-31")));
    }

    #[test]
    fn monthly_last_day_and_last_friday() {
        let set = rule("RRULE:FREQ=MONTHLY;BYMONTHDAY=-1", "2021-01-15");
        assert_eq!(set.next(day("2021-01-31")), Some(day("2021-02-28")));

        let set = rule("RRULE:FREQ=MONTHLY;BYDAY=-1FR", "2021-01-01");
        assert_eq!(set.next(day("2021-01-01")), Some(day("2021-01-29")));
        assert_eq!(set.next(day("2021-01-29")), Some(day("2021-02-26")));
    }

    #[test]
    fn monthly_second_tuesday() {
        let set = rule("RRULE:FREQ=MONTHLY;BYDAY=2TU", "2021-01-01");
        assert_eq!(set.next(day("2021-01-01")), Some(day("2021-01-12")));
        assert_eq!(set.next(day("2021-01-12")), Some(day("2021-02-09")));
    }

    #[test]
    fn yearly_on_leap_day() {
        let set = rule("RRULE:FREQ=YEARLY", "2020-02-29");
        assert_eq!(set.next(day("2020-02-29")), Some(day("2024-02-29")));
    }

    #[test]
    fn yearly_by_month_and_weekday() {
        // Thanksgiving: fourth Thursday of November
        let set = rule("RRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=4TH", "2021-01-01");
        assert_eq!(set.next(day("2021-01-01")), Some(day("2021-11-25")));
        assert_eq!(set.next(day("2021-11-25")), Some(day("2022-11-24")));
    }

    #[test]
    fn count_exhausts() {
        let set = rule("RRULE:FREQ=DAILY;COUNT=3", "2021-01-01");
        assert_eq!(set.next(day("2021-01-01")), Some(day("2021-01-02")));
        assert_eq!(set.next(day("2021-01-02")), Some(day("2021-01-03")));
        assert_eq!(set.next(day("2021-01-03")), None);
    }

    #[test]
    fn until_is_inclusive() {
        let set = rule("RRULE:FREQ=WEEKLY;UNTIL=20210115", "2021-01-01");
        assert_eq!(set.next(day("2021-01-08")), Some(day("2021-01-15")));
        assert_eq!(set.next(day("2021-01-15")), None);
    }

    #[test]
    fn exdate_and_exrule_remove_dates() {
        let set = rule("RRULE:FREQ=WEEKLY;;EXDATE:2021-01-08", "2021-01-01");
        assert_eq!(set.next(day("2021-01-01")), Some(day("2021-01-15")));

        // Every day except weekends
        let set = rule(
            "RRULE:FREQ=DAILY;;EXRULE:FREQ=WEEKLY;BYDAY=SA,SU",
            "2021-01-01",
        );
        assert_eq!(set.next(day("2021-01-01")), Some(day("2021-01-04")));
    }

    #[test]
    fn parse_keeps_every_clause_kind() {
        let set = rule(
            "RRULE:FREQ=MONTHLY;INTERVAL=2;;EXRULE:FREQ=YEARLY;;RDATE:2021-03-05;;EXDATE:2021-05-01",
            "2021-01-01",
        );
        assert_eq!(set.rules()[0].frequency(), Frequency::Monthly);
        assert_eq!(set.rules()[0].interval(), 2);
        assert_eq!(set.exclusion_rules()[0].frequency(), Frequency::Yearly);
        assert_eq!(set.exclusion_rules()[0].interval(), 1);
        assert_eq!(set.dates(), &[day("2021-03-05")]);
        assert_eq!(set.exclusion_dates(), &[day("2021-05-01")]);
    }

    #[test]
    fn rdate_adds_dates() {
        let set = rule("RRULE:FREQ=MONTHLY;;RDATE:2021-01-10", "2021-01-01");
        assert_eq!(set.next(day("2021-01-01")), Some(day("2021-01-10")));
        assert_eq!(set.next(day("2021-01-10")), Some(day("2021-02-01")));

        let only_dates = rule("RDATE:2021-03-01;;RDATE:2021-02-01", "2021-01-01");
        assert_eq!(only_dates.next(day("2021-01-15")), Some(day("2021-02-01")));
        assert_eq!(only_dates.next(day("2021-03-01")), None);
    }

    #[test]
    fn rebind_moves_rules_but_not_dates() {
        let mut set = rule("RRULE:FREQ=DAILY;COUNT=2;;EXDATE:2021-01-02", "2021-01-01");
        assert_eq!(set.next(day("2021-01-01")), None);

        set.rebind(day("2021-02-01"));
        assert_eq!(set.rules()[0].anchor(), day("2021-02-01"));
        assert_eq!(set.exclusion_dates(), &[day("2021-01-02")]);
        assert_eq!(set.next(day("2021-02-01")), Some(day("2021-02-02")));
    }

    #[test]
    fn formats_in_canonical_order() {
        let set = rule(
            "EXDATE:2021-01-08;;EXRULE:FREQ=MONTHLY;;RDATE:2021-01-02;;RRULE:freq=weekly;interval=2;byday=mo",
            "2021-01-01",
        );
        assert_eq!(
            set.to_string(),
            "RRULE:FREQ=WEEKLY;INTERVAL=2;BYDAY=MO;;RDATE:2021-01-02;;EXRULE:FREQ=MONTHLY;;EXDATE:2021-01-08"
        );

        let reparsed = RecurrenceRule::parse(&set.format(), day("2021-01-01")).unwrap();
        assert_eq!(reparsed, set);
    }

    #[test]
    fn until_formats_compactly() {
        let set = rule("RRULE:FREQ=DAILY;UNTIL=2021-03-01", "2021-01-01");
        assert_eq!(set.to_string(), "RRULE:FREQ=DAILY;UNTIL=20210301");
        let set = rule("RRULE:FREQ=DAILY;UNTIL=20210301T000000Z", "2021-01-01");
        assert_eq!(set.rules()[0].until(), Some(day("2021-03-01")));
    }

    #[test]
    fn rejects_malformed_clauses() {
        let anchor = day("2021-01-01");
        for bad in [
            "",
            "FREQ=DAILY",
            "RRULE:",
            "RRULE:INTERVAL=2",
            "RRULE:FREQ=HOURLY",
            "RRULE:FREQ=DAILY;INTERVAL=0",
            "RRULE:FREQ=DAILY;COUNT=2;UNTIL=20210101",
            "RRULE:FREQ=DAILY;FREQ=WEEKLY",
            "RRULE:FREQ=WEEKLY;BYMONTHDAY=1",
            "RRULE:FREQ=WEEKLY;BYDAY=1MO",
            "RRULE:FREQ=MONTHLY;BYDAY=XX",
            "RRULE:FREQ=MONTHLY;BYSETPOS=1",
            "RDATE:tomorrow",
            "SOMETHING:else",
        ] {
            assert!(
                matches!(
                    RecurrenceRule::parse(bad, anchor),
                    Err(FormatError::Recurrence { .. })
                ),
                "expected failure for {:?}",
                bad
            );
        }
    }

    #[test]
    fn one_bad_clause_fails_the_whole_set() {
        let result = RecurrenceRule::parse("RRULE:FREQ=DAILY;;RRULE:FREQ=SOMETIMES", day("2021-01-01"));
        assert!(result.is_err());
    }

    #[test]
    fn impossible_rule_has_no_next() {
        let set = rule("RRULE:FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=30", "2021-01-01");
        assert_eq!(set.next(day("2021-01-01")), None);
    }

    #[test]
    fn exclusion_only_set_has_no_next() {
        let set = rule("EXDATE:2021-01-02", "2021-01-01");
        assert_eq!(set.next(day("2021-01-01")), None);
    }
}
