//! Weekly opening hours.
//!
//! Schedules are stored as loose `(day, open, close)` rows in whatever order the
//! storage returns them. On read they are folded into a [`WeekHours`], a fixed
//! Monday to Sunday sequence where every day is present and days without a row
//! are marked closed.

use chrono::{NaiveTime, Weekday};
use serde::{Serialize, ser::SerializeStruct};

/// Canonical day order of a [`WeekHours`]
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Format used to read and write opening times
pub const TIME_FORMAT: &str = "%H:%M";

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Accepts full or abbreviated english day names, in any case.
pub fn parse_weekday(value: &str) -> Option<Weekday> {
    value.trim().parse().ok()
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub day: Weekday,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl ScheduleEntry {
    pub fn new(day: Weekday, open: NaiveTime, close: NaiveTime) -> Self {
        Self { day, open, close }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayHours {
    pub day: Weekday,
    /// Opening and closing time, [`None`] when closed
    pub hours: Option<(NaiveTime, NaiveTime)>,
}

impl DayHours {
    pub fn closed(day: Weekday) -> Self {
        Self { day, hours: None }
    }

    pub fn is_closed(&self) -> bool {
        self.hours.is_none()
    }
}

impl Serialize for DayHours {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let (open, close) = match self.hours {
            Some((open, close)) => (
                Some(open.format(TIME_FORMAT).to_string()),
                Some(close.format(TIME_FORMAT).to_string()),
            ),
            None => (None, None),
        };

        let mut s = serializer.serialize_struct("DayHours", 4)?;
        s.serialize_field("day", weekday_name(self.day))?;
        s.serialize_field("open", &open)?;
        s.serialize_field("close", &close)?;
        s.serialize_field("closed", &self.is_closed())?;
        s.end()
    }
}

/// A full week of opening hours, always seven days in [`WEEK`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WeekHours([DayHours; 7]);

impl Default for WeekHours {
    fn default() -> Self {
        Self::closed()
    }
}

impl WeekHours {
    /// A week where every day is closed.
    pub fn closed() -> Self {
        Self(WEEK.map(DayHours::closed))
    }

    /// Folds schedule rows into the canonical week.
    ///
    /// The input order is irrelevant. If a day appears more than once the first
    /// occurrence wins.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ScheduleEntry>,
    {
        let mut week = Self::closed();
        for entry in entries {
            let slot = &mut week.0[entry.day.num_days_from_monday() as usize];
            if slot.hours.is_none() {
                slot.hours = Some((entry.open, entry.close));
            }
        }
        week
    }

    pub fn days(&self) -> &[DayHours; 7] {
        &self.0
    }

    pub fn day(&self, day: Weekday) -> &DayHours {
        &self.0[day.num_days_from_monday() as usize]
    }

    pub fn open_days(&self) -> usize {
        self.0.iter().filter(|d| !d.is_closed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(value: &str) -> NaiveTime {
        parse_time(value).unwrap()
    }

    #[test]
    fn partial_week_is_canonicalized() {
        // Stored out of order, only three days present
        let entries = vec![
            ScheduleEntry::new(Weekday::Fri, t("09:00"), t("22:00")),
            ScheduleEntry::new(Weekday::Mon, t("08:00"), t("17:00")),
            ScheduleEntry::new(Weekday::Wed, t("08:30"), t("17:30")),
        ];

        let week = WeekHours::from_entries(entries);

        assert_eq!(week.days().len(), 7);
        let order: Vec<Weekday> = week.days().iter().map(|d| d.day).collect();
        assert_eq!(order, WEEK.to_vec());

        assert_eq!(week.day(Weekday::Mon).hours, Some((t("08:00"), t("17:00"))));
        assert_eq!(week.day(Weekday::Wed).hours, Some((t("08:30"), t("17:30"))));
        assert_eq!(week.day(Weekday::Fri).hours, Some((t("09:00"), t("22:00"))));
        for day in [Weekday::Tue, Weekday::Thu, Weekday::Sat, Weekday::Sun] {
            assert!(week.day(day).is_closed());
        }
        assert_eq!(week.open_days(), 3);
    }

    #[test]
    fn first_duplicate_wins() {
        let week = WeekHours::from_entries(vec![
            ScheduleEntry::new(Weekday::Sun, t("10:00"), t("14:00")),
            ScheduleEntry::new(Weekday::Sun, t("11:00"), t("15:00")),
        ]);

        assert_eq!(week.day(Weekday::Sun).hours, Some((t("10:00"), t("14:00"))));
        assert_eq!(week.open_days(), 1);
    }

    #[test]
    fn empty_schedule_is_closed_all_week() {
        assert_eq!(WeekHours::from_entries(Vec::new()), WeekHours::closed());
    }

    #[test]
    fn weekday_parsing() {
        assert_eq!(parse_weekday("Monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday(" sun "), Some(Weekday::Sun));
        assert_eq!(parse_weekday("someday"), None);
        assert!(parse_time("25:00").is_none());
    }

    #[test]
    fn day_hours_json() {
        let week = WeekHours::from_entries(vec![ScheduleEntry::new(
            Weekday::Tue,
            t("07:00"),
            t("15:30"),
        )]);

        let json = serde_json::to_value(&week).unwrap();
        assert_eq!(
            json[1],
            serde_json::json!({"day": "tuesday", "open": "07:00", "close": "15:30", "closed": false})
        );
        assert_eq!(
            json[0],
            serde_json::json!({"day": "monday", "open": null, "close": null, "closed": true})
        );
    }
}
