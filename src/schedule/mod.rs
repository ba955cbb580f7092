pub mod entry;
pub mod resolve;
pub mod table;

use std::fmt;

use chrono::{NaiveTime, Timelike, Weekday};

/// Values substituted for blank optional schedule fields.
///
/// Constructed once (from config or [Default]) and passed into parsing, never
/// read from shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryDefaults {
    pub hours: u32,
    pub cpus: u32,
    pub mem_gb: u32,
}

impl Default for EntryDefaults {
    fn default() -> Self {
        EntryDefaults {
            hours: 3,
            cpus: 1,
            mem_gb: 8,
        }
    }
}

/// One recurring weekly notebook slot.
///
/// All five fields are validated at parse time; `hours`, `cpus` and `mem_gb`
/// are always positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    weekday: Weekday,
    start: NaiveTime,
    hours: u32,
    cpus: u32,
    mem_gb: u32,
}

impl ScheduleEntry {
    pub fn new(weekday: Weekday, start: NaiveTime, hours: u32, cpus: u32, mem_gb: u32) -> Self {
        ScheduleEntry {
            weekday,
            start,
            hours,
            cpus,
            mem_gb,
        }
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn cpus(&self) -> u32 {
        self.cpus
    }

    pub fn mem_gb(&self) -> u32 {
        self.mem_gb
    }
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

fn format_start(start: NaiveTime) -> String {
    let (hour12, meridiem) = match start.hour() {
        0 => (12, "am"),
        hour @ 1..=11 => (hour, "am"),
        12 => (12, "pm"),
        hour => (hour - 12, "pm"),
    };

    format!("{}:{:02}{}", hour12, start.minute(), meridiem)
}

impl fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}h, {}, {}gb",
            weekday_name(self.weekday),
            format_start(self.start),
            self.hours,
            self.cpus,
            self.mem_gb
        )
    }
}
