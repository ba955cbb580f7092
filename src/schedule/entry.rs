use chrono::{NaiveTime, Weekday};
use winnow::Parser;

use crate::{
    schedule::{EntryDefaults, ScheduleEntry},
    Error,
};

pub fn parse_day(text: &str) -> Result<Weekday, Error> {
    parse::weekday
        .parse(text)
        .map_err(|_| Error::InvalidDay(text.to_string()))
}

pub fn parse_start(text: &str) -> Result<NaiveTime, Error> {
    parse::start_time
        .parse(text)
        .map_err(|_| Error::InvalidStartTime(text.to_string()))
}

pub fn parse_hours(text: &str) -> Result<u32, Error> {
    parse::hours
        .parse(text)
        .map_err(|_| Error::InvalidHours(text.to_string()))
}

pub fn parse_cpus(text: &str) -> Result<u32, Error> {
    parse::cpus
        .parse(text)
        .map_err(|_| Error::InvalidCpus(text.to_string()))
}

pub fn parse_mem_gb(text: &str) -> Result<u32, Error> {
    parse::mem_gb
        .parse(text)
        .map_err(|_| Error::InvalidMemGb(text.to_string()))
}

/// Parse one schedule row given as five fields in the fixed column order
/// `day, start, hours, cpus, mem_gb`.
///
/// Fields are trimmed and missing trailing fields are treated as blank. The
/// optional resource fields fall back to `defaults` when blank; `day` and
/// `start` are mandatory.
pub fn parse_row(fields: &[&str], defaults: &EntryDefaults) -> Result<ScheduleEntry, Error> {
    let field = |n: usize| fields.get(n).map(|text| text.trim()).unwrap_or("");

    let weekday = parse_day(field(0))?;
    let start = parse_start(field(1))?;

    let hours = match field(2) {
        "" => defaults.hours,
        text => parse_hours(text)?,
    };

    let cpus = match field(3) {
        "" => defaults.cpus,
        text => parse_cpus(text)?,
    };

    let mem_gb = match field(4) {
        "" => defaults.mem_gb,
        text => parse_mem_gb(text)?,
    };

    Ok(ScheduleEntry::new(weekday, start, hours, cpus, mem_gb))
}

mod parse {
    use chrono::{NaiveTime, Weekday};
    use winnow::{
        ascii::{digit1, Caseless},
        combinator::{alt, opt},
        token::literal,
        ModalResult, Parser,
    };

    pub fn weekday(input: &mut &str) -> ModalResult<Weekday> {
        alt((
            "Mon".value(Weekday::Mon),
            "Tue".value(Weekday::Tue),
            "Wed".value(Weekday::Wed),
            "Thu".value(Weekday::Thu),
            "Fri".value(Weekday::Fri),
            "Sat".value(Weekday::Sat),
            "Sun".value(Weekday::Sun),
        ))
        .parse_next(input)
    }

    fn hour12(input: &mut &str) -> ModalResult<u32> {
        digit1
            .parse_to::<u32>()
            .verify(|hour| (1..=12).contains(hour))
            .parse_next(input)
    }

    fn minute(input: &mut &str) -> ModalResult<u32> {
        digit1
            .parse_to::<u32>()
            .verify(|minute| *minute <= 59)
            .parse_next(input)
    }

    /// `true` means pm.
    fn meridiem(input: &mut &str) -> ModalResult<bool> {
        alt((
            literal(Caseless("am")).value(false),
            literal(Caseless("pm")).value(true),
        ))
        .parse_next(input)
    }

    pub fn start_time(input: &mut &str) -> ModalResult<NaiveTime> {
        (hour12, opt((':', minute)), meridiem)
            .parse_next(input)
            .map(|(hour, minute, pm)| {
                let hour24 = match (hour % 12, pm) {
                    (hour, false) => hour,
                    (hour, true) => hour + 12,
                };

                NaiveTime::from_hms_opt(hour24, minute.map(|(_, m)| m).unwrap_or(0), 0)
                    .expect("valid due to Parser::verify in hour12() and minute()")
            })
    }

    fn positive_number(input: &mut &str) -> ModalResult<u32> {
        digit1
            .parse_to::<u32>()
            .verify(|n| *n > 0)
            .parse_next(input)
    }

    pub fn hours(input: &mut &str) -> ModalResult<u32> {
        (positive_number, opt(literal(Caseless("h"))))
            .parse_next(input)
            .map(|(n, _)| n)
    }

    pub fn cpus(input: &mut &str) -> ModalResult<u32> {
        positive_number.parse_next(input)
    }

    pub fn mem_gb(input: &mut &str) -> ModalResult<u32> {
        (positive_number, opt(literal(Caseless("gb"))))
            .parse_next(input)
            .map(|(n, _)| n)
    }
}
