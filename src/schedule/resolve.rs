use chrono::{Datelike, NaiveDateTime, TimeDelta};
use log::debug;

use crate::{
    schedule::{table::ScheduleTable, ScheduleEntry},
    Error,
};

/// Result of resolving a schedule against a reference timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOccurrence {
    pub entry: ScheduleEntry,
    pub fire_time: NaiveDateTime,
    pub residual: ScheduleTable,
}

/// Next absolute date-time at which `entry` fires, relative to `now`.
///
/// A slot on today's weekday whose start time has already passed is pushed
/// out a full week; slots on other weekdays use the next calendar date of
/// that weekday at the slot's start time.
pub fn next_occurrence(entry: &ScheduleEntry, now: NaiveDateTime) -> NaiveDateTime {
    let candidate = now.date().and_time(entry.start());

    let mut days_delay = (entry.weekday().num_days_from_monday() as i64
        - now.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);

    if days_delay == 0 && candidate < now {
        days_delay = 7;
    }

    candidate + TimeDelta::days(days_delay)
}

/// Select the entry with the earliest next occurrence relative to `now`.
///
/// Ties are won by the entry encountered first in table order. The residual
/// table holds every other entry, sorted ascending by its own next
/// occurrence.
pub fn resolve(table: &ScheduleTable, now: NaiveDateTime) -> Result<ResolvedOccurrence, Error> {
    let mut selected: Option<(usize, &ScheduleEntry, NaiveDateTime)> = None;

    for (nth, entry) in table.entries().enumerate() {
        let occurrence = next_occurrence(entry, now);

        // strict `<` so the first-scanned entry wins ties
        if selected.map_or(true, |(_, _, earliest)| occurrence < earliest) {
            selected = Some((nth, entry, occurrence));
        }
    }

    let (selected_nth, entry, fire_time) = selected.ok_or(Error::NoScheduledEntries)?;

    debug!("schedule::resolve: selected `{entry}` firing at {fire_time}");

    let mut residual = table
        .entries()
        .enumerate()
        .filter(|(nth, _)| *nth != selected_nth)
        .map(|(_, entry)| (next_occurrence(entry, now), entry.clone()))
        .collect::<Vec<_>>();

    residual.sort_by_key(|(occurrence, _)| *occurrence);

    Ok(ResolvedOccurrence {
        entry: entry.clone(),
        fire_time,
        residual: ScheduleTable::new(residual.into_iter().map(|(_, entry)| entry).collect()),
    })
}

#[cfg(test)]
mod tests {
    use bolero::{check, gen, TypeGenerator};
    use chrono::{NaiveDate, NaiveTime, Weekday};

    use crate::schedule::EntryDefaults;

    use super::*;

    fn entry(weekday: Weekday, hour: u32, minute: u32) -> ScheduleEntry {
        ScheduleEntry::new(
            weekday,
            NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
            3,
            1,
            8,
        )
    }

    fn datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_next_occurrence_later_today() {
        // 2024-01-03 is a Wednesday
        let now = datetime(2024, 1, 3, 10, 0);

        assert_eq!(
            next_occurrence(&entry(Weekday::Wed, 13, 0), now),
            datetime(2024, 1, 3, 13, 0)
        );
    }

    #[test]
    fn test_next_occurrence_today_already_passed() {
        let now = datetime(2024, 1, 3, 10, 0);

        assert_eq!(
            next_occurrence(&entry(Weekday::Wed, 9, 0), now),
            datetime(2024, 1, 10, 9, 0)
        );
    }

    #[test]
    fn test_next_occurrence_exactly_now_fires_today() {
        let now = datetime(2024, 1, 3, 10, 0);

        // candidate == now is not strictly before now
        assert_eq!(
            next_occurrence(&entry(Weekday::Wed, 10, 0), now),
            datetime(2024, 1, 3, 10, 0)
        );
    }

    #[test]
    fn test_next_occurrence_later_this_week() {
        let now = datetime(2024, 1, 3, 10, 0);

        assert_eq!(
            next_occurrence(&entry(Weekday::Fri, 9, 0), now),
            datetime(2024, 1, 5, 9, 0)
        );
    }

    #[test]
    fn test_next_occurrence_wraps_week_boundary() {
        let now = datetime(2024, 1, 3, 10, 0);

        // Monday comes before Wednesday in the week, so next Monday is Jan 8
        assert_eq!(
            next_occurrence(&entry(Weekday::Mon, 9, 0), now),
            datetime(2024, 1, 8, 9, 0)
        );

        // earlier time-of-day is fine on a different weekday
        assert_eq!(
            next_occurrence(&entry(Weekday::Mon, 1, 0), now),
            datetime(2024, 1, 8, 1, 0)
        );
    }

    #[test]
    fn test_resolve_spec_scenario() {
        let table = ScheduleTable::parse(
            "\
day, start, hours, cpus, mem_gb
Mon, 9:00am, 4h, 2, 16gb
Wed, 1:00pm, 3h, 1, 8gb
",
            &EntryDefaults::default(),
        )
        .unwrap();

        let resolved = resolve(&table, datetime(2024, 1, 3, 10, 0)).unwrap();

        assert_eq!(resolved.entry, entry(Weekday::Wed, 13, 0));
        assert_eq!(resolved.fire_time, datetime(2024, 1, 3, 13, 0));

        assert_eq!(resolved.residual.len(), 1);

        let remaining = resolved.residual.entries().next().unwrap();
        assert_eq!(remaining.weekday(), Weekday::Mon);
        assert_eq!(
            next_occurrence(remaining, datetime(2024, 1, 3, 10, 0)),
            datetime(2024, 1, 8, 9, 0)
        );
    }

    #[test]
    fn test_resolve_empty_table() {
        assert!(matches!(
            resolve(&ScheduleTable::default(), datetime(2024, 1, 3, 10, 0)),
            Err(Error::NoScheduledEntries)
        ));
    }

    #[test]
    fn test_resolve_tie_break_keeps_file_order() {
        let first = ScheduleEntry::new(
            Weekday::Thu,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            4,
            2,
            16,
        );
        let second = ScheduleEntry::new(
            Weekday::Thu,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            1,
            1,
            1,
        );

        let table = ScheduleTable::new(vec![first.clone(), second.clone()]);
        let resolved = resolve(&table, datetime(2024, 1, 3, 10, 0)).unwrap();

        assert_eq!(resolved.entry, first);
        assert_eq!(resolved.residual.entries().collect::<Vec<_>>(), vec![&second]);
    }

    #[test]
    fn test_resolve_residual_sorted_by_occurrence() {
        let table = ScheduleTable::new(vec![
            entry(Weekday::Sun, 9, 0),
            entry(Weekday::Thu, 9, 0),
            entry(Weekday::Fri, 9, 0),
        ]);

        let now = datetime(2024, 1, 3, 10, 0);
        let resolved = resolve(&table, now).unwrap();

        assert_eq!(resolved.entry, entry(Weekday::Thu, 9, 0));

        let residual_days = resolved
            .residual
            .entries()
            .map(|entry| entry.weekday())
            .collect::<Vec<_>>();

        assert_eq!(residual_days, vec![Weekday::Fri, Weekday::Sun]);
    }

    #[derive(Debug, Clone, TypeGenerator)]
    struct ArbitraryEntry {
        #[generator(gen::<u8>().with().bounds(0..=6))]
        weekday: u8,

        #[generator(gen::<u32>().with().bounds(0..=23))]
        hour: u32,

        #[generator(gen::<u32>().with().bounds(0..=59))]
        minute: u32,
    }

    impl ArbitraryEntry {
        fn to_entry(&self) -> ScheduleEntry {
            entry(
                Weekday::try_from(self.weekday).expect("weekday generator is bounded to 0..=6"),
                self.hour,
                self.minute,
            )
        }
    }

    #[derive(Debug, Clone, TypeGenerator)]
    struct ArbitraryNow {
        #[generator(gen::<u32>().with().bounds(0..=4000))]
        days: u32,

        #[generator(gen::<u32>().with().bounds(0..=1439))]
        minutes: u32,
    }

    impl ArbitraryNow {
        fn to_datetime(&self) -> NaiveDateTime {
            datetime(2020, 1, 1, 0, 0)
                + TimeDelta::days(self.days as i64)
                + TimeDelta::minutes(self.minutes as i64)
        }
    }

    #[test]
    fn test_arbitrary_occurrence_within_coming_week() {
        check!()
            .with_generator(gen::<(ArbitraryEntry, ArbitraryNow)>())
            .with_max_len(1000)
            .for_each(|(entry, now)| {
                let now = now.to_datetime();
                let occurrence = next_occurrence(&entry.to_entry(), now);

                assert!(occurrence >= now);
                assert!(occurrence < now + TimeDelta::days(8));
                assert_eq!(occurrence.weekday(), entry.to_entry().weekday());
                assert_eq!(occurrence.time(), entry.to_entry().start());
            });
    }

    #[test]
    fn test_arbitrary_resolve_minimality_and_residual() {
        check!()
            .with_generator((
                gen::<Vec<ArbitraryEntry>>().with().len(1..=8usize),
                gen::<ArbitraryNow>(),
            ))
            .with_max_len(1000)
            .for_each(|(entries, now)| {
                let now = now.to_datetime();
                let table =
                    ScheduleTable::new(entries.iter().map(ArbitraryEntry::to_entry).collect());

                let resolved = resolve(&table, now).expect("non-empty table must resolve");

                assert_eq!(resolved.residual.len(), table.len() - 1);

                for entry in table.entries() {
                    assert!(resolved.fire_time <= next_occurrence(entry, now));
                }

                let residual_times = resolved
                    .residual
                    .entries()
                    .map(|entry| next_occurrence(entry, now))
                    .collect::<Vec<_>>();

                assert!(residual_times.windows(2).all(|pair| pair[0] <= pair[1]));
            });
    }
}
