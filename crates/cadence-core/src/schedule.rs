//! Slot allocation for auto-scheduled posts.
//!
//! Allocation is a pure function of its inputs: the caller snapshots the
//! settings once, gathers every pinned calendar date, and passes `now` in.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::domain::{PostFrequency, Settings};

/// Settings snapshot used for one allocation batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulePolicy {
    pub frequency: PostFrequency,
    pub preferred_time: NaiveTime,
    pub timezone: Tz,
}

impl SchedulePolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            frequency: settings.post_frequency,
            preferred_time: settings.preferred_time.time(),
            timezone: settings.timezone,
        }
    }

    /// Calendar date of `at` in the policy timezone.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.timezone).date_naive()
    }

    /// The instant of `preferred_time` on a local calendar date.
    ///
    /// Ambiguous local times resolve to the earlier instant; times skipped by
    /// a DST jump are pushed forward one hour.
    pub fn slot_on(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(self.preferred_time);
        self.timezone
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| {
                self.timezone
                    .from_local_datetime(&(local + Duration::hours(1)))
                    .earliest()
            })
            .map(|at| at.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local))
    }
}

impl PostFrequency {
    /// Advance the cursor by one cadence step.
    fn step(self, date: NaiveDate) -> NaiveDate {
        match self {
            PostFrequency::Daily => date + Days::new(1),
            PostFrequency::EveryOtherDay => date + Days::new(2),
            PostFrequency::ThreeTimesWeekly => match date.weekday() {
                Weekday::Mon | Weekday::Wed => date + Days::new(2),
                _ => date + Days::new(3),
            },
            PostFrequency::FiveTimesWeekly => {
                let mut next = date + Days::new(1);
                while is_weekend(next) {
                    next = next + Days::new(1);
                }
                next
            }
        }
    }

    /// Whether the cadence posts on this weekday at all.
    fn posts_on(self, date: NaiveDate) -> bool {
        match self {
            PostFrequency::Daily | PostFrequency::EveryOtherDay => true,
            PostFrequency::ThreeTimesWeekly => {
                matches!(date.weekday(), Weekday::Mon | Weekday::Wed | Weekday::Fri)
            }
            PostFrequency::FiveTimesWeekly => !is_weekend(date),
        }
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Compute `count` future publish instants.
///
/// The cursor starts at today's preferred time, or tomorrow's when that is not
/// strictly after `now`, then moves forward to the first day the cadence posts
/// on. Each step emits the cursor unless its date is pinned, then advances by
/// one cadence step either way.
///
/// Unlike a literal cursor walk, a `3x-week` or `5x-week` seed that falls off
/// the cadence (a Tuesday, a Saturday) is skipped rather than emitted.
pub fn allocate(
    count: usize,
    pinned: &BTreeSet<NaiveDate>,
    policy: &SchedulePolicy,
    now: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    let mut slots = Vec::with_capacity(count);
    if count == 0 {
        return slots;
    }

    let mut cursor = policy.local_date(now);
    if policy.slot_on(cursor) <= now {
        cursor = cursor + Days::new(1);
    }
    while !policy.frequency.posts_on(cursor) {
        cursor = cursor + Days::new(1);
    }

    while slots.len() < count {
        if !pinned.contains(&cursor) {
            slots.push(policy.slot_on(cursor));
        }
        cursor = policy.frequency.step(cursor);
    }

    slots
}
