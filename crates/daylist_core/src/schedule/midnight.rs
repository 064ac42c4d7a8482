//! Local calendar boundary arithmetic.

use chrono::{DateTime, Duration as TimeDelta, Local, NaiveTime, TimeZone, Utc};

// DST gaps are whole quarter hours in every zone in use.
const GAP_PROBE_STEP_MINUTES: i64 = 15;
const GAP_PROBE_LIMIT: i64 = 4 * 24;

/// Returns `00:00:00.000` of the day after `now`, in `now`'s zone.
///
/// When that local midnight is skipped by a DST transition, the first
/// quarter-hour that exists afterwards is used. When it is ambiguous, the
/// earlier instant wins.
pub fn next_local_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let zone = now.timezone();
    let Some(tomorrow) = now.date_naive().succ_opt() else {
        return now.clone() + TimeDelta::days(1);
    };
    let midnight = tomorrow.and_time(NaiveTime::MIN);

    (0..=GAP_PROBE_LIMIT)
        .find_map(|step| {
            let probe = midnight + TimeDelta::minutes(step * GAP_PROBE_STEP_MINUTES);
            zone.from_local_datetime(&probe).earliest()
        })
        .unwrap_or_else(|| now.clone() + TimeDelta::days(1))
}

/// Next midnight in the platform zone after the UTC instant `now`.
pub fn next_system_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    next_local_midnight(&now.with_timezone(&Local)).with_timezone(&Utc)
}

#[cfg(test)]
mod tests {
    use super::{next_local_midnight, next_system_midnight};
    use chrono::{
        Duration as TimeDelta, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
        TimeZone, Timelike, Utc,
    };

    /// Zone that shifts one hour at local 00:00 on 2026-09-06.
    ///
    /// `FALL_BACK = false` jumps from -04:00 to -03:00, so 00:00..01:00 is
    /// skipped. `FALL_BACK = true` goes from -03:00 to -04:00 at 01:00, so
    /// 00:00..01:00 happens twice.
    #[derive(Debug, Clone, Copy)]
    struct ShiftZone<const FALL_BACK: bool>;

    fn hours_west(hours: i32) -> FixedOffset {
        FixedOffset::west_opt(hours * 3600).unwrap()
    }

    fn shift_day_start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, 6)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    impl<const FALL_BACK: bool> ShiftZone<FALL_BACK> {
        fn offsets() -> (FixedOffset, FixedOffset) {
            if FALL_BACK {
                (hours_west(3), hours_west(4))
            } else {
                (hours_west(4), hours_west(3))
            }
        }
    }

    impl<const FALL_BACK: bool> TimeZone for ShiftZone<FALL_BACK> {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            Self
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let (before, after) = Self::offsets();
            let start = shift_day_start();
            if *local < start {
                LocalResult::Single(before)
            } else if *local >= start + TimeDelta::hours(1) {
                LocalResult::Single(after)
            } else if FALL_BACK {
                LocalResult::Ambiguous(before, after)
            } else {
                LocalResult::None
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            // Both variants switch at 04:00 UTC.
            let (before, after) = Self::offsets();
            if *utc < shift_day_start() + TimeDelta::hours(4) {
                before
            } else {
                after
            }
        }
    }

    #[test]
    fn late_evening_rolls_to_next_day() {
        let zone = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = zone.with_ymd_and_hms(2026, 10, 18, 23, 59, 59).unwrap();
        let next = next_local_midnight(&now);
        assert_eq!(next, zone.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap());
    }

    #[test]
    fn exactly_midnight_targets_the_following_day() {
        let zone = FixedOffset::west_opt(5 * 3600).unwrap();
        let now = zone.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();
        assert_eq!(
            next_local_midnight(&now),
            zone.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn year_boundary_rolls_over() {
        let now = Utc.with_ymd_and_hms(2026, 12, 31, 8, 30, 0).unwrap();
        assert_eq!(
            next_local_midnight(&now),
            Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn system_midnight_is_in_the_future_and_on_a_local_boundary() {
        let now = Utc::now();
        let next = next_system_midnight(now);
        assert!(next > now);
        let local = next.with_timezone(&chrono::Local);
        assert_eq!(local.minute() % 15, 0);
        assert!(next - now <= chrono::Duration::hours(26));
    }

    #[test]
    fn skipped_midnight_moves_to_first_existing_quarter_hour() {
        let zone = ShiftZone::<false>;
        let now = zone.with_ymd_and_hms(2026, 9, 5, 20, 0, 0).unwrap();
        let next = next_local_midnight(&now);

        assert_eq!(next.naive_local(), shift_day_start() + TimeDelta::hours(1));
        assert_eq!(*next.offset(), hours_west(3));
        assert_eq!(
            next.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2026, 9, 6, 4, 0, 0).unwrap()
        );
    }

    #[test]
    fn ambiguous_midnight_takes_the_earlier_instant() {
        let zone = ShiftZone::<true>;
        let now = zone.with_ymd_and_hms(2026, 9, 5, 20, 0, 0).unwrap();
        let next = next_local_midnight(&now);

        assert_eq!(next.naive_local(), shift_day_start());
        assert_eq!(*next.offset(), hours_west(3));
        assert_eq!(
            next.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2026, 9, 6, 3, 0, 0).unwrap()
        );
    }
}
