use chrono::{DateTime, Days, NaiveDate, Utc};

/// Anything that occupies a charter's calendar: a start day, a duration in
/// days, and optionally a fixed departure slot.
pub trait Reservation {
    fn date(&self) -> DateTime<Utc>;
    fn days(&self) -> i32;
    fn start_time(&self) -> Option<&str>;
}

/// How a charter sells its calendar
#[derive(Debug, Clone, Default)]
pub struct ConflictOptions {
    /// Multiple independent slots per day rather than whole-boat exclusivity
    pub uses_start_times: bool,
    pub selected_start_time: Option<String>,
}

impl ConflictOptions {
    pub fn whole_day() -> Self {
        Self::default()
    }

    pub fn slot(start_time: impl Into<String>) -> Self {
        Self {
            uses_start_times: true,
            selected_start_time: Some(start_time.into()),
        }
    }
}

/// Inclusive `(first_day, last_day)` occupied by a trip, on UTC calendar days.
/// Non-positive durations count as a single day.
pub fn occupied_days(start: DateTime<Utc>, days: i32) -> (NaiveDate, NaiveDate) {
    let first = start.date_naive();
    let extra = u64::try_from(days.max(1) - 1).unwrap_or(0);
    let last = first.checked_add_days(Days::new(extra)).unwrap_or(NaiveDate::MAX);
    (first, last)
}

/// True iff the two inclusive day ranges share at least one day.
pub fn range_overlaps(
    start_a: DateTime<Utc>,
    days_a: i32,
    start_b: DateTime<Utc>,
    days_b: i32,
) -> bool {
    let (a_first, a_last) = occupied_days(start_a, days_a);
    let (b_first, b_last) = occupied_days(start_b, days_b);
    a_first <= b_last && b_first <= a_last
}

fn normalize_start_time(value: Option<&str>) -> Option<&str> {
    value.map(str::trim)
}

/// First existing reservation the candidate trip would collide with.
pub fn find_conflict<'a, R: Reservation>(
    existing: &'a [R],
    candidate_start: DateTime<Utc>,
    candidate_days: i32,
    options: &ConflictOptions,
) -> Option<&'a R> {
    let selected = normalize_start_time(options.selected_start_time.as_deref());

    existing.iter().find(|booking| {
        if !range_overlaps(booking.date(), booking.days(), candidate_start, candidate_days) {
            return false;
        }
        if !options.uses_start_times {
            return true;
        }
        // A missing start time is its own value, not a wildcard
        normalize_start_time(booking.start_time()) == selected
    })
}

pub fn has_conflict<R: Reservation>(
    existing: &[R],
    candidate_start: DateTime<Utc>,
    candidate_days: i32,
    options: &ConflictOptions,
) -> bool {
    find_conflict(existing, candidate_start, candidate_days, options).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    struct Trip {
        date: DateTime<Utc>,
        days: i32,
        start_time: Option<String>,
    }

    impl Reservation for Trip {
        fn date(&self) -> DateTime<Utc> {
            self.date
        }
        fn days(&self) -> i32 {
            self.days
        }
        fn start_time(&self) -> Option<&str> {
            self.start_time.as_deref()
        }
    }

    fn day(offset: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap() + Duration::days(offset)
    }

    fn trip(offset: i64, days: i32, start_time: Option<&str>) -> Trip {
        Trip {
            date: day(offset),
            days,
            start_time: start_time.map(String::from),
        }
    }

    #[test]
    fn test_next_day_does_not_conflict() {
        let existing = vec![trip(0, 1, None)];
        assert!(!has_conflict(&existing, day(1), 1, &ConflictOptions::whole_day()));
    }

    #[test]
    fn test_same_day_conflicts_in_whole_day_mode() {
        let existing = vec![trip(0, 1, None)];
        assert!(has_conflict(&existing, day(0), 1, &ConflictOptions::whole_day()));
    }

    #[test]
    fn test_multi_day_trips_sharing_last_day_conflict() {
        let existing = vec![trip(0, 3, None)];
        assert!(has_conflict(&existing, day(2), 2, &ConflictOptions::whole_day()));
        assert!(!has_conflict(&existing, day(3), 2, &ConflictOptions::whole_day()));
    }

    #[test]
    fn test_same_slot_conflicts() {
        let existing = vec![trip(0, 1, Some("07:00"))];
        assert!(has_conflict(&existing, day(0), 1, &ConflictOptions::slot("07:00")));
    }

    #[test]
    fn test_different_slots_share_the_day() {
        let existing = vec![trip(0, 1, Some("07:00"))];
        assert!(!has_conflict(&existing, day(0), 1, &ConflictOptions::slot("13:00")));
        // No tolerance window between nearby slots
        assert!(!has_conflict(&existing, day(0), 1, &ConflictOptions::slot("07:01")));
    }

    #[test]
    fn test_slot_labels_are_trimmed_before_comparison() {
        let existing = vec![trip(0, 1, Some(" 07:00 "))];
        assert!(has_conflict(&existing, day(0), 1, &ConflictOptions::slot("07:00")));
    }

    #[test]
    fn test_missing_start_time_is_not_a_wildcard() {
        let existing = vec![trip(0, 1, None)];
        assert!(!has_conflict(&existing, day(0), 1, &ConflictOptions::slot("07:00")));

        let untimed = ConflictOptions {
            uses_start_times: true,
            selected_start_time: None,
        };
        assert!(has_conflict(&existing, day(0), 1, &untimed));

        let timed = vec![trip(0, 1, Some("07:00"))];
        assert!(!has_conflict(&timed, day(0), 1, &untimed));
    }

    #[test]
    fn test_slot_mode_still_requires_day_overlap() {
        let existing = vec![trip(0, 1, Some("07:00"))];
        assert!(!has_conflict(&existing, day(1), 1, &ConflictOptions::slot("07:00")));
    }

    #[test]
    fn test_non_positive_days_clamp_to_single_day() {
        for days in [0, -1, -30, i32::MIN] {
            assert_eq!(occupied_days(day(4), days), occupied_days(day(4), 1));

            assert_eq!(
                range_overlaps(day(0), days, day(0), 1),
                range_overlaps(day(0), 1, day(0), 1)
            );
            assert_eq!(
                range_overlaps(day(0), 1, day(1), days),
                range_overlaps(day(0), 1, day(1), 1)
            );
        }

        let existing = vec![trip(0, 0, None)];
        assert!(has_conflict(&existing, day(0), -5, &ConflictOptions::whole_day()));
        assert!(!has_conflict(&existing, day(1), 0, &ConflictOptions::whole_day()));
    }

    #[test]
    fn test_time_of_day_is_truncated() {
        let late = Utc.with_ymd_and_hms(2026, 7, 1, 23, 59, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2026, 7, 2, 0, 1, 0).unwrap();
        assert!(!range_overlaps(late, 1, early, 1));
        assert!(range_overlaps(late, 2, early, 1));
        assert!(range_overlaps(day(0), 1, late, 1));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let cases = [
            (0, 1, 0, 1),
            (0, 3, 2, 2),
            (0, 3, 3, 1),
            (5, 1, 0, 5),
            (5, 1, 0, 6),
            (2, 0, 2, -4),
            (10, 30, 0, 11),
        ];
        for (a, da, b, db) in cases {
            assert_eq!(
                range_overlaps(day(a), da, day(b), db),
                range_overlaps(day(b), db, day(a), da),
                "asymmetric for {a}+{da} vs {b}+{db}"
            );
        }
    }

    #[test]
    fn test_find_conflict_returns_first_blocking_trip() {
        let existing = vec![trip(0, 1, None), trip(3, 2, None), trip(4, 1, None)];
        let hit = find_conflict(&existing, day(4), 1, &ConflictOptions::whole_day()).unwrap();
        assert_eq!(hit.date, day(3));
    }

    #[test]
    fn test_huge_duration_does_not_panic() {
        assert!(range_overlaps(day(0), i32::MAX, day(10_000), 1));
    }
}
