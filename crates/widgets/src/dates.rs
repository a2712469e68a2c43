use chrono::{Local, NaiveDate};

/// Today's local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `true` iff `date` is `today`.
pub fn is_today_at(date: NaiveDate, today: NaiveDate) -> bool {
    date == today
}

/// `true` iff `date` is the day after `today`.
pub fn is_tomorrow_at(date: NaiveDate, today: NaiveDate) -> bool {
    today.succ_opt() == Some(date)
}

pub fn is_today(date: NaiveDate) -> bool {
    is_today_at(date, today())
}

pub fn is_tomorrow(date: NaiveDate) -> bool {
    is_tomorrow_at(date, today())
}

/// Position of an event relative to the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventStatus {
    Past,
    Now,
    Future,
}

/// Classify an event spanning `start..=end` at instant `now`.
///
/// Checked in order: ended before `now` → past, `now` inside the span →
/// now, anything else → future.
pub fn classify<T: PartialOrd>(start: T, end: T, now: T) -> EventStatus {
    if end < now {
        EventStatus::Past
    } else if start <= now && now <= end {
        EventStatus::Now
    } else {
        EventStatus::Future
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn tomorrow_crosses_month_and_year() {
        assert!(is_tomorrow_at(date(2025, 1, 1), date(2024, 12, 31)));
        assert!(is_tomorrow_at(date(2024, 3, 1), date(2024, 2, 29)));
        assert!(!is_tomorrow_at(date(2024, 2, 29), date(2024, 2, 29)));
    }

    #[test]
    fn classification_examples() {
        assert_eq!(classify(1, 2, 3), EventStatus::Past);
        assert_eq!(classify(1, 3, 3), EventStatus::Now);
        assert_eq!(classify(3, 5, 3), EventStatus::Now);
        assert_eq!(classify(4, 5, 3), EventStatus::Future);
    }

    #[test]
    fn wall_clock_helpers_agree() {
        let before = today();
        let hits = (is_today(before), is_tomorrow(before.succ_opt().unwrap()));
        let after = today();

        // Only a midnight between the two clock reads may break agreement.
        assert!(hits == (true, true) || before != after);
        assert!(is_today_at(before, before));
        assert!(is_tomorrow_at(before.succ_opt().unwrap(), before));
    }

    proptest! {
        #[test]
        fn prop_today_and_tomorrow_are_exclusive(base in 0u64..200_000, offset in -3i64..4) {
            let today = date(1900, 1, 1) + Days::new(base);
            let d = if offset >= 0 {
                today + Days::new(offset as u64)
            } else {
                today - Days::new(offset.unsigned_abs())
            };

            let (t, m) = (is_today_at(d, today), is_tomorrow_at(d, today));
            prop_assert!(!(t && m));
            if offset == 0 || offset == 1 {
                prop_assert!(t ^ m);
            } else {
                prop_assert!(!t && !m);
            }
        }

        #[test]
        fn prop_classification_is_total_and_exclusive(a in -1000i64..1000, b in -1000i64..1000, now in -1000i64..1000) {
            let (start, end) = (a.min(b), a.max(b));
            let expected = if end < now {
                EventStatus::Past
            } else if start <= now {
                EventStatus::Now
            } else {
                EventStatus::Future
            };
            prop_assert_eq!(classify(start, end, now), expected);
        }
    }
}
