use chrono::{Days, NaiveDate};

use crate::entities::daily_entry;

/// Consecutive-day streak over a set of entry dates.
///
/// The walk anchors on `today`, or on yesterday when nothing was logged today
/// yet — logging yesterday keeps the streak alive until the day is over. Each
/// date matching the anchor extends the streak and moves the anchor back one
/// day; the first gap stops the walk. Dates after `today` are ignored.
pub fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut sorted: Vec<NaiveDate> = dates.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut anchor = if sorted.binary_search(&today).is_ok() {
        today
    } else {
        today - Days::new(1)
    };

    let mut streak = 0;
    for date in sorted.into_iter().rev() {
        if date > anchor {
            continue;
        }
        if date == anchor {
            streak += 1;
            anchor = anchor - Days::new(1);
        } else {
            break;
        }
    }
    streak
}

pub fn compute_streak(entries: &[daily_entry::Model], today: NaiveDate) -> u32 {
    let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
    current_streak(&dates, today)
}

#[cfg(test)]
mod tests {
    use super::current_streak;
    use chrono::{Days, NaiveDate};

    fn day(offset: u64) -> NaiveDate {
        today() - Days::new(offset)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 4).unwrap()
    }

    #[test]
    fn empty_input_has_no_streak() {
        assert_eq!(current_streak(&[], today()), 0);
    }

    #[test]
    fn single_entry_today() {
        assert_eq!(current_streak(&[day(0)], today()), 1);
    }

    #[test]
    fn three_consecutive_days() {
        assert_eq!(current_streak(&[day(2), day(0), day(1)], today()), 3);
    }

    #[test]
    fn anchor_shifts_to_yesterday_when_today_is_unlogged() {
        assert_eq!(current_streak(&[day(1), day(2)], today()), 2);
    }

    #[test]
    fn gap_at_yesterday_stops_the_walk() {
        // Today is logged, yesterday is not; the run behind the gap does not
        // count even though it is consecutive among itself.
        assert_eq!(current_streak(&[day(0), day(2), day(3)], today()), 1);
    }

    #[test]
    fn two_day_gap_breaks_everything() {
        assert_eq!(current_streak(&[day(3), day(4)], today()), 0);
    }

    #[test]
    fn future_dates_are_ignored() {
        let tomorrow = today() + Days::new(1);
        assert_eq!(current_streak(&[tomorrow, day(0), day(1)], today()), 2);
    }

    #[test]
    fn duplicate_dates_count_once() {
        assert_eq!(current_streak(&[day(0), day(0), day(1)], today()), 2);
    }
}
