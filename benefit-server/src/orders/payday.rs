//! Bi-weekly payday date math
//!
//! Paydays fall every other Friday on a fixed cadence defined by a single
//! anchor date. Deductions for an order begin on the first payday whose
//! cutoff the receive date made: the cutoff for payday P is `P - 6 days`
//! (the Saturday ending the prior pay period), so items received after the
//! cutoff roll to the following payday. In particular a receive on a payday
//! Friday itself schedules for the NEXT payday.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Length of one pay period
const PERIOD_DAYS: i64 = 14;

/// Days between a payday and its deduction cutoff
const CUTOFF_OFFSET_DAYS: i64 = 6;

/// Bi-weekly payday calendar anchored at a known payday Friday
#[derive(Debug, Clone, Copy)]
pub struct PaydayCalendar {
    anchor: NaiveDate,
}

impl PaydayCalendar {
    /// Build a calendar from an anchor payday. The anchor must be a Friday.
    pub fn new(anchor: NaiveDate) -> Result<Self, String> {
        if anchor.weekday() != Weekday::Fri {
            return Err(format!("payday anchor {anchor} is not a Friday"));
        }
        Ok(Self { anchor })
    }

    /// First payday whose deduction window a given receive date falls in.
    ///
    /// Idempotent in the scheduling sense: receiving on any day of one pay
    /// window yields the same payday.
    pub fn payday_for(&self, date: NaiveDate) -> NaiveDate {
        let mut cutoff = self.anchor - Duration::days(CUTOFF_OFFSET_DAYS);
        while date > cutoff {
            cutoff += Duration::days(PERIOD_DAYS);
        }
        while date <= cutoff - Duration::days(PERIOD_DAYS) {
            cutoff -= Duration::days(PERIOD_DAYS);
        }
        cutoff + Duration::days(CUTOFF_OFFSET_DAYS)
    }

    /// Whether a date sits on the payday cadence
    pub fn is_payday(&self, date: NaiveDate) -> bool {
        (date - self.anchor).num_days() % PERIOD_DAYS == 0
    }

    /// The payday `n` periods after `payday`
    pub fn advance(&self, payday: NaiveDate, n: u8) -> NaiveDate {
        payday + Duration::days(PERIOD_DAYS * n as i64)
    }

    /// Recent past and upcoming paydays relative to `today`, oldest first.
    ///
    /// Returns `history` paydays already in the past followed by `count`
    /// paydays from the next scheduling target forward.
    pub fn window(&self, today: NaiveDate, history: usize, count: usize) -> Vec<NaiveDate> {
        let first = self.payday_for(today);
        let mut paydays = Vec::with_capacity(history + count);
        for i in (1..=history).rev() {
            paydays.push(first - Duration::days(PERIOD_DAYS * i as i64));
        }
        for i in 0..count {
            paydays.push(first + Duration::days(PERIOD_DAYS * i as i64));
        }
        paydays
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar() -> PaydayCalendar {
        // 2023-01-06 was a Friday
        PaydayCalendar::new(NaiveDate::from_ymd_opt(2023, 1, 6).unwrap()).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn anchor_must_be_friday() {
        assert!(PaydayCalendar::new(d(2023, 1, 5)).is_err());
        assert!(PaydayCalendar::new(d(2023, 1, 6)).is_ok());
    }

    #[test]
    fn cutoff_day_schedules_for_its_payday() {
        let cal = calendar();
        // Cutoff for the 2023-01-20 payday is 2023-01-14 (Saturday)
        assert_eq!(cal.payday_for(d(2023, 1, 14)), d(2023, 1, 20));
        // One day past the cutoff rolls to the following payday
        assert_eq!(cal.payday_for(d(2023, 1, 15)), d(2023, 2, 3));
    }

    #[test]
    fn payday_friday_rolls_to_next_payday() {
        let cal = calendar();
        assert_eq!(cal.payday_for(d(2023, 1, 20)), d(2023, 2, 3));
        assert_eq!(cal.payday_for(d(2023, 1, 6)), d(2023, 1, 20));
    }

    #[test]
    fn works_before_the_anchor() {
        let cal = calendar();
        assert_eq!(cal.payday_for(d(2022, 12, 26)), d(2022, 12, 23) + Duration::days(14));
        assert_eq!(cal.payday_for(d(2022, 12, 17)), d(2022, 12, 23));
    }

    #[test]
    fn every_day_of_a_window_maps_to_one_payday() {
        let cal = calendar();
        let payday = d(2023, 2, 3);
        let cutoff = payday - Duration::days(6);
        for offset in 0..14 {
            let day = cutoff - Duration::days(offset);
            assert_eq!(cal.payday_for(day), payday, "offset {offset}");
        }
    }

    #[test]
    fn window_is_contiguous_and_on_cadence() {
        let cal = calendar();
        let today = d(2026, 3, 2);
        let paydays = cal.window(today, 2, 4);
        assert_eq!(paydays.len(), 6);
        for pair in paydays.windows(2) {
            assert_eq!((pair[1] - pair[0]).num_days(), 14);
        }
        for p in &paydays {
            assert!(cal.is_payday(*p));
            assert_eq!(p.weekday(), Weekday::Fri);
        }
        assert_eq!(paydays[2], cal.payday_for(today));
    }

    #[test]
    fn advance_steps_whole_periods() {
        let cal = calendar();
        assert_eq!(cal.advance(d(2023, 1, 6), 3), d(2023, 2, 17));
    }
}
