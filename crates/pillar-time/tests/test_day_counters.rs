//! Day counter and schedule behaviour exercised through the public API.

use pillar_time::{Date, DayCounter, Frequency, Period, Schedule};
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

// ─── Actual/Actual ────────────────────────────────────────────────────────────

#[test]
fn test_actual_actual_isda() {
    let dc = DayCounter::ActualActualIsda;

    let cases: Vec<(Date, Date, f64)> = vec![
        (date(2003, 11, 1), date(2004, 5, 1), 0.497724380567),
        (date(1999, 2, 1), date(1999, 7, 1), 0.410958904110),
        (date(1999, 7, 1), date(2000, 7, 1), 1.001377348600),
        (date(2002, 8, 15), date(2003, 7, 15), 0.915068493151),
        (date(2003, 7, 15), date(2004, 1, 15), 0.504004790778),
        (date(1999, 7, 30), date(2000, 1, 30), 0.503892506924),
        (date(2000, 1, 30), date(2000, 6, 30), 0.415300546448),
    ];

    for (i, (d1, d2, expected)) in cases.iter().enumerate() {
        let calculated = dc.year_fraction(*d1, *d2);
        assert!(
            (calculated - expected).abs() < 1.0e-10,
            "ISDA case {i}: from {d1} to {d2}: calculated {calculated:.12}, expected {expected:.12}"
        );
    }
}

// ─── Schedules ────────────────────────────────────────────────────────────────

#[test]
fn test_annual_schedule_from_frequency() {
    let s = Schedule::from_frequency(date(2025, 1, 2), date(2030, 1, 2), Frequency::Annual).unwrap();
    assert_eq!(s.len(), 5);
    assert_eq!(s.start_date(), date(2025, 1, 2));
    assert_eq!(s.end_date(), date(2030, 1, 2));
    for (start, end) in s.periods() {
        assert_eq!(start.advance(Period::years(1)).unwrap(), end);
    }
}

#[test]
fn test_once_schedule_is_single_period() {
    let s = Schedule::from_frequency(date(2025, 1, 2), date(2025, 7, 2), Frequency::Once).unwrap();
    assert_eq!(s.dates(), &[date(2025, 1, 2), date(2025, 7, 2)]);
}

// ─── Properties ───────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn actual_conventions_are_additive(a in 0i64..20_000, b in 0i64..5_000, c in 0i64..5_000) {
        let d1 = date(1990, 1, 1).add_days(a).unwrap();
        let d2 = d1.add_days(b).unwrap();
        let d3 = d2.add_days(c).unwrap();
        for dc in [DayCounter::Actual360, DayCounter::Actual365Fixed, DayCounter::ActualActualIsda] {
            let whole = dc.year_fraction(d1, d3);
            let parts = dc.year_fraction(d1, d2) + dc.year_fraction(d2, d3);
            prop_assert!((whole - parts).abs() < 1e-12);
        }
    }

    #[test]
    fn backward_schedules_are_increasing(months in 1i32..120, tenor in prop::sample::select(vec![1, 3, 6, 12])) {
        let start = date(2024, 1, 31);
        let end = start.add_months(months).unwrap();
        let s = Schedule::backward(start, end, Period::months(tenor)).unwrap();
        prop_assert!(s.dates().windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(s.start_date(), start);
        prop_assert_eq!(s.end_date(), end);
    }
}
