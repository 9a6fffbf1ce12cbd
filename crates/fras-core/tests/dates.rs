//! Burn-date canonicalization tests.

use chrono::NaiveDate;
use fras_core::{repair_month, to_yyyymmdd};
use fras_model::Value;
use proptest::prelude::proptest;

fn date_value(year: i32, month: u32, day: u32) -> Value {
    Value::Date(
        NaiveDate::from_ymd_opt(year, month, day)
            .expect("valid date")
            .and_hms_opt(0, 0, 0)
            .expect("valid time"),
    )
}

#[test]
fn native_dates_format_to_integers() {
    assert_eq!(to_yyyymmdd(&date_value(2023, 4, 5)), Ok(Some(20230405)));
    assert_eq!(to_yyyymmdd(&date_value(1999, 12, 31)), Ok(Some(19991231)));
}

#[test]
fn iso_strings_parse() {
    assert_eq!(to_yyyymmdd(&Value::from("2023-04-05")), Ok(Some(20230405)));
    assert_eq!(to_yyyymmdd(&Value::from("2019-8-7")), Ok(Some(20190807)));
}

#[test]
fn fallback_strips_separators() {
    assert_eq!(to_yyyymmdd(&Value::from("2023/04/05")), Ok(Some(20230405)));
    assert_eq!(to_yyyymmdd(&Value::from("20230405")), Ok(Some(20230405)));
}

#[test]
fn integers_pass_through() {
    assert_eq!(to_yyyymmdd(&Value::Long(20230405)), Ok(Some(20230405)));
}

#[test]
fn null_stays_null() {
    assert_eq!(to_yyyymmdd(&Value::Null), Ok(None));
}

#[test]
fn unparseable_values_fail() {
    assert!(to_yyyymmdd(&Value::from("last summer")).is_err());
    assert!(to_yyyymmdd(&Value::from("")).is_err());
}

#[test]
fn month_thirteen_becomes_december() {
    assert_eq!(repair_month(20231305), 20231205);
}

#[test]
fn valid_months_are_untouched() {
    assert_eq!(repair_month(20231205), 20231205);
    assert_eq!(repair_month(20230105), 20230105);
}

proptest! {
    // Round trip: any complete calendar date canonicalizes to its own
    // YYYYMMDD integer.
    #[test]
    fn canonicalization_round_trips(year in 1900i32..2100, month in 1u32..=12, day in 1u32..=28) {
        let expected = i64::from(year) * 10_000 + i64::from(month) * 100 + i64::from(day);
        assert_eq!(to_yyyymmdd(&date_value(year, month, day)), Ok(Some(expected)));
    }

    // The repaired month component never exceeds twelve, and year and day
    // survive the repair.
    #[test]
    fn repair_bounds_the_month(year in 1900i64..2100, month in 1i64..=20, day in 1i64..=28) {
        let raw = year * 10_000 + month * 100 + day;
        let repaired = repair_month(raw);
        assert!((repaired / 100) % 100 <= 12);
        assert_eq!(repaired / 10_000, year);
        assert_eq!(repaired % 100, day);
    }
}
