use super::calculator::*;
use crate::assets::{AppreciationType, DepreciationMethod, ValuationPolicy};
use crate::errors::{Error, ValuationError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn assert_invalid_parameter<T: std::fmt::Debug>(result: crate::Result<T>) {
    match result {
        Err(Error::Valuation(ValuationError::InvalidParameter(_))) => {}
        other => panic!("expected InvalidParameter, got {:?}", other),
    }
}

#[test]
fn test_straight_line_midlife_property() {
    // $400,000 property, salvage $40,000, 10-year life, held 5 years.
    let value =
        straight_line_depreciation(dec!(400000), dec!(40000), dec!(10), dec!(5)).unwrap();
    assert_eq!(value, dec!(220000));
}

#[test]
fn test_straight_line_boundaries_are_exact() {
    // At zero years held the value is exactly the initial value.
    let at_start =
        straight_line_depreciation(dec!(400000), dec!(40000), dec!(10), dec!(0)).unwrap();
    assert_eq!(at_start, dec!(400000));

    // At the end of the useful life the value is exactly the salvage value.
    let at_end =
        straight_line_depreciation(dec!(400000), dec!(40000), dec!(10), dec!(10)).unwrap();
    assert_eq!(at_end, dec!(40000));

    // Beyond the useful life it stays at salvage.
    let beyond =
        straight_line_depreciation(dec!(400000), dec!(40000), dec!(10), dec!(25)).unwrap();
    assert_eq!(beyond, dec!(40000));
}

#[test]
fn test_straight_line_rejects_bad_domain() {
    assert_invalid_parameter(straight_line_depreciation(
        dec!(1000),
        dec!(100),
        dec!(0),
        dec!(1),
    ));
    assert_invalid_parameter(straight_line_depreciation(
        dec!(1000),
        dec!(100),
        dec!(-5),
        dec!(1),
    ));
    // Salvage exceeding initial value.
    assert_invalid_parameter(straight_line_depreciation(
        dec!(1000),
        dec!(2000),
        dec!(10),
        dec!(1),
    ));
    // Negative holding period.
    assert_invalid_parameter(straight_line_depreciation(
        dec!(1000),
        dec!(100),
        dec!(10),
        dec!(-1),
    ));
}

#[test]
fn test_double_declining_whole_years() {
    // 10-year life -> 20% of the declining book value per year.
    let initial = dec!(10000);
    let year_one = double_declining_balance(initial, dec!(0), dec!(10), dec!(1)).unwrap();
    assert_eq!(year_one, dec!(8000));

    let year_two = double_declining_balance(initial, dec!(0), dec!(10), dec!(2)).unwrap();
    assert_eq!(year_two, dec!(6400));
}

#[test]
fn test_double_declining_fractional_year_interpolates() {
    // Halfway through year one: midpoint of 10000 and 8000.
    let value = double_declining_balance(dec!(10000), dec!(0), dec!(10), dec!(0.5)).unwrap();
    assert_eq!(value, dec!(9000));

    // Halfway through year two: midpoint of 8000 and 6400.
    let value = double_declining_balance(dec!(10000), dec!(0), dec!(10), dec!(1.5)).unwrap();
    assert_eq!(value, dec!(7200));
}

#[test]
fn test_double_declining_floors_and_sticks_at_salvage() {
    // 2-year life -> 100% rate: book value hits the floor after one year.
    let value = double_declining_balance(dec!(10000), dec!(1500), dec!(2), dec!(1)).unwrap();
    assert_eq!(value, dec!(1500));

    // And stays there for all subsequent years.
    let value = double_declining_balance(dec!(10000), dec!(1500), dec!(2), dec!(7)).unwrap();
    assert_eq!(value, dec!(1500));

    // Interpolation never dips below the floor either.
    let value = double_declining_balance(dec!(10000), dec!(1500), dec!(2), dec!(1.5)).unwrap();
    assert_eq!(value, dec!(1500));
}

#[test]
fn test_compound_appreciation_three_years_at_eight_percent() {
    // $10,000 at 8%/yr for 3 years = $12,597.12 to the cent.
    let value = compound_appreciation(dec!(10000), dec!(8), dec!(3)).unwrap();
    assert_eq!(value.round_dp(2), dec!(12597.12));
}

#[test]
fn test_compound_appreciation_zero_years_is_identity() {
    let value = compound_appreciation(dec!(10000), dec!(8), dec!(0)).unwrap();
    assert_eq!(value, dec!(10000));
}

#[test]
fn test_compound_appreciation_overflow_is_rejected() {
    // Doubling for three centuries blows past what Decimal can hold; the
    // whole-year and fractional paths must both fail cleanly.
    assert_invalid_parameter(compound_appreciation(dec!(1000), dec!(100), dec!(300)));
    assert_invalid_parameter(compound_appreciation(dec!(1000), dec!(100), dec!(300.5)));
}

#[test]
fn test_annualized_return_overflow_is_zero() {
    // A huge gain over a sliver of a year overflows the root computation.
    assert_eq!(
        annualized_return(dec!(1), dec!(1000000), dec!(0.0001)),
        Decimal::ZERO
    );
}

#[test]
fn test_compound_appreciation_rejects_impossible_rate() {
    assert_invalid_parameter(compound_appreciation(dec!(10000), dec!(-100), dec!(1)));
    assert_invalid_parameter(compound_appreciation(dec!(10000), dec!(8), dec!(-1)));
}

#[test]
fn test_linear_appreciation() {
    let value = linear_appreciation(dec!(10000), dec!(8), dec!(3)).unwrap();
    assert_eq!(value, dec!(12400));

    assert_invalid_parameter(linear_appreciation(dec!(10000), dec!(8), dec!(-0.5)));
}

#[test]
fn test_annualized_return_round_trip_with_compound_growth() {
    let current = compound_appreciation(dec!(10000), dec!(8), dec!(3)).unwrap();
    let rate = annualized_return(dec!(10000), current, dec!(3));
    // powd with the repeating exponent 1/3 is approximate.
    assert!((rate - dec!(8)).abs() < dec!(0.0001), "rate was {}", rate);
}

#[test]
fn test_annualized_return_undefined_domain_is_zero() {
    assert_eq!(annualized_return(dec!(0), dec!(1000), dec!(2)), Decimal::ZERO);
    assert_eq!(
        annualized_return(dec!(-10), dec!(1000), dec!(2)),
        Decimal::ZERO
    );
    assert_eq!(annualized_return(dec!(1000), dec!(1200), dec!(0)), Decimal::ZERO);
    assert_eq!(
        annualized_return(dec!(1000), dec!(1200), dec!(-1)),
        Decimal::ZERO
    );
}

#[test]
fn test_annualized_return_total_loss() {
    assert_eq!(annualized_return(dec!(1000), dec!(0), dec!(2)), dec!(-100));
}

#[test]
fn test_years_between() {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    // 366 days across the 2020 leap year.
    assert_eq!(
        years_between(start, end).unwrap().round_dp(4),
        dec!(1.0021)
    );

    assert_eq!(years_between(start, start).unwrap(), Decimal::ZERO);
    assert_invalid_parameter(years_between(end, start));
}

#[test]
fn test_policy_value_dispatch() {
    let depreciating =
        ValuationPolicy::depreciating(DepreciationMethod::StraightLine, dec!(10), dec!(40000));
    let value = policy_value(&depreciating, dec!(400000), dec!(5)).unwrap();
    assert_eq!(value, dec!(220000));

    let appreciating = ValuationPolicy::appreciating(AppreciationType::Compound, dec!(8));
    let value = policy_value(&appreciating, dec!(10000), dec!(3)).unwrap();
    assert_eq!(value.round_dp(2), dec!(12597.12));

    // No active policy: value does not move between explicit updates.
    let none = ValuationPolicy::none();
    assert_eq!(policy_value(&none, dec!(5000), dec!(4)).unwrap(), dec!(5000));
}
