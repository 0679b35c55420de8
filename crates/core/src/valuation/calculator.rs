//! Pure valuation formulas.
//!
//! Stateless functions over `Decimal`; no side effects. Out-of-domain inputs
//! (negative useful life, salvage exceeding initial value, negative elapsed
//! time) fail with `InvalidParameter` and are never silently clamped.

use chrono::NaiveDate;
use num_traits::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::assets::{AppreciationType, DepreciationMethod, ValuationPolicy};
use crate::errors::{Result, ValuationError};

const DAYS_PER_YEAR: Decimal = dec!(365.25);
const HUNDRED: Decimal = dec!(100);

fn invalid(msg: impl Into<String>) -> crate::errors::Error {
    ValuationError::InvalidParameter(msg.into()).into()
}

fn validate_depreciation_inputs(
    initial: Decimal,
    salvage: Decimal,
    useful_life_years: Decimal,
    years_held: Decimal,
) -> Result<()> {
    if useful_life_years <= Decimal::ZERO {
        return Err(invalid("Useful life must be positive"));
    }
    if salvage < Decimal::ZERO {
        return Err(invalid("Salvage value cannot be negative"));
    }
    if salvage > initial {
        return Err(invalid("Salvage value cannot exceed initial value"));
    }
    if years_held < Decimal::ZERO {
        return Err(invalid("Holding period cannot be negative"));
    }
    Ok(())
}

/// Straight-line depreciation, floored at the salvage value.
///
/// `value = initial − (initial − salvage) × min(years_held, useful_life) / useful_life`
pub fn straight_line_depreciation(
    initial: Decimal,
    salvage: Decimal,
    useful_life_years: Decimal,
    years_held: Decimal,
) -> Result<Decimal> {
    validate_depreciation_inputs(initial, salvage, useful_life_years, years_held)?;

    let elapsed = years_held.min(useful_life_years);
    let value = initial - (initial - salvage) * elapsed / useful_life_years;
    Ok(value.max(salvage))
}

/// Double-declining-balance depreciation.
///
/// Applies the rate `2 / useful_life` to the declining book value per elapsed
/// whole year, interpolating linearly between whole-year book values for
/// fractional holding periods. Floored at the salvage value; once the book
/// value reaches salvage it stays there. No switch to straight-line is
/// attempted — floor-at-salvage is the whole contract.
pub fn double_declining_balance(
    initial: Decimal,
    salvage: Decimal,
    useful_life_years: Decimal,
    years_held: Decimal,
) -> Result<Decimal> {
    validate_depreciation_inputs(initial, salvage, useful_life_years, years_held)?;

    let rate = dec!(2) / useful_life_years;
    let full_years = years_held
        .floor()
        .to_u64()
        .ok_or_else(|| invalid("Holding period out of range"))?;

    let at_start = book_value_after(initial, salvage, rate, full_years);
    let frac = years_held - years_held.floor();
    if frac.is_zero() {
        return Ok(at_start);
    }
    let at_end = book_value_after(initial, salvage, rate, full_years + 1);
    Ok(at_start + (at_end - at_start) * frac)
}

/// Book value after `years` whole years of declining-balance write-offs,
/// sticky at the salvage floor.
fn book_value_after(initial: Decimal, salvage: Decimal, rate: Decimal, years: u64) -> Decimal {
    let mut value = initial;
    for _ in 0..years {
        if value <= salvage {
            return salvage;
        }
        value = (value * (Decimal::ONE - rate)).max(salvage);
    }
    value
}

/// Compound appreciation: `initial × (1 + rate/100) ^ years_held`.
pub fn compound_appreciation(
    initial: Decimal,
    annual_rate_percent: Decimal,
    years_held: Decimal,
) -> Result<Decimal> {
    if years_held < Decimal::ZERO {
        return Err(invalid("Holding period cannot be negative"));
    }
    let base = Decimal::ONE + annual_rate_percent / HUNDRED;
    if base <= Decimal::ZERO {
        return Err(invalid("Annual rate must be greater than -100%"));
    }

    // Whole-year exponents stay exact; fractional ones go through powd.
    let growth = if years_held.fract().is_zero() {
        let exp = years_held
            .to_i64()
            .ok_or_else(|| invalid("Holding period out of range"))?;
        base.checked_powi(exp)
    } else {
        base.checked_powd(years_held)
    }
    .ok_or_else(|| invalid("Compound growth overflows the representable range"))?;
    initial
        .checked_mul(growth)
        .ok_or_else(|| invalid("Compound growth overflows the representable range"))
}

/// Linear appreciation: `initial × (1 + rate/100 × years_held)`.
pub fn linear_appreciation(
    initial: Decimal,
    annual_rate_percent: Decimal,
    years_held: Decimal,
) -> Result<Decimal> {
    if years_held < Decimal::ZERO {
        return Err(invalid("Holding period cannot be negative"));
    }
    Ok(initial * (Decimal::ONE + annual_rate_percent / HUNDRED * years_held))
}

/// Annualized rate of return as a percentage:
/// `((current / initial) ^ (1 / years_held) − 1) × 100`.
///
/// Returns zero for the undefined domain (`years_held ≤ 0` or
/// `initial ≤ 0`) — an asset younger than one reporting period is common
/// and "no data" is not an error.
pub fn annualized_return(
    initial_value: Decimal,
    current_value: Decimal,
    years_held: Decimal,
) -> Decimal {
    if years_held <= Decimal::ZERO || initial_value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if current_value < Decimal::ZERO {
        return Decimal::ZERO;
    }
    if current_value.is_zero() {
        return -HUNDRED;
    }
    let ratio = current_value / initial_value;
    match ratio.checked_powd(Decimal::ONE / years_held) {
        Some(root) => (root - Decimal::ONE) * HUNDRED,
        // Sub-period holdings can push the exponent high enough to
        // overflow; treat that like the rest of the undefined domain.
        None => Decimal::ZERO,
    }
}

/// Elapsed calendar time in years using a 365.25-day year. Never negative;
/// fails with `InvalidParameter` when `end < start`.
pub fn years_between(start: NaiveDate, end: NaiveDate) -> Result<Decimal> {
    if end < start {
        return Err(invalid(format!(
            "End date {} precedes start date {}",
            end, start
        )));
    }
    let days = (end - start).num_days();
    Ok(Decimal::from(days) / DAYS_PER_YEAR)
}

/// Dispatches to the formula selected by the asset's valuation policy.
///
/// With neither side active the initial value is returned unchanged — the
/// asset's value only moves on explicit ledger entries.
pub fn policy_value(
    policy: &ValuationPolicy,
    initial: Decimal,
    years_held: Decimal,
) -> Result<Decimal> {
    policy.validate()?;

    match policy.depreciation_method {
        DepreciationMethod::StraightLine => {
            // validate() guarantees the parameters are present.
            let life = policy.useful_life_years.unwrap_or_default();
            let salvage = policy.salvage_value.unwrap_or_default();
            return straight_line_depreciation(initial, salvage, life, years_held);
        }
        DepreciationMethod::DoubleDeclining => {
            let life = policy.useful_life_years.unwrap_or_default();
            let salvage = policy.salvage_value.unwrap_or_default();
            return double_declining_balance(initial, salvage, life, years_held);
        }
        DepreciationMethod::None => {}
    }

    match policy.appreciation_type {
        AppreciationType::Compound => {
            let rate = policy.annual_rate_of_return.unwrap_or_default();
            compound_appreciation(initial, rate, years_held)
        }
        AppreciationType::Linear => {
            let rate = policy.annual_rate_of_return.unwrap_or_default();
            linear_appreciation(initial, rate, years_held)
        }
        AppreciationType::None => Ok(initial),
    }
}
