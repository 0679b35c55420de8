//! Valuation module - pure depreciation/appreciation/return formulas.

mod calculator;

#[cfg(test)]
mod calculator_tests;

pub use calculator::{
    annualized_return, compound_appreciation, double_declining_balance, linear_appreciation,
    policy_value, straight_line_depreciation, years_between,
};
