use super::assets_model::*;
use crate::errors::{Error, LedgerError, ValidationError};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn base_new_asset() -> NewAsset {
    NewAsset {
        id: None,
        asset_type: AssetType::Property,
        name: "Beach House".to_string(),
        symbol: None,
        location: Some("Lisbon".to_string()),
        quantity: None,
        currency: "USD".to_string(),
        initial_value: dec!(400000),
        acquisition_date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
        valuation_policy: ValuationPolicy::none(),
        valuation_method: ValuationMethod::Manual,
        next_valuation_date: None,
        valuation_cadence_days: None,
    }
}

#[test]
fn test_policy_both_sides_active_is_conflict() {
    let policy = ValuationPolicy {
        depreciation_method: DepreciationMethod::StraightLine,
        appreciation_type: AppreciationType::Compound,
        annual_rate_of_return: Some(dec!(8)),
        useful_life_years: Some(dec!(10)),
        salvage_value: Some(dec!(40000)),
    };
    match policy.validate() {
        Err(Error::Ledger(LedgerError::PolicyConflict(_))) => {}
        other => panic!("expected PolicyConflict, got {:?}", other),
    }
}

#[test]
fn test_depreciating_builder_clears_appreciation_side() {
    let policy =
        ValuationPolicy::depreciating(DepreciationMethod::StraightLine, dec!(10), dec!(40000));
    assert_eq!(policy.appreciation_type, AppreciationType::None);
    assert!(policy.annual_rate_of_return.is_none());
    assert!(policy.validate().is_ok());
}

#[test]
fn test_appreciating_builder_clears_depreciation_side() {
    let policy = ValuationPolicy::appreciating(AppreciationType::Compound, dec!(8));
    assert_eq!(policy.depreciation_method, DepreciationMethod::None);
    assert!(policy.useful_life_years.is_none());
    assert!(policy.salvage_value.is_none());
    assert!(policy.validate().is_ok());
}

#[test]
fn test_depreciation_policy_requires_parameters() {
    let policy = ValuationPolicy {
        depreciation_method: DepreciationMethod::DoubleDeclining,
        ..Default::default()
    };
    match policy.validate() {
        Err(Error::Validation(ValidationError::MissingField(field))) => {
            assert_eq!(field, "usefulLifeYears");
        }
        other => panic!("expected MissingField, got {:?}", other),
    }
}

#[test]
fn test_appreciation_policy_requires_rate() {
    let policy = ValuationPolicy {
        appreciation_type: AppreciationType::Linear,
        ..Default::default()
    };
    match policy.validate() {
        Err(Error::Validation(ValidationError::MissingField(field))) => {
            assert_eq!(field, "annualRateOfReturn");
        }
        other => panic!("expected MissingField, got {:?}", other),
    }
}

#[test]
fn test_new_asset_validation() {
    assert!(base_new_asset().validate().is_ok());

    let mut no_name = base_new_asset();
    no_name.name = "  ".to_string();
    assert!(no_name.validate().is_err());

    let mut negative = base_new_asset();
    negative.initial_value = dec!(-1);
    assert!(negative.validate().is_err());
}

#[test]
fn test_scheduled_asset_requires_next_valuation_date() {
    let mut scheduled = base_new_asset();
    scheduled.valuation_method = ValuationMethod::Scheduled;
    match scheduled.validate() {
        Err(Error::Validation(ValidationError::MissingField(field))) => {
            assert_eq!(field, "nextValuationDate");
        }
        other => panic!("expected MissingField, got {:?}", other),
    }

    scheduled.next_valuation_date = NaiveDate::from_ymd_opt(2025, 1, 1);
    assert!(scheduled.validate().is_ok());
}

#[test]
fn test_is_revaluation_due() {
    let mut asset = Asset {
        valuation_method: ValuationMethod::Scheduled,
        next_valuation_date: NaiveDate::from_ymd_opt(2025, 6, 1),
        is_active: true,
        ..Default::default()
    };
    let before = NaiveDate::from_ymd_opt(2025, 5, 31).unwrap();
    let due = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    assert!(!asset.is_revaluation_due(before));
    assert!(asset.is_revaluation_due(due));

    asset.is_active = false;
    assert!(!asset.is_revaluation_due(due));

    asset.is_active = true;
    asset.valuation_method = ValuationMethod::Manual;
    assert!(!asset.is_revaluation_due(due));
}

#[test]
fn test_enum_db_round_trip() {
    for t in [
        AssetType::Property,
        AssetType::Stock,
        AssetType::Crypto,
        AssetType::TermDeposit,
        AssetType::Other,
    ] {
        assert_eq!(AssetType::from_db_str(t.as_db_str()).unwrap(), t);
    }
    assert!(AssetType::from_db_str("BOND").is_err());
    assert!(DepreciationMethod::from_db_str("SUM_OF_YEARS").is_err());
    assert!(ValuationMethod::from_db_str("").is_err());
}
