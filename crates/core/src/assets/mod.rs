//! Assets module - projection models, services, and traits.

mod assets_model;
mod assets_service;
mod assets_traits;

#[cfg(test)]
mod assets_model_tests;

pub use assets_model::{
    Asset, AssetType, AssetUpdate, AppreciationType, DepreciationMethod, NewAsset,
    ValuationMethod, ValuationPolicy, DEFAULT_VALUATION_CADENCE_DAYS,
};
pub use assets_service::AssetService;
pub use assets_traits::{AssetRepositoryTrait, AssetServiceTrait};
