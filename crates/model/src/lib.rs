#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cne5-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod regression;
pub use regression::{CrossSectionRegressor, DayRegression, RegressionConfig};

mod risk;
pub use risk::{RiskConfig, RiskEstimator, RiskModel};

mod error;
pub use error::ModelError;

/// Re-export commonly used types.
pub mod prelude {
    pub use cne5_traits::FactorEstimator;

    pub use super::{
        CrossSectionRegressor, DayRegression, ModelError, RegressionConfig, RiskConfig,
        RiskEstimator, RiskModel,
    };
}
