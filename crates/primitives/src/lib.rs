#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cne5-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod security;
pub use security::{ParseCodeError, SecurityCode};

mod industry;
pub use industry::Industry;

mod factor;
pub use factor::{FACTOR_COUNT, Factor, INDUSTRY_COUNT, STYLE_COUNT, StyleFactor};

mod observation;
pub use observation::{BenchmarkObservation, PriceObservation, derive_returns};

mod exposure;
pub use exposure::{CrossSection, ExposureSeries};

mod returns;
pub use returns::{FactorReturnSeries, ResidualPanel};

mod risk;
pub use risk::RiskParameters;

/// Canonical A-share trading session date.
pub type TradeDate = chrono::NaiveDate;
