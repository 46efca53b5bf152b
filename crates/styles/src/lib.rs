#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cne5-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod size;
pub use size::{non_linear_size, size};

mod beta;
pub use beta::{BetaConfig, beta};

mod momentum;
pub use momentum::{MomentumConfig, momentum};

mod volatility;
pub use volatility::{VolatilityConfig, volatility};

mod value;
pub use value::{book_to_price, earnings_yield};

mod liquidity;
pub use liquidity::{LiquidityConfig, liquidity};

mod fundamental;
pub use fundamental::{growth, leverage};

mod builder;
pub use builder::{ExposureBuilder, ExposureConfig, WinsorQuantiles};

mod error;
pub use error::StyleError;
