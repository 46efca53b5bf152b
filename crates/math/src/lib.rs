#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cne5-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod stats;
pub use stats::{population_std, quantile, sample_std};

mod rolling;
pub use rolling::{rolling_beta, rolling_mean, rolling_std};

mod winsorize;
pub use winsorize::winsorize;

mod ewma;
pub use ewma::{ewma_covariance, ewma_std, exp_weights};

mod linalg;
pub use linalg::{
    WlsSolution, determinant, invert_matrix, lift_positive_definite, symmetric_eigenvalues,
    wls_ridge,
};

mod error;
pub use error::MathError;
