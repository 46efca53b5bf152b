#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cne5-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::PipelineConfig;

mod transpose;
pub use transpose::transpose;

mod report;
pub use report::{RunReport, RunStatus};

mod run;
pub use run::Pipeline;

mod error;
pub use error::PipelineError;
