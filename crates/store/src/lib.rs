#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cne5-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod frame;

mod calendar;
pub use calendar::TradingCalendar;

mod industry_map;
pub use industry_map::{IndustryMap, default_label_mapping};

mod panel;
pub use panel::PanelStore;

mod sink;
pub use sink::ArtifactSink;

mod validate;
pub use validate::{
    Issue, Severity, check_completeness, check_covariance, check_cross_section,
    check_factor_returns, check_specific_risks,
};

mod error;
pub use error::StoreError;
