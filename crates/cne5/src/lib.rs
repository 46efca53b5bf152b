#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/cne5-rs/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use cne5_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use cne5_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use cne5_math as math;
#[cfg(feature = "styles")]
#[doc(inline)]
pub use cne5_styles as styles;
#[cfg(feature = "model")]
#[doc(inline)]
pub use cne5_model as model;
#[cfg(feature = "store")]
#[doc(inline)]
pub use cne5_store as store;
#[cfg(feature = "pipeline")]
#[doc(inline)]
pub use cne5_pipeline as pipeline;
