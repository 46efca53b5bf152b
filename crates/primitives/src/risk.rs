//! The published risk-parameters document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::TradeDate;

/// The "latest" risk-model document published after every estimation.
///
/// Maps are keyed by factor column name and security code; `BTreeMap`
/// keeps the serialized document byte-stable across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskParameters {
    /// Latest trading day that entered the estimation.
    pub estimation_date: TradeDate,
    /// Estimation window in sessions.
    pub estimation_window: usize,
    /// Exponential-decay half-life in sessions.
    pub half_life: usize,
    /// Number of factors in the covariance matrix.
    pub num_factors: usize,
    /// Number of securities with a specific-risk estimate.
    pub num_stocks: usize,
    /// Factor covariance, nested by factor column name.
    pub factor_covariance: BTreeMap<String, BTreeMap<String, f64>>,
    /// Annualized factor volatility by factor column name.
    pub factor_volatility: BTreeMap<String, f64>,
    /// Specific risk by security code.
    pub specific_risks: BTreeMap<String, f64>,
}
