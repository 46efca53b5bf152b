//! Post-publish validation of artifacts.

use std::collections::{BTreeMap, HashSet};

use cne5_math::symmetric_eigenvalues;
use cne5_primitives::{CrossSection, FactorReturnSeries, STYLE_COUNT, SecurityCode, TradeDate};
use ndarray::Array2;

const INDUSTRY_SUM_TOLERANCE: f64 = 1e-12;
const SYMMETRY_TOLERANCE: f64 = 1e-12;

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The artifact is usable but suspicious.
    Warning,
    /// The artifact violates a contractual invariant.
    Error,
}

/// One structured validation finding. A non-empty issue list downgrades
/// the run to "with warnings" without rolling the publish back.
#[derive(Debug, Clone)]
pub struct Issue {
    /// Finding severity.
    pub severity: Severity,
    /// Name of the violated check.
    pub check: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl Issue {
    /// A warning-level finding.
    #[must_use]
    pub fn warning(check: &'static str, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, check, message: message.into() }
    }

    /// An error-level finding.
    #[must_use]
    pub fn error(check: &'static str, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, check, message: message.into() }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{severity}] {}: {}", self.check, self.message)
    }
}

/// Completeness: published per-date artifacts cover the expected trading
/// days, allowing `tolerance` missing days at the calendar edges.
#[must_use]
pub fn check_completeness(
    published: &[TradeDate],
    expected: &[TradeDate],
    tolerance: usize,
) -> Vec<Issue> {
    let have: HashSet<TradeDate> = published.iter().copied().collect();
    let missing: Vec<TradeDate> =
        expected.iter().copied().filter(|d| !have.contains(d)).collect();

    if missing.len() <= tolerance {
        return Vec::new();
    }
    vec![Issue::warning(
        "completeness",
        format!(
            "{} of {} expected trading days missing (first: {})",
            missing.len(),
            expected.len(),
            missing[0]
        ),
    )]
}

/// Row invariant: the thirty industry dummies of every cross-section row
/// sum to exactly one.
#[must_use]
pub fn check_cross_section(cross_section: &CrossSection) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (row, code) in cross_section.codes.iter().enumerate() {
        let sum: f64 =
            cross_section.exposures.row(row).iter().skip(STYLE_COUNT).sum();
        if (sum - 1.0).abs() > INDUSTRY_SUM_TOLERANCE {
            issues.push(Issue::error(
                "industry_sum",
                format!("{} on {}: industry dummies sum to {sum}", code, cross_section.date),
            ));
        }
    }
    issues
}

/// Row invariant: no factor-return row contains non-finite values.
#[must_use]
pub fn check_factor_returns(series: &FactorReturnSeries) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (date, row) in series.dates().iter().zip(series.rows()) {
        if row.iter().any(|x| !x.is_finite()) {
            issues.push(Issue::error(
                "factor_returns_finite",
                format!("factor-return row for {date} contains non-finite values"),
            ));
        }
    }
    issues
}

/// Covariance invariants: symmetric within tolerance, smallest eigenvalue
/// strictly positive.
#[must_use]
pub fn check_covariance(covariance: &Array2<f64>) -> Vec<Issue> {
    let mut issues = Vec::new();
    let n = covariance.nrows();

    if covariance.ncols() != n {
        issues.push(Issue::error(
            "covariance_shape",
            format!("covariance is {}x{}, expected square", n, covariance.ncols()),
        ));
        return issues;
    }

    let mut max_asymmetry = 0.0_f64;
    for i in 0..n {
        for j in (i + 1)..n {
            max_asymmetry =
                max_asymmetry.max((covariance[[i, j]] - covariance[[j, i]]).abs());
        }
    }
    if max_asymmetry > SYMMETRY_TOLERANCE {
        issues.push(Issue::error(
            "covariance_symmetry",
            format!("maximum asymmetry {max_asymmetry:e} exceeds tolerance"),
        ));
    }

    match symmetric_eigenvalues(covariance) {
        Ok(eigenvalues) => {
            let min = eigenvalues.first().copied().unwrap_or(0.0);
            if min <= 0.0 {
                issues.push(Issue::error(
                    "covariance_eigenvalues",
                    format!("smallest eigenvalue {min:e} is not strictly positive"),
                ));
            }
        }
        Err(err) => {
            issues.push(Issue::error("covariance_eigenvalues", err.to_string()));
        }
    }

    issues
}

/// Specific-risk invariant: every value within the configured bounds.
#[must_use]
pub fn check_specific_risks(
    risks: &BTreeMap<SecurityCode, f64>,
    floor: f64,
    cap: f64,
) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (code, risk) in risks {
        if !risk.is_finite() || *risk < floor || *risk > cap {
            issues.push(Issue::error(
                "specific_risk_bounds",
                format!("{code}: specific risk {risk} outside [{floor}, {cap}]"),
            ));
        }
    }
    issues
}
