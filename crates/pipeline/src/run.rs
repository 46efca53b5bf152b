//! Pipeline orchestration: full build and incremental append.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use cne5_model::{CrossSectionRegressor, DayRegression, RiskEstimator};
use cne5_primitives::{
    CrossSection, FACTOR_COUNT, FactorReturnSeries, ResidualPanel, SecurityCode, TradeDate,
};
use cne5_store::{
    ArtifactSink, Issue, check_completeness, check_covariance, check_cross_section,
    check_factor_returns, check_specific_risks,
};
use cne5_styles::ExposureBuilder;
use cne5_traits::{FactorEstimator, PanelSource};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::{PipelineConfig, PipelineError, RunReport, transpose};

/// Securities per fan-out batch; bounds how many exposure series are in
/// flight before the driving thread serializes them to the sink.
const EXPOSURE_BATCH: usize = 256;

/// Wires the panel source, exposure builder, regressor, risk estimator
/// and artifact sink into a batch run.
///
/// Work fans out over a pool sized by the configuration; the driving
/// thread is the only writer per artifact key, and all published series
/// are date-sorted regardless of completion order. Pre-warm the panel
/// source before running so workers only hit in-memory caches.
#[derive(Debug)]
pub struct Pipeline<'a, S> {
    source: &'a S,
    sink: ArtifactSink,
    config: PipelineConfig,
}

impl<'a, S: PanelSource> Pipeline<'a, S> {
    /// Create a pipeline with default configuration.
    #[must_use]
    pub fn new(source: &'a S, sink: ArtifactSink) -> Self {
        Self::with_config(source, sink, PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration.
    #[must_use]
    pub const fn with_config(source: &'a S, sink: ArtifactSink, config: PipelineConfig) -> Self {
        Self { source, sink, config }
    }

    /// The artifact sink.
    #[must_use]
    pub const fn sink(&self) -> &ArtifactSink {
        &self.sink
    }

    /// Run a full build: exposures for every security, per-date cross
    /// sections, per-day factor returns, and the risk model.
    ///
    /// # Errors
    /// Returns `PipelineError` on fatal I/O or configuration failures;
    /// data-quality findings land in the report instead.
    pub fn full_build(&self) -> Result<RunReport, PipelineError> {
        self.sink.ensure_layout()?;
        let mut report = RunReport::default();

        let codes = self.source.securities();
        let benchmark = self.source.benchmark_history();
        info!(securities = codes.len(), "full build started");

        let builder = ExposureBuilder::with_config(self.config.exposure.clone());
        let pool = self.pool()?;

        let mut exposure_dates: BTreeSet<TradeDate> = BTreeSet::new();
        for batch in codes.chunks(EXPOSURE_BATCH) {
            let results = pool.install(|| {
                batch
                    .par_iter()
                    .map(|code| {
                        let history = self.source.price_history(code);
                        let industry = self.source.industry(code);
                        builder.build(code.clone(), industry, &history, &benchmark)
                    })
                    .collect::<Result<Vec<_>, _>>()
            })?;

            for series in results {
                match series {
                    Some(series) => {
                        exposure_dates.extend(series.dates.iter().copied());
                        self.sink.write_exposures(&series)?;
                        report.securities_built += 1;
                    }
                    None => report.securities_skipped += 1,
                }
            }
        }
        info!(
            built = report.securities_built,
            skipped = report.securities_skipped,
            "exposure series published"
        );

        let dates: Vec<TradeDate> = exposure_dates.into_iter().collect();
        let published = transpose(&self.sink, &codes, &dates, self.config.transpose_chunk)?;
        report.days_published = published.len();

        let days = self.regress_days(&pool, &published)?;
        let (series, residuals) = collect_days(days, &mut report);
        self.sink.write_factor_returns(&series)?;
        self.sink.write_residuals(&residuals)?;

        self.estimate_and_publish_risk(&series, &residuals, &mut report)?;

        self.check_calendar_coverage(&published, &mut report);
        self.validate_days(&published, &mut report)?;
        report.issues.extend(check_factor_returns(&self.sink.read_factor_returns()?));

        info!(status = ?report.status(), "full build finished");
        Ok(report)
    }

    /// Append trading days after the latest published cross section
    /// without recomputing history, then re-estimate the risk model.
    ///
    /// # Errors
    /// Returns `PipelineError::NoExistingArtifacts` when no prior build
    /// exists, and on fatal I/O failures.
    pub fn incremental(&self) -> Result<RunReport, PipelineError> {
        self.sink.ensure_layout()?;
        let mut report = RunReport::default();

        let cursor = self
            .sink
            .latest_cross_section_date()?
            .ok_or(PipelineError::NoExistingArtifacts)?;
        let new_days = self.source.trading_days(Some(cursor));
        if new_days.is_empty() {
            info!(%cursor, "no new trading days to append");
            return Ok(report);
        }
        info!(%cursor, new_days = new_days.len(), "incremental append started");

        let codes = self.source.securities();
        let benchmark = self.source.benchmark_history();
        let builder = ExposureBuilder::with_config(self.config.exposure.clone());
        let pool = self.pool()?;

        let mut buffers: BTreeMap<TradeDate, (Vec<SecurityCode>, Vec<Array1<f64>>)> =
            new_days.iter().map(|d| (*d, (Vec::new(), Vec::new()))).collect();

        for batch in codes.chunks(EXPOSURE_BATCH) {
            let results = pool.install(|| {
                batch
                    .par_iter()
                    .map(|code| {
                        let history = self.source.price_history(code);
                        let industry = self.source.industry(code);
                        builder.build(code.clone(), industry, &history, &benchmark)
                    })
                    .collect::<Result<Vec<_>, _>>()
            })?;

            for series in results.into_iter().flatten() {
                let appended = self.sink.append_exposures(&series, cursor)?;
                if appended > 0 {
                    report.securities_built += 1;
                }
                for (date, buffer) in &mut buffers {
                    if let Some(row) = series.position(*date) {
                        buffer.0.push(series.code.clone());
                        buffer.1.push(series.dense_row(row));
                    }
                }
            }
        }

        let mut published = Vec::new();
        for (date, (row_codes, rows)) in buffers {
            if row_codes.is_empty() {
                continue;
            }
            let mut exposures = Array2::from_elem((rows.len(), FACTOR_COUNT), f64::NAN);
            for (i, row) in rows.iter().enumerate() {
                for (j, value) in row.iter().enumerate() {
                    exposures[[i, j]] = *value;
                }
            }
            self.sink.write_cross_section(&CrossSection { date, codes: row_codes, exposures })?;
            published.push(date);
        }
        report.days_published = published.len();

        let days = self.regress_days(&pool, &published)?;
        let (new_series, new_residuals) = collect_days(days, &mut report);

        let new_dates: HashSet<TradeDate> = new_series.dates().iter().copied().collect();

        let existing = self.sink.read_factor_returns()?;
        let mut merged = FactorReturnSeries::new();
        for (date, row) in existing.dates().iter().zip(existing.rows()) {
            if !new_dates.contains(date) {
                merged.push(*date, row.clone());
            }
        }
        for (date, row) in new_series.dates().iter().zip(new_series.rows()) {
            merged.push(*date, row.clone());
        }
        merged.sort_by_date();
        self.sink.write_factor_returns(&merged)?;

        let existing_residuals = self.sink.read_residuals()?;
        let mut merged_residuals = ResidualPanel::new();
        for (date, code, residual) in existing_residuals.rows() {
            if !new_dates.contains(date) {
                merged_residuals.push(*date, code.clone(), *residual);
            }
        }
        for (date, code, residual) in new_residuals.rows() {
            merged_residuals.push(*date, code.clone(), *residual);
        }
        merged_residuals.sort();
        self.sink.write_residuals(&merged_residuals)?;

        // Covariance estimation is cheap next to the exposure pass, so
        // the risk model is always refreshed.
        self.estimate_and_publish_risk(&merged, &merged_residuals, &mut report)?;

        self.validate_days(&published, &mut report)?;
        report.issues.extend(check_factor_returns(&new_series));

        info!(status = ?report.status(), days = report.days_published, "incremental append finished");
        Ok(report)
    }

    fn pool(&self) -> Result<rayon::ThreadPool, PipelineError> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.parallelism.max(1))
            .build()
            .map_err(|err| PipelineError::ThreadPool(err.to_string()))
    }

    fn regress_days(
        &self,
        pool: &rayon::ThreadPool,
        dates: &[TradeDate],
    ) -> Result<Vec<DayRegression>, PipelineError> {
        let regressor = CrossSectionRegressor::with_config(self.config.regression.clone());

        let days = pool.install(|| {
            dates
                .par_iter()
                .map(|date| -> Result<Option<DayRegression>, PipelineError> {
                    let Some(cross_section) = self.sink.read_cross_section(*date)? else {
                        return Ok(None);
                    };
                    Ok(Some(self.regress_one(&regressor, &cross_section)?))
                })
                .collect::<Result<Vec<_>, _>>()
        })?;

        let mut days: Vec<DayRegression> = days.into_iter().flatten().collect();
        days.sort_by_key(|day| day.date);
        Ok(days)
    }

    fn regress_one(
        &self,
        regressor: &CrossSectionRegressor,
        cross_section: &CrossSection,
    ) -> Result<DayRegression, PipelineError> {
        let returns = Array1::from_iter(cross_section.codes.iter().map(|code| {
            self.source
                .observation_on(code, cross_section.date)
                .map_or(f64::NAN, |obs| obs.pct_change)
        }));
        let market_values = Array1::from_iter(cross_section.codes.iter().map(|code| {
            self.source.market_value_asof(code, cross_section.date).unwrap_or(f64::NAN)
        }));

        Ok(regressor.regress(cross_section, &returns, &market_values)?)
    }

    fn estimate_and_publish_risk(
        &self,
        series: &FactorReturnSeries,
        residuals: &ResidualPanel,
        report: &mut RunReport,
    ) -> Result<(), PipelineError> {
        let estimator = RiskEstimator::with_config(self.config.risk.clone());
        match estimator.estimate(series, residuals) {
            Ok(model) => {
                self.sink.write_specific_risks(&model.specific_risks)?;
                self.sink.write_risk_parameters(&model.to_parameters(estimator.config()))?;

                report.issues.extend(check_covariance(&model.covariance));
                report.issues.extend(check_specific_risks(
                    &model.specific_risks,
                    self.config.risk.specific_risk_floor,
                    self.config.risk.specific_risk_cap,
                ));
                Ok(())
            }
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, "risk estimation skipped");
                report.issues.push(Issue::warning("risk_estimation", err.to_string()));
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn check_calendar_coverage(&self, published: &[TradeDate], report: &mut RunReport) {
        let calendar = self.source.trading_days(None);
        if calendar.is_empty() {
            report.issues.push(Issue::warning(
                "calendar",
                "trading calendar unavailable; completeness not checked",
            ));
            return;
        }
        if let (Some(first), Some(last)) = (published.first(), published.last()) {
            let expected: Vec<TradeDate> =
                calendar.into_iter().filter(|d| d >= first && d <= last).collect();
            report.issues.extend(check_completeness(
                published,
                &expected,
                self.config.completeness_tolerance,
            ));
        }
    }

    fn validate_days(
        &self,
        published: &[TradeDate],
        report: &mut RunReport,
    ) -> Result<(), PipelineError> {
        for date in published {
            if let Some(cross_section) = self.sink.read_cross_section(*date)? {
                report.issues.extend(check_cross_section(&cross_section));
            }
        }
        Ok(())
    }
}

fn collect_days(
    days: Vec<DayRegression>,
    report: &mut RunReport,
) -> (FactorReturnSeries, ResidualPanel) {
    let mut series = FactorReturnSeries::new();
    let mut residuals = ResidualPanel::new();
    for day in days {
        if day.insufficient {
            report.days_insufficient += 1;
        } else {
            report.days_regressed += 1;
        }
        residuals.extend_day(day.date, &day.residuals);
        series.push(day.date, day.factor_returns);
    }
    (series, residuals)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use cne5_store::PanelStore;
    use cne5_styles::{LiquidityConfig, MomentumConfig, VolatilityConfig};
    use polars::prelude::*;

    use crate::RunStatus;

    use super::*;

    fn day(offset: i64) -> TradeDate {
        TradeDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Duration::days(offset)
    }

    fn write_frame(path: &Path, mut df: DataFrame) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let file = std::fs::File::create(path).unwrap();
        ParquetWriter::new(file).finish(&mut df).unwrap();
    }

    fn write_daily(root: &Path, code: &str, dates: &[TradeDate], closes: &[f64]) {
        let n = dates.len();
        let df = DataFrame::new(vec![
            Column::new("trade_date".into(), dates.to_vec()),
            Column::new("close".into(), closes.to_vec()),
            Column::new("pct_chg".into(), vec![f64::NAN; n]),
            Column::new("turnover_rate".into(), vec![1.2; n]),
            Column::new(
                "total_mv".into(),
                (0..n).map(|i| 1e9 * (1.0 + 0.001 * i as f64)).collect::<Vec<f64>>(),
            ),
            Column::new("pb".into(), vec![1.8; n]),
            Column::new("pe_ttm".into(), vec![22.0; n]),
        ])
        .unwrap();
        write_frame(&root.join(format!("daily/{code}.parquet")), df);
    }

    fn write_calendar(root: &Path, dates: &[TradeDate]) {
        let df = DataFrame::new(vec![
            Column::new("cal_date".into(), dates.to_vec()),
            Column::new("is_open".into(), vec![1i64; dates.len()]),
        ])
        .unwrap();
        write_frame(&root.join("trade_cal/data.parquet"), df);
    }

    fn closes(code_seed: u64, n: usize) -> Vec<f64> {
        // Deterministic pseudo-random walk, different per security.
        let mut state = code_seed;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                let step = ((state >> 33) % 1000) as f64 / 1000.0 - 0.5;
                50.0 * (1.0 + 0.02 * step)
            })
            .collect()
    }

    fn write_panel(root: &Path, n_days: usize) {
        let dates: Vec<TradeDate> = (0..n_days as i64).map(day).collect();
        for (i, code) in ["000001.SZ", "000002.SZ", "600519.SH"].iter().enumerate() {
            write_daily(root, code, &dates, &closes(i as u64 + 7, n_days));
        }
        write_calendar(root, &dates);
    }

    fn small_config() -> PipelineConfig {
        let mut config = PipelineConfig {
            parallelism: 2,
            transpose_chunk: 3,
            ..PipelineConfig::default()
        };
        config.exposure.beta.window = 10;
        config.exposure.momentum = MomentumConfig { short: 2, long: 10 };
        config.exposure.volatility = VolatilityConfig { window: 10, min_valid: 5 };
        config.exposure.liquidity = LiquidityConfig {
            windows: [3, 5, 10],
            min_valid: [2, 3, 5],
            weights: [0.35, 0.35, 0.30],
        };
        config.regression.min_stocks = 2;
        config.risk.estimation_window = 10;
        config
    }

    #[test]
    fn full_build_publishes_every_artifact() {
        let panel_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        write_panel(panel_dir.path(), 20);

        let mut store = PanelStore::open(panel_dir.path());
        store.prewarm();

        let pipeline =
            Pipeline::with_config(&store, ArtifactSink::new(out_dir.path()), small_config());
        let report = pipeline.full_build().unwrap();

        assert_eq!(report.status(), RunStatus::Clean, "issues: {:?}", report.issues);
        assert_eq!(report.securities_built, 3);
        assert_eq!(report.securities_skipped, 0);
        // 20 sessions with a 10-session window: rows from session 10 on.
        assert_eq!(report.days_published, 11);
        assert_eq!(report.days_regressed, 11);
        assert_eq!(report.days_insufficient, 0);

        let sink = pipeline.sink();
        assert_eq!(sink.exposure_codes().unwrap().len(), 3);
        assert_eq!(sink.cross_section_dates().unwrap().len(), 11);

        let series = sink.read_factor_returns().unwrap();
        assert_eq!(series.len(), 11);
        assert!(series.rows().iter().all(|row| row.iter().all(|x| x.is_finite())));

        let risks = sink.read_specific_risks().unwrap();
        assert_eq!(risks.len(), 3);
        assert!(risks.values().all(|r| (0.01..=0.10).contains(r)));

        let params = sink.read_risk_parameters().unwrap().unwrap();
        assert_eq!(params.num_factors, FACTOR_COUNT);
        assert_eq!(params.estimation_date, day(19));
    }

    #[test]
    fn full_build_is_idempotent() {
        let panel_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        write_panel(panel_dir.path(), 20);

        let store = PanelStore::open(panel_dir.path());
        let pipeline =
            Pipeline::with_config(&store, ArtifactSink::new(out_dir.path()), small_config());

        pipeline.full_build().unwrap();
        let returns_path = out_dir.path().join("risk/factor_returns.parquet");
        let first = std::fs::read(&returns_path).unwrap();
        let first_params =
            std::fs::read(out_dir.path().join("risk/risk_params_latest.json")).unwrap();

        pipeline.full_build().unwrap();
        assert_eq!(std::fs::read(&returns_path).unwrap(), first);
        assert_eq!(
            std::fs::read(out_dir.path().join("risk/risk_params_latest.json")).unwrap(),
            first_params
        );
    }

    #[test]
    fn incremental_append_matches_a_full_rebuild() {
        let panel_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        write_panel(panel_dir.path(), 20);

        {
            let store = PanelStore::open(panel_dir.path());
            let pipeline = Pipeline::with_config(
                &store,
                ArtifactSink::new(out_dir.path()),
                small_config(),
            );
            pipeline.full_build().unwrap();
        }

        let before = ArtifactSink::new(out_dir.path()).read_factor_returns().unwrap();
        assert_eq!(before.len(), 11);

        // Two more sessions arrive.
        write_panel(panel_dir.path(), 22);
        let store = PanelStore::open(panel_dir.path());
        let pipeline =
            Pipeline::with_config(&store, ArtifactSink::new(out_dir.path()), small_config());
        let report = pipeline.incremental().unwrap();

        assert_eq!(report.days_published, 2);
        assert_eq!(pipeline.sink().cross_section_dates().unwrap().len(), 13);

        let after = pipeline.sink().read_factor_returns().unwrap();
        assert_eq!(after.len(), 13);
        // History is untouched by the append.
        for i in 0..before.len() {
            assert_eq!(after.dates()[i], before.dates()[i]);
            assert_eq!(after.rows()[i], before.rows()[i]);
        }

        // Append equivalence: a fresh full build over all 22 sessions
        // covers the same dates and produces identical rows for the
        // appended days. (Earlier rows may shift marginally because the
        // winsorization quantiles now see two more sessions.)
        let fresh_dir = tempfile::tempdir().unwrap();
        let fresh = Pipeline::with_config(
            &store,
            ArtifactSink::new(fresh_dir.path()),
            small_config(),
        );
        fresh.full_build().unwrap();
        let rebuilt = fresh.sink().read_factor_returns().unwrap();

        assert_eq!(rebuilt.dates(), after.dates());
        for i in before.len()..after.len() {
            assert_eq!(rebuilt.rows()[i], after.rows()[i]);
        }
    }

    #[test]
    fn incremental_without_new_days_is_a_no_op() {
        let panel_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        write_panel(panel_dir.path(), 20);

        let store = PanelStore::open(panel_dir.path());
        let pipeline =
            Pipeline::with_config(&store, ArtifactSink::new(out_dir.path()), small_config());
        pipeline.full_build().unwrap();

        let report = pipeline.incremental().unwrap();
        assert_eq!(report.days_published, 0);
        assert_eq!(report.status(), RunStatus::Clean);
    }

    #[test]
    fn incremental_requires_a_prior_build() {
        let panel_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        write_panel(panel_dir.path(), 20);

        let store = PanelStore::open(panel_dir.path());
        let pipeline =
            Pipeline::with_config(&store, ArtifactSink::new(out_dir.path()), small_config());

        assert!(matches!(
            pipeline.incremental(),
            Err(PipelineError::NoExistingArtifacts)
        ));
    }

    #[test]
    fn sparse_panels_are_skipped_not_fatal() {
        let panel_dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();

        // Two long securities, one too short for the window.
        let dates: Vec<TradeDate> = (0..20).map(day).collect();
        write_daily(panel_dir.path(), "000001.SZ", &dates, &closes(3, 20));
        write_daily(panel_dir.path(), "000002.SZ", &dates, &closes(4, 20));
        write_daily(panel_dir.path(), "600519.SH", &dates[..5], &closes(5, 5));
        write_calendar(panel_dir.path(), &dates);

        let store = PanelStore::open(panel_dir.path());
        let pipeline =
            Pipeline::with_config(&store, ArtifactSink::new(out_dir.path()), small_config());
        let report = pipeline.full_build().unwrap();

        assert_eq!(report.securities_built, 2);
        assert_eq!(report.securities_skipped, 1);
        assert_eq!(report.days_regressed, 11);
    }
}
