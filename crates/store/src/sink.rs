//! Artifact sink with atomic publish semantics.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use cne5_primitives::{
    CrossSection, ExposureSeries, FACTOR_COUNT, Factor, FactorReturnSeries, Industry,
    ResidualPanel, RiskParameters, STYLE_COUNT, SecurityCode, StyleFactor, TradeDate,
};
use ndarray::Array2;
use polars::prelude::*;
use tracing::warn;

use crate::StoreError;
use crate::frame::{
    date_column, f64_column, read_parquet, str_column, write_json_atomic, write_parquet_atomic,
};

const DATE_FORMAT: &str = "%Y%m%d";

/// Writes and re-reads every published artifact. All writes go through a
/// temp file and a rename; one writer per artifact key.
#[derive(Debug, Clone)]
pub struct ArtifactSink {
    root: PathBuf,
}

impl ArtifactSink {
    /// Create a sink rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the sink.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the artifact directory layout. An unwritable output tree is
    /// the one fatal storage condition.
    ///
    /// # Errors
    /// Returns `StoreError::Io` when a directory cannot be created.
    pub fn ensure_layout(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(self.by_security_dir())?;
        std::fs::create_dir_all(self.by_date_dir())?;
        std::fs::create_dir_all(self.risk_dir())?;
        Ok(())
    }

    fn by_security_dir(&self) -> PathBuf {
        self.root.join("factors/by_security")
    }

    fn by_date_dir(&self) -> PathBuf {
        self.root.join("factors/by_date")
    }

    fn risk_dir(&self) -> PathBuf {
        self.root.join("risk")
    }

    fn by_security_path(&self, code: &SecurityCode) -> PathBuf {
        self.by_security_dir().join(format!("{}.parquet", code.as_str()))
    }

    fn by_date_path(&self, date: TradeDate) -> PathBuf {
        self.by_date_dir().join(format!("{}.parquet", date.format(DATE_FORMAT)))
    }

    /// Publish one security's exposure series.
    ///
    /// # Errors
    /// Returns `StoreError` on write failure.
    pub fn write_exposures(&self, series: &ExposureSeries) -> Result<(), StoreError> {
        let rows: Vec<usize> = (0..series.len()).collect();
        let mut df = exposure_frame(series, &rows)?;
        write_parquet_atomic(&self.by_security_path(&series.code), &mut df)
    }

    /// Append the rows of `series` dated strictly after `after` to the
    /// security's exposure artifact, creating it when absent. Rows
    /// already present are not duplicated. Returns the appended count.
    ///
    /// # Errors
    /// Returns `StoreError` on read or write failure.
    pub fn append_exposures(
        &self,
        series: &ExposureSeries,
        after: TradeDate,
    ) -> Result<usize, StoreError> {
        let path = self.by_security_path(&series.code);
        let existing = if path.exists() { Some(read_parquet(&path)?) } else { None };

        let known: HashSet<TradeDate> = existing
            .as_ref()
            .map(|df| {
                date_column(df, "trade_date")
                    .map(|dates| dates.into_iter().flatten().collect())
            })
            .transpose()?
            .unwrap_or_default();

        let rows: Vec<usize> = (0..series.len())
            .filter(|&i| series.dates[i] > after && !known.contains(&series.dates[i]))
            .collect();
        if rows.is_empty() {
            return Ok(0);
        }

        let appended = exposure_frame(series, &rows)?;
        let mut combined = match existing {
            Some(df) => df.vstack(&appended)?,
            None => appended,
        };
        write_parquet_atomic(&path, &mut combined)?;
        Ok(rows.len())
    }

    /// Read one security's exposure series, if published.
    ///
    /// # Errors
    /// Returns `StoreError` on read failure or a malformed artifact.
    pub fn read_exposures(
        &self,
        code: &SecurityCode,
    ) -> Result<Option<ExposureSeries>, StoreError> {
        let path = self.by_security_path(code);
        if !path.exists() {
            return Ok(None);
        }
        let df = read_parquet(&path)?;

        let raw_dates = date_column(&df, "trade_date")?;
        let mut keep: Vec<usize> = Vec::with_capacity(raw_dates.len());
        let mut dates: Vec<TradeDate> = Vec::with_capacity(raw_dates.len());
        for (i, date) in raw_dates.iter().enumerate() {
            if let Some(date) = date {
                keep.push(i);
                dates.push(*date);
            }
        }

        let mut styles = Array2::from_elem((keep.len(), STYLE_COUNT), f64::NAN);
        for style in StyleFactor::ALL {
            let values = f64_column(&df, style.column_name())?;
            for (row, &i) in keep.iter().enumerate() {
                styles[[row, style.index()]] = values[i];
            }
        }

        let industry = read_industry(&df, &path)?;
        Ok(Some(ExposureSeries { code: code.clone(), industry, dates, styles }))
    }

    /// Securities with a published exposure artifact, sorted.
    ///
    /// # Errors
    /// Returns `StoreError` on directory scan failure.
    pub fn exposure_codes(&self) -> Result<Vec<SecurityCode>, StoreError> {
        let dir = self.by_security_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut codes: Vec<SecurityCode> = std::fs::read_dir(&dir)?
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                let stem = path.file_stem()?.to_str()?;
                SecurityCode::parse(stem).ok()
            })
            .collect();
        codes.sort_unstable();
        Ok(codes)
    }

    /// Publish one trading day's cross section.
    ///
    /// # Errors
    /// Returns `StoreError` on write failure.
    pub fn write_cross_section(&self, cross_section: &CrossSection) -> Result<(), StoreError> {
        let codes: Vec<String> =
            cross_section.codes.iter().map(|c| c.as_str().to_string()).collect();

        let mut columns: Vec<Column> = Vec::with_capacity(1 + FACTOR_COUNT);
        columns.push(Column::new("ts_code".into(), codes));
        for factor in Factor::ALL {
            let values: Vec<f64> = cross_section.exposures.column(factor.index()).to_vec();
            columns.push(Column::new(factor.column_name().into(), values));
        }

        let mut df = DataFrame::new(columns)?;
        write_parquet_atomic(&self.by_date_path(cross_section.date), &mut df)
    }

    /// Read one trading day's cross section, if published.
    ///
    /// # Errors
    /// Returns `StoreError` on read failure or a malformed artifact.
    pub fn read_cross_section(
        &self,
        date: TradeDate,
    ) -> Result<Option<CrossSection>, StoreError> {
        let path = self.by_date_path(date);
        if !path.exists() {
            return Ok(None);
        }
        let df = read_parquet(&path)?;

        let raw_codes = str_column(&df, "ts_code")?;
        let mut keep: Vec<usize> = Vec::with_capacity(raw_codes.len());
        let mut codes: Vec<SecurityCode> = Vec::with_capacity(raw_codes.len());
        for (i, raw) in raw_codes.iter().enumerate() {
            match SecurityCode::parse(raw.clone()) {
                Ok(code) => {
                    keep.push(i);
                    codes.push(code);
                }
                Err(_) => {
                    warn!(path = %path.display(), code = %raw, "skipping malformed security code");
                }
            }
        }

        let mut exposures = Array2::from_elem((keep.len(), FACTOR_COUNT), f64::NAN);
        for factor in Factor::ALL {
            let values = f64_column(&df, factor.column_name())?;
            for (row, &i) in keep.iter().enumerate() {
                exposures[[row, factor.index()]] = values[i];
            }
        }

        Ok(Some(CrossSection { date, codes, exposures }))
    }

    /// Dates with a published cross section, ascending.
    ///
    /// # Errors
    /// Returns `StoreError` on directory scan failure.
    pub fn cross_section_dates(&self) -> Result<Vec<TradeDate>, StoreError> {
        let dir = self.by_date_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut dates: Vec<TradeDate> = std::fs::read_dir(&dir)?
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().is_none_or(|ext| ext != "parquet") {
                    return None;
                }
                let stem = path.file_stem()?.to_str()?;
                TradeDate::parse_from_str(stem, DATE_FORMAT).ok()
            })
            .collect();
        dates.sort_unstable();
        Ok(dates)
    }

    /// The latest trading day with a published cross section.
    ///
    /// # Errors
    /// Returns `StoreError` on directory scan failure.
    pub fn latest_cross_section_date(&self) -> Result<Option<TradeDate>, StoreError> {
        Ok(self.cross_section_dates()?.last().copied())
    }

    /// Publish the factor-return series, sorted by date.
    ///
    /// # Errors
    /// Returns `StoreError` on write failure.
    pub fn write_factor_returns(&self, series: &FactorReturnSeries) -> Result<(), StoreError> {
        let mut sorted = series.clone();
        sorted.sort_by_date();

        let mut columns: Vec<Column> = Vec::with_capacity(1 + FACTOR_COUNT);
        columns.push(Column::new("trade_date".into(), sorted.dates().to_vec()));
        for factor in Factor::ALL {
            let values: Vec<f64> =
                sorted.rows().iter().map(|row| row[factor.index()]).collect();
            columns.push(Column::new(factor.column_name().into(), values));
        }

        let mut df = DataFrame::new(columns)?;
        write_parquet_atomic(&self.risk_dir().join("factor_returns.parquet"), &mut df)
    }

    /// Read the factor-return series; empty when never published.
    ///
    /// # Errors
    /// Returns `StoreError` on read failure or a malformed artifact.
    pub fn read_factor_returns(&self) -> Result<FactorReturnSeries, StoreError> {
        let path = self.risk_dir().join("factor_returns.parquet");
        let mut series = FactorReturnSeries::new();
        if !path.exists() {
            return Ok(series);
        }
        let df = read_parquet(&path)?;

        let dates = date_column(&df, "trade_date")?;
        let mut factor_values: Vec<Vec<f64>> = Vec::with_capacity(FACTOR_COUNT);
        for factor in Factor::ALL {
            factor_values.push(f64_column(&df, factor.column_name())?);
        }

        for (i, date) in dates.iter().enumerate() {
            let Some(date) = date else { continue };
            let row =
                ndarray::Array1::from_iter(factor_values.iter().map(|values| values[i]));
            series.push(*date, row);
        }
        series.sort_by_date();
        Ok(series)
    }

    /// Publish the residual panel, sorted by date then security.
    ///
    /// # Errors
    /// Returns `StoreError` on write failure.
    pub fn write_residuals(&self, panel: &ResidualPanel) -> Result<(), StoreError> {
        let mut sorted = panel.clone();
        sorted.sort();

        let dates: Vec<TradeDate> = sorted.rows().iter().map(|(d, _, _)| *d).collect();
        let codes: Vec<String> =
            sorted.rows().iter().map(|(_, c, _)| c.as_str().to_string()).collect();
        let values: Vec<f64> = sorted.rows().iter().map(|(_, _, r)| *r).collect();

        let mut df = DataFrame::new(vec![
            Column::new("trade_date".into(), dates),
            Column::new("ts_code".into(), codes),
            Column::new("residual".into(), values),
        ])?;
        write_parquet_atomic(&self.risk_dir().join("residuals.parquet"), &mut df)
    }

    /// Read the residual panel; empty when never published.
    ///
    /// # Errors
    /// Returns `StoreError` on read failure or a malformed artifact.
    pub fn read_residuals(&self) -> Result<ResidualPanel, StoreError> {
        let path = self.risk_dir().join("residuals.parquet");
        let mut panel = ResidualPanel::new();
        if !path.exists() {
            return Ok(panel);
        }
        let df = read_parquet(&path)?;

        let dates = date_column(&df, "trade_date")?;
        let codes = str_column(&df, "ts_code")?;
        let values = f64_column(&df, "residual")?;

        for i in 0..df.height() {
            let Some(date) = dates[i] else { continue };
            let Ok(code) = SecurityCode::parse(codes[i].clone()) else { continue };
            panel.push(date, code, values[i]);
        }
        panel.sort();
        Ok(panel)
    }

    /// Publish the per-security specific risks.
    ///
    /// # Errors
    /// Returns `StoreError` on write failure.
    pub fn write_specific_risks(
        &self,
        risks: &BTreeMap<SecurityCode, f64>,
    ) -> Result<(), StoreError> {
        let codes: Vec<String> = risks.keys().map(|c| c.as_str().to_string()).collect();
        let values: Vec<f64> = risks.values().copied().collect();

        let mut df = DataFrame::new(vec![
            Column::new("ts_code".into(), codes),
            Column::new("specific_risk".into(), values),
        ])?;
        write_parquet_atomic(&self.risk_dir().join("specific_risks.parquet"), &mut df)
    }

    /// Read the per-security specific risks; empty when never published.
    ///
    /// # Errors
    /// Returns `StoreError` on read failure or a malformed artifact.
    pub fn read_specific_risks(&self) -> Result<BTreeMap<SecurityCode, f64>, StoreError> {
        let path = self.risk_dir().join("specific_risks.parquet");
        let mut risks = BTreeMap::new();
        if !path.exists() {
            return Ok(risks);
        }
        let df = read_parquet(&path)?;

        let codes = str_column(&df, "ts_code")?;
        let values = f64_column(&df, "specific_risk")?;
        for (code, value) in codes.iter().zip(&values) {
            if let Ok(code) = SecurityCode::parse(code.clone()) {
                risks.insert(code, *value);
            }
        }
        Ok(risks)
    }

    /// Publish the latest risk-parameters document.
    ///
    /// # Errors
    /// Returns `StoreError` on write failure.
    pub fn write_risk_parameters(&self, params: &RiskParameters) -> Result<(), StoreError> {
        write_json_atomic(&self.risk_dir().join("risk_params_latest.json"), params)
    }

    /// Read the latest risk-parameters document, if published.
    ///
    /// # Errors
    /// Returns `StoreError` on read failure or a malformed document.
    pub fn read_risk_parameters(&self) -> Result<Option<RiskParameters>, StoreError> {
        let path = self.risk_dir().join("risk_params_latest.json");
        if !path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(&path)?;
        Ok(Some(serde_json::from_reader(file)?))
    }
}

fn exposure_frame(series: &ExposureSeries, rows: &[usize]) -> Result<DataFrame, StoreError> {
    let dates: Vec<TradeDate> = rows.iter().map(|&i| series.dates[i]).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(1 + FACTOR_COUNT);
    columns.push(Column::new("trade_date".into(), dates));
    for style in StyleFactor::ALL {
        let values: Vec<f64> =
            rows.iter().map(|&i| series.styles[[i, style.index()]]).collect();
        columns.push(Column::new(style.column_name().into(), values));
    }
    for industry in Industry::ALL {
        let dummy = if industry == series.industry { 1.0 } else { 0.0 };
        columns.push(Column::new(industry.column_name().into(), vec![dummy; rows.len()]));
    }

    Ok(DataFrame::new(columns)?)
}

fn read_industry(df: &DataFrame, path: &Path) -> Result<Industry, StoreError> {
    for industry in Industry::ALL {
        let values = f64_column(df, industry.column_name())?;
        if values.first().copied() == Some(1.0) {
            return Ok(industry);
        }
    }
    warn!(path = %path.display(), "no industry dummy set, falling back to comprehensive");
    Ok(Industry::Comprehensive)
}

#[cfg(test)]
mod tests {
    use ndarray::Array1;

    use super::*;

    fn day(d: u32) -> TradeDate {
        TradeDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn code(s: &str) -> SecurityCode {
        SecurityCode::parse(s).unwrap()
    }

    fn sample_series() -> ExposureSeries {
        let mut styles = Array2::from_elem((3, STYLE_COUNT), 0.25);
        styles[[1, StyleFactor::Growth.index()]] = f64::NAN;
        ExposureSeries {
            code: code("000001.SZ"),
            industry: Industry::Banking,
            dates: vec![day(25), day(26), day(27)],
            styles,
        }
    }

    #[test]
    fn exposure_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ArtifactSink::new(dir.path());
        sink.ensure_layout().unwrap();

        let series = sample_series();
        sink.write_exposures(&series).unwrap();

        let read = sink.read_exposures(&series.code).unwrap().unwrap();
        assert_eq!(read.dates, series.dates);
        assert_eq!(read.industry, Industry::Banking);
        assert_eq!(read.styles[[0, 0]], 0.25);
        assert!(read.styles[[1, StyleFactor::Growth.index()]].is_nan());

        assert_eq!(sink.exposure_codes().unwrap(), vec![series.code.clone()]);
        assert!(sink.read_exposures(&code("999999.SZ")).unwrap().is_none());
    }

    #[test]
    fn append_skips_known_dates() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ArtifactSink::new(dir.path());
        sink.ensure_layout().unwrap();

        let series = sample_series();
        sink.write_exposures(&series).unwrap();

        // Appending with a cursor before the last row only adds new dates.
        let appended = sink.append_exposures(&series, day(26)).unwrap();
        assert_eq!(appended, 0, "existing dates must not duplicate");

        let mut extended = series.clone();
        extended.dates.push(day(28));
        let mut styles = Array2::from_elem((4, STYLE_COUNT), 0.25);
        styles[[1, StyleFactor::Growth.index()]] = f64::NAN;
        extended.styles = styles;

        let appended = sink.append_exposures(&extended, day(26)).unwrap();
        assert_eq!(appended, 1);

        let read = sink.read_exposures(&series.code).unwrap().unwrap();
        assert_eq!(read.dates, vec![day(25), day(26), day(27), day(28)]);
    }

    #[test]
    fn cross_section_round_trip_and_dates() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ArtifactSink::new(dir.path());
        sink.ensure_layout().unwrap();

        let mut exposures = Array2::from_elem((2, FACTOR_COUNT), 0.0);
        exposures[[0, 0]] = 1.5;
        exposures[[0, STYLE_COUNT]] = 1.0;
        exposures[[1, STYLE_COUNT + 1]] = 1.0;
        let cross_section = CrossSection {
            date: day(27),
            codes: vec![code("000001.SZ"), code("600519.SH")],
            exposures,
        };
        sink.write_cross_section(&cross_section).unwrap();

        let read = sink.read_cross_section(day(27)).unwrap().unwrap();
        assert_eq!(read.codes, cross_section.codes);
        assert_eq!(read.exposures[[0, 0]], 1.5);
        assert_eq!(read.exposures[[1, STYLE_COUNT + 1]], 1.0);

        assert_eq!(sink.cross_section_dates().unwrap(), vec![day(27)]);
        assert_eq!(sink.latest_cross_section_date().unwrap(), Some(day(27)));
        assert!(sink.read_cross_section(day(28)).unwrap().is_none());
    }

    #[test]
    fn factor_returns_round_trip_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ArtifactSink::new(dir.path());
        sink.ensure_layout().unwrap();

        let mut series = FactorReturnSeries::new();
        series.push(day(27), Array1::from_elem(FACTOR_COUNT, 0.02));
        series.push(day(25), Array1::from_elem(FACTOR_COUNT, 0.01));
        sink.write_factor_returns(&series).unwrap();

        let read = sink.read_factor_returns().unwrap();
        assert_eq!(read.dates(), &[day(25), day(27)]);
        assert_eq!(read.rows()[0][0], 0.01);

        // Missing artifact reads as empty.
        let empty_sink = ArtifactSink::new(dir.path().join("fresh"));
        assert!(empty_sink.read_factor_returns().unwrap().is_empty());
    }

    #[test]
    fn residuals_and_specific_risks_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ArtifactSink::new(dir.path());
        sink.ensure_layout().unwrap();

        let mut panel = ResidualPanel::new();
        panel.push(day(26), code("600519.SH"), -0.01);
        panel.push(day(25), code("000001.SZ"), 0.02);
        sink.write_residuals(&panel).unwrap();

        let read = sink.read_residuals().unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read.rows()[0].0, day(25));

        let risks = BTreeMap::from([(code("000001.SZ"), 0.03), (code("600519.SH"), 0.05)]);
        sink.write_specific_risks(&risks).unwrap();
        assert_eq!(sink.read_specific_risks().unwrap(), risks);
    }

    #[test]
    fn risk_parameters_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ArtifactSink::new(dir.path());
        sink.ensure_layout().unwrap();

        assert!(sink.read_risk_parameters().unwrap().is_none());

        let params = RiskParameters {
            estimation_date: day(28),
            estimation_window: 252,
            half_life: 90,
            num_factors: FACTOR_COUNT,
            num_stocks: 0,
            factor_covariance: BTreeMap::new(),
            factor_volatility: BTreeMap::new(),
            specific_risks: BTreeMap::new(),
        };
        sink.write_risk_parameters(&params).unwrap();
        assert_eq!(sink.read_risk_parameters().unwrap(), Some(params));
    }
}
