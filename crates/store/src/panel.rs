//! Read-only panel store over the Parquet data tree.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cne5_primitives::{
    BenchmarkObservation, Industry, PriceObservation, SecurityCode, TradeDate, derive_returns,
};
use cne5_traits::PanelSource;
use tracing::{debug, info, warn};

use crate::frame::{date_column, f64_column_or_missing, read_parquet};
use crate::{IndustryMap, TradingCalendar, default_label_mapping};

/// Parquet-backed implementation of [`PanelSource`].
///
/// Layout under the root directory:
///
/// ```text
/// daily/{code}.parquet        trade_date, close, pct_chg, turnover_rate,
///                             total_mv, pb, pe_ttm
/// benchmark/data.parquet      trade_date, close
/// stock_basic/data.parquet    ts_code, industry
/// trade_cal/data.parquet      cal_date, is_open
/// ```
///
/// [`PanelStore::prewarm`] loads every per-security panel into a shared
/// read-only cache on the calling thread; worker threads afterwards only
/// perform map lookups.
#[derive(Debug)]
pub struct PanelStore {
    root: PathBuf,
    industries: IndustryMap,
    calendar: TradingCalendar,
    benchmark: Vec<BenchmarkObservation>,
    prices: HashMap<SecurityCode, Arc<Vec<PriceObservation>>>,
}

impl PanelStore {
    /// Open a panel store rooted at `root`.
    ///
    /// Small reference tables (industry mapping, calendar, benchmark) are
    /// loaded eagerly; missing files degrade to empty tables with a
    /// warning. Price panels stay on disk until [`PanelStore::prewarm`].
    #[must_use]
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let industries =
            IndustryMap::load(&root.join("stock_basic/data.parquet"), default_label_mapping());
        let calendar = TradingCalendar::load(&root.join("trade_cal/data.parquet"));
        let benchmark = load_benchmark(&root.join("benchmark/data.parquet"));

        info!(
            root = %root.display(),
            industries = industries.len(),
            calendar_days = calendar.len(),
            benchmark_days = benchmark.len(),
            "panel store opened"
        );

        Self { root, industries, calendar, benchmark, prices: HashMap::new() }
    }

    /// The trading calendar.
    #[must_use]
    pub const fn calendar(&self) -> &TradingCalendar {
        &self.calendar
    }

    /// Load every per-security price panel into the in-memory cache.
    /// Returns the number of securities cached.
    pub fn prewarm(&mut self) -> usize {
        let codes = self.scan_daily_codes();
        for code in codes {
            if self.prices.contains_key(&code) {
                continue;
            }
            let history = self.load_daily(&code);
            if !history.is_empty() {
                self.prices.insert(code, Arc::new(history));
            }
        }
        info!(securities = self.prices.len(), "price panels prewarmed");
        self.prices.len()
    }

    /// Shared handle to a cached price panel, if prewarmed.
    #[must_use]
    pub fn history_handle(&self, code: &SecurityCode) -> Option<Arc<Vec<PriceObservation>>> {
        self.prices.get(code).cloned()
    }

    fn scan_daily_codes(&self) -> Vec<SecurityCode> {
        let dir = self.root.join("daily");
        let Ok(entries) = std::fs::read_dir(&dir) else {
            warn!(path = %dir.display(), "daily panel directory unavailable");
            return Vec::new();
        };

        let mut codes: Vec<SecurityCode> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().is_none_or(|ext| ext != "parquet") {
                    return None;
                }
                let stem = path.file_stem()?.to_str()?;
                SecurityCode::parse(stem).ok()
            })
            .collect();
        codes.sort_unstable();
        codes
    }

    fn load_daily(&self, code: &SecurityCode) -> Vec<PriceObservation> {
        let path = self.root.join("daily").join(format!("{}.parquet", code.as_str()));
        load_price_panel(&path)
    }
}

fn load_price_panel(path: &Path) -> Vec<PriceObservation> {
    if !path.exists() {
        return Vec::new();
    }
    let df = match read_parquet(path) {
        Ok(df) => df,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "skipping corrupted price panel");
            return Vec::new();
        }
    };

    let dates = match date_column(&df, "trade_date") {
        Ok(dates) => dates,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "price panel missing trade_date");
            return Vec::new();
        }
    };

    let close = f64_column_or_missing(&df, "close");
    let pct_chg = f64_column_or_missing(&df, "pct_chg");
    let turnover = f64_column_or_missing(&df, "turnover_rate");
    let total_mv = f64_column_or_missing(&df, "total_mv");
    let pb = f64_column_or_missing(&df, "pb");
    let pe_ttm = f64_column_or_missing(&df, "pe_ttm");

    let mut skipped = 0usize;
    let mut observations: Vec<PriceObservation> = dates
        .iter()
        .enumerate()
        .filter_map(|(i, date)| {
            let Some(date) = date else {
                skipped += 1;
                return None;
            };
            Some(PriceObservation {
                date: *date,
                close: close[i],
                pct_change: pct_chg[i],
                turnover_rate: turnover[i],
                total_market_value: total_mv[i],
                price_to_book: pb[i],
                trailing_pe: pe_ttm[i],
                log_return: f64::NAN,
            })
        })
        .collect();
    if skipped > 0 {
        debug!(path = %path.display(), skipped, "dropped rows with malformed dates");
    }

    observations.sort_by_key(|obs| obs.date);
    observations.dedup_by_key(|obs| obs.date);
    derive_returns(&mut observations);
    observations
}

fn load_benchmark(path: &Path) -> Vec<BenchmarkObservation> {
    let panel = load_price_panel(path);
    let mut out: Vec<BenchmarkObservation> = panel
        .iter()
        .map(|obs| BenchmarkObservation { date: obs.date, close: obs.close, log_return: f64::NAN })
        .collect();

    let mut prev = f64::NAN;
    for obs in &mut out {
        if obs.close.is_finite() && obs.close > 0.0 && prev.is_finite() && prev > 0.0 {
            obs.log_return = (obs.close / prev).ln();
        }
        prev = obs.close;
    }
    out
}

impl PanelSource for PanelStore {
    fn securities(&self) -> Vec<SecurityCode> {
        if self.prices.is_empty() {
            self.scan_daily_codes()
        } else {
            let mut codes: Vec<SecurityCode> = self.prices.keys().cloned().collect();
            codes.sort_unstable();
            codes
        }
    }

    fn price_history(&self, code: &SecurityCode) -> Vec<PriceObservation> {
        self.prices
            .get(code)
            .map_or_else(|| self.load_daily(code), |cached| cached.as_ref().clone())
    }

    fn benchmark_history(&self) -> Vec<BenchmarkObservation> {
        self.benchmark.clone()
    }

    fn industry(&self, code: &SecurityCode) -> Industry {
        self.industries.industry(code)
    }

    fn trading_days(&self, after: Option<TradeDate>) -> Vec<TradeDate> {
        self.calendar.days_after(after)
    }

    fn observation_on(&self, code: &SecurityCode, date: TradeDate) -> Option<PriceObservation> {
        if let Some(cached) = self.prices.get(code) {
            return cached
                .binary_search_by_key(&date, |obs| obs.date)
                .ok()
                .map(|i| cached[i]);
        }
        let history = self.load_daily(code);
        history.binary_search_by_key(&date, |obs| obs.date).ok().map(|i| history[i])
    }

    fn market_value_asof(&self, code: &SecurityCode, date: TradeDate) -> Option<f64> {
        let lookup = |history: &[PriceObservation]| {
            history
                .iter()
                .rev()
                .find(|obs| obs.date <= date && obs.total_market_value.is_finite())
                .map(|obs| obs.total_market_value)
        };
        self.prices
            .get(code)
            .map_or_else(|| lookup(&self.load_daily(code)), |cached| lookup(cached))
    }
}
