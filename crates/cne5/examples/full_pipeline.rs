//! Example: full CNE5 pipeline over a synthetic A-share panel.
//!
//! This example demonstrates the complete workflow:
//! 1. Writing a synthetic Parquet panel (daily bars, benchmark, calendar)
//! 2. Running a full build: exposures, cross sections, factor returns,
//!    risk model
//! 3. Appending two new trading days incrementally
//! 4. Printing the published risk parameters
//!
//! Run with: `cargo run --example full_pipeline --features full`

use std::error::Error;
use std::path::Path;

use chrono::Duration;
use cne5::pipeline::{Pipeline, PipelineConfig};
use cne5::primitives::{StyleFactor, TradeDate};
use cne5::store::{ArtifactSink, PanelStore};
use cne5::styles::{LiquidityConfig, MomentumConfig, VolatilityConfig};
use polars::prelude::*;
use tracing_subscriber::EnvFilter;

/// Synthetic universe: code and a seed for its price path.
const UNIVERSE: &[(&str, u64)] = &[
    ("000001.SZ", 11),
    ("000002.SZ", 23),
    ("000651.SZ", 37),
    ("600036.SH", 41),
    ("600519.SH", 53),
    ("601318.SH", 67),
];

/// Sessions in the initial build and in the incremental append.
const INITIAL_SESSIONS: usize = 300;
const APPENDED_SESSIONS: usize = 2;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let panel_dir = tempfile::tempdir()?;
    let output_dir = tempfile::tempdir()?;

    // Step 1: synthesize the input panel.
    write_panel(panel_dir.path(), INITIAL_SESSIONS)?;

    // Step 2: full build.
    let config = example_config();
    let report = {
        let mut store = PanelStore::open(panel_dir.path());
        store.prewarm();
        let pipeline =
            Pipeline::with_config(&store, ArtifactSink::new(output_dir.path()), config.clone());
        pipeline.full_build()?
    };
    println!(
        "full build: {:?} | securities {} (+{} skipped) | days {} ({} regressed)",
        report.status(),
        report.securities_built,
        report.securities_skipped,
        report.days_published,
        report.days_regressed,
    );

    // Step 3: two more sessions arrive; append without rebuilding.
    write_panel(panel_dir.path(), INITIAL_SESSIONS + APPENDED_SESSIONS)?;
    let report = {
        let mut store = PanelStore::open(panel_dir.path());
        store.prewarm();
        let pipeline =
            Pipeline::with_config(&store, ArtifactSink::new(output_dir.path()), config);
        pipeline.incremental()?
    };
    println!(
        "incremental: {:?} | days appended {} | issues {}",
        report.status(),
        report.days_published,
        report.issues.len(),
    );

    // Step 4: inspect the published risk model.
    let sink = ArtifactSink::new(output_dir.path());
    let params = sink.read_risk_parameters()?.expect("risk parameters published");
    println!(
        "\nrisk parameters as of {} ({} factors, {} stocks)",
        params.estimation_date, params.num_factors, params.num_stocks
    );
    println!("{:<18} {:>12}", "style factor", "ann. vol");
    for style in StyleFactor::ALL {
        let vol = params.factor_volatility.get(style.column_name()).copied().unwrap_or(0.0);
        println!("{:<18} {:>12.6}", style.column_name(), vol);
    }
    println!("\nspecific risks:");
    for (code, risk) in &params.specific_risks {
        println!("{code:<12} {risk:>10.4}");
    }

    Ok(())
}

/// A pipeline configuration with shortened windows so the example runs
/// on a small synthetic panel. Production uses the defaults (252-day
/// windows, 50-stock minimum).
fn example_config() -> PipelineConfig {
    let mut config = PipelineConfig { parallelism: 2, ..PipelineConfig::default() };
    config.exposure.beta.window = 60;
    config.exposure.momentum = MomentumConfig { short: 5, long: 60 };
    config.exposure.volatility = VolatilityConfig { window: 60, min_valid: 30 };
    config.exposure.liquidity =
        LiquidityConfig { windows: [5, 21, 60], min_valid: [3, 10, 30], weights: [0.35, 0.35, 0.30] };
    config.regression.min_stocks = 4;
    config.risk.estimation_window = 60;
    config
}

fn write_panel(root: &Path, sessions: usize) -> Result<(), Box<dyn Error>> {
    let dates: Vec<TradeDate> = (0..sessions as i64)
        .map(|i| TradeDate::from_ymd_opt(2023, 1, 2).unwrap() + Duration::days(i))
        .collect();

    for (code, seed) in UNIVERSE {
        write_daily(root, code, *seed, &dates)?;
    }
    write_benchmark(root, &dates)?;
    write_calendar(root, &dates)?;
    Ok(())
}

fn write_daily(
    root: &Path,
    code: &str,
    seed: u64,
    dates: &[TradeDate],
) -> Result<(), Box<dyn Error>> {
    let closes = price_path(seed, dates.len(), 50.0);
    let n = dates.len();

    let df = DataFrame::new(vec![
        Column::new("trade_date".into(), dates.to_vec()),
        Column::new("close".into(), closes.clone()),
        Column::new("pct_chg".into(), vec![f64::NAN; n]),
        Column::new(
            "turnover_rate".into(),
            (0..n).map(|i| 0.8 + 0.4 * ((seed as usize + i) % 5) as f64 / 5.0).collect::<Vec<_>>(),
        ),
        Column::new(
            "total_mv".into(),
            closes.iter().map(|c| c * 2e7).collect::<Vec<f64>>(),
        ),
        Column::new("pb".into(), vec![1.0 + seed as f64 / 40.0; n]),
        Column::new("pe_ttm".into(), vec![12.0 + seed as f64 / 4.0; n]),
    ])?;
    write_frame(&root.join(format!("daily/{code}.parquet")), df)
}

fn write_benchmark(root: &Path, dates: &[TradeDate]) -> Result<(), Box<dyn Error>> {
    let closes = price_path(1, dates.len(), 3500.0);
    let df = DataFrame::new(vec![
        Column::new("trade_date".into(), dates.to_vec()),
        Column::new("close".into(), closes),
    ])?;
    write_frame(&root.join("benchmark/data.parquet"), df)
}

fn write_calendar(root: &Path, dates: &[TradeDate]) -> Result<(), Box<dyn Error>> {
    let df = DataFrame::new(vec![
        Column::new("cal_date".into(), dates.to_vec()),
        Column::new("is_open".into(), vec![1i64; dates.len()]),
    ])?;
    write_frame(&root.join("trade_cal/data.parquet"), df)
}

fn write_frame(path: &Path, mut df: DataFrame) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(path.parent().expect("artifact paths have parents"))?;
    let file = std::fs::File::create(path)?;
    ParquetWriter::new(file).finish(&mut df)?;
    Ok(())
}

/// Deterministic pseudo-random price walk.
fn price_path(seed: u64, sessions: usize, start: f64) -> Vec<f64> {
    let mut state = seed;
    let mut price = start;
    (0..sessions)
        .map(|_| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            let step = ((state >> 33) % 2001) as f64 / 1000.0 - 1.0;
            price *= 1.0 + 0.015 * step;
            price
        })
        .collect()
}
