//! Panel source trait definition.

use cne5_primitives::{
    BenchmarkObservation, Industry, PriceObservation, SecurityCode, TradeDate,
};

/// Read-only panel of market data, keyed by security and date.
///
/// The pipeline holds this as a shared, never-mutated collaborator.
/// Missing data is modeled as empty sequences, never as errors; a
/// malformed record affects at most one security.
pub trait PanelSource: Send + Sync {
    /// All securities with a price history, sorted ascending by code.
    fn securities(&self) -> Vec<SecurityCode>;

    /// End-of-day history for one security, sorted ascending by date.
    /// Unknown securities yield an empty vector.
    fn price_history(&self, code: &SecurityCode) -> Vec<PriceObservation>;

    /// History of the benchmark index, sorted ascending by date. Empty
    /// when no benchmark data is available.
    fn benchmark_history(&self) -> Vec<BenchmarkObservation>;

    /// Canonical industry of a security. Securities absent from the
    /// mapping resolve to [`Industry::Comprehensive`].
    fn industry(&self, code: &SecurityCode) -> Industry;

    /// Open trading days strictly after `after`, ascending; the full
    /// calendar when `after` is `None`.
    fn trading_days(&self, after: Option<TradeDate>) -> Vec<TradeDate>;

    /// Exact-date observation for one security, if it traded that day.
    fn observation_on(&self, code: &SecurityCode, date: TradeDate) -> Option<PriceObservation> {
        let history = self.price_history(code);
        history.binary_search_by_key(&date, |obs| obs.date).ok().map(|i| history[i])
    }

    /// Latest total market value observed on or before `date`, if any.
    fn market_value_asof(&self, code: &SecurityCode, date: TradeDate) -> Option<f64> {
        self.price_history(code)
            .iter()
            .rev()
            .find(|obs| obs.date <= date && obs.total_market_value.is_finite())
            .map(|obs| obs.total_market_value)
    }
}
