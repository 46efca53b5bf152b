//! Reserved fundamental factors: growth and leverage.
//!
//! Neither factor is computable from a price-only panel; both columns
//! stay present and entirely missing until a fundamentals source exists,
//! and downstream consumers skip all-missing columns.

use cne5_primitives::PriceObservation;
use ndarray::Array1;

/// Growth exposure. Missing while fundamentals are unavailable.
#[must_use]
pub fn growth(history: &[PriceObservation]) -> Array1<f64> {
    Array1::from_elem(history.len(), f64::NAN)
}

/// Leverage exposure. Missing while fundamentals are unavailable.
#[must_use]
pub fn leverage(history: &[PriceObservation]) -> Array1<f64> {
    Array1::from_elem(history.len(), f64::NAN)
}

#[cfg(test)]
mod tests {
    use cne5_primitives::TradeDate;

    use super::*;

    #[test]
    fn reserved_factors_are_missing_not_defaulted() {
        let history =
            vec![PriceObservation::empty(TradeDate::from_ymd_opt(2024, 1, 2).unwrap()); 3];

        assert!(growth(&history).iter().all(|x| x.is_nan()));
        assert!(leverage(&history).iter().all(|x| x.is_nan()));
        assert_eq!(growth(&history).len(), 3);
    }
}
