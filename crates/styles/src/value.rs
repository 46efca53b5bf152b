//! Valuation-ratio factors: book-to-price and earnings yield.

use cne5_primitives::PriceObservation;
use ndarray::Array1;

/// Book-to-price exposure: the inverse price-to-book ratio.
///
/// Non-positive or missing ratios are missing.
#[must_use]
pub fn book_to_price(history: &[PriceObservation]) -> Array1<f64> {
    inverse_ratio(history, |obs| obs.price_to_book)
}

/// Earnings-yield exposure: the inverse trailing price-to-earnings ratio.
///
/// Non-positive or missing ratios are missing.
#[must_use]
pub fn earnings_yield(history: &[PriceObservation]) -> Array1<f64> {
    inverse_ratio(history, |obs| obs.trailing_pe)
}

fn inverse_ratio(
    history: &[PriceObservation],
    ratio: impl Fn(&PriceObservation) -> f64,
) -> Array1<f64> {
    Array1::from_iter(history.iter().map(|obs| {
        let r = ratio(obs);
        if r.is_finite() && r > 0.0 { 1.0 / r } else { f64::NAN }
    }))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cne5_primitives::TradeDate;

    use super::*;

    fn obs(pb: f64, pe: f64) -> PriceObservation {
        let mut obs = PriceObservation::empty(TradeDate::from_ymd_opt(2024, 1, 2).unwrap());
        obs.price_to_book = pb;
        obs.trailing_pe = pe;
        obs
    }

    #[test]
    fn inverse_of_positive_ratios() {
        let history = vec![obs(2.0, 20.0), obs(0.8, 12.5)];

        let btp = book_to_price(&history);
        assert_relative_eq!(btp[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(btp[1], 1.25, epsilon = 1e-12);

        let ey = earnings_yield(&history);
        assert_relative_eq!(ey[0], 0.05, epsilon = 1e-12);
        assert_relative_eq!(ey[1], 0.08, epsilon = 1e-12);
    }

    #[test]
    fn non_positive_ratios_are_missing() {
        let history = vec![obs(0.0, -15.0), obs(f64::NAN, f64::INFINITY)];
        assert!(book_to_price(&history).iter().all(|x| x.is_nan()));
        assert!(earnings_yield(&history).iter().all(|x| x.is_nan()));
    }
}
