//! The closed factor vocabulary.
//!
//! The factor axis of every exposure row, factor-return row and covariance
//! matrix is the fixed 40-name set: ten style factors followed by the
//! thirty industries of [`Industry::ALL`]. Factor columns are keyed by
//! this tag set, never by string lookup.

use serde::{Deserialize, Serialize};

use crate::Industry;

/// Number of style factors.
pub const STYLE_COUNT: usize = 10;

/// Number of industry factors.
pub const INDUSTRY_COUNT: usize = 30;

/// Total number of factors (style + industry).
pub const FACTOR_COUNT: usize = STYLE_COUNT + INDUSTRY_COUNT;

/// The ten CNE5 style factors, in the contractual column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleFactor {
    /// Natural log of total market value.
    Size,
    /// Rolling regression coefficient against the benchmark index.
    Beta,
    /// Medium-term price momentum, skipping the most recent month.
    Momentum,
    /// Rolling standard deviation of daily log returns.
    Volatility,
    /// Cube of the size exposure (not orthogonalized against size).
    NonLinearSize,
    /// Inverse price-to-book ratio.
    BookToPrice,
    /// Weighted average turnover over one, three and twelve months.
    Liquidity,
    /// Inverse trailing price-to-earnings ratio.
    EarningsYield,
    /// Reserved; missing when fundamentals are unavailable.
    Growth,
    /// Reserved; missing when fundamentals are unavailable.
    Leverage,
}

impl StyleFactor {
    /// All style factors in canonical column order.
    pub const ALL: [Self; STYLE_COUNT] = [
        Self::Size,
        Self::Beta,
        Self::Momentum,
        Self::Volatility,
        Self::NonLinearSize,
        Self::BookToPrice,
        Self::Liquidity,
        Self::EarningsYield,
        Self::Growth,
        Self::Leverage,
    ];

    /// Contractual column name.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Beta => "beta",
            Self::Momentum => "momentum",
            Self::Volatility => "volatility",
            Self::NonLinearSize => "non_linear_size",
            Self::BookToPrice => "book_to_price",
            Self::Liquidity => "liquidity",
            Self::EarningsYield => "earnings_yield",
            Self::Growth => "growth",
            Self::Leverage => "leverage",
        }
    }

    /// Position of this factor within [`StyleFactor::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for StyleFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

/// A factor in the combined 40-column axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Factor {
    /// One of the ten style factors.
    Style(StyleFactor),
    /// One of the thirty industry dummies.
    Industry(Industry),
}

impl Factor {
    /// All forty factors in canonical column order: styles, then industries.
    pub const ALL: [Self; FACTOR_COUNT] = {
        let mut all = [Self::Style(StyleFactor::Size); FACTOR_COUNT];
        let mut i = 0;
        while i < STYLE_COUNT {
            all[i] = Self::Style(StyleFactor::ALL[i]);
            i += 1;
        }
        let mut j = 0;
        while j < INDUSTRY_COUNT {
            all[STYLE_COUNT + j] = Self::Industry(Industry::ALL[j]);
            j += 1;
        }
        all
    };

    /// Contractual column name.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Style(style) => style.column_name(),
            Self::Industry(ind) => ind.column_name(),
        }
    }

    /// Position of this factor within [`Factor::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Style(style) => style.index(),
            Self::Industry(ind) => STYLE_COUNT + ind.index(),
        }
    }

    /// Resolve a contractual column name back to a factor.
    #[must_use]
    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.column_name() == name)
    }
}

impl std::fmt::Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}
