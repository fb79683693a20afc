//! Stock-level classification.

use serde::{Deserialize, Serialize};

/// Stock status of a single item, used for dashboard counts and UI coloring.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Normal,
    Low,
    OutOfStock,
}

impl StockStatus {
    /// True for every status that belongs on the low-stock list.
    pub fn needs_attention(self) -> bool {
        !matches!(self, StockStatus::Normal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StockStatus::Normal => "normal",
            StockStatus::Low => "low",
            StockStatus::OutOfStock => "out_of_stock",
        }
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a stock level against an optional low-stock threshold.
///
/// - `quantity <= 0` is always [`StockStatus::OutOfStock`].
/// - An absent threshold disables alerting: any positive quantity is normal.
/// - With a threshold, `quantity < threshold` is low; equal is **not** low.
pub fn classify(quantity: i64, threshold: Option<i64>) -> StockStatus {
    if quantity <= 0 {
        return StockStatus::OutOfStock;
    }
    match threshold {
        Some(t) if quantity < t => StockStatus::Low,
        _ => StockStatus::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn threshold_boundaries() {
        assert_eq!(classify(5, Some(10)), StockStatus::Low);
        assert_eq!(classify(10, Some(10)), StockStatus::Normal);
        assert_eq!(classify(11, Some(10)), StockStatus::Normal);
        assert_eq!(classify(0, Some(10)), StockStatus::OutOfStock);
    }

    #[test]
    fn zero_threshold_is_not_the_same_as_no_threshold() {
        // With a zero threshold nothing positive is ever "below" it.
        assert_eq!(classify(1, Some(0)), StockStatus::Normal);
        assert_eq!(classify(0, Some(0)), StockStatus::OutOfStock);
        assert_eq!(classify(0, None), StockStatus::OutOfStock);
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&StockStatus::OutOfStock).unwrap();
        assert_eq!(json, "\"out_of_stock\"");
        assert!(StockStatus::Low.needs_attention());
        assert!(!StockStatus::Normal.needs_attention());
    }

    proptest! {
        #[test]
        fn absent_threshold_only_flags_empty_stock(q in any::<i64>()) {
            let expected = if q <= 0 { StockStatus::OutOfStock } else { StockStatus::Normal };
            prop_assert_eq!(classify(q, None), expected);
        }

        #[test]
        fn classification_is_idempotent(q in -1_000i64..1_000, t in proptest::option::of(0i64..1_000)) {
            prop_assert_eq!(classify(q, t), classify(q, t));
        }

        #[test]
        fn low_means_strictly_between_zero_and_threshold(q in -1_000i64..1_000, t in 0i64..1_000) {
            let low = classify(q, Some(t)) == StockStatus::Low;
            prop_assert_eq!(low, q > 0 && q < t);
        }
    }
}
