//! Marketplace fee calculation engine.
//!
//! Implements the four-component platform fee charged on each sale:
//! payment processing, category-fixed commission, the optional capped
//! service ("voucher extra") fee, and a flat infrastructure fee.
//!
//! Pure and deterministic: the same price/rate/toggle always produces
//! the same breakdown. All arithmetic is f64; rounding is a display
//! concern and never happens here.

use serde::{Deserialize, Serialize};

/// Itemized platform fee for a single listing price.
///
/// `total` is always the exact sum of the four components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    /// Payment processing fee (platform-wide percentage).
    pub payment: f64,
    /// Category-fixed commission (per fee-category percentage).
    pub fixed: f64,
    /// Service fee, capped at a flat ceiling; 0 when the toggle is off.
    pub service: f64,
    /// Flat infrastructure fee, independent of price.
    pub infra: f64,
    /// Sum of the four components.
    pub total: f64,
}

impl FeeBreakdown {
    /// The all-zero breakdown used for non-positive prices.
    pub const ZERO: Self = Self {
        payment: 0.0,
        fixed: 0.0,
        service: 0.0,
        infra: 0.0,
        total: 0.0,
    };
}

/// Fee calculator carrying the platform-wide rate constants.
///
/// The category rate varies per product and is passed into
/// [`FeeCalculator::breakdown`]; everything else is fixed for the
/// marketplace and configured once at startup.
#[derive(Debug, Clone)]
pub struct FeeCalculator {
    /// Payment processing rate (percent of price).
    payment_rate: f64,
    /// Service fee rate (percent of price) when enabled.
    service_rate: f64,
    /// Flat ceiling for the service fee.
    service_cap: f64,
    /// Flat infrastructure fee charged on every priced sale.
    infra_fee: f64,
}

impl Default for FeeCalculator {
    /// Calculator with the published marketplace schedule:
    /// 4.91% payment, 2.5% service capped at 50 000, 4 620 infra.
    fn default() -> Self {
        Self {
            payment_rate: 4.91,
            service_rate: 2.5,
            service_cap: 50_000.0,
            infra_fee: 4_620.0,
        }
    }
}

impl FeeCalculator {
    /// Creates a calculator with explicit rate constants.
    pub fn new(payment_rate: f64, service_rate: f64, service_cap: f64, infra_fee: f64) -> Self {
        Self {
            payment_rate,
            service_rate,
            service_cap,
            infra_fee,
        }
    }

    /// Computes the itemized platform fee for one listing price.
    ///
    /// A non-positive price short-circuits to the all-zero breakdown;
    /// that branch is the only thing that suppresses the flat infra
    /// fee. `category_rate` is the percentage of the product's resolved
    /// fee category.
    pub fn breakdown(
        &self,
        price: f64,
        category_rate: f64,
        service_enabled: bool,
    ) -> FeeBreakdown {
        if price <= 0.0 {
            return FeeBreakdown::ZERO;
        }

        let payment = price * (self.payment_rate / 100.0);
        let fixed = price * (category_rate / 100.0);

        let service = if service_enabled {
            (price * (self.service_rate / 100.0)).min(self.service_cap)
        } else {
            0.0
        };

        let infra = self.infra_fee;

        FeeBreakdown {
            payment,
            fixed,
            service,
            infra,
            total: payment + fixed + service + infra,
        }
    }

    /// Total platform fee for one listing price.
    pub fn total_fee(&self, price: f64, category_rate: f64, service_enabled: bool) -> f64 {
        self.breakdown(price, category_rate, service_enabled).total
    }
}

/// Net profit for a sale: price minus cost minus total platform fee.
///
/// May be negative; loss-making listings are a first-class state the
/// dashboard surfaces, not an error.
pub fn profit(price: f64, cost: f64, total_fee: f64) -> f64 {
    price - cost - total_fee
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_zero_price_zero_breakdown() {
        let calc = FeeCalculator::default();
        let b = calc.breakdown(0.0, 12.6, true);
        assert_eq!(b, FeeBreakdown::ZERO);
    }

    #[test]
    fn test_negative_price_zero_breakdown() {
        let calc = FeeCalculator::default();
        let b = calc.breakdown(-250_000.0, 7.0, true);
        assert_eq!(b, FeeBreakdown::ZERO);
    }

    #[test]
    fn test_infra_charged_for_any_positive_price() {
        let calc = FeeCalculator::default();
        let b = calc.breakdown(1.0, 0.0, false);
        assert!((b.infra - 4_620.0).abs() < EPS);
        assert!(b.total > 4_620.0 - EPS);
    }

    #[test]
    fn test_service_fee_respects_cap() {
        let calc = FeeCalculator::default();
        // 2.5% of 10 000 000 = 250 000, well above the 50 000 cap.
        let b = calc.breakdown(10_000_000.0, 6.0, true);
        assert!((b.service - 50_000.0).abs() < EPS);
    }

    #[test]
    fn test_service_fee_below_cap_uncapped() {
        let calc = FeeCalculator::default();
        let b = calc.breakdown(140_000.0, 6.0, true);
        assert!((b.service - 3_500.0).abs() < EPS);
    }

    #[test]
    fn test_service_fee_zero_when_disabled() {
        let calc = FeeCalculator::default();
        let b = calc.breakdown(10_000_000.0, 6.0, false);
        assert_eq!(b.service, 0.0);
    }

    #[test]
    fn test_published_schedule_breakdown() {
        // 140 000 price at a 6% category with service on:
        // payment 6 874, fixed 8 400, service 3 500, infra 4 620.
        let calc = FeeCalculator::default();
        let b = calc.breakdown(140_000.0, 6.0, true);
        assert!((b.payment - 6_874.0).abs() < EPS);
        assert!((b.fixed - 8_400.0).abs() < EPS);
        assert!((b.service - 3_500.0).abs() < EPS);
        assert!((b.infra - 4_620.0).abs() < EPS);
        assert!((b.total - 23_394.0).abs() < EPS);
    }

    #[test]
    fn test_total_is_exact_component_sum() {
        let calc = FeeCalculator::default();
        let b = calc.breakdown(137_451.0, 8.5, true);
        assert_eq!(b.total, b.payment + b.fixed + b.service + b.infra);
    }

    #[test]
    fn test_profit_may_go_negative() {
        let calc = FeeCalculator::default();
        let fee = calc.total_fee(140_000.0, 6.0, true);
        let p = profit(140_000.0, 100_000.0, fee);
        assert!((p - 16_606.0).abs() < EPS);

        let loss = profit(140_000.0, 200_000.0, fee);
        assert!(loss < 0.0);
    }

    #[test]
    fn test_custom_constants() {
        let calc = FeeCalculator::new(10.0, 5.0, 1_000.0, 100.0);
        let b = calc.breakdown(10_000.0, 2.0, true);
        assert!((b.payment - 1_000.0).abs() < EPS);
        assert!((b.fixed - 200.0).abs() < EPS);
        assert!((b.service - 500.0).abs() < EPS);
        assert!((b.infra - 100.0).abs() < EPS);
    }
}
