//! Coalescing of rapid parameter changes.
//!
//! The comparison itself is synchronous and cheap; the debouncer only decides
//! *when* to run it, so that a burst of form edits triggers a single trailing
//! calculation. Callers pass the current [`Instant`] in, which keeps the
//! wrapper free of threads and timers and makes it deterministic to test.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::bank::BankCatalog;
use crate::config::CalculatorConfig;
use crate::error::CalculatorResult;
use crate::params::LoanParameters;
use crate::pipeline::{OfferComparison, calculate_offers};

/// Trailing-edge debouncer holding the latest submitted value.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn submit(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Yields the pending value once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let (_, submitted_at) = self.pending.as_ref()?;
        if now.saturating_duration_since(*submitted_at) < self.delay {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    /// Yields the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

/// Runs the offer comparison on the last of a burst of parameter changes.
#[derive(Debug, Clone)]
pub struct DebouncedCalculator {
    catalog: BankCatalog,
    config: CalculatorConfig,
    debouncer: Debouncer<LoanParameters>,
}

impl DebouncedCalculator {
    pub fn new(catalog: BankCatalog, config: CalculatorConfig) -> Self {
        let debouncer = Debouncer::new(Duration::from_millis(config.debounce_ms));
        Self {
            catalog,
            config,
            debouncer,
        }
    }

    pub fn on_change(&mut self, params: LoanParameters, now: Instant) {
        if self.debouncer.is_pending() {
            debug!("Superseding pending calculation");
        }
        self.debouncer.submit(params, now);
    }

    /// Runs the comparison if a change has settled.
    pub fn poll(&mut self, now: Instant) -> Option<CalculatorResult<OfferComparison>> {
        let params = self.debouncer.poll(now)?;
        Some(calculate_offers(&params, &self.catalog, &self.config))
    }

    /// Runs the pending comparison without waiting.
    pub fn flush(&mut self) -> Option<CalculatorResult<OfferComparison>> {
        let params = self.debouncer.flush()?;
        Some(calculate_offers(&params, &self.catalog, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::test_support::bank;
    use rust_decimal_macros::dec;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_nothing_before_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.submit(1, start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert!(debouncer.is_pending());
    }

    #[test]
    fn test_burst_yields_last_value_once() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.submit(1, start);
        debouncer.submit(2, start + Duration::from_millis(100));
        debouncer.submit(3, start + Duration::from_millis(200));

        // 300ms after the first submit, but only 100ms after the last
        assert_eq!(debouncer.poll(start + Duration::from_millis(300)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(500)), Some(3));
        assert_eq!(debouncer.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn test_flush_skips_the_wait() {
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.submit("x", Instant::now());
        assert_eq!(debouncer.flush(), Some("x"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_calculator_runs_on_settled_params() {
        let catalog = BankCatalog::new(vec![bank("a"), bank("b")]).unwrap();
        let mut calculator = DebouncedCalculator::new(catalog, CalculatorConfig::default());
        let start = Instant::now();

        calculator.on_change(
            LoanParameters::new(dec!(300000), 25, dec!(12000)).with_down_payment(dec!(75000)),
            start,
        );
        calculator.on_change(
            LoanParameters::new(dec!(400000), 25, dec!(12000)).with_down_payment(dec!(100000)),
            start + Duration::from_millis(50),
        );

        assert!(calculator.poll(start + Duration::from_millis(200)).is_none());
        let comparison = calculator
            .poll(start + Duration::from_millis(400))
            .unwrap()
            .unwrap();
        assert_eq!(comparison.results.len(), 2);
        assert_eq!(comparison.results[0].monthly_payment, dec!(2955.96));
        assert!(calculator.flush().is_none());
    }
}
