//! Display formatting for counters and chart labels.

use std::time::{Duration, Instant};

/// Format an amount with a currency symbol and thousands separators.
/// Whole amounts drop the decimals, fractional amounts keep two.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let negative = amount < 0.0;
    // Round once at cent precision so .995 and up carries into the
    // whole part instead of printing as three-digit cents.
    let total_cents = (amount.abs() * 100.0).round() as i128;
    let whole = total_cents / 100;
    let cents = total_cents % 100;

    let mut grouped = String::new();
    let digits = whole.to_string();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if cents == 0 {
        format!("{sign}{symbol}{grouped}")
    } else {
        format!("{sign}{symbol}{grouped}.{cents:02}")
    }
}

/// Render a percentage as a whole number for chart labels.
pub fn format_percent(value: f64) -> String {
    format!("{}%", value.round() as i64)
}

/// A counter that sweeps from zero to its target over a fixed duration,
/// then holds. Drives the animated stat tiles.
pub struct AnimatedCounter {
    target: f64,
    duration: Duration,
    started: Instant,
}

impl AnimatedCounter {
    pub fn new(target: f64, duration: Duration) -> Self {
        Self {
            target,
            duration,
            started: Instant::now(),
        }
    }

    /// The displayed value after `elapsed`. Linear ramp; never
    /// overshoots the target.
    pub fn value_at(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() || elapsed >= self.duration {
            return self.target;
        }
        self.target * (elapsed.as_secs_f64() / self.duration.as_secs_f64())
    }

    pub fn value(&self) -> f64 {
        self.value_at(self.started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(12500.0, "₹"), "₹12,500");
        assert_eq!(format_currency(1234567.0, "₹"), "₹1,234,567");
        assert_eq!(format_currency(999.0, "₹"), "₹999");
        assert_eq!(format_currency(0.0, "₹"), "₹0");
    }

    #[test]
    fn currency_keeps_cents_only_when_fractional() {
        assert_eq!(format_currency(36.42, "₹"), "₹36.42");
        assert_eq!(format_currency(1000.5, "₹"), "₹1,000.50");
        assert_eq!(format_currency(-45.07, "₹"), "-₹45.07");
    }

    #[test]
    fn currency_cents_that_round_to_a_whole_carry_over() {
        assert_eq!(format_currency(0.999, "₹"), "₹1");
        assert_eq!(format_currency(1000.999, "₹"), "₹1,001");
        assert_eq!(format_currency(999.995, "₹"), "₹1,000");
        assert_eq!(format_currency(-0.999, "₹"), "-₹1");
    }

    #[test]
    fn percent_rounds_to_whole_numbers() {
        assert_eq!(format_percent(86.4), "86%");
        assert_eq!(format_percent(86.5), "87%");
        assert_eq!(format_percent(0.0), "0%");
        assert_eq!(format_percent(100.0), "100%");
    }

    #[test]
    fn counter_ramps_linearly_and_holds_at_the_target() {
        let counter = AnimatedCounter::new(200.0, Duration::from_secs(2));
        assert_eq!(counter.value_at(Duration::ZERO), 0.0);
        assert_eq!(counter.value_at(Duration::from_secs(1)), 100.0);
        assert_eq!(counter.value_at(Duration::from_secs(2)), 200.0);
        assert_eq!(counter.value_at(Duration::from_secs(10)), 200.0);
    }

    #[test]
    fn zero_duration_counter_is_already_done() {
        let counter = AnimatedCounter::new(50.0, Duration::ZERO);
        assert_eq!(counter.value_at(Duration::ZERO), 50.0);
    }
}
