use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClosingPrice {
    pub date: NaiveDate,
    pub close: f64,
}

/// Daily closing prices for one index symbol, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceObservation {
    pub symbol: String,
    pub closes: Vec<ClosingPrice>,
}

impl PriceObservation {
    /// The two most recent closes as `(previous, current)`.
    pub fn latest_pair(&self) -> Option<(f64, f64)> {
        let n = self.closes.len();
        if n < 2 {
            return None;
        }
        Some((self.closes[n - 2].close, self.closes[n - 1].close))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn label_ja(&self) -> &'static str {
        match self {
            Direction::Up => "上昇",
            Direction::Down => "下落",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ChangeResult {
    pub current: f64,
    pub previous: f64,
    pub delta: f64,
    pub percent: f64,
    pub direction: Direction,
}

impl ChangeResult {
    /// Inclusive gate: a change of exactly the threshold triggers a post.
    pub fn exceeds_threshold(&self, threshold_percent: f64) -> bool {
        self.percent.abs() >= threshold_percent
    }
}

/// Day-over-day change between two closes. A zero delta reports `Down`; the
/// direction test is strictly `> 0`.
pub fn evaluate(current: f64, previous: f64) -> ChangeResult {
    let delta = current - previous;
    let percent = delta / previous * 100.0;
    let direction = if delta > 0.0 {
        Direction::Up
    } else {
        Direction::Down
    };

    ChangeResult {
        current,
        previous,
        delta,
        percent,
        direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_delta_and_percent() {
        let change = evaluate(28000.0, 27000.0);
        assert_eq!(change.delta, 1000.0);
        assert!((change.percent - 1000.0 / 27000.0 * 100.0).abs() < 1e-12);
        assert_eq!(change.direction, Direction::Up);
    }

    #[test]
    fn negative_delta_reports_down() {
        let change = evaluate(27000.0, 28000.0);
        assert_eq!(change.delta, -1000.0);
        assert_eq!(change.direction, Direction::Down);
        assert!(change.percent < 0.0);
    }

    #[test]
    fn zero_delta_reports_down() {
        let change = evaluate(28000.0, 28000.0);
        assert_eq!(change.delta, 0.0);
        assert_eq!(change.percent, 0.0);
        assert_eq!(change.direction, Direction::Down);
    }

    #[test]
    fn threshold_gate_is_inclusive_at_boundary() {
        // 28280 vs 28000 is exactly +1.0%.
        let change = evaluate(28280.0, 28000.0);
        assert_eq!(change.percent, 1.0);
        assert!(change.exceeds_threshold(1.0));
    }

    #[test]
    fn threshold_gate_applies_to_absolute_change() {
        let change = evaluate(27720.0, 28000.0);
        assert_eq!(change.direction, Direction::Down);
        assert!(change.exceeds_threshold(1.0));

        let small = evaluate(28010.0, 28000.0);
        assert!(!small.exceeds_threshold(1.0));
    }

    #[test]
    fn latest_pair_needs_two_rows() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let mut obs = PriceObservation {
            symbol: "^N225".to_string(),
            closes: vec![ClosingPrice {
                date,
                close: 28000.0,
            }],
        };
        assert!(obs.latest_pair().is_none());

        obs.closes.push(ClosingPrice {
            date: date.succ_opt().unwrap(),
            close: 28560.0,
        });
        assert_eq!(obs.latest_pair(), Some((28000.0, 28560.0)));
    }
}
