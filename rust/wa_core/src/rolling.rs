//! Trailing-window primitives over regularly sampled series.
//!
//! Every output has the same length as its input. Positions where the window
//! has not yet filled are `None`.

use std::collections::VecDeque;

/// Fixed-length trailing sum over integer counts. Exact, no float drift.
#[derive(Debug, Clone)]
pub struct TrailingSum {
    window: usize,
    buf: VecDeque<i64>,
    sum: i64,
}

impl TrailingSum {
    pub fn new(window: usize) -> Self {
        Self { window, buf: VecDeque::with_capacity(window), sum: 0 }
    }

    /// Push a value; returns the window sum once `window` values are held.
    pub fn push(&mut self, value: i64) -> Option<i64> {
        if self.buf.len() == self.window {
            if let Some(evicted) = self.buf.pop_front() {
                self.sum -= evicted;
            }
        }
        self.buf.push_back(value);
        self.sum += value;
        self.is_full().then_some(self.sum)
    }

    pub fn is_full(&self) -> bool {
        self.window > 0 && self.buf.len() == self.window
    }
}

pub fn trailing_sum(values: &[i64], window: usize) -> Vec<Option<i64>> {
    let mut acc = TrailingSum::new(window);
    values.iter().map(|&v| acc.push(v)).collect()
}

/// Trailing arithmetic mean. Each window is summed directly so identical
/// inputs give bit-identical outputs regardless of history length.
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let slice = &values[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

/// Shift a series forward by `periods`: `out[i] = values[i - periods]`.
pub fn lag<T: Copy>(values: &[Option<T>], periods: usize) -> Vec<Option<T>> {
    (0..values.len())
        .map(|i| if i >= periods { values[i - periods] } else { None })
        .collect()
}
