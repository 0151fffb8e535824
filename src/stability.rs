//! Head stability tracking over the loading and release phases.
//!
//! Keeps a rolling window of head tilt samples and reports their spread. A
//! shooter who keeps their eyes on the rim shows a small head-tilt standard
//! deviation; a large one is reported as an unstable head.

use serde::Serialize;
use std::collections::VecDeque;

/// Rolling head tilt statistics
#[derive(Debug, Clone)]
pub struct HeadStabilityTracker {
    window_size: usize,
    threshold: f64,
    history: VecDeque<f64>,
    peak_std_dev: f64,
}

impl HeadStabilityTracker {
    /// Create a tracker with a window size and std-dev threshold in degrees
    #[must_use]
    pub fn new(window_size: usize, threshold: f64) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            threshold,
            history: VecDeque::with_capacity(window_size),
            peak_std_dev: 0.0,
        }
    }

    /// Add a head tilt sample. Returns `true` if the full window is unstable.
    pub fn update(&mut self, head_tilt: f64) -> bool {
        if self.history.len() >= self.window_size {
            self.history.pop_front();
        }
        self.history.push_back(head_tilt);

        // Need a full window to judge
        if self.history.len() < self.window_size {
            return false;
        }

        let stats = Self::calculate_stats(&self.history);
        self.peak_std_dev = self.peak_std_dev.max(stats.std_dev);
        stats.std_dev > self.threshold
    }

    /// Statistics of the current window, once it holds at least two samples
    #[must_use]
    pub fn get_stats(&self) -> Option<Statistics> {
        if self.history.len() < 2 {
            return None;
        }
        let mut stats = Self::calculate_stats(&self.history);
        stats.peak_std_dev = stats.peak_std_dev.max(self.peak_std_dev);
        Some(stats)
    }

    /// Whether the largest spread seen so far exceeds the threshold
    #[must_use]
    pub fn is_unstable(&self) -> bool {
        self.get_stats().is_some_and(|s| s.peak_std_dev > self.threshold)
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Reset the tracker
    pub fn reset(&mut self) {
        self.history.clear();
        self.peak_std_dev = 0.0;
    }

    /// Calculate statistics for a data window
    fn calculate_stats(data: &VecDeque<f64>) -> Statistics {
        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;

        let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        let std_dev = variance.sqrt();

        let min = data.iter().copied().fold(f64::INFINITY, f64::min);
        let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Statistics {
            mean,
            std_dev,
            min,
            max,
            range: max - min,
            peak_std_dev: std_dev,
            samples: data.len(),
        }
    }
}

/// Statistical summary of head tilt
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    /// Mean head tilt
    pub mean: f64,
    /// Standard deviation of the current window
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Range (max - min) of the window
    pub range: f64,
    /// Largest window standard deviation seen
    pub peak_std_dev: f64,
    /// Samples in the current window
    pub samples: usize,
}
