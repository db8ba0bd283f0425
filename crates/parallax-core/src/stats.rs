//! Single-pass running mean and variance (Welford).

/// Numerically stable streaming accumulator for mean and variance.
///
/// Not synchronized; share behind a lock if several threads push.
#[derive(Clone, Debug, Default)]
pub struct StreamingStats {
    count: u64,
    mean: f64,
    sum_sq: f64,
}

impl StreamingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample.
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let old_mean = self.mean;
        self.mean += (x - old_mean) / self.count as f64;
        self.sum_sq += (x - old_mean) * (x - self.mean);
    }

    /// Forget every sample.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean of pushed samples, 0 before the first push.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance with the `n - 1` divisor, 0 for fewer than two samples.
    pub fn variance(&self) -> f64 {
        if self.count > 1 {
            self.sum_sq / (self.count - 1) as f64
        } else {
            0.0
        }
    }

    pub fn standard_deviation(&self) -> f64 {
        self.variance().sqrt()
    }
}

impl Extend<f64> for StreamingStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.push(x);
        }
    }
}
