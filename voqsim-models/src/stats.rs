// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Small statistics helpers for summarizing sample sequences.

/// Arithmetic mean of the samples. Zero for an empty sequence.
#[must_use]
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn mean_of_samples() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }
}
