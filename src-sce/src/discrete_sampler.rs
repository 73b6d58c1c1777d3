//! Discrete inverse-transform sampler, used with a trapezoidal density to draw
//! rank indices biased toward the best points of a complex.

use rand::Rng;

use crate::error::{Result, SceError};

const SMALL_VALUE: f64 = 1e-8;

/// Sampler over a finite set of realisations `x_i` with probabilities `p_i`
#[derive(Debug, Clone)]
pub struct DiscreteRandomNumberGenerator {
    values: Vec<f64>,
    /// `cumulative[i] = P(X < x_i)`
    cumulative: Vec<f64>,
}

impl DiscreteRandomNumberGenerator {
    /// Build from `(x_i, p_i)` pairs. Negative probabilities and a total further
    /// than 1e-8 from one are rejected.
    pub fn from_pdf(pdf: &[(f64, f64)]) -> Result<Self> {
        if pdf.is_empty() {
            return Err(SceError::InvalidDensity("no realisation".to_string()));
        }
        if pdf.iter().any(|&(_, p)| p < 0.0) {
            return Err(SceError::InvalidDensity("negative probability".to_string()));
        }
        let total: f64 = pdf.iter().map(|&(_, p)| p).sum();
        if (1.0 - total).abs() > SMALL_VALUE {
            return Err(SceError::InvalidDensity(format!("probabilities sum to {}", total)));
        }
        let mut values = Vec::with_capacity(pdf.len());
        let mut cumulative = Vec::with_capacity(pdf.len());
        let mut acc = 0.0;
        for &(x, p) in pdf {
            values.push(x);
            cumulative.push(acc);
            acc += p;
        }
        Ok(Self { values, cumulative })
    }

    /// Trapezoidal density over the indices `0..n`.
    ///
    /// `c` is the density multiplier at index 0 and must lie in `[0, 2]`:
    /// `p_i = c/n + i * (-2(c-1) / ((n-1)n))`. `c = 1` is uniform, `c > 1`
    /// favours low indices. `n = 1` always yields 0.
    pub fn trapezoidal(c: f64, n: usize) -> Result<Self> {
        if !(0.0..=2.0).contains(&c) {
            return Err(SceError::InvalidDensity(format!("trapezoidal parameter {} not in [0, 2]", c)));
        }
        if n < 1 {
            return Err(SceError::InvalidDensity("trapezoidal density needs n >= 1".to_string()));
        }
        if n == 1 {
            return Self::from_pdf(&[(0.0, 1.0)]);
        }
        let nf = n as f64;
        let first = c / nf;
        let increment = -(2.0 * (c - 1.0)) / ((nf - 1.0) * nf);
        let pdf: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let mut p = first + increment * i as f64;
                // rounding may leave a tiny negative density at the tail
                if p.abs() < SMALL_VALUE {
                    p = 0.0;
                }
                (i as f64, p)
            })
            .collect();
        Self::from_pdf(&pdf)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(x_i, p_i)` pairs
    pub fn probabilities(&self) -> Vec<(f64, f64)> {
        let n = self.values.len();
        (0..n)
            .map(|i| {
                let next = if i + 1 < n { self.cumulative[i + 1] } else { 1.0 };
                (self.values[i], next - self.cumulative[i])
            })
            .collect()
    }

    pub fn next_value<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u = rng.random::<f64>();
        let n = self.values.len();
        let mut i = 1;
        while i < n && u > self.cumulative[i] {
            i += 1;
        }
        self.values[i - 1]
    }

    /// Draw interpreted as an index, for densities built by [`Self::trapezoidal`]
    pub fn next_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.next_value(rng) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_trapezoidal_uniform() {
        let g = DiscreteRandomNumberGenerator::trapezoidal(1.0, 4).unwrap();
        for (i, (x, p)) in g.probabilities().into_iter().enumerate() {
            assert_eq!(x, i as f64);
            assert!((p - 0.25).abs() < 1e-12, "p[{}]={}", i, p);
        }
    }

    #[test]
    fn test_trapezoidal_shape() {
        let g = DiscreteRandomNumberGenerator::trapezoidal(2.0, 3).unwrap();
        let p: Vec<f64> = g.probabilities().into_iter().map(|(_, p)| p).collect();
        assert!((p[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((p[1] - 1.0 / 3.0).abs() < 1e-12);
        assert!(p[2].abs() < 1e-12);

        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1000 {
            assert!(g.next_index(&mut rng) < 2);
        }
    }

    #[test]
    fn test_trapezoidal_frequencies() {
        let n = 13;
        let g = DiscreteRandomNumberGenerator::trapezoidal(1.9, n).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = vec![0usize; n];
        let draws = 20_000;
        for _ in 0..draws {
            counts[g.next_index(&mut rng)] += 1;
        }
        let f0 = counts[0] as f64 / draws as f64;
        let f_last = counts[n - 1] as f64 / draws as f64;
        assert!((f0 - 1.9 / 13.0).abs() < 0.02, "frequency of best rank: {}", f0);
        assert!(f_last < f0, "last rank drawn more than first: {} vs {}", f_last, f0);
    }

    #[test]
    fn test_single_realisation() {
        let g = DiscreteRandomNumberGenerator::trapezoidal(1.8, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(g.next_index(&mut rng), 0);
        }
    }

    #[test]
    fn test_invalid_densities() {
        assert!(DiscreteRandomNumberGenerator::trapezoidal(2.5, 4).is_err());
        assert!(DiscreteRandomNumberGenerator::trapezoidal(-0.1, 4).is_err());
        assert!(DiscreteRandomNumberGenerator::trapezoidal(1.0, 0).is_err());
        assert!(DiscreteRandomNumberGenerator::from_pdf(&[(0.0, -0.5), (1.0, 1.5)]).is_err());
        assert!(DiscreteRandomNumberGenerator::from_pdf(&[(0.0, 0.5), (1.0, 0.4)]).is_err());
    }
}
