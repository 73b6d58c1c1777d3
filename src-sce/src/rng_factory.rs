//! Seeded source of random number generators.
//!
//! Every stochastic component of a run draws from a generator handed out by
//! one [`RngFactory`], in a fixed order, so that a seed fully determines the
//! run whatever the number of worker threads.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct RngFactory {
    rng: StdRng,
}

impl RngFactory {
    /// Seeded factory; `None` seeds from the thread generator
    pub fn new(seed: Option<u64>) -> Self {
        let rng: StdRng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => {
                let mut thread_rng = rand::rng();
                StdRng::from_rng(&mut thread_rng)
            }
        };
        Self { rng }
    }

    /// Next child generator
    pub fn create_rng(&mut self) -> StdRng {
        StdRng::seed_from_u64(self.rng.random::<u64>())
    }

    /// Independent child factory, e.g. one per shuffle round
    pub fn create_factory(&mut self) -> RngFactory {
        RngFactory { rng: self.create_rng() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_children() {
        let mut a = RngFactory::new(Some(7));
        let mut b = RngFactory::new(Some(7));
        for _ in 0..5 {
            let x: f64 = a.create_rng().random();
            let y: f64 = b.create_rng().random();
            assert_eq!(x, y);
        }
        let mut fa = a.create_factory();
        let mut fb = b.create_factory();
        assert_eq!(fa.create_rng().random::<u64>(), fb.create_rng().random::<u64>());
    }

    #[test]
    fn test_children_differ() {
        let mut f = RngFactory::new(Some(1));
        let x: u64 = f.create_rng().random();
        let y: u64 = f.create_rng().random();
        assert_ne!(x, y);
    }
}
