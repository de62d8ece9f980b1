use crate::bundle::Point;
use crate::prng::Prng;

/// Power ratio for a level in decibels.
pub fn db_to_power(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

/// Additive white Gaussian noise with a fixed complex noise power.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AwgnChannel {
    noise_power: f64,
}

impl AwgnChannel {
    pub fn new(noise_power: f64) -> Self {
        Self {
            noise_power: noise_power.max(0.0),
        }
    }

    pub fn from_db(noise_power_db: f64) -> Self {
        Self::new(db_to_power(noise_power_db))
    }

    pub fn noise_power(&self) -> f64 {
        self.noise_power
    }

    /// Each component gets half of the noise power.
    pub fn apply(&self, symbols: &[Point], rng: &mut Prng) -> Vec<Point> {
        let sigma = (self.noise_power / 2.0).sqrt();
        symbols
            .iter()
            .map(|p| p.offset(sigma * rng.next_normal(), sigma * rng.next_normal()))
            .collect()
    }
}
