use std::f64::consts::PI;
use std::fmt;

use crate::bundle::Point;
use crate::error::{DemoError, DemoResult};
use crate::prng::Prng;

/// M-ary phase-shift keying with natural labeling.
#[derive(Debug, Clone, PartialEq)]
pub struct PskModulation {
    order: usize,
    amplitude: f64,
    phase_offset: f64,
}

impl PskModulation {
    pub fn new(order: usize, amplitude: f64, phase_offset: f64) -> DemoResult<Self> {
        if order < 2 || !order.is_power_of_two() {
            return Err(DemoError::invalid("order", format!("must be a power of two >= 2, got {order}")));
        }
        if !(amplitude.is_finite() && amplitude > 0.0) {
            return Err(DemoError::invalid("amplitude", format!("must be positive, got {amplitude}")));
        }
        if !phase_offset.is_finite() {
            return Err(DemoError::invalid("phase_offset", "must be finite"));
        }
        Ok(Self {
            order,
            amplitude,
            phase_offset,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn bits_per_symbol(&self) -> u32 {
        self.order.trailing_zeros()
    }

    pub fn energy_per_symbol(&self) -> f64 {
        self.amplitude * self.amplitude
    }

    pub fn constellation(&self) -> Vec<Point> {
        (0..self.order)
            .map(|k| {
                let angle = 2.0 * PI * k as f64 / self.order as f64 + self.phase_offset;
                Point::polar(self.amplitude, angle)
            })
            .collect()
    }

    /// `count` equiprobable symbols.
    pub fn random_symbols(&self, count: usize, rng: &mut Prng) -> Vec<Point> {
        let constellation = self.constellation();
        (0..count)
            .map(|_| constellation[rng.gen_range_usize(0, self.order)])
            .collect()
    }
}

impl fmt::Display for PskModulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-PSK (amplitude {:.2}, phase offset {:.2})",
            self.order, self.amplitude, self.phase_offset
        )
    }
}
