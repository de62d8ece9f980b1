use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bundle::Point;
use crate::error::{DemoError, DemoResult};
use crate::prng::Prng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QamLabeling {
    #[serde(rename = "natural")]
    Natural,
    /// Gray code along each dimension.
    #[default]
    #[serde(rename = "reflected_2d")]
    Reflected2d,
}

impl QamLabeling {
    pub fn display_name(self) -> &'static str {
        match self {
            QamLabeling::Natural => "Natural",
            QamLabeling::Reflected2d => "Reflected 2D (Gray)",
        }
    }
}

fn gray(n: usize) -> usize {
    n ^ (n >> 1)
}

/// Rectangular QAM: an `M0 x M1` grid, optionally rotated.
#[derive(Debug, Clone, PartialEq)]
pub struct QamModulation {
    orders: (usize, usize),
    base_amplitudes: (f64, f64),
    phase_offset: f64,
    labeling: QamLabeling,
}

impl QamModulation {
    pub fn new(
        orders: (usize, usize),
        base_amplitudes: (f64, f64),
        phase_offset: f64,
        labeling: QamLabeling,
    ) -> DemoResult<Self> {
        for order in [orders.0, orders.1] {
            if order < 2 || !order.is_power_of_two() {
                return Err(DemoError::invalid(
                    "orders",
                    format!("each dimension must be a power of two >= 2, got {orders:?}"),
                ));
            }
        }
        for a in [base_amplitudes.0, base_amplitudes.1] {
            if !(a.is_finite() && a > 0.0) {
                return Err(DemoError::invalid(
                    "base_amplitudes",
                    format!("must be positive, got {base_amplitudes:?}"),
                ));
            }
        }
        if !phase_offset.is_finite() {
            return Err(DemoError::invalid("phase_offset", "must be finite"));
        }
        Ok(Self {
            orders,
            base_amplitudes,
            phase_offset,
            labeling,
        })
    }

    pub fn order(&self) -> usize {
        self.orders.0 * self.orders.1
    }

    pub fn orders(&self) -> (usize, usize) {
        self.orders
    }

    pub fn bits_per_symbol(&self) -> u32 {
        self.order().trailing_zeros()
    }

    /// Point `k` sits at column `k % M0`, row `k / M0`.
    pub fn constellation(&self) -> Vec<Point> {
        let (m0, m1) = self.orders;
        let (a0, a1) = self.base_amplitudes;
        (0..self.order())
            .map(|k| {
                let (i, q) = (k % m0, k / m0);
                let re = a0 * (2.0 * i as f64 + 1.0 - m0 as f64);
                let im = a1 * (2.0 * q as f64 + 1.0 - m1 as f64);
                Point::new(re, im).rotated(self.phase_offset)
            })
            .collect()
    }

    /// Integer label of each constellation point.
    pub fn labels(&self) -> Vec<usize> {
        let m0 = self.orders.0;
        (0..self.order())
            .map(|k| match self.labeling {
                QamLabeling::Natural => k,
                QamLabeling::Reflected2d => gray(k % m0) + m0 * gray(k / m0),
            })
            .collect()
    }

    pub fn random_symbols(&self, count: usize, rng: &mut Prng) -> Vec<Point> {
        let constellation = self.constellation();
        (0..count)
            .map(|_| constellation[rng.gen_range_usize(0, constellation.len())])
            .collect()
    }
}

impl fmt::Display for QamModulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-QAM ({} x {}, base amplitudes {:.2}/{:.2}, phase offset {:.2}, {})",
            self.order(),
            self.orders.0,
            self.orders.1,
            self.base_amplitudes.0,
            self.base_amplitudes.1,
            self.phase_offset,
            self.labeling.display_name(),
        )
    }
}
