//! The simulation engine behind the demo pages.
//!
//! These are plain numerical models. The core (cache, merger) never looks
//! inside them; each demo wraps one behind the `Simulator` trait.

pub mod awgn;
pub mod psk;
pub mod qam;
pub mod quantizer;

pub use awgn::AwgnChannel;
pub use psk::PskModulation;
pub use qam::{QamLabeling, QamModulation};
pub use quantizer::{QuantizerChoice, UniformQuantizer};

/// `n` evenly spaced samples over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Bits of `value`, most significant first, padded to `width`.
pub fn bit_string(value: usize, width: u32) -> String {
    (0..width)
        .rev()
        .map(|b| if (value >> b) & 1 == 1 { '1' } else { '0' })
        .collect()
}
