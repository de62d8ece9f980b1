//! The demo pages: one controller and one simulator per page.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DemoError;

pub mod psk;
pub mod qam;
pub mod quantizer;

pub use psk::{PskControls, PskDemo};
pub use qam::{QamControls, QamDemo};
pub use quantizer::{QuantizerControls, QuantizerDemo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemoKind {
    Quantizer,
    Psk,
    Qam,
}

impl DemoKind {
    pub fn label(self) -> &'static str {
        match self {
            DemoKind::Quantizer => "quantizer",
            DemoKind::Psk => "psk",
            DemoKind::Qam => "qam",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DemoKind::Quantizer => "Uniform quantization",
            DemoKind::Psk => "Phase-shift keying",
            DemoKind::Qam => "Quadrature amplitude modulation",
        }
    }

    pub fn all() -> &'static [DemoKind] {
        &[DemoKind::Quantizer, DemoKind::Psk, DemoKind::Qam]
    }
}

impl fmt::Display for DemoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DemoKind {
    type Err = DemoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DemoKind::all()
            .iter()
            .copied()
            .find(|k| k.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DemoError::UnknownDemo(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_from_labels() {
        for kind in DemoKind::all() {
            assert_eq!(kind.label().parse::<DemoKind>().unwrap(), *kind);
        }
        assert_eq!(" PSK ".parse::<DemoKind>().unwrap(), DemoKind::Psk);
        assert!(matches!("ofdm".parse::<DemoKind>(), Err(DemoError::UnknownDemo(_))));
    }

    #[test]
    fn serde_uses_labels() {
        assert_eq!(serde_json::to_string(&DemoKind::Qam).unwrap(), "\"qam\"");
    }
}
