//! Easing curves for tweens.

use serde::{Deserialize, Serialize};

/// Easing curve applied to a tween's normalized progress.
///
/// Serialized with the timeline engine's curve names (`"none"`,
/// `"power1.inOut"`, ...).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ease {
    #[default]
    #[serde(rename = "none", alias = "linear")]
    None,
    #[serde(rename = "power1.in")]
    InQuad,
    #[serde(rename = "power1.out")]
    OutQuad,
    #[serde(rename = "power1.inOut")]
    InOutQuad,
    #[serde(rename = "power2.in")]
    InCubic,
    #[serde(rename = "power2.out")]
    OutCubic,
    #[serde(rename = "power2.inOut")]
    InOutCubic,
    #[serde(rename = "sine.in")]
    InSine,
    #[serde(rename = "sine.out")]
    OutSine,
    #[serde(rename = "sine.inOut")]
    InOutSine,
    #[serde(rename = "back.in")]
    InBack,
    #[serde(rename = "back.out")]
    OutBack,
    #[serde(rename = "back.inOut")]
    InOutBack,
}

const BACK_C1: f64 = 1.70158;
const BACK_C2: f64 = BACK_C1 * 1.525;
const BACK_C3: f64 = BACK_C1 + 1.0;

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        use std::f64::consts::PI;

        let t = t.clamp(0.0, 1.0);
        match self {
            Self::None => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::InSine => 1.0 - (t * PI / 2.0).cos(),
            Self::OutSine => (t * PI / 2.0).sin(),
            Self::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Self::InBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Self::OutBack => 1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2),
            Self::InOutBack => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    let u = 2.0 * t - 2.0;
                    (u.powi(2) * ((BACK_C2 + 1.0) * u + BACK_C2) + 2.0) / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ease; 13] = [
        Ease::None,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
        Ease::InSine,
        Ease::OutSine,
        Ease::InOutSine,
        Ease::InBack,
        Ease::OutBack,
        Ease::InOutBack,
    ];

    #[test]
    fn test_endpoints_are_fixed() {
        for ease in ALL {
            assert!(ease.apply(0.0).abs() < 1e-9, "{ease:?} at 0");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-9, "{ease:?} at 1");
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(Ease::None.apply(-1.0), 0.0);
        assert_eq!(Ease::InQuad.apply(2.0), 1.0);
    }

    #[test]
    fn test_in_out_symmetry() {
        assert!((Ease::InOutQuad.apply(0.5) - 0.5).abs() < 1e-9);
        assert!((Ease::InOutCubic.apply(0.5) - 0.5).abs() < 1e-9);
        assert!((Ease::InOutSine.apply(0.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&Ease::InOutQuad).unwrap(), "\"power1.inOut\"");
        let parsed: Ease = serde_json::from_str("\"linear\"").unwrap();
        assert_eq!(parsed, Ease::None);
    }
}
