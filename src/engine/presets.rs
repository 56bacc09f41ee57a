use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ranking preset. Baseline is engagement-only; the rest are prototype
/// presets with their own score weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Baseline,
    Entertainment,
    Inspiration,
    Learning,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Baseline,
        Preset::Entertainment,
        Preset::Inspiration,
        Preset::Learning,
    ];

    pub const PROTOTYPES: [Preset; 3] =
        [Preset::Entertainment, Preset::Inspiration, Preset::Learning];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Baseline => "baseline",
            Preset::Entertainment => "entertainment",
            Preset::Inspiration => "inspiration",
            Preset::Learning => "learning",
        }
    }

    pub fn is_prototype(&self) -> bool {
        !matches!(self, Preset::Baseline)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "baseline" => Ok(Preset::Baseline),
            "entertainment" => Ok(Preset::Entertainment),
            "inspiration" => Ok(Preset::Inspiration),
            "learning" => Ok(Preset::Learning),
            other => anyhow::bail!("unknown preset: {}", other),
        }
    }
}

/// Score weights: engagement and diversity and prosocial add, risk subtracts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Weights {
    pub engagement: f64,
    pub diversity: f64,
    pub prosocial: f64,
    pub risk: f64,
}

/// Resolve effective weights and feed length for a run.
///
/// Night mode leans harder on the risk penalty and caps the feed length
/// (shorter late-night sessions). Baseline callers never reach this;
/// they rank by engagement alone.
pub fn mode_settings(
    weights: Weights,
    night_mode: bool,
    k_default: usize,
    night_k_cap: usize,
    night_risk_boost: f64,
) -> (Weights, usize) {
    if !night_mode {
        return (weights, k_default);
    }
    let adjusted = Weights {
        risk: weights.risk + night_risk_boost,
        ..weights
    };
    (adjusted, k_default.min(night_k_cap))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_roundtrip() {
        for preset in Preset::ALL {
            assert_eq!(preset.as_str().parse::<Preset>().unwrap(), preset);
        }
        assert!("disco".parse::<Preset>().is_err());
    }

    #[test]
    fn test_mode_settings_normal() {
        let w = Weights { engagement: 0.55, diversity: 0.20, prosocial: 0.15, risk: 0.10 };
        let (weights, k) = mode_settings(w, false, 100, 15, 0.15);
        assert_eq!(k, 100);
        assert!((weights.risk - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_mode_settings_night() {
        let w = Weights { engagement: 0.55, diversity: 0.20, prosocial: 0.15, risk: 0.10 };
        let (weights, k) = mode_settings(w, true, 100, 15, 0.15);
        assert_eq!(k, 15);
        assert!((weights.risk - 0.25).abs() < 1e-9);
        // other weights untouched
        assert!((weights.engagement - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_night_cap_does_not_grow_k() {
        let w = Weights { engagement: 0.5, diversity: 0.2, prosocial: 0.2, risk: 0.1 };
        let (_, k) = mode_settings(w, true, 10, 15, 0.15);
        assert_eq!(k, 10);
    }
}
