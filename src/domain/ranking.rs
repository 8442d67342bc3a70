//! Ranking, qualitative bands, velocity and alert flags for the latest scores.
//!
//! Everything here is evaluated once per refresh from the latest two smoothed
//! samples; there is no state carried between refreshes.

use crate::domain::config::AlertThresholds;
use crate::domain::currency::Currency;
use crate::domain::strength::CurrencyStrength;
use chrono::NaiveDateTime;
use std::fmt;

pub const STRONG_BAND: f64 = 7.0;
pub const MODERATE_STRONG_BAND: f64 = 5.5;
pub const MODERATE_WEAK_BAND: f64 = 4.0;
/// Score changes within this deadband count as flat.
pub const VELOCITY_DEADBAND: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Strong,
    ModerateStrong,
    ModerateWeak,
    Weak,
}

impl Band {
    /// Lower bounds are inclusive, checked top-down.
    pub fn classify(score: f64) -> Self {
        if score >= STRONG_BAND {
            Band::Strong
        } else if score >= MODERATE_STRONG_BAND {
            Band::ModerateStrong
        } else if score >= MODERATE_WEAK_BAND {
            Band::ModerateWeak
        } else {
            Band::Weak
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Band::Strong => "strong",
            Band::ModerateStrong => "moderate-strong",
            Band::ModerateWeak => "moderate-weak",
            Band::Weak => "weak",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Velocity {
    Rising,
    Falling,
    Flat,
}

impl Velocity {
    pub fn from_delta(delta: f64) -> Self {
        if delta > VELOCITY_DEADBAND {
            Velocity::Rising
        } else if delta < -VELOCITY_DEADBAND {
            Velocity::Falling
        } else {
            Velocity::Flat
        }
    }

    /// Flat when there is no previous sample to compare against.
    pub fn between(previous: Option<f64>, current: f64) -> Self {
        previous.map_or(Velocity::Flat, |p| Self::from_delta(current - p))
    }
}

impl fmt::Display for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Velocity::Rising => "rising",
            Velocity::Falling => "falling",
            Velocity::Flat => "flat",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedCurrency {
    pub rank: usize,
    pub currency: Currency,
    pub score: f64,
    pub band: Band,
    pub velocity: Velocity,
    pub opponents_used: usize,
    pub opponents_possible: usize,
}

impl RankedCurrency {
    pub fn is_reduced_confidence(&self) -> bool {
        self.opponents_used < self.opponents_possible
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsufficientReason {
    NoOpponents,
    WarmingUp,
}

impl fmt::Display for InsufficientReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsufficientReason::NoOpponents => write!(f, "no resolvable opponent pairs"),
            InsufficientReason::WarmingUp => write!(f, "not enough samples for a smoothed score"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsufficientCurrency {
    pub currency: Currency,
    pub reason: InsufficientReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertFlags {
    pub divergence: f64,
    pub divergence_alert: bool,
    pub strong: Vec<Currency>,
    pub weak: Vec<Currency>,
}

impl AlertFlags {
    pub fn any(&self) -> bool {
        self.divergence_alert || !self.strong.is_empty() || !self.weak.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub timestamp: Option<NaiveDateTime>,
    pub ranking: Vec<RankedCurrency>,
    pub insufficient: Vec<InsufficientCurrency>,
    pub alerts: AlertFlags,
}

/// Order (currency, score) entries by score descending. Ties keep input order.
pub fn rank_scores(entries: &[(Currency, f64)]) -> Vec<(usize, Currency, f64)> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, (currency, score))| (i + 1, currency, score))
        .collect()
}

/// max - min over the scores, 0 for an empty slice.
pub fn divergence(scores: &[f64]) -> f64 {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    if scores.is_empty() { 0.0 } else { max - min }
}

pub fn build_snapshot(
    strengths: &[CurrencyStrength],
    timestamp: Option<NaiveDateTime>,
    thresholds: &AlertThresholds,
) -> Snapshot {
    let mut scored = Vec::new();
    let mut insufficient = Vec::new();

    for s in strengths {
        match (s.has_opponents(), s.latest()) {
            (false, _) => insufficient.push(InsufficientCurrency {
                currency: s.currency,
                reason: InsufficientReason::NoOpponents,
            }),
            (true, None) => insufficient.push(InsufficientCurrency {
                currency: s.currency,
                reason: InsufficientReason::WarmingUp,
            }),
            (true, Some(score)) => scored.push((s.currency, score)),
        }
    }

    let ranking: Vec<RankedCurrency> = rank_scores(&scored)
        .into_iter()
        .filter_map(|(rank, currency, score)| {
            let s = strengths.iter().find(|s| s.currency == currency)?;
            Some(RankedCurrency {
                rank,
                currency,
                score,
                band: Band::classify(score),
                velocity: Velocity::between(s.previous(), score),
                opponents_used: s.opponents_used(),
                opponents_possible: s.opponents_possible(),
            })
        })
        .collect();

    let scores: Vec<f64> = ranking.iter().map(|r| r.score).collect();
    let spread = divergence(&scores);
    let alerts = AlertFlags {
        divergence: spread,
        divergence_alert: spread > thresholds.divergence_above,
        strong: ranking
            .iter()
            .filter(|r| r.score > thresholds.strong_above)
            .map(|r| r.currency)
            .collect(),
        weak: ranking
            .iter()
            .filter(|r| r.score < thresholds.weak_below)
            .map(|r| r.currency)
            .collect(),
    };

    Snapshot {
        timestamp,
        ranking,
        insufficient,
        alerts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::currency::{AUD, EUR, GBP, JPY, USD};

    #[test]
    fn band_thresholds_inclusive_lower_bound() {
        assert_eq!(Band::classify(10.0), Band::Strong);
        assert_eq!(Band::classify(7.0), Band::Strong);
        assert_eq!(Band::classify(6.99), Band::ModerateStrong);
        assert_eq!(Band::classify(5.5), Band::ModerateStrong);
        assert_eq!(Band::classify(5.49), Band::ModerateWeak);
        assert_eq!(Band::classify(4.0), Band::ModerateWeak);
        assert_eq!(Band::classify(3.99), Band::Weak);
        assert_eq!(Band::classify(0.0), Band::Weak);
    }

    #[test]
    fn velocity_deadband() {
        assert_eq!(Velocity::from_delta(0.06), Velocity::Rising);
        assert_eq!(Velocity::from_delta(0.05), Velocity::Flat);
        assert_eq!(Velocity::from_delta(0.0), Velocity::Flat);
        assert_eq!(Velocity::from_delta(-0.05), Velocity::Flat);
        assert_eq!(Velocity::from_delta(-0.06), Velocity::Falling);
        assert_eq!(Velocity::between(None, 9.0), Velocity::Flat);
        assert_eq!(Velocity::between(Some(5.0), 6.0), Velocity::Rising);
    }

    #[test]
    fn ranking_is_stable_on_ties() {
        let ranked = rank_scores(&[(USD, 5.0), (EUR, 7.0), (GBP, 5.0), (JPY, 7.0), (AUD, 1.0)]);
        let order: Vec<_> = ranked.iter().map(|(_, c, _)| *c).collect();
        assert_eq!(order, vec![EUR, JPY, USD, GBP, AUD]);
        let ranks: Vec<_> = ranked.iter().map(|(r, _, _)| *r).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn divergence_of_scores() {
        assert_eq!(divergence(&[]), 0.0);
        assert_eq!(divergence(&[4.0]), 0.0);
        assert_eq!(divergence(&[2.0, 9.5, 5.0]), 7.5);
    }

    #[test]
    fn alert_flags_any() {
        let quiet = AlertFlags {
            divergence: 1.0,
            divergence_alert: false,
            strong: vec![],
            weak: vec![],
        };
        assert!(!quiet.any());
        let loud = AlertFlags {
            weak: vec![USD],
            ..quiet
        };
        assert!(loud.any());
    }
}
