use rand::Rng;
use rand_distr::{Distribution, LogNormal, Normal, Poisson};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Severity distribution for individual loss amounts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SeverityModel {
    /// |Normal(mean, std)|: a normal draw folded to non-negative. Not a true
    /// lognormal; the fold is the intended shape.
    FoldedNormal { mean: f64, std: f64 },
    /// Log-normal severity; ln-space params. E[X] = exp(mu + sigma²/2).
    LogNormal { mu: f64, sigma: f64 },
}

impl SeverityModel {
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        match self {
            SeverityModel::FoldedNormal { mean, std } => {
                let dist = Normal::new(*mean, *std).expect("invalid Normal params");
                dist.sample(rng).abs()
            }
            SeverityModel::LogNormal { mu, sigma } => {
                let dist = LogNormal::new(*mu, *sigma).expect("invalid LogNormal params");
                dist.sample(rng)
            }
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        match self {
            SeverityModel::FoldedNormal { mean, std } => {
                if !mean.is_finite() {
                    return Err(Error::InvalidParameter {
                        name: "loss_sev_mean",
                        reason: format!("{mean} is not finite"),
                    });
                }
                if !std.is_finite() || *std < 0.0 {
                    return Err(Error::InvalidParameter {
                        name: "loss_sev_std",
                        reason: format!("must be finite and non-negative, got {std}"),
                    });
                }
            }
            SeverityModel::LogNormal { mu, sigma } => {
                if !mu.is_finite() {
                    return Err(Error::InvalidParameter {
                        name: "loss_sev_mu",
                        reason: format!("{mu} is not finite"),
                    });
                }
                if !sigma.is_finite() || *sigma < 0.0 {
                    return Err(Error::InvalidParameter {
                        name: "loss_sev_sigma",
                        reason: format!("must be finite and non-negative, got {sigma}"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Daily Key Risk Indicator draw: i.i.d. Normal(baseline, volatility).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KriModel {
    pub baseline: f64,
    pub volatility: f64,
}

impl KriModel {
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        let dist = Normal::new(self.baseline, self.volatility).expect("invalid Normal params");
        dist.sample(rng)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.baseline.is_finite() {
            return Err(Error::InvalidParameter {
                name: "kri_baseline",
                reason: format!("{} is not finite", self.baseline),
            });
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(Error::InvalidParameter {
                name: "kri_volatility",
                reason: format!("must be finite and non-negative, got {}", self.volatility),
            });
        }
        Ok(())
    }
}

/// Draw the number of loss events for one day from Poisson(mean).
pub fn sample_event_count(mean: f64, rng: &mut impl Rng) -> u64 {
    let poisson = Poisson::new(mean).expect("invalid Poisson lambda");
    poisson.sample(rng) as u64
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    /// FoldedNormal(1200, 300) has mean barely above 1200 (the fold only
    /// moves mass at ~4σ below zero). 10k samples must land within ±5 %.
    #[test]
    fn folded_normal_mean_in_expected_range() {
        let model = SeverityModel::FoldedNormal { mean: 1200.0, std: 300.0 };
        let mut rng = rng();
        let n = 10_000;
        let mean: f64 = (0..n).map(|_| model.sample(&mut rng)).sum::<f64>() / n as f64;
        assert!(
            mean >= 1140.0 && mean <= 1260.0,
            "folded normal mean {mean:.1} outside [1140, 1260]"
        );
    }

    #[test]
    fn folded_normal_never_negative() {
        // Mean 0 puts half the raw normal mass below zero; the fold must
        // reflect all of it.
        let model = SeverityModel::FoldedNormal { mean: 0.0, std: 500.0 };
        let mut rng = rng();
        for _ in 0..5_000 {
            assert!(model.sample(&mut rng) >= 0.0);
        }
    }

    /// LogNormal(mu=7, sigma=0.5): E[X] = exp(7 + 0.125) ≈ 1242. 10k samples
    /// must land within ±20 % of that.
    #[test]
    fn lognormal_mean_in_expected_range() {
        let model = SeverityModel::LogNormal { mu: 7.0, sigma: 0.5 };
        let mut rng = rng();
        let n = 10_000;
        let mean: f64 = (0..n).map(|_| model.sample(&mut rng)).sum::<f64>() / n as f64;
        let expected = (7.0_f64 + 0.5_f64 * 0.5 / 2.0).exp();
        let (lo, hi) = (expected * 0.80, expected * 1.20);
        assert!(mean >= lo && mean <= hi, "LogNormal mean {mean:.0} outside [{lo:.0}, {hi:.0}]");
    }

    /// With λ=2.0 over 10k draws the mean count must lie in [1.9, 2.1].
    #[test]
    fn poisson_count_is_reasonable() {
        let mut rng = rng();
        let n = 10_000;
        let total: u64 = (0..n).map(|_| sample_event_count(2.0, &mut rng)).sum();
        let mean = total as f64 / n as f64;
        assert!(mean >= 1.9 && mean <= 2.1, "mean count {mean:.3} outside [1.9, 2.1]");
    }

    #[test]
    fn kri_draws_spread_around_baseline() {
        let model = KriModel { baseline: 50.0, volatility: 5.0 };
        let mut rng = rng();
        let n = 10_000;
        let samples: Vec<f64> = (0..n).map(|_| model.sample(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        assert!((mean - 50.0).abs() < 0.5, "KRI mean {mean:.2} too far from baseline");
        assert!(samples.iter().any(|&x| x < 50.0) && samples.iter().any(|&x| x > 50.0));
    }

    #[test]
    fn negative_severity_std_fails_validation() {
        let model = SeverityModel::FoldedNormal { mean: 1200.0, std: -1.0 };
        assert!(matches!(
            model.validate(),
            Err(Error::InvalidParameter { name: "loss_sev_std", .. })
        ));
    }

    #[test]
    fn negative_kri_volatility_fails_validation() {
        let model = KriModel { baseline: 50.0, volatility: -0.5 };
        assert!(model.validate().is_err());
    }
}
