use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, json_type_name};
use crate::sampler::{KriModel, SeverityModel};

/// Opening business volume on the first simulated day.
pub const INITIAL_BUSINESS_VOLUME: u64 = 100;

/// Revenue earned per unit of business volume.
pub const REVENUE_PER_UNIT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusinessConfig {
    /// Daily growth rate of business volume. Interactive range 0–0.1,
    /// step 0.005.
    pub growth_rate: f64,
}

/// Poisson frequency of loss events per day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossFrequencyConfig {
    /// λ: expected loss events per day. Interactive range 0.5–10.
    pub mean: f64,
    /// Carried for the configuration surface; the Poisson sampler takes no
    /// dispersion parameter. Interactive range 0.1–5.
    pub std: f64,
}

/// Immutable input for one simulation run. Constructed once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub seed: u64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub business: BusinessConfig,
    pub loss_frequency: LossFrequencyConfig,
    pub loss_severity: SeverityModel,
    pub kri: KriModel,
}

impl SimulationConfig {
    /// The documented defaults of the interactive configuration surface.
    pub fn canonical() -> Self {
        SimulationConfig {
            seed: 42,
            start: NaiveDate::from_ymd_opt(2022, 1, 1).expect("valid calendar date"),
            end: NaiveDate::from_ymd_opt(2022, 1, 31).expect("valid calendar date"),
            business: BusinessConfig { growth_rate: 0.02 },
            loss_frequency: LossFrequencyConfig { mean: 2.0, std: 1.0 },
            // Severity sliders: mean 100–5000, std 10–1000.
            loss_severity: SeverityModel::FoldedNormal { mean: 1200.0, std: 300.0 },
            // KRI sliders: baseline 10–100, volatility 1–20.
            kri: KriModel { baseline: 50.0, volatility: 5.0 },
        }
    }

    /// Reject inputs no sampler can honour. Called once at the start of a
    /// run; sampling after a successful `validate` cannot fail.
    pub fn validate(&self) -> Result<(), Error> {
        if self.start > self.end {
            return Err(Error::InvalidRange { start: self.start, end: self.end });
        }
        require_finite("growth_rate", self.business.growth_rate)?;
        if self.business.growth_rate <= -1.0 {
            return Err(Error::InvalidParameter {
                name: "growth_rate",
                reason: format!("{} would drive volume negative", self.business.growth_rate),
            });
        }
        require_finite("loss_freq_mean", self.loss_frequency.mean)?;
        if self.loss_frequency.mean <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "loss_freq_mean",
                reason: format!("Poisson mean must be positive, got {}", self.loss_frequency.mean),
            });
        }
        require_finite("loss_freq_std", self.loss_frequency.std)?;
        if self.loss_frequency.std < 0.0 {
            return Err(Error::InvalidParameter {
                name: "loss_freq_std",
                reason: format!("must be non-negative, got {}", self.loss_frequency.std),
            });
        }
        self.loss_severity.validate()?;
        self.kri.validate()
    }
}

fn require_finite(name: &'static str, value: f64) -> Result<(), Error> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter { name, reason: format!("{value} is not finite") })
    }
}

/// User-defined appetite thresholds. Every threshold is optional: an absent
/// threshold disables the corresponding check rather than failing it.
///
/// JSON field names match the interactive configuration surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAppetiteParams {
    #[serde(rename = "MaxExpectedLoss_Threshold", default)]
    pub max_expected_loss: Option<f64>,
    #[serde(rename = "MaxUnexpectedLoss_Threshold", default)]
    pub max_unexpected_loss: Option<f64>,
    #[serde(rename = "MaxSevereLossEvents_Threshold", default)]
    pub max_severe_loss_events: Option<u32>,
    #[serde(rename = "KRI_Limit", default)]
    pub kri_limit: Option<f64>,
    /// Reference buffer displayed alongside the results; consumed by no
    /// computation in the pipeline.
    #[serde(rename = "RiskCapacity", default)]
    pub risk_capacity: Option<f64>,
}

impl RiskAppetiteParams {
    pub fn canonical() -> Self {
        RiskAppetiteParams {
            max_expected_loss: Some(1300.0),
            max_unexpected_loss: Some(380.0),
            max_severe_loss_events: Some(5),
            kri_limit: Some(55.0),
            risk_capacity: Some(50_000.0),
        }
    }

    /// All checks disabled.
    pub fn empty() -> Self {
        RiskAppetiteParams {
            max_expected_loss: None,
            max_unexpected_loss: None,
            max_severe_loss_events: None,
            kri_limit: None,
            risk_capacity: None,
        }
    }

    /// Read thresholds from an untyped JSON value, e.g. a user-supplied
    /// parameter file. Unknown keys are ignored; known keys must carry the
    /// right JSON type; absent keys disable their check.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, Error> {
        let obj = value.as_object().ok_or_else(|| Error::TypeMismatch {
            expected: "a JSON object of appetite thresholds",
            found: json_type_name(value).to_string(),
        })?;
        Ok(RiskAppetiteParams {
            max_expected_loss: opt_f64(obj, "MaxExpectedLoss_Threshold")?,
            max_unexpected_loss: opt_f64(obj, "MaxUnexpectedLoss_Threshold")?,
            max_severe_loss_events: opt_u32(obj, "MaxSevereLossEvents_Threshold")?,
            kri_limit: opt_f64(obj, "KRI_Limit")?,
            risk_capacity: opt_f64(obj, "RiskCapacity")?,
        })
    }
}

fn opt_f64(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &'static str,
) -> Result<Option<f64>, Error> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or_else(|| Error::TypeMismatch {
            expected: "a number",
            found: format!("{} in {key}", json_type_name(v)),
        }),
    }
}

fn opt_u32(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &'static str,
) -> Result<Option<u32>, Error> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| Error::TypeMismatch {
                expected: "a non-negative integer",
                found: format!("{} in {key}", json_type_name(v)),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_config_is_valid() {
        SimulationConfig::canonical().validate().unwrap();
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut config = SimulationConfig::canonical();
        config.start = NaiveDate::from_ymd_opt(2022, 2, 1).unwrap();
        config.end = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        assert!(matches!(config.validate(), Err(Error::InvalidRange { .. })));
    }

    #[test]
    fn single_day_range_is_valid() {
        let mut config = SimulationConfig::canonical();
        config.end = config.start;
        config.validate().unwrap();
    }

    #[test]
    fn zero_poisson_mean_is_rejected() {
        let mut config = SimulationConfig::canonical();
        config.loss_frequency.mean = 0.0;
        match config.validate() {
            Err(Error::InvalidParameter { name, .. }) => assert_eq!(name, "loss_freq_mean"),
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_growth_is_rejected() {
        let mut config = SimulationConfig::canonical();
        config.business.growth_rate = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter { name: "growth_rate", .. })
        ));
    }

    #[test]
    fn params_from_json_reads_surface_key_names() {
        let value = serde_json::json!({
            "MaxExpectedLoss_Threshold": 1300.0,
            "MaxUnexpectedLoss_Threshold": 380.0,
            "MaxSevereLossEvents_Threshold": 5,
            "KRI_Limit": 55.0,
            "RiskCapacity": 50000.0,
        });
        let params = RiskAppetiteParams::from_json(&value).unwrap();
        assert_eq!(params, RiskAppetiteParams::canonical());
    }

    #[test]
    fn params_from_json_skips_absent_keys() {
        let value = serde_json::json!({ "KRI_Limit": 60.0, "unrelated": "ignored" });
        let params = RiskAppetiteParams::from_json(&value).unwrap();
        assert_eq!(params.kri_limit, Some(60.0));
        assert_eq!(params.max_expected_loss, None);
        assert_eq!(params.max_severe_loss_events, None);
    }

    #[test]
    fn params_from_json_rejects_non_object() {
        match RiskAppetiteParams::from_json(&serde_json::json!(42)) {
            Err(Error::TypeMismatch { found, .. }) => assert_eq!(found, "a number"),
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn params_from_json_rejects_wrong_value_type() {
        let value = serde_json::json!({ "MaxExpectedLoss_Threshold": "plenty" });
        match RiskAppetiteParams::from_json(&value) {
            Err(Error::TypeMismatch { found, .. }) => {
                assert_eq!(found, "a string in MaxExpectedLoss_Threshold");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn params_from_json_rejects_negative_event_count() {
        let value = serde_json::json!({ "MaxSevereLossEvents_Threshold": -3 });
        assert!(RiskAppetiteParams::from_json(&value).is_err());
    }

    #[test]
    fn params_serde_round_trip_uses_renamed_keys() {
        let json = serde_json::to_value(RiskAppetiteParams::canonical()).unwrap();
        assert_eq!(json["KRI_Limit"], 55.0);
        assert_eq!(json["MaxSevereLossEvents_Threshold"], 5);
        let back: RiskAppetiteParams = serde_json::from_value(json).unwrap();
        assert_eq!(back, RiskAppetiteParams::canonical());
    }
}
