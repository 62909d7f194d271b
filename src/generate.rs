use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::config::{INITIAL_BUSINESS_VOLUME, REVENUE_PER_UNIT, SimulationConfig};
use crate::error::Error;
use crate::records::{LossEvent, OperationsRecord};
use crate::sampler;

/// Every calendar day in `[start, end]`, inclusive.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Generate the two synthetic datasets for one run: the daily operations
/// series and the irregular loss-event list.
///
/// Pure in everything but the draws taken from `rng`; the same seeded rng
/// and config always reproduce the same output.
pub fn generate(
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> Result<(Vec<OperationsRecord>, Vec<LossEvent>), Error> {
    config.validate()?;

    let days = date_range(config.start, config.end);
    let growth = config.business.growth_rate;

    // The volume recurrence feeds each day's floored result into the next
    // day's product, so it cannot be computed per-day independently.
    let mut operations = Vec::with_capacity(days.len());
    let mut volume = INITIAL_BUSINESS_VOLUME;
    for (i, date) in days.iter().enumerate() {
        if i > 0 {
            volume = (volume as f64 * (1.0 + growth)).floor() as u64;
        }
        operations.push(OperationsRecord {
            date: *date,
            business_volume: volume,
            revenue: REVENUE_PER_UNIT * volume as f64,
            kri: config.kri.sample(rng),
        });
    }

    // Loss days: Poisson count, then one severity draw per event. Zero-count
    // days produce no rows.
    let mut losses = Vec::new();
    for date in &days {
        let n = sampler::sample_event_count(config.loss_frequency.mean, rng);
        for _ in 0..n {
            losses.push(LossEvent { date: *date, amount: config.loss_severity.sample(rng) });
        }
    }

    Ok((operations, losses))
}

/// [`generate`] with a `ChaCha20Rng` seeded from `config.seed`.
pub fn generate_seeded(
    config: &SimulationConfig,
) -> Result<(Vec<OperationsRecord>, Vec<LossEvent>), Error> {
    let mut rng = ChaCha20Rng::seed_from_u64(config.seed);
    generate(config, &mut rng)
}
