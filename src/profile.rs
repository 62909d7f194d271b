use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::RiskAppetiteParams;
use crate::records::{LossEvent, OperationsRecord, RiskProfileRecord};

/// Arithmetic mean. Zero for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation (n − 1 denominator). Zero for fewer than two
/// values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
}

/// Reduce the generated datasets into a per-day risk profile.
///
/// Expected and Unexpected Loss are computed once over every loss amount in
/// the run and broadcast to each row; per-day aggregation feeds only
/// `day_loss_total`. One output record per operations record, same order.
/// Empty operations in, empty profile out.
pub fn calculate(
    operations: &[OperationsRecord],
    losses: &[LossEvent],
    params: &RiskAppetiteParams,
) -> Vec<RiskProfileRecord> {
    if operations.is_empty() {
        return Vec::new();
    }

    let amounts: Vec<f64> = losses.iter().map(|l| l.amount).collect();
    let expected_loss = mean(&amounts);
    let unexpected_loss = sample_std(&amounts);

    let mut day_totals: HashMap<NaiveDate, f64> = HashMap::new();
    for loss in losses {
        *day_totals.entry(loss.date).or_insert(0.0) += loss.amount;
    }

    operations
        .iter()
        .map(|op| RiskProfileRecord {
            date: op.date,
            expected_loss,
            unexpected_loss,
            day_loss_total: day_totals.get(&op.date).copied().unwrap_or(0.0),
            severe_loss_count: None,
            kri: Some(op.kri),
            // No configured limit means no exceedance, not an error.
            kri_exceeded: params.kri_limit.is_some_and(|limit| op.kri > limit),
        })
        .collect()
}
