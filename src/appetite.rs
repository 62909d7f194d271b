use crate::config::RiskAppetiteParams;
use crate::records::{BreachRecord, BreachStatus, KriStatus, KriStatusRecord, RiskProfileRecord};

/// Strict-greater-than breach test. Equality is never a breach; an absent
/// threshold skips the check entirely.
fn check(value: f64, threshold: Option<f64>) -> Option<BreachStatus> {
    threshold.map(|t| {
        if value > t { BreachStatus::Breached } else { BreachStatus::WithinAppetite }
    })
}

/// Compare a risk profile against the appetite thresholds, one breach record
/// and one KRI status record per profile row. An empty profile yields two
/// empty sequences.
pub fn evaluate(
    profile: &[RiskProfileRecord],
    params: &RiskAppetiteParams,
) -> (Vec<BreachRecord>, Vec<KriStatusRecord>) {
    let mut breaches = Vec::with_capacity(profile.len());
    let mut kri_status = Vec::with_capacity(profile.len());

    for row in profile {
        breaches.push(BreachRecord {
            date: row.date,
            expected_loss: check(row.expected_loss, params.max_expected_loss),
            unexpected_loss: check(row.unexpected_loss, params.max_unexpected_loss),
            severe_loss_events: match (row.severe_loss_count, params.max_severe_loss_events) {
                (Some(count), Some(max)) => Some(if count > max {
                    BreachStatus::Breached
                } else {
                    BreachStatus::WithinAppetite
                }),
                _ => None,
            },
        });

        // The exceedance flag was computed against the same limit upstream;
        // here it is only mapped to a status label.
        let status = match (row.kri, params.kri_limit) {
            (Some(_), Some(_)) => {
                if row.kri_exceeded {
                    KriStatus::AboveLimit
                } else {
                    KriStatus::WithinLimit
                }
            }
            _ => KriStatus::NotAvailable,
        };
        kri_status.push(KriStatusRecord { date: row.date, status });
    }

    (breaches, kri_status)
}
