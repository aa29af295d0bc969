//! Alert / Recommendation Engine
//!
//! Deterministic rule layer translating per-unit risk probabilities into
//! tiered output records. Thresholds are strict at both boundaries:
//!
//! - p > critical (0.7): one critical Alert + one High Recommendation
//! - medium (0.5) < p <= critical: one Medium Recommendation, no Alert
//! - p <= medium: nothing (p exactly at the medium bound produces nothing)
//!
//! Only the latest feature row per unit feeds the rules; no windowing or
//! smoothing beyond what the feature builder already encodes. The engine
//! never fails on a malformed row — its single failure mode is the
//! systemic one of a unit without a score.

use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::debug;

use crate::config::ScanConfig;
use crate::types::{Alert, FeatureRow, Priority, Recommendation};

/// Alert engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no probability score for equipment {equipment_id} in the latest-row set")]
    MissingScore { equipment_id: u32 },
}

/// Stateless rule layer
pub struct AlertEngine;

impl AlertEngine {
    /// Latest feature row per unit (maximum date per equipment id; source
    /// order breaks date ties). Returned in ascending id order so output
    /// collections are deterministic.
    pub fn latest_per_unit(rows: &[FeatureRow]) -> Vec<&FeatureRow> {
        let mut latest: BTreeMap<u32, &FeatureRow> = BTreeMap::new();
        for row in rows {
            latest
                .entry(row.equipment_id)
                .and_modify(|current| {
                    if row.date >= current.date {
                        *current = row;
                    }
                })
                .or_insert(row);
        }
        latest.into_values().collect()
    }

    /// Apply the threshold rules to every latest row.
    ///
    /// Every unit present in `latest` must have a score; a missing one
    /// aborts with `EngineError::MissingScore` rather than silently
    /// dropping the unit.
    pub fn generate(
        latest: &[&FeatureRow],
        scores: &HashMap<u32, f64>,
        config: &ScanConfig,
    ) -> Result<(Vec<Alert>, Vec<Recommendation>), EngineError> {
        let mut alerts = Vec::new();
        let mut recommendations = Vec::new();

        for row in latest {
            let probability = *scores.get(&row.equipment_id).ok_or(
                EngineError::MissingScore {
                    equipment_id: row.equipment_id,
                },
            )?;

            if probability > config.critical_threshold {
                alerts.push(Self::critical_alert(row, probability));
                recommendations.push(Self::high_recommendation(row));
            } else if probability > config.medium_threshold {
                recommendations.push(Self::medium_recommendation(row));
            }
        }

        debug!(
            units = latest.len(),
            alerts = alerts.len(),
            recommendations = recommendations.len(),
            "rule layer applied"
        );
        Ok((alerts, recommendations))
    }

    /// Probability formatted to the nearest whole percent
    fn format_pct(probability: f64) -> String {
        format!("{:.0}%", probability * 100.0)
    }

    fn critical_alert(row: &FeatureRow, probability: f64) -> Alert {
        let pct = Self::format_pct(probability);
        Alert {
            equipment_id: row.equipment_id,
            equipment_name: row.equipment_name.clone(),
            probability,
            probability_pct: pct.clone(),
            messages: vec![
                format!("Critical failure probability ({pct})"),
                format!(
                    "Expected symptom: {}",
                    row.observed_symptom.as_deref().unwrap_or("Unknown")
                ),
            ],
        }
    }

    fn high_recommendation(row: &FeatureRow) -> Recommendation {
        Recommendation {
            equipment_id: row.equipment_id,
            equipment_name: row.equipment_name.clone(),
            actions: vec![
                "Perform immediate inspection within the next 24 hours".to_string(),
                format!("Check {}", row.replaced_parts),
                format!(
                    "Monitor {}",
                    row.failure_cause.as_deref().unwrap_or("N/A")
                ),
            ],
            priority: Priority::High,
        }
    }

    fn medium_recommendation(row: &FeatureRow) -> Recommendation {
        Recommendation {
            equipment_id: row.equipment_id,
            equipment_name: row.equipment_name.clone(),
            actions: vec![
                "Schedule preventive maintenance within the next 72 hours".to_string(),
                format!("Check vibration trend: {:.1} mm/s", row.vibration_mm_s),
            ],
            priority: Priority::Medium,
        }
    }
}
