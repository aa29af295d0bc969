//! Pipeline Regression Tests
//!
//! End-to-end scans over in-memory datasets: a hand-built scenario with one
//! failing unit, and a seeded synthetic fleet with a planted stoppage
//! streak. Locks in the ranking, coverage, and determinism properties of
//! `run_scan` without touching disk.

use chrono::NaiveDate;
use std::collections::HashMap;

use vigil_pdm::dataset::Dataset;
use vigil_pdm::engine::AlertEngine;
use vigil_pdm::features::FeatureBuilder;
use vigil_pdm::model::{Imputer, RandomForest, RiskClassifier};
use vigil_pdm::sim::{self, FleetSimConfig};
use vigil_pdm::types::{OccurrenceRecord, OperationalReading, Priority};
use vigil_pdm::{run_scan, ScanConfig};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).expect("valid date")
}

fn reading(id: u32, day: u32, vibration: f64) -> OperationalReading {
    OperationalReading {
        equipment_id: id,
        equipment_name: format!("Unit {id}"),
        date: date(day),
        temperature_c: 95.0 + f64::from(day) * 0.1,
        pressure_bar: 12.0,
        vibration_mm_s: vibration,
        operating_hours: 20,
        energy_kwh: 400,
    }
}

fn stoppage(id: u32, day: u32) -> OccurrenceRecord {
    OccurrenceRecord {
        equipment_id: id,
        equipment_name: format!("Unit {id}"),
        date: date(day),
        part: "Bearing".to_string(),
        observed_symptom: "Stopped working".to_string(),
        failure_class: 1,
    }
}

/// Three units over ten days. Units 1 and 2 stay in a healthy vibration
/// band; unit 3 drifts to 2.9 mm/s and stops working on its final five
/// days.
fn scenario_dataset() -> Dataset {
    let mut operational = Vec::new();
    let mut occurrences = Vec::new();
    for day in 1..=10 {
        operational.push(reading(1, day, 1.2 + f64::from(day) * 0.01));
        operational.push(reading(2, day, 1.4 + f64::from(day) * 0.01));
        let failing_vibration = if day >= 6 { 2.9 } else { 1.3 };
        operational.push(reading(3, day, failing_vibration));
        if day >= 6 {
            occurrences.push(stoppage(3, day));
        }
    }
    Dataset {
        operational,
        occurrences,
        ..Default::default()
    }
}

#[test]
fn failing_unit_scores_strictly_highest() {
    let dataset = scenario_dataset();
    let config = ScanConfig::default();

    let rows = FeatureBuilder::build(&dataset).expect("features");
    let imputer = Imputer::fit(&rows);
    let (x, y) = imputer.matrix(&rows);

    let mut model = RandomForest::new(config.n_trees, config.max_depth)
        .with_seed(config.seed)
        .with_sample_ratio(config.sample_ratio);
    model.fit(&x, &y).expect("fit");

    let latest = AlertEngine::latest_per_unit(&rows);
    let scores: HashMap<u32, f64> = latest
        .iter()
        .map(|row| {
            let p = model.predict_proba(&imputer.vector(row)).expect("score");
            (row.equipment_id, p)
        })
        .collect();

    assert_eq!(scores.len(), 3);
    assert!(scores[&3] > scores[&1], "failing unit must outrank unit 1");
    assert!(scores[&3] > scores[&2], "failing unit must outrank unit 2");
    assert!(
        scores[&3] > 0.5,
        "failing unit must clear the medium bound, got {}",
        scores[&3]
    );
}

#[test]
fn scan_flags_only_the_failing_unit() {
    let report = run_scan(&scenario_dataset(), &ScanConfig::default()).expect("scan");

    assert_eq!(report.units_scored, 3);
    for alert in &report.alerts {
        assert_eq!(alert.equipment_id, 3);
    }
    for rec in &report.recommendations {
        assert_eq!(rec.equipment_id, 3);
    }
    // The failing unit must reach at least the medium tier.
    assert!(
        !report.recommendations.is_empty(),
        "failing unit produced no recommendation"
    );
    let rec = &report.recommendations[0];
    assert!(matches!(rec.priority, Priority::Medium | Priority::High));
}

#[test]
fn high_priority_carries_the_inspection_action() {
    let report = run_scan(&scenario_dataset(), &ScanConfig::default()).expect("scan");
    for rec in &report.recommendations {
        match rec.priority {
            Priority::High => assert_eq!(
                rec.actions[0],
                "Perform immediate inspection within the next 24 hours"
            ),
            Priority::Medium => assert_eq!(
                rec.actions[0],
                "Schedule preventive maintenance within the next 72 hours"
            ),
        }
    }
}

#[test]
fn repeated_scans_reproduce_identical_reports() {
    let dataset = scenario_dataset();
    let config = ScanConfig::default();
    let a = run_scan(&dataset, &config).expect("scan a");
    let b = run_scan(&dataset, &config).expect("scan b");
    assert_eq!(
        serde_json::to_string(&a).expect("serialize"),
        serde_json::to_string(&b).expect("serialize"),
    );
}

#[test]
fn synthetic_fleet_scan_covers_every_observed_unit() {
    let sim_config = FleetSimConfig {
        units: 8,
        reading_days: 120,
        event_days: 180,
        seed: 42,
        ..Default::default()
    };
    let mut dataset = sim::generate(&sim_config);
    sim::plant_stoppage_streak(&mut dataset, 1, 5, sim_config.seed);

    let report = run_scan(&dataset, &ScanConfig::default()).expect("scan");

    let mut observed: Vec<u32> = dataset
        .operational
        .iter()
        .map(|r| r.equipment_id)
        .collect();
    observed.sort_unstable();
    observed.dedup();
    assert_eq!(report.units_scored, observed.len());

    // 120 rows leaves a 24-row held-out split.
    let eval = report.evaluation.expect("evaluation present");
    assert_eq!(eval.n_samples, 24);
    assert!((0.0..=1.0).contains(&eval.accuracy));
}

#[test]
fn evaluation_absent_for_tiny_datasets() {
    // 4 rows * 0.2 floors to 0 test rows.
    let mut dataset = scenario_dataset();
    dataset.operational.truncate(4);
    dataset.occurrences.clear();
    let report = run_scan(&dataset, &ScanConfig::default()).expect("scan");
    assert!(report.evaluation.is_none());
}
