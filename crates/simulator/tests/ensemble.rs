//! Scenario file to CSV, end to end.

use episim_simulator::output::{csv_header, write_csv};
use episim_simulator::{EnsembleReport, Scenario};
use std::fs;
use tempfile::TempDir;

/// Ring of `n` nodes as JSON neighbour lists.
fn ring_json(n: usize) -> String {
    let lists: Vec<Vec<usize>> = (0..n)
        .map(|i| vec![(i + n - 1) % n, (i + 1) % n])
        .collect();
    serde_json::to_string(&lists).unwrap()
}

fn scenario(dir: &TempDir, replicates: usize, extra_model: &str) -> std::path::PathBuf {
    fs::write(dir.path().join("ring.json"), ring_json(30)).unwrap();
    let text = format!(
        r#"
graph = "ring.json"

[model]
population = 30
initial_infected = 2
infectiousness = 0.6
contact_reduction = 0.5
horizon = 40.0
sample_interval = 4.0
{extra_model}

[model.transitions]
exposed_to_carrier = 0.5
carrier_to_infected = 0.3
carrier_to_recovered = 0.1
infected_to_hospitalized = 0.1
infected_to_recovered = 0.3
hospitalized_to_icu = 0.1
hospitalized_to_recovered = 0.3
icu_to_dead = 0.2
icu_to_recovered = 0.3

[ensemble]
replicates = {replicates}
seed = 2024
"#
    );
    let path = dir.path().join("scenario.toml");
    fs::write(&path, text).unwrap();
    path
}

fn run_to_csv(path: &std::path::Path) -> String {
    let results = Scenario::load(path)
        .unwrap()
        .into_ensemble()
        .unwrap()
        .run()
        .unwrap();
    assert!(results.is_complete());

    let mut buffer = Vec::new();
    write_csv(&mut buffer, &results.outcomes).unwrap();
    String::from_utf8(buffer).unwrap()
}

#[test]
fn test_scenario_to_csv() {
    let dir = TempDir::new().unwrap();
    let path = scenario(&dir, 5, "");
    let csv = run_to_csv(&path);

    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some(csv_header().as_str()));

    let rows: Vec<Vec<f64>> = lines
        .map(|line| line.split(',').map(|v| v.parse().unwrap()).collect())
        .collect();
    // 5 replicates, 11 rows each.
    assert_eq!(rows.len(), 55);
    for row in &rows {
        assert_eq!(row.len(), 10);
        let total: f64 = row[2..].iter().sum();
        assert_eq!(total, 30.0);
    }
    for (replicate, chunk) in rows.chunks(11).enumerate() {
        assert!(chunk.iter().all(|row| row[0] == replicate as f64));
        assert_eq!(chunk[0][1], 0.0);
        assert_eq!(chunk[10][1], 40.0);
        // Two seeded carriers at t=0.
        assert_eq!(chunk[0][2], 28.0);
        assert_eq!(chunk[0][4], 2.0);
    }
}

#[test]
fn test_same_scenario_same_output() {
    let dir = TempDir::new().unwrap();
    let path = scenario(&dir, 4, "");
    assert_eq!(run_to_csv(&path), run_to_csv(&path));
}

#[test]
fn test_intervention_and_seed_compartment_from_file() {
    let dir = TempDir::new().unwrap();
    let path = scenario(
        &dir,
        3,
        "seed_compartment = \"exposed\"\nintervention = { time = 10.0, intensity = 0.0 }",
    );
    let loaded = Scenario::load(&path).unwrap();
    assert_eq!(loaded.params.intervention.map(|i| i.time), Some(10.0));

    let results = loaded.into_ensemble().unwrap().run().unwrap();
    for outcome in &results.outcomes {
        let rows = outcome.outcome.time_series.rows();
        assert_eq!(rows[0].counts.as_array()[1], 2);

        // Nobody is newly exposed once infectiousness drops to zero.
        let susceptible: Vec<u64> = rows
            .iter()
            .filter(|r| r.time >= 10.0)
            .map(|r| r.counts.as_array()[0])
            .collect();
        assert!(susceptible.windows(2).all(|w| w[0] == w[1]));
    }

    let report = EnsembleReport::from_results(&results).unwrap();
    assert_eq!(report.succeeded, 3);
    assert!(report.final_size_p50 >= 2);
}
