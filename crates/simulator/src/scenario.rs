//! Scenario files: model parameters, ensemble settings, and a graph.
//!
//! ```toml
//! graph = "ring.json"
//!
//! [model]
//! population = 100
//! initial_infected = 3
//! infectiousness = 0.05
//! contact_reduction = 0.2
//! horizon = 100.0
//! sample_interval = 10.0
//!
//! [model.transitions]
//! exposed_to_carrier = 0.45
//! # ...
//!
//! [ensemble]
//! replicates = 20
//! seed = 7
//! ```
//!
//! The graph file is a JSON array holding one neighbour list per node. A
//! relative path is resolved against the scenario file's directory.

use crate::config::EnsembleConfig;
use crate::ensemble::Ensemble;
use crate::error::SimulatorError;
use episim_simulation::{Adjacency, SimulationError};
use episim_types::ModelParameters;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    graph: PathBuf,
    model: ModelParameters,
    #[serde(default)]
    ensemble: EnsembleConfig,
}

/// A loaded scenario with its graph parsed and validated.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub params: ModelParameters,
    pub ensemble: EnsembleConfig,
    /// Resolved location of the graph file.
    pub graph_path: PathBuf,
    pub adjacency: Arc<Adjacency>,
}

impl Scenario {
    /// Read a scenario file and the graph it names.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimulatorError> {
        let path = path.as_ref();
        let text = read(path)?;
        let file: ScenarioFile = toml::from_str(&text).map_err(|source| SimulatorError::Scenario {
            path: path.to_path_buf(),
            source,
        })?;

        let graph_path = match path.parent() {
            Some(dir) if file.graph.is_relative() => dir.join(&file.graph),
            _ => file.graph,
        };
        let adjacency = load_adjacency(&graph_path)?;
        debug!(
            scenario = %path.display(),
            graph = %graph_path.display(),
            nodes = adjacency.node_count(),
            edges = adjacency.edge_count(),
            "Loaded scenario"
        );

        Ok(Self {
            params: file.model,
            ensemble: file.ensemble,
            graph_path,
            adjacency: Arc::new(adjacency),
        })
    }

    /// Validate and build the ensemble this scenario describes.
    pub fn into_ensemble(self) -> Result<Ensemble, SimulatorError> {
        Ensemble::new(self.params, self.adjacency, self.ensemble)
    }
}

/// Read a JSON array of neighbour lists.
pub fn load_adjacency(path: impl AsRef<Path>) -> Result<Adjacency, SimulatorError> {
    let path = path.as_ref();
    let text = read(path)?;
    let lists: Vec<Vec<usize>> =
        serde_json::from_str(&text).map_err(|source| SimulatorError::Graph {
            path: path.to_path_buf(),
            source,
        })?;
    Adjacency::from_lists(lists).map_err(|e| SimulationError::from(e).into())
}

fn read(path: &Path) -> Result<String, SimulatorError> {
    fs::read_to_string(path).map_err(|source| SimulatorError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use episim_types::GraphError;
    use std::io::Write;
    use tempfile::TempDir;

    const SCENARIO: &str = r#"
graph = "path.json"

[model]
population = 4
initial_infected = 1
infectiousness = 0.5
contact_reduction = 0.2
horizon = 20.0
sample_interval = 5.0

[model.transitions]
exposed_to_carrier = 0.45
carrier_to_infected = 0.17
carrier_to_recovered = 0.06
infected_to_hospitalized = 0.1
infected_to_recovered = 0.15
hospitalized_to_icu = 0.12
hospitalized_to_recovered = 0.2
icu_to_dead = 0.12
icu_to_recovered = 0.2

[ensemble]
replicates = 3
seed = 42
"#;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_loads_scenario_with_relative_graph() {
        let dir = TempDir::new().unwrap();
        write(&dir, "path.json", "[[1], [0, 2], [1, 3], [2]]");
        let path = write(&dir, "scenario.toml", SCENARIO);

        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.params.population, 4);
        assert_eq!(scenario.ensemble, EnsembleConfig::new(3).with_seed(42));
        assert_eq!(scenario.graph_path, dir.path().join("path.json"));
        assert_eq!(scenario.adjacency.edge_count(), 3);

        let results = scenario.into_ensemble().unwrap().run().unwrap();
        assert_eq!(results.outcomes.len(), 3);
    }

    #[test]
    fn test_missing_ensemble_table_uses_defaults() {
        let dir = TempDir::new().unwrap();
        write(&dir, "path.json", "[[1], [0, 2], [1, 3], [2]]");
        let text = SCENARIO.split("[ensemble]").next().unwrap();
        let path = write(&dir, "scenario.toml", text);

        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.ensemble, EnsembleConfig::default());
    }

    #[test]
    fn test_reports_missing_graph_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "scenario.toml", SCENARIO);

        let err = Scenario::load(&path).unwrap_err();
        assert!(matches!(err, SimulatorError::Io { ref path, .. } if path.ends_with("path.json")));
    }

    #[test]
    fn test_reports_malformed_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "path.json", "{\"not\": \"a list\"}");
        let path = write(&dir, "scenario.toml", SCENARIO);
        assert!(matches!(
            Scenario::load(&path),
            Err(SimulatorError::Graph { .. })
        ));

        let path = write(&dir, "bad.toml", "graph = \"path.json\"\n[model]\npopulation = \"four\"");
        assert!(matches!(
            Scenario::load(&path),
            Err(SimulatorError::Scenario { .. })
        ));
    }

    #[test]
    fn test_rejects_asymmetric_graph() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "graph.json", "[[1], [], []]");

        assert!(matches!(
            load_adjacency(&path),
            Err(SimulatorError::Simulation(SimulationError::Graph(
                GraphError::AsymmetricEdge { .. }
            )))
        ));
    }

    #[test]
    fn test_graph_size_must_match_population() {
        let dir = TempDir::new().unwrap();
        write(&dir, "path.json", "[[1], [0]]");
        let path = write(&dir, "scenario.toml", SCENARIO);

        let err = Scenario::load(&path).unwrap().into_ensemble().err().unwrap();
        assert!(matches!(
            err,
            SimulatorError::Simulation(SimulationError::Graph(GraphError::SizeMismatch {
                expected: 4,
                actual: 2
            }))
        ));
    }
}
