//! Prediction artifacts: the three estimators trained off-line, loaded
//! once at startup and shared read-only for the process lifetime.
//!
//! Each artifact file bundles the fitted estimator with the feature
//! schema it was trained on (column order, and the category vocabulary
//! for every non-numeric column), so a request frame can be encoded into
//! exactly the matrix the estimator expects.

use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::DecisionTreeClassifier;
use thiserror::Error;

pub const STAY_MODEL_FILE: &str = "model_stay.json";
pub const BLOCK_MODEL_FILE: &str = "model_block.json";
pub const DEMAND_MODEL_FILE: &str = "model_demand.json";

pub type RegressionEstimator = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;
pub type ClassificationEstimator = DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum PredictError {
    #[error(transparent)]
    Frame(#[from] PolarsError),

    #[error("feature column {0:?} missing from input")]
    MissingColumn(String),

    #[error("feature column {0:?} holds no value")]
    EmptyColumn(String),

    #[error("feature column {column:?} has unsupported type {dtype}")]
    UnsupportedType { column: String, dtype: String },

    #[error("unknown category {value:?} for column {column:?}")]
    UnknownCategory { column: String, value: String },

    #[error("inference failed: {0}")]
    Inference(String),
}

/// One feature column as the estimator was fitted on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnSpec {
    Numeric { name: String },
    Categorical { name: String, categories: Vec<String> },
}

impl ColumnSpec {
    pub fn name(&self) -> &str {
        match self {
            ColumnSpec::Numeric { name } => name,
            ColumnSpec::Categorical { name, .. } => name,
        }
    }
}

/// Ordered column set of a fitted estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<ColumnSpec>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// Encode the single row of `df` into the 1xN matrix the estimator
    /// consumes, in stored column order. Categorical values become their
    /// index in the stored vocabulary; a value the vocabulary does not
    /// contain fails the row, the estimator was never fitted on it.
    pub fn encode(&self, df: &DataFrame) -> Result<DenseMatrix<f64>, PredictError> {
        let mut row = Vec::with_capacity(self.columns.len());
        for spec in &self.columns {
            let series = df
                .column(spec.name())
                .map_err(|_| PredictError::MissingColumn(spec.name().to_string()))?;
            let value = match spec {
                ColumnSpec::Numeric { name } => numeric_value(name, series)?,
                ColumnSpec::Categorical { name, categories } => {
                    let value = series
                        .utf8()
                        .map_err(|_| PredictError::UnsupportedType {
                            column: name.clone(),
                            dtype: series.dtype().to_string(),
                        })?
                        .get(0)
                        .ok_or_else(|| PredictError::EmptyColumn(name.clone()))?;
                    categories
                        .iter()
                        .position(|c| c == value)
                        .ok_or_else(|| PredictError::UnknownCategory {
                            column: name.clone(),
                            value: value.to_string(),
                        })? as f64
                }
            };
            row.push(value);
        }
        Ok(DenseMatrix::new(1, row.len(), row, false))
    }
}

fn numeric_value(name: &str, series: &Series) -> Result<f64, PredictError> {
    let value = match series.dtype() {
        DataType::Float64 => series.f64()?.get(0),
        DataType::Int64 => series.i64()?.get(0).map(|v| v as f64),
        DataType::Int32 => series.i32()?.get(0).map(|v| v as f64),
        other => {
            return Err(PredictError::UnsupportedType {
                column: name.to_string(),
                dtype: other.to_string(),
            })
        }
    };
    value.ok_or_else(|| PredictError::EmptyColumn(name.to_string()))
}

/// A fitted regressor plus its feature schema.
#[derive(Serialize, Deserialize)]
pub struct RegressionArtifact {
    pub schema: FeatureSchema,
    pub estimator: RegressionEstimator,
}

impl RegressionArtifact {
    pub fn predict(&self, df: &DataFrame) -> Result<f64, PredictError> {
        let x = self.schema.encode(df)?;
        let y = self
            .estimator
            .predict(&x)
            .map_err(|e| PredictError::Inference(e.to_string()))?;
        y.first()
            .copied()
            .ok_or_else(|| PredictError::Inference("estimator returned no rows".to_string()))
    }
}

/// A fitted classifier plus its feature schema.
#[derive(Serialize, Deserialize)]
pub struct ClassificationArtifact {
    pub schema: FeatureSchema,
    pub estimator: ClassificationEstimator,
}

impl ClassificationArtifact {
    pub fn predict(&self, df: &DataFrame) -> Result<i32, PredictError> {
        let x = self.schema.encode(df)?;
        let y = self
            .estimator
            .predict(&x)
            .map_err(|e| PredictError::Inference(e.to_string()))?;
        y.first()
            .copied()
            .ok_or_else(|| PredictError::Inference("estimator returned no rows".to_string()))
    }
}

/// The three artifacts the service needs. All or nothing: either every
/// file loads or the service runs in the unavailable state.
pub struct ModelRegistry {
    pub stay: RegressionArtifact,
    pub block: ClassificationArtifact,
    pub demand: RegressionArtifact,
}

impl ModelRegistry {
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        Ok(Self {
            stay: load_artifact(&dir.join(STAY_MODEL_FILE))?,
            block: load_artifact(&dir.join(BLOCK_MODEL_FILE))?,
            demand: load_artifact(&dir.join(DEMAND_MODEL_FILE))?,
        })
    }
}

/// Loaded-or-not status of the registry, decided once at startup.
pub enum ModelState {
    Ready(ModelRegistry),
    Unavailable,
}

impl ModelState {
    /// Load the registry from `dir`. A missing or undecodable file leaves
    /// the service up but answering every prediction with an unavailable
    /// error; it never aborts startup.
    pub fn load(dir: &Path) -> Self {
        match ModelRegistry::load(dir) {
            Ok(registry) => {
                tracing::info!(dir = %dir.display(), "prediction models loaded");
                ModelState::Ready(registry)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load prediction models, predictions disabled");
                ModelState::Unavailable
            }
        }
    }
}

fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(file).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
