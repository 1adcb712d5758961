use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::model::{Attributor, LinearShap, LogisticModel, Predictor, ShapOutput, ZScoreScaler};

const DEFAULT_SCALER_PATH: &str = "assets/injury_scaler.json";
const DEFAULT_MODEL_PATH: &str = "assets/injury_model.json";

const SCALER_ENV: &str = "INJURY_SCALER_PATH";
const MODEL_ENV: &str = "INJURY_MODEL_PATH";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub version: u32,
    pub feature_names: Vec<String>,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: u32,
    pub generated_at: String,
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub coeffs: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub train_log_loss: f64,
    #[serde(default)]
    pub val_log_loss: f64,
    #[serde(default)]
    pub train_samples: usize,
    #[serde(default)]
    pub val_samples: usize,
}

/// The loaded scaler, classifier and explainer, plus the feature schema the
/// scaler was fitted on. Built once at startup and never torn down.
#[derive(Debug, Clone)]
pub struct Resources {
    feature_names: Vec<String>,
    scaler: ZScoreScaler,
    model: LogisticModel,
    explainer: LinearShap,
}

impl Resources {
    pub fn from_artifacts(scaler: ScalerArtifact, model: ModelArtifact) -> Result<Self> {
        if scaler.feature_names.is_empty() {
            bail!("scaler artifact declares no features");
        }
        if scaler.means.len() != scaler.feature_names.len()
            || scaler.stds.len() != scaler.feature_names.len()
        {
            bail!(
                "scaler artifact is inconsistent: {} names, {} means, {} stds",
                scaler.feature_names.len(),
                scaler.means.len(),
                scaler.stds.len()
            );
        }
        if scaler.stds.iter().any(|s| *s <= 0.0 || !s.is_finite()) {
            bail!("scaler artifact has non-positive feature stds");
        }
        if model.coeffs.len() != scaler.feature_names.len() {
            bail!(
                "model expects {} features but scaler provides {}",
                model.coeffs.len(),
                scaler.feature_names.len()
            );
        }
        if !model.feature_names.is_empty() && model.feature_names != scaler.feature_names {
            bail!("model and scaler artifacts disagree on feature names");
        }

        let explainer = LinearShap::new(model.coeffs.clone(), model.intercept);
        Ok(Self {
            feature_names: scaler.feature_names.clone(),
            scaler: ZScoreScaler::new(scaler.means, scaler.stds),
            model: LogisticModel::new(model.coeffs, model.intercept),
            explainer,
        })
    }

    /// Ordered feature schema the model expects, sourced from the scaler.
    pub fn expected_features(&self) -> &[String] {
        &self.feature_names
    }
}

impl Predictor for Resources {
    fn transform(&self, raw: &[f64]) -> Result<Vec<f64>> {
        self.scaler.transform(raw)
    }

    fn predict_proba(&self, scaled: &[f64]) -> Result<[f64; 2]> {
        self.model.predict_proba(scaled)
    }
}

impl Attributor for Resources {
    fn explain(&self, scaled: &[f64]) -> Result<ShapOutput> {
        self.explainer.explain(scaled)
    }
}

/// Load both artifacts from their fixed paths (env-overridable). Failure
/// here is the one unrecoverable error path: callers halt startup.
pub fn load_resources() -> Result<Resources> {
    let scaler_path = artifact_path(SCALER_ENV, DEFAULT_SCALER_PATH);
    let model_path = artifact_path(MODEL_ENV, DEFAULT_MODEL_PATH);

    let scaler = read_artifact::<ScalerArtifact>(&scaler_path, "scaler")?;
    let model = read_artifact::<ModelArtifact>(&model_path, "model")?;
    Resources::from_artifacts(scaler, model)
}

/// Process-lifetime cache of the loaded resources.
pub fn resources() -> Result<&'static Resources> {
    static RESOURCES: OnceCell<Resources> = OnceCell::new();
    RESOURCES.get_or_try_init(load_resources)
}

fn artifact_path(env_key: &str, default: &str) -> PathBuf {
    match env::var(env_key) {
        Ok(raw) if !raw.trim().is_empty() => PathBuf::from(raw.trim()),
        _ => PathBuf::from(default),
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(path: &PathBuf, kind: &str) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read {kind} artifact {}", path.display()))?;
    serde_json::from_str::<T>(&raw)
        .with_context(|| format!("parse {kind} artifact {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaler_artifact() -> ScalerArtifact {
        ScalerArtifact {
            version: 1,
            feature_names: vec!["age".into(), "bmi".into()],
            means: vec![25.0, 23.0],
            stds: vec![4.0, 2.0],
        }
    }

    fn model_artifact(coeffs: Vec<f64>) -> ModelArtifact {
        ModelArtifact {
            version: 1,
            generated_at: "t".into(),
            feature_names: Vec::new(),
            coeffs,
            intercept: -1.0,
            train_log_loss: 0.0,
            val_log_loss: 0.0,
            train_samples: 0,
            val_samples: 0,
        }
    }

    #[test]
    fn schema_comes_from_the_scaler() {
        let res =
            Resources::from_artifacts(scaler_artifact(), model_artifact(vec![0.5, 0.3])).unwrap();
        assert_eq!(res.expected_features(), ["age", "bmi"]);
    }

    #[test]
    fn rejects_feature_count_mismatch() {
        assert!(Resources::from_artifacts(scaler_artifact(), model_artifact(vec![0.5])).is_err());
    }

    #[test]
    fn rejects_disagreeing_feature_names() {
        let mut model = model_artifact(vec![0.5, 0.3]);
        model.feature_names = vec!["bmi".into(), "age".into()];
        assert!(Resources::from_artifacts(scaler_artifact(), model).is_err());
    }

    #[test]
    fn rejects_zero_std() {
        let mut scaler = scaler_artifact();
        scaler.stds[1] = 0.0;
        assert!(Resources::from_artifacts(scaler, model_artifact(vec![0.5, 0.3])).is_err());
    }
}
