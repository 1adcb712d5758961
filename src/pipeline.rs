use std::collections::HashMap;

use anyhow::anyhow;
use thiserror::Error;

use crate::inputs::AuxiliaryAttributes;
use crate::model::{Attributor, Predictor};
use crate::recommend::{Recommendation, build_recommendations};

pub const RISK_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLabel {
    Low,
    High,
}

impl RiskLabel {
    /// Strictly greater than the threshold; exactly 0.5 stays Low.
    pub fn from_probability(probability: f64) -> Self {
        if probability > RISK_THRESHOLD {
            RiskLabel::High
        } else {
            RiskLabel::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLabel::Low => "Low",
            RiskLabel::High => "High",
        }
    }
}

/// Raw player attributes in schema order: exactly the expected feature
/// keys, no more, no fewer.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

impl FeatureVector {
    /// Select the collected values strictly into schema order. Extra keys
    /// are dropped; any absent feature fails the cycle.
    pub fn from_raw(schema: &[String], raw: &HashMap<String, f64>) -> Result<Self, PipelineError> {
        let missing: Vec<String> = schema
            .iter()
            .filter(|name| !raw.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::SchemaMismatch { missing });
        }
        Ok(Self {
            names: schema.to_vec(),
            values: schema.iter().map(|name| raw[name]).collect(),
        })
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input is missing expected features: {}", .missing.join(", "))]
    SchemaMismatch { missing: Vec<String> },
    #[error("prediction failed: {0}")]
    Inference(#[from] anyhow::Error),
}

/// Everything one prediction cycle produces. Immutable after creation;
/// the renderer reads it, nothing rewrites it.
#[derive(Debug, Clone)]
pub struct RiskReport {
    pub probability: f64,
    pub risk: RiskLabel,
    pub attributions: Vec<(String, f64)>,
    pub baseline: f64,
    pub features: FeatureVector,
    pub scaled: Vec<f64>,
    pub recommendations: Vec<Recommendation>,
}

/// One full prediction cycle: schema reorder, scale, infer, threshold,
/// attribute, recommend. Pure beyond the collaborator calls; any failure
/// abandons the cycle with nothing partially surfaced.
pub fn run_prediction<P, A>(
    schema: &[String],
    raw: &HashMap<String, f64>,
    aux: &AuxiliaryAttributes,
    predictor: &P,
    attributor: &A,
) -> Result<RiskReport, PipelineError>
where
    P: Predictor + ?Sized,
    A: Attributor + ?Sized,
{
    let features = FeatureVector::from_raw(schema, raw)?;

    let scaled = predictor.transform(&features.values)?;
    let [_, probability] = predictor.predict_proba(&scaled)?;
    let risk = RiskLabel::from_probability(probability);

    let (values, baseline) = attributor.explain(&scaled)?.positive_class()?;
    if values.len() != schema.len() {
        return Err(PipelineError::Inference(anyhow!(
            "explainer returned {} attribution values for {} features",
            values.len(),
            schema.len()
        )));
    }
    let attributions: Vec<(String, f64)> = schema.iter().cloned().zip(values).collect();

    let recommendations = build_recommendations(&features, aux, probability);

    Ok(RiskReport {
        probability,
        risk,
        attributions,
        baseline,
        features,
        scaled,
        recommendations,
    })
}
