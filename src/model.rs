use anyhow::{Result, bail};

/// Scaling + inference capability of the loaded artifacts. Concrete
/// implementations must be deterministic: same input, same output.
pub trait Predictor {
    fn transform(&self, raw: &[f64]) -> Result<Vec<f64>>;
    fn predict_proba(&self, scaled: &[f64]) -> Result<[f64; 2]>;
}

/// Per-feature attribution capability.
pub trait Attributor {
    fn explain(&self, scaled: &[f64]) -> Result<ShapOutput>;
}

/// Explainer libraries disagree on the return shape depending on the
/// classifier type: either one array with one baseline, or one array per
/// class. Both are accepted and resolved once via `positive_class`.
#[derive(Debug, Clone)]
pub enum ShapOutput {
    Single {
        values: Vec<f64>,
        baseline: f64,
    },
    PerClass {
        values: Vec<Vec<f64>>,
        baselines: Vec<f64>,
    },
}

impl ShapOutput {
    /// Attribution values and baseline for the positive ("injury") class.
    pub fn positive_class(self) -> Result<(Vec<f64>, f64)> {
        match self {
            ShapOutput::Single { values, baseline } => Ok((values, baseline)),
            ShapOutput::PerClass { mut values, baselines } => {
                if values.len() < 2 || baselines.len() < 2 {
                    bail!(
                        "per-class attribution is missing the positive class (got {} classes)",
                        values.len()
                    );
                }
                Ok((values.swap_remove(1), baselines[1]))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ZScoreScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl ZScoreScaler {
    pub fn new(means: Vec<f64>, stds: Vec<f64>) -> Self {
        Self { means, stds }
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }

    pub fn transform(&self, raw: &[f64]) -> Result<Vec<f64>> {
        if raw.len() != self.means.len() {
            bail!(
                "scaler expects {} features, got {}",
                self.means.len(),
                raw.len()
            );
        }
        Ok(raw
            .iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(x, (mean, std))| (x - mean) / std.max(1e-12))
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct LogisticModel {
    coeffs: Vec<f64>,
    intercept: f64,
}

impl LogisticModel {
    pub fn new(coeffs: Vec<f64>, intercept: f64) -> Self {
        Self { coeffs, intercept }
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// `[p_fit, p_injury]`; the positive class is index 1.
    pub fn predict_proba(&self, scaled: &[f64]) -> Result<[f64; 2]> {
        if scaled.len() != self.coeffs.len() {
            bail!(
                "model expects {} features, got {}",
                self.coeffs.len(),
                scaled.len()
            );
        }
        let z = self.intercept + dot(&self.coeffs, scaled);
        let p = sigmoid(z);
        Ok([1.0 - p, p])
    }
}

/// Exact attribution for the linear margin: each feature contributes
/// `coeff * scaled_value` around the intercept baseline. Returned in the
/// per-class shape, negative class mirrored, matching what the upstream
/// explainer produces for binary classifiers.
#[derive(Debug, Clone)]
pub struct LinearShap {
    coeffs: Vec<f64>,
    intercept: f64,
}

impl LinearShap {
    pub fn new(coeffs: Vec<f64>, intercept: f64) -> Self {
        Self { coeffs, intercept }
    }

    pub fn explain(&self, scaled: &[f64]) -> Result<ShapOutput> {
        if scaled.len() != self.coeffs.len() {
            bail!(
                "explainer expects {} features, got {}",
                self.coeffs.len(),
                scaled.len()
            );
        }
        let positive: Vec<f64> = self
            .coeffs
            .iter()
            .zip(scaled)
            .map(|(c, x)| c * x)
            .collect();
        let negative: Vec<f64> = positive.iter().map(|v| -v).collect();
        Ok(ShapOutput::PerClass {
            values: vec![negative, positive],
            baselines: vec![-self.intercept, self.intercept],
        })
    }
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
