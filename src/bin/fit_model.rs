use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use rand::Rng;

use injury_terminal::artifacts::{ModelArtifact, ScalerArtifact};
use injury_terminal::model::sigmoid;

const FEATURE_NAMES: [&str; 5] = [
    "age",
    "bmi",
    "fifa_rating",
    "total_minutes_played",
    "high_intensity_distance",
];
const FEATURE_COUNT: usize = 5;

const SAMPLES: usize = 4000;
const TRAIN_SPLIT: f64 = 0.85;
const MIN_TRAIN_SAMPLES: usize = 250;
const L2_REG: f64 = 0.02;
const MAX_ITERS: usize = 2200;
const LR_START: f64 = 0.10;
const IMPROVEMENT_EPS: f64 = 1e-4;

#[derive(Debug, Clone, Copy)]
struct TrainSample {
    x: [f64; FEATURE_COUNT],
    injured: bool,
}

fn main() -> Result<()> {
    let out_dir = parse_out_dir_arg().unwrap_or_else(|| PathBuf::from("assets"));
    let force = has_flag("--force");

    let mut rng = rand::thread_rng();
    let mut samples = synth_samples(SAMPLES, &mut rng);
    if samples.len() < MIN_TRAIN_SAMPLES {
        return Err(anyhow!(
            "insufficient training samples: {} (need at least {})",
            samples.len(),
            MIN_TRAIN_SAMPLES
        ));
    }

    let split_idx = split_train_index(samples.len());
    let (feature_means, feature_stds) = feature_norm_stats(&samples[..split_idx]);
    for sample in &mut samples {
        for i in 0..FEATURE_COUNT {
            sample.x[i] = standardized(sample.x[i], feature_means[i], feature_stds[i]);
        }
    }
    let (train, val) = samples.split_at(split_idx);

    let base_rate = train.iter().filter(|s| s.injured).count() as f64 / train.len() as f64;
    let base_intercept = (base_rate.clamp(1e-6, 1.0 - 1e-6)
        / (1.0 - base_rate.clamp(1e-6, 1.0 - 1e-6)))
    .ln();
    let baseline_val = log_loss(&[0.0; FEATURE_COUNT], base_intercept, val);

    let (coeffs, intercept) = fit_coeffs(train, val, base_intercept, L2_REG);
    let fit_train = log_loss(&coeffs, intercept, train);
    let fit_val = log_loss(&coeffs, intercept, val);

    println!(
        "injury model fit train={} val={} base_rate={:.3} l2={:.3}",
        train.len(),
        val.len(),
        base_rate,
        L2_REG
    );
    println!(
        "val log_loss baseline={:.6} fit={:.6} delta={:+.6}",
        baseline_val,
        fit_val,
        baseline_val - fit_val
    );
    println!();
    println!("Feature coefficients (z = intercept + sum(coeff_i * std_feature_i)):");
    println!("  {:28} {:+.4}", "intercept", intercept);
    for (idx, name) in FEATURE_NAMES.iter().enumerate() {
        println!(
            "  {:28} coeff={:+.4} mean={:+.4} std={:.4}",
            name, coeffs[idx], feature_means[idx], feature_stds[idx]
        );
    }

    if !(fit_val + IMPROVEMENT_EPS < baseline_val) && !force {
        return Err(anyhow!(
            "validation log-loss did not improve (pass --force to still write artifacts)"
        ));
    }

    let scaler = ScalerArtifact {
        version: 1,
        feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        means: feature_means.to_vec(),
        stds: feature_stds.to_vec(),
    };
    let model = ModelArtifact {
        version: 1,
        generated_at: chrono::Utc::now().to_rfc3339(),
        feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        coeffs: coeffs.to_vec(),
        intercept,
        train_log_loss: fit_train,
        val_log_loss: fit_val,
        train_samples: train.len(),
        val_samples: val.len(),
    };

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("create output directory {}", out_dir.display()))?;
    write_artifact(&out_dir.join("injury_scaler.json"), &scaler)?;
    write_artifact(&out_dir.join("injury_model.json"), &model)?;
    println!();
    println!("artifacts written under: {}", out_dir.display());
    Ok(())
}

fn parse_out_dir_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix("--out-dir=") {
            if !v.trim().is_empty() {
                return Some(PathBuf::from(v));
            }
        }
        if arg == "--out-dir"
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}

fn has_flag(flag: &str) -> bool {
    std::env::args().skip(1).any(|a| a == flag)
}

fn write_artifact<T: serde::Serialize>(path: &PathBuf, artifact: &T) -> Result<()> {
    let raw = serde_json::to_string_pretty(artifact).context("serialize artifact")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    println!("artifact written: {}", path.display());
    Ok(())
}

/// Synthetic season profiles with a known latent risk surface: older,
/// heavier, lower-rated and harder-worked players get injured more often.
fn synth_samples(n: usize, rng: &mut impl Rng) -> Vec<TrainSample> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let age = rng.gen_range(16.0..=40.0);
        let bmi = 18.0 + 4.0 * (rng.r#gen::<f64>() + rng.r#gen::<f64>());
        let fifa_rating = rng.gen_range(45.0..=95.0);
        let minutes = rng.gen_range(0.0..=4500.0);
        let high_intensity = 40.0 + 140.0 * rng.r#gen::<f64>();

        let noise = 1.2 * (rng.r#gen::<f64>() + rng.r#gen::<f64>() - 1.0);
        let z = -1.2
            + 0.09 * (age - 27.0)
            + 0.16 * (bmi - 23.0)
            - 0.020 * (fifa_rating - 75.0)
            + 0.00085 * (minutes - 1800.0)
            + 0.008 * (high_intensity - 110.0)
            + noise;
        let injured = rng.r#gen::<f64>() < sigmoid(z);

        out.push(TrainSample {
            x: [age, bmi, fifa_rating, minutes, high_intensity],
            injured,
        });
    }
    out
}

fn split_train_index(n: usize) -> usize {
    let mut idx = ((n as f64) * TRAIN_SPLIT).round() as usize;
    idx = idx.clamp(64, n.saturating_sub(1));
    idx
}

fn feature_norm_stats(samples: &[TrainSample]) -> ([f64; FEATURE_COUNT], [f64; FEATURE_COUNT]) {
    let mut mean = [0.0; FEATURE_COUNT];
    let mut var = [0.0; FEATURE_COUNT];
    let n = samples.len().max(1) as f64;

    for sample in samples {
        for i in 0..FEATURE_COUNT {
            mean[i] += sample.x[i];
        }
    }
    for v in &mut mean {
        *v /= n;
    }

    for sample in samples {
        for i in 0..FEATURE_COUNT {
            let d = sample.x[i] - mean[i];
            var[i] += d * d;
        }
    }
    for v in &mut var {
        *v = (*v / n).sqrt().max(1e-6);
    }

    (mean, var)
}

fn standardized(x: f64, mean: f64, std: f64) -> f64 {
    (x - mean) / std.max(1e-6)
}

fn fit_coeffs(
    train: &[TrainSample],
    val: &[TrainSample],
    base_intercept: f64,
    l2: f64,
) -> ([f64; FEATURE_COUNT], f64) {
    let mut coeffs = [0.0; FEATURE_COUNT];
    let mut intercept = base_intercept;
    let mut best = (coeffs, intercept);
    let mut best_val = log_loss(&coeffs, intercept, val);
    let mut no_improve = 0usize;

    for iter in 0..MAX_ITERS {
        let mut grad = [0.0; FEATURE_COUNT];
        let mut grad_intercept = 0.0;

        for sample in train {
            let z = intercept + dot(coeffs, sample.x);
            let p = sigmoid(z);
            let dz = p - if sample.injured { 1.0 } else { 0.0 };
            grad_intercept += dz;
            for j in 0..FEATURE_COUNT {
                grad[j] += dz * sample.x[j];
            }
        }

        let n = train.len() as f64;
        let lr = LR_START / (1.0 + (iter as f64 * 0.003));
        intercept -= lr * grad_intercept / n;
        for j in 0..FEATURE_COUNT {
            coeffs[j] -= lr * (grad[j] / n + l2 * coeffs[j]);
        }

        if iter % 20 == 0 || iter + 1 == MAX_ITERS {
            let val_ll = log_loss(&coeffs, intercept, val);
            if val_ll + IMPROVEMENT_EPS < best_val {
                best_val = val_ll;
                best = (coeffs, intercept);
                no_improve = 0;
            } else {
                no_improve = no_improve.saturating_add(1);
                if no_improve >= 20 {
                    break;
                }
            }
        }
    }

    best
}

fn log_loss(coeffs: &[f64; FEATURE_COUNT], intercept: f64, samples: &[TrainSample]) -> f64 {
    if samples.is_empty() {
        return f64::INFINITY;
    }
    let mut sum = 0.0;
    for sample in samples {
        let p = sigmoid(intercept + dot(*coeffs, sample.x)).clamp(1e-9, 1.0 - 1e-9);
        sum += if sample.injured {
            -p.ln()
        } else {
            -(1.0 - p).ln()
        };
    }
    sum / samples.len() as f64
}

fn dot(a: [f64; FEATURE_COUNT], b: [f64; FEATURE_COUNT]) -> f64 {
    let mut out = 0.0;
    for i in 0..FEATURE_COUNT {
        out += a[i] * b[i];
    }
    out
}
