use std::collections::HashMap;
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use injury_terminal::artifacts::{ModelArtifact, Resources, ScalerArtifact};
use injury_terminal::inputs::{AuxiliaryAttributes, Position};
use injury_terminal::pipeline::{FeatureVector, run_prediction};
use injury_terminal::recommend::build_recommendations;
use injury_terminal::report::attribution_rows;

static SCALER_JSON: &str = include_str!("../tests/fixtures/injury_scaler.json");
static MODEL_JSON: &str = include_str!("../tests/fixtures/injury_model.json");

fn fixture_resources() -> Resources {
    let scaler: ScalerArtifact = serde_json::from_str(SCALER_JSON).expect("valid scaler fixture");
    let model: ModelArtifact = serde_json::from_str(MODEL_JSON).expect("valid model fixture");
    Resources::from_artifacts(scaler, model).expect("consistent fixtures")
}

fn sample_raw(res: &Resources) -> HashMap<String, f64> {
    res.expected_features()
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.clone(), 20.0 + idx as f64 * 7.5))
        .collect()
}

fn bench_pipeline_run(c: &mut Criterion) {
    let res = fixture_resources();
    let raw = sample_raw(&res);
    let aux = AuxiliaryAttributes {
        position: Position::Midfielder,
        previous_injuries: 1,
    };

    c.bench_function("pipeline_run", |b| {
        b.iter(|| {
            let report = run_prediction(
                black_box(res.expected_features()),
                black_box(&raw),
                black_box(&aux),
                &res,
                &res,
            )
            .unwrap();
            black_box(report.probability);
        })
    });
}

fn bench_recommendations(c: &mut Criterion) {
    let features = FeatureVector {
        names: vec![
            "age".to_string(),
            "bmi".to_string(),
            "fifa_rating".to_string(),
            "total_minutes_played".to_string(),
        ],
        values: vec![35.0, 27.0, 70.0, 2800.0],
    };
    let aux = AuxiliaryAttributes {
        position: Position::Forward,
        previous_injuries: 2,
    };

    c.bench_function("recommendations", |b| {
        b.iter(|| {
            let recs = build_recommendations(black_box(&features), black_box(&aux), black_box(0.66));
            black_box(recs.len());
        })
    });
}

fn bench_attribution_rows(c: &mut Criterion) {
    let attributions: Vec<(String, f64)> = (0..16)
        .map(|idx| (format!("feature_{idx}"), (idx as f64 - 8.0) * 0.05))
        .collect();

    c.bench_function("attribution_rows", |b| {
        b.iter(|| {
            let rows = attribution_rows(black_box(&attributions), 18);
            black_box(rows.len());
        })
    });
}

criterion_group!(
    perf,
    bench_pipeline_run,
    bench_recommendations,
    bench_attribution_rows
);
criterion_main!(perf);
