use anyhow::anyhow;
use chrono::Local;
use injury_terminal::history::HistoryStore;
use injury_terminal::model::{Attributor, Predictor, ShapOutput};
use injury_terminal::state::AppState;

struct StubPredictor {
    probability: f64,
}

impl Predictor for StubPredictor {
    fn transform(&self, raw: &[f64]) -> anyhow::Result<Vec<f64>> {
        Ok(raw.to_vec())
    }

    fn predict_proba(&self, _scaled: &[f64]) -> anyhow::Result<[f64; 2]> {
        Ok([1.0 - self.probability, self.probability])
    }
}

struct StubAttributor;

impl Attributor for StubAttributor {
    fn explain(&self, scaled: &[f64]) -> anyhow::Result<ShapOutput> {
        Ok(ShapOutput::Single {
            values: vec![0.0; scaled.len()],
            baseline: 0.0,
        })
    }
}

struct BrokenPredictor;

impl Predictor for BrokenPredictor {
    fn transform(&self, _raw: &[f64]) -> anyhow::Result<Vec<f64>> {
        Err(anyhow!("model file truncated"))
    }

    fn predict_proba(&self, _scaled: &[f64]) -> anyhow::Result<[f64; 2]> {
        Err(anyhow!("unreachable"))
    }
}

fn schema() -> Vec<String> {
    vec!["age".to_string(), "bmi".to_string()]
}

#[test]
fn record_returns_exactly_n_entries_in_call_order() {
    let mut store = HistoryStore::new();
    let now = Local::now();
    for i in 0..25 {
        store.record("Player", i as f64 / 25.0, now);
    }

    let entries = store.all();
    assert_eq!(entries.len(), 25);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.probability, i as f64 / 25.0);
    }
}

#[test]
fn saving_appends_the_displayed_prediction() {
    let mut state = AppState::new(&schema());
    state.player_name = "Jo Durand".to_string();
    state.run_prediction_cycle(&StubPredictor { probability: 0.42 }, &StubAttributor);
    assert!(state.report.is_some());

    assert!(state.save_to_history(Local::now()));
    assert!(state.save_to_history(Local::now())); // repeated saves allowed

    let entries = state.history.all();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].player_name, "Jo Durand");
    assert_eq!(entries[0].probability, 0.42);
}

#[test]
fn failed_cycle_leaves_history_untouched_and_blocks_saving() {
    let mut state = AppState::new(&schema());
    state.run_prediction_cycle(&StubPredictor { probability: 0.6 }, &StubAttributor);
    assert!(state.save_to_history(Local::now()));
    assert_eq!(state.history.len(), 1);

    state.run_prediction_cycle(&BrokenPredictor, &StubAttributor);
    assert!(state.report.is_none());
    assert!(state.last_error.as_deref().unwrap().contains("model file truncated"));

    assert!(!state.save_to_history(Local::now()));
    assert_eq!(state.history.len(), 1);
}
