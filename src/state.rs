use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Local};

use crate::history::HistoryStore;
use crate::inputs::{self, AuxiliaryAttributes, FeatureField, Position};
use crate::model::{Attributor, Predictor};
use crate::pipeline::{self, RiskReport};

const MAX_LOG_LINES: usize = 50;

/// Form rows before the per-feature widgets.
pub const ROW_NAME: usize = 0;
pub const ROW_POSITION: usize = 1;
pub const ROW_INJURIES: usize = 2;
pub const FIXED_ROWS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTab {
    Summary,
    Insights,
    History,
    Advice,
    Raw,
}

pub const TAB_ORDER: [ReportTab; 5] = [
    ReportTab::Summary,
    ReportTab::Insights,
    ReportTab::History,
    ReportTab::Advice,
    ReportTab::Raw,
];

impl ReportTab {
    pub fn label(self) -> &'static str {
        match self {
            ReportTab::Summary => "Summary",
            ReportTab::Insights => "Insights",
            ReportTab::History => "History",
            ReportTab::Advice => "Advice",
            ReportTab::Raw => "Raw Data",
        }
    }

    pub fn index(self) -> usize {
        TAB_ORDER.iter().position(|t| *t == self).unwrap_or(0)
    }
}

pub struct AppState {
    pub schema: Vec<String>,
    pub player_name: String,
    pub editing_name: bool,
    pub position: Position,
    pub previous_injuries: u32,
    pub fields: Vec<FeatureField>,
    pub focus: usize,
    pub tab: ReportTab,
    /// Last successful prediction, with the name it was made under. A save
    /// is only offered while this is present.
    pub report: Option<RiskReport>,
    pub report_player: String,
    pub last_error: Option<String>,
    pub history: HistoryStore,
    pub news: Vec<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(schema: &[String]) -> Self {
        Self {
            schema: schema.to_vec(),
            player_name: String::new(),
            editing_name: false,
            position: Position::Forward,
            previous_injuries: 0,
            fields: inputs::fields_for_schema(schema),
            focus: ROW_NAME,
            tab: ReportTab::Summary,
            report: None,
            report_player: String::new(),
            last_error: None,
            history: HistoryStore::new(),
            news: vec!["Enter a player name to get news.".to_string()],
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn form_rows(&self) -> usize {
        FIXED_ROWS + self.fields.len()
    }

    pub fn select_next(&mut self) {
        self.focus = (self.focus + 1) % self.form_rows();
    }

    pub fn select_prev(&mut self) {
        let rows = self.form_rows();
        self.focus = (self.focus + rows - 1) % rows;
    }

    /// Left/right on the focused row: cycle the position selector, step the
    /// injury counter, or step the focused feature widget.
    pub fn adjust_focused(&mut self, steps: i64) {
        match self.focus {
            ROW_NAME => {}
            ROW_POSITION => {
                self.position = if steps >= 0 {
                    self.position.next()
                } else {
                    self.position.prev()
                };
            }
            ROW_INJURIES => {
                if steps >= 0 {
                    self.previous_injuries = self.previous_injuries.saturating_add(steps as u32);
                } else {
                    self.previous_injuries =
                        self.previous_injuries.saturating_sub((-steps) as u32);
                }
            }
            row => {
                if let Some(field) = self.fields.get_mut(row - FIXED_ROWS) {
                    field.adjust(steps);
                }
            }
        }
    }

    pub fn name_input_char(&mut self, c: char) {
        if self.editing_name && !c.is_control() {
            self.player_name.push(c);
        }
    }

    pub fn name_backspace(&mut self) {
        if self.editing_name {
            self.player_name.pop();
        }
    }

    pub fn aux(&self) -> AuxiliaryAttributes {
        AuxiliaryAttributes {
            position: self.position,
            previous_injuries: self.previous_injuries,
        }
    }

    pub fn raw_input(&self) -> HashMap<String, f64> {
        inputs::collect(&self.fields)
    }

    pub fn display_name(&self) -> &str {
        if self.player_name.trim().is_empty() {
            "Unnamed Player"
        } else {
            self.player_name.trim()
        }
    }

    /// One prediction cycle. On failure the cycle is abandoned: no partial
    /// report is surfaced and the history is untouched.
    pub fn run_prediction_cycle<P, A>(&mut self, predictor: &P, attributor: &A)
    where
        P: Predictor + ?Sized,
        A: Attributor + ?Sized,
    {
        let raw = self.raw_input();
        let aux = self.aux();
        match pipeline::run_prediction(&self.schema, &raw, &aux, predictor, attributor) {
            Ok(report) => {
                self.report_player = self.display_name().to_string();
                self.push_log(format!(
                    "[INFO] Prediction complete for {} ({})",
                    self.report_player,
                    report.risk.label()
                ));
                self.report = Some(report);
                self.last_error = None;
                self.tab = ReportTab::Summary;
            }
            Err(err) => {
                self.report = None;
                self.last_error = Some(format!("An error occurred: {err}"));
                self.push_log(format!("[ERROR] Prediction failed: {err}"));
            }
        }
    }

    /// Save the displayed prediction. Only available after a successful
    /// cycle; returns whether anything was recorded.
    pub fn save_to_history(&mut self, timestamp: DateTime<Local>) -> bool {
        let Some(report) = &self.report else {
            self.push_log("[WARN] Nothing to save; run a prediction first");
            return false;
        };
        self.history
            .record(&self.report_player, report.probability, timestamp);
        self.push_log(format!("[INFO] Prediction for {} saved", self.report_player));
        true
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        if self.logs.len() >= MAX_LOG_LINES {
            self.logs.pop_front();
        }
        self.logs.push_back(line.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<String> {
        vec![
            "age".to_string(),
            "bmi".to_string(),
            "total_minutes_played".to_string(),
        ]
    }

    #[test]
    fn focus_wraps_both_directions() {
        let mut state = AppState::new(&schema());
        assert_eq!(state.form_rows(), 6);

        state.select_prev();
        assert_eq!(state.focus, 5);
        state.select_next();
        assert_eq!(state.focus, 0);
    }

    #[test]
    fn adjust_routes_to_the_focused_row() {
        let mut state = AppState::new(&schema());

        state.focus = ROW_POSITION;
        state.adjust_focused(1);
        assert_eq!(state.position, Position::Midfielder);

        state.focus = ROW_INJURIES;
        state.adjust_focused(-1);
        assert_eq!(state.previous_injuries, 0);
        state.adjust_focused(3);
        assert_eq!(state.previous_injuries, 3);

        state.focus = FIXED_ROWS; // age
        state.adjust_focused(2);
        assert_eq!(state.fields[0].value, 27.0);
    }

    #[test]
    fn name_editing_is_gated_on_edit_mode() {
        let mut state = AppState::new(&schema());
        state.name_input_char('x');
        assert!(state.player_name.is_empty());

        state.editing_name = true;
        state.name_input_char('J');
        state.name_input_char('o');
        state.name_backspace();
        assert_eq!(state.player_name, "J");
    }

    #[test]
    fn save_requires_a_successful_prediction() {
        let mut state = AppState::new(&schema());
        assert!(!state.save_to_history(Local::now()));
        assert!(state.history.is_empty());
    }

    #[test]
    fn log_ring_is_bounded() {
        let mut state = AppState::new(&schema());
        for i in 0..(MAX_LOG_LINES + 10) {
            state.push_log(format!("line {i}"));
        }
        assert_eq!(state.logs.len(), MAX_LOG_LINES);
        assert_eq!(state.logs.front().unwrap(), "line 10");
    }
}
