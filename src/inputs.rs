use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Forward,
    Midfielder,
    Defender,
    Goalkeeper,
}

impl Position {
    pub fn label(self) -> &'static str {
        match self {
            Position::Forward => "Forward",
            Position::Midfielder => "Midfielder",
            Position::Defender => "Defender",
            Position::Goalkeeper => "Goalkeeper",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Position::Forward => Position::Midfielder,
            Position::Midfielder => Position::Defender,
            Position::Defender => Position::Goalkeeper,
            Position::Goalkeeper => Position::Forward,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Position::Forward => Position::Goalkeeper,
            Position::Midfielder => Position::Forward,
            Position::Defender => Position::Midfielder,
            Position::Goalkeeper => Position::Defender,
        }
    }
}

/// Fields the model never sees; only the recommendation rules read them.
#[derive(Debug, Clone, Copy)]
pub struct AuxiliaryAttributes {
    pub position: Position,
    pub previous_injuries: u32,
}

impl Default for AuxiliaryAttributes {
    fn default() -> Self {
        Self {
            position: Position::Forward,
            previous_injuries: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidgetSpec {
    /// Bounded slider; adjustments clamp to [min, max].
    Slider {
        min: f64,
        max: f64,
        step: f64,
        default: f64,
    },
    /// Numeric input, optionally bounded below, unbounded above.
    Number {
        min: Option<f64>,
        step: f64,
        default: f64,
    },
}

impl WidgetSpec {
    pub fn default_value(self) -> f64 {
        match self {
            WidgetSpec::Slider { default, .. } => default,
            WidgetSpec::Number { default, .. } => default,
        }
    }

    pub fn step(self) -> f64 {
        match self {
            WidgetSpec::Slider { step, .. } => step,
            WidgetSpec::Number { step, .. } => step,
        }
    }

    pub fn clamp(self, value: f64) -> f64 {
        match self {
            WidgetSpec::Slider { min, max, .. } => value.clamp(min, max),
            WidgetSpec::Number { min: Some(min), .. } => value.max(min),
            WidgetSpec::Number { min: None, .. } => value,
        }
    }
}

/// Widget selection policy. Matched case-insensitively, first rule wins:
/// exact "age", exact "bmi", exact "fifa_rating", substring "minutes",
/// then the free numeric fallback.
pub fn widget_for(feature: &str) -> WidgetSpec {
    let name = feature.trim().to_ascii_lowercase();
    if name == "age" {
        WidgetSpec::Slider {
            min: 15.0,
            max: 45.0,
            step: 1.0,
            default: 25.0,
        }
    } else if name == "bmi" {
        WidgetSpec::Slider {
            min: 15.0,
            max: 40.0,
            step: 0.1,
            default: 22.5,
        }
    } else if name == "fifa_rating" {
        WidgetSpec::Slider {
            min: 40.0,
            max: 100.0,
            step: 1.0,
            default: 75.0,
        }
    } else if name.contains("minutes") {
        WidgetSpec::Number {
            min: Some(0.0),
            step: 50.0,
            default: 1500.0,
        }
    } else {
        WidgetSpec::Number {
            min: None,
            step: 0.1,
            default: 0.0,
        }
    }
}

/// One form row per schema feature, holding whatever the widget currently
/// shows. Values from non-slider widgets are passed through unvalidated.
#[derive(Debug, Clone)]
pub struct FeatureField {
    pub name: String,
    pub widget: WidgetSpec,
    pub value: f64,
}

impl FeatureField {
    pub fn new(name: &str) -> Self {
        let widget = widget_for(name);
        Self {
            name: name.to_string(),
            widget,
            value: widget.default_value(),
        }
    }

    pub fn adjust(&mut self, steps: i64) {
        let next = self.value + self.widget.step() * steps as f64;
        self.value = self.widget.clamp(next);
    }
}

pub fn fields_for_schema(features: &[String]) -> Vec<FeatureField> {
    features.iter().map(|name| FeatureField::new(name)).collect()
}

/// Snapshot of the form: raw feature map keyed by schema name.
pub fn collect(fields: &[FeatureField]) -> HashMap<String, f64> {
    fields
        .iter()
        .map(|field| (field.name.clone(), field.value))
        .collect()
}

/// "total_minutes_played" -> "Total Minutes Played".
pub fn format_label(feature: &str) -> String {
    feature
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_matches_in_order() {
        assert_eq!(
            widget_for("age"),
            WidgetSpec::Slider {
                min: 15.0,
                max: 45.0,
                step: 1.0,
                default: 25.0
            }
        );
        assert_eq!(
            widget_for("BMI"),
            WidgetSpec::Slider {
                min: 15.0,
                max: 40.0,
                step: 0.1,
                default: 22.5
            }
        );
        assert_eq!(
            widget_for("Fifa_Rating"),
            WidgetSpec::Slider {
                min: 40.0,
                max: 100.0,
                step: 1.0,
                default: 75.0
            }
        );
        // Substring, not exact.
        assert_eq!(
            widget_for("total_minutes_played"),
            WidgetSpec::Number {
                min: Some(0.0),
                step: 50.0,
                default: 1500.0
            }
        );
        assert_eq!(
            widget_for("sprint_speed"),
            WidgetSpec::Number {
                min: None,
                step: 0.1,
                default: 0.0
            }
        );
    }

    #[test]
    fn slider_adjust_clamps_to_bounds() {
        let mut field = FeatureField::new("age");
        field.adjust(100);
        assert_eq!(field.value, 45.0);
        field.adjust(-100);
        assert_eq!(field.value, 15.0);
    }

    #[test]
    fn minutes_adjust_stops_at_zero_but_is_unbounded_above() {
        let mut field = FeatureField::new("total_minutes_played");
        field.adjust(-1000);
        assert_eq!(field.value, 0.0);
        field.adjust(200);
        assert_eq!(field.value, 10_000.0);
    }

    #[test]
    fn free_input_accepts_out_of_range_values() {
        let mut field = FeatureField::new("sprint_speed");
        field.adjust(-50);
        assert!((field.value + 5.0).abs() < 1e-9);
    }

    #[test]
    fn collect_keys_equal_schema() {
        let schema = vec!["age".to_string(), "bmi".to_string()];
        let fields = fields_for_schema(&schema);
        let raw = collect(&fields);
        assert_eq!(raw.len(), 2);
        assert_eq!(raw["age"], 25.0);
        assert_eq!(raw["bmi"], 22.5);
    }

    #[test]
    fn labels_are_title_cased() {
        assert_eq!(format_label("total_minutes_played"), "Total Minutes Played");
        assert_eq!(format_label("age"), "Age");
    }

    #[test]
    fn position_cycles_both_ways() {
        assert_eq!(Position::Forward.next(), Position::Midfielder);
        assert_eq!(Position::Forward.prev(), Position::Goalkeeper);
        assert_eq!(Position::Goalkeeper.next(), Position::Forward);
    }
}
