use crate::inputs::AuxiliaryAttributes;
use crate::pipeline::FeatureVector;

const IMMEDIATE_ACTION_PROB: f64 = 0.75;
const HIGH_ALERT_PROB: f64 = 0.5;
const AGE_LIMIT: f64 = 32.0;
const BMI_LIMIT: f64 = 25.0;
const WORKLOAD_MINUTES: f64 = 2500.0;

const AGE_FEATURE: &str = "age";
const BMI_FEATURE: &str = "bmi";
const MINUTES_FEATURE: &str = "total_minutes_played";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
    Advisory,
    Good,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub severity: Severity,
    pub text: String,
}

impl Recommendation {
    fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

/// Advisory list for one prediction. Pure: identical inputs always yield
/// the identical, identically-ordered list. The two risk-tier rules are
/// mutually exclusive; every other rule accumulates independently, and the
/// low-risk line appears only when nothing else fired.
pub fn build_recommendations(
    features: &FeatureVector,
    aux: &AuxiliaryAttributes,
    probability: f64,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if probability > IMMEDIATE_ACTION_PROB {
        recs.push(Recommendation::new(
            Severity::Critical,
            "Immediate Action: high-risk probability. Strongly consider resting the player.",
        ));
    } else if probability > HIGH_ALERT_PROB {
        recs.push(Recommendation::new(
            Severity::Warning,
            "High Alert: player is at high risk. Implement a personalized pre-hab routine and monitor training load.",
        ));
    }

    if matches!(features.get(AGE_FEATURE), Some(age) if age > AGE_LIMIT) {
        recs.push(Recommendation::new(
            Severity::Advisory,
            "Age Factor: focus on dynamic stretching and post-session recovery.",
        ));
    }
    if matches!(features.get(BMI_FEATURE), Some(bmi) if bmi > BMI_LIMIT) {
        recs.push(Recommendation::new(
            Severity::Advisory,
            "BMI Factor: consider a nutritional consultation to optimize body composition.",
        ));
    }
    if matches!(features.get(MINUTES_FEATURE), Some(minutes) if minutes > WORKLOAD_MINUTES) {
        recs.push(Recommendation::new(
            Severity::Advisory,
            "Workload Factor: high accumulated fatigue. Prioritize recovery sessions.",
        ));
    }
    if aux.previous_injuries > 0 {
        recs.push(Recommendation::new(
            Severity::Advisory,
            format!(
                "Injury History: with {} prior injuries, strengthen those areas.",
                aux.previous_injuries
            ),
        ));
    }

    if recs.is_empty() {
        recs.push(Recommendation::new(
            Severity::Good,
            "Low Risk: player is in good physical condition. Continue standard monitoring.",
        ));
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::Position;

    fn vector(pairs: &[(&str, f64)]) -> FeatureVector {
        FeatureVector {
            names: pairs.iter().map(|(n, _)| n.to_string()).collect(),
            values: pairs.iter().map(|(_, v)| *v).collect(),
        }
    }

    fn aux(previous_injuries: u32) -> AuxiliaryAttributes {
        AuxiliaryAttributes {
            position: Position::Midfielder,
            previous_injuries,
        }
    }

    #[test]
    fn immediate_action_excludes_high_alert() {
        let features = vector(&[("age", 25.0), ("bmi", 22.0)]);
        let recs = build_recommendations(&features, &aux(0), 0.80);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].severity, Severity::Critical);
        assert!(recs[0].text.starts_with("Immediate Action"));
    }

    #[test]
    fn high_alert_band_is_half_open() {
        let features = vector(&[("age", 25.0), ("bmi", 22.0)]);

        let recs = build_recommendations(&features, &aux(0), 0.75);
        assert_eq!(recs[0].severity, Severity::Warning);

        let recs = build_recommendations(&features, &aux(0), 0.51);
        assert_eq!(recs[0].severity, Severity::Warning);

        // Exactly 0.5 is below the alert band.
        let recs = build_recommendations(&features, &aux(0), 0.5);
        assert_eq!(recs[0].severity, Severity::Good);
    }

    #[test]
    fn independent_rules_accumulate_in_order() {
        let features = vector(&[
            ("age", 35.0),
            ("bmi", 27.0),
            ("fifa_rating", 70.0),
            ("total_minutes_played", 2800.0),
        ]);
        let recs = build_recommendations(&features, &aux(1), 0.60);

        let texts: Vec<&str> = recs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts.len(), 5);
        assert!(texts[0].starts_with("High Alert"));
        assert!(texts[1].starts_with("Age Factor"));
        assert!(texts[2].starts_with("BMI Factor"));
        assert!(texts[3].starts_with("Workload Factor"));
        assert!(texts[4].contains("1 prior injuries"));
    }

    #[test]
    fn safe_defaults_produce_only_the_low_risk_line() {
        let features = vector(&[
            ("age", 25.0),
            ("bmi", 22.5),
            ("fifa_rating", 75.0),
            ("total_minutes_played", 1500.0),
        ]);
        let recs = build_recommendations(&features, &aux(0), 0.3);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].severity, Severity::Good);
    }

    #[test]
    fn absent_features_do_not_fire_rules() {
        let features = vector(&[("sprint_speed", 33.0)]);
        let recs = build_recommendations(&features, &aux(0), 0.2);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].severity, Severity::Good);
    }

    #[test]
    fn identical_inputs_yield_identical_lists() {
        let features = vector(&[("age", 34.0), ("bmi", 26.0)]);
        let a = build_recommendations(&features, &aux(2), 0.66);
        let b = build_recommendations(&features, &aux(2), 0.66);
        assert_eq!(a, b);
    }
}
