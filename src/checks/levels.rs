use crate::verdict::State;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Alert when the value rises to or above a breakpoint.
    Upper,
    /// Alert when the value falls below a breakpoint.
    Lower,
}

/// Warning/critical breakpoints for one direction.
///
/// In `config.toml`:
/// ```toml
/// lower = "no_levels"
/// upper = { fixed = [80.0, 90.0] }
/// # upper = { predictive = { metric = "physical_used_percent" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Levels {
    NoLevels,
    Fixed(f64, f64),
    /// Breakpoints computed from the history of `metric` by a [`LevelsPredictor`].
    Predictive { metric: String },
}

/// Source of predicted breakpoints. Prediction itself lives outside this
/// crate; implementations only hand back a (warn, crit) pair.
pub trait LevelsPredictor {
    fn predict(&self, metric: &str, direction: Direction) -> Option<(f64, f64)>;
}

/// Predictor for setups without metric history.
pub struct NoPrediction;

impl LevelsPredictor for NoPrediction {
    fn predict(&self, _metric: &str, _direction: Direction) -> Option<(f64, f64)> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub state:  State,
    /// Breakpoints that were actually applied.
    pub bounds: Option<(f64, f64)>,
    /// Empty for OK, otherwise ` (warn/crit at ...)`.
    pub note:   String,
}

impl Outcome {
    fn ok(bounds: Option<(f64, f64)>) -> Self {
        Self { state: State::Ok, bounds, note: String::new() }
    }
}

/// Compare `value` against a fixed pair. Critical is checked first.
pub fn compare(value: f64, warn: f64, crit: f64, direction: Direction) -> State {
    match direction {
        Direction::Upper if value >= crit => State::Crit,
        Direction::Upper if value >= warn => State::Warn,
        Direction::Lower if value < crit  => State::Crit,
        Direction::Lower if value < warn  => State::Warn,
        _ => State::Ok,
    }
}

pub fn check(
    value:     f64,
    levels:    &Levels,
    direction: Direction,
    predictor: &dyn LevelsPredictor,
    render:    fn(f64) -> String,
) -> Outcome {
    let (warn, crit) = match levels {
        Levels::NoLevels      => return Outcome::ok(None),
        Levels::Fixed(w, c)   => (*w, *c),
        Levels::Predictive { metric } => match predictor.predict(metric, direction) {
            Some(pair) => pair,
            None => {
                debug!(metric = %metric, "no prediction available, levels not applied");
                return Outcome::ok(None);
            }
        },
    };

    let state = compare(value, warn, crit, direction);
    if state == State::Ok {
        return Outcome::ok(Some((warn, crit)));
    }
    let word = match direction {
        Direction::Upper => "at",
        Direction::Lower => "below",
    };
    Outcome {
        state,
        bounds: Some((warn, crit)),
        note: format!(" (warn/crit {} {}/{})", word, render(warn), render(crit)),
    }
}

/// Independent lower and upper levels on one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualLevels {
    #[serde(default = "no_levels")]
    pub lower: Levels,
    #[serde(default = "no_levels")]
    pub upper: Levels,
}

fn no_levels() -> Levels {
    Levels::NoLevels
}

impl DualLevels {
    /// Worst of both directions. The reported bounds are the upper ones,
    /// which is what graphs draw.
    pub fn check(&self, value: f64, predictor: &dyn LevelsPredictor, render: fn(f64) -> String) -> Outcome {
        let upper = check(value, &self.upper, Direction::Upper, predictor, render);
        let lower = check(value, &self.lower, Direction::Lower, predictor, render);
        let state = State::worst(upper.state, lower.state);
        let note = if upper.state != State::Ok { upper.note } else { lower.note };
        Outcome { state, bounds: upper.bounds, note }
    }
}
