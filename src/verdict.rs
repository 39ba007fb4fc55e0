use std::fmt;

/// Monitoring state of one service. The numeric value doubles as the
/// plugin exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Ok = 0,
    Warn = 1,
    Crit = 2,
    Unknown = 3,
}

impl State {
    pub fn label(&self) -> &'static str {
        match self {
            State::Ok      => "OK",
            State::Warn    => "WARN",
            State::Crit    => "CRIT",
            State::Unknown => "UNKNOWN",
        }
    }

    /// Marker appended to a summary fragment that caused this state.
    pub fn marker(&self) -> &'static str {
        match self {
            State::Ok      => "",
            State::Warn    => "(!)",
            State::Crit    => "(!!)",
            State::Unknown => "(?)",
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Ranking used to combine states: CRIT beats UNKNOWN beats WARN beats OK.
    fn rank(&self) -> u8 {
        match self {
            State::Ok      => 0,
            State::Warn    => 1,
            State::Unknown => 2,
            State::Crit    => 3,
        }
    }

    pub fn worst(a: State, b: State) -> State {
        if b.rank() > a.rank() { b } else { a }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A named numeric value attached to a verdict, optionally with the
/// levels that were applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name:   String,
    pub value:  f64,
    pub levels: Option<(f64, f64)>,
}

impl Metric {
    pub fn new(name: &str, value: f64) -> Self {
        Self { name: name.to_string(), value, levels: None }
    }

    pub fn with_levels(mut self, levels: Option<(f64, f64)>) -> Self {
        self.levels = levels;
        self
    }

    /// Performance-data rendering: `name=value;warn;crit`.
    pub fn perfdata(&self) -> String {
        match self.levels {
            Some((w, c)) => format!("{}={};{};{}", self.name, self.value, w, c),
            None         => format!("{}={}", self.name, self.value),
        }
    }
}

/// Result of one evaluator run for one service.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub state:   State,
    summary:     Vec<String>,
    pub details: Vec<String>,
    pub metrics: Vec<Metric>,
}

impl Default for Verdict {
    fn default() -> Self {
        Self { state: State::Ok, summary: Vec::new(), details: Vec::new(), metrics: Vec::new() }
    }
}

impl Verdict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unknown(text: impl Into<String>) -> Self {
        let mut v = Self::new();
        v.push(State::Unknown, text);
        v
    }

    /// Add a summary fragment and fold its state into the overall one.
    pub fn push(&mut self, state: State, text: impl Into<String>) {
        self.state = State::worst(self.state, state);
        self.summary.push(format!("{}{}", text.into(), state.marker()));
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn metric(&mut self, metric: Metric) {
        self.metrics.push(metric);
    }

    pub fn summary(&self) -> String {
        self.summary.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crit_outranks_unknown() {
        assert_eq!(State::worst(State::Unknown, State::Crit), State::Crit);
        assert_eq!(State::worst(State::Warn, State::Unknown), State::Unknown);
        assert_eq!(State::worst(State::Ok, State::Warn), State::Warn);
        assert_eq!(State::worst(State::Crit, State::Ok), State::Crit);
    }

    #[test]
    fn verdict_folds_states_and_marks_summary() {
        let mut v = Verdict::new();
        v.push(State::Ok, "State: Ready");
        v.push(State::Warn, "Used: 85.00%");
        assert_eq!(v.state, State::Warn);
        assert_eq!(v.summary(), "State: Ready, Used: 85.00%(!)");
    }

    #[test]
    fn perfdata_includes_levels_when_present() {
        assert_eq!(Metric::new("total_iops", 12.5).perfdata(), "total_iops=12.5");
        let m = Metric::new("physical_used_percent", 50.0).with_levels(Some((80.0, 90.0)));
        assert_eq!(m.perfdata(), "physical_used_percent=50;80;90");
    }
}
