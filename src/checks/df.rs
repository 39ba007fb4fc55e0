//! Filesystem style usage levels for volumes: percentage or absolute
//! thresholds, optionally scaled by a magic factor for large sizes.

use crate::util::human::{fmt_mb, fmt_pct};
use crate::verdict::{Metric, State};
use serde::{Deserialize, Serialize};

/// Warning/critical thresholds on used space. Negative values are read as
/// free space instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsThresholds {
    Percent(f64, f64),
    Megabytes(i64, i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesystemLevels {
    pub levels:         FsThresholds,
    /// Exponent that relaxes percentage levels on volumes larger than
    /// `magic_normsize` and tightens them on smaller ones.
    pub magic:          Option<f64>,
    /// Reference size in GB for the magic factor.
    pub magic_normsize: f64,
    /// Floor for magic scaled (warn, crit) percentages.
    pub levels_low:     (f64, f64),
}

impl Default for FilesystemLevels {
    fn default() -> Self {
        Self {
            levels:         FsThresholds::Percent(80.0, 90.0),
            magic:          None,
            magic_normsize: 20.0,
            levels_low:     (50.0, 60.0),
        }
    }
}

impl FilesystemLevels {
    /// Effective (warn, crit) in percent used for a volume of `size_mb`.
    pub fn percent_levels(&self, size_mb: f64) -> (f64, f64) {
        match self.levels {
            FsThresholds::Percent(w, c) => {
                let warn = if w < 0.0 { 100.0 + w } else { w };
                let crit = if c < 0.0 { 100.0 + c } else { c };
                self.apply_magic(size_mb, warn, crit)
            }
            FsThresholds::Megabytes(w, c) => {
                (mb_to_pct(w, size_mb), mb_to_pct(c, size_mb))
            }
        }
    }

    fn apply_magic(&self, size_mb: f64, warn: f64, crit: f64) -> (f64, f64) {
        let magic = match self.magic {
            Some(m) => m,
            None    => return (warn, crit),
        };
        let size_gb = size_mb / 1024.0;
        if size_gb <= 0.0 || self.magic_normsize <= 0.0 {
            return (warn, crit);
        }
        let hgb_size = size_gb / self.magic_normsize;
        let felt_size = hgb_size.powf(magic);
        let scale = felt_size / hgb_size;
        let warn = (100.0 - (100.0 - warn) * scale).max(self.levels_low.0);
        let crit = (100.0 - (100.0 - crit) * scale).max(self.levels_low.1);
        (warn, crit)
    }
}

fn mb_to_pct(mb: i64, size_mb: f64) -> f64 {
    if size_mb <= 0.0 {
        return 100.0;
    }
    let used = if mb < 0 { size_mb + mb as f64 } else { mb as f64 };
    used * 100.0 / size_mb
}

#[derive(Debug, Clone, PartialEq)]
pub struct FsOutcome {
    pub state:   State,
    pub text:    String,
    pub metrics: Vec<Metric>,
}

/// Evaluate used space (all values in MB) against `params`.
pub fn check_filesystem_levels(size_mb: f64, free_mb: f64, used_mb: f64, params: &FilesystemLevels) -> FsOutcome {
    let (warn_pct, crit_pct) = params.percent_levels(size_mb);
    let warn_mb = warn_pct / 100.0 * size_mb;
    let crit_mb = crit_pct / 100.0 * size_mb;
    let used_pct = if size_mb > 0.0 { used_mb / size_mb * 100.0 } else { 0.0 };

    let state = if size_mb <= 0.0 {
        State::Ok
    } else if used_mb >= crit_mb {
        State::Crit
    } else if used_mb >= warn_mb {
        State::Warn
    } else {
        State::Ok
    };

    let mut text = format!("Used: {} - {} of {}", fmt_pct(used_pct), fmt_mb(used_mb), fmt_mb(size_mb));
    if state != State::Ok {
        text.push_str(&format!(" (warn/crit at {}/{} used)", fmt_pct(warn_pct), fmt_pct(crit_pct)));
    }

    let metrics = vec![
        Metric::new("fs_used", used_mb).with_levels(Some((warn_mb, crit_mb))),
        Metric::new("fs_free", free_mb),
        Metric::new("fs_size", size_mb),
        Metric::new("fs_used_percent", used_pct).with_levels(Some((warn_pct, crit_pct))),
    ];
    FsOutcome { state, text, metrics }
}
