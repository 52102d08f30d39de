use super::recharge::{Recharge, RechargeOption};
use crate::config::CheckThresholds;
use crate::error::{PackageError, ShapeMismatch};

use derive_more::{Constructor, Display};
use ndarray::{ArrayView2, ArrayView3, Axis, Zip};

/// Hydraulic conductivity and thickness of every cell, `(nlay, nrow, ncol)`.
#[derive(Debug, Clone, Copy, Constructor)]
pub struct Transmissivity<'a> {
    pub hk: ArrayView3<'a, f64>,
    pub thickness: ArrayView3<'a, f64>,
}

/// A check that did not pass
#[derive(Debug, Clone, PartialEq, Display)]
#[display(fmt = "{} ({})", description, value)]
pub struct CheckEntry {
    pub description: String,
    pub value: f64,
}

/// Outcome of a package check
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CheckSummary {
    pub package: String,
    pub warnings: Vec<CheckEntry>,
    pub passed: Vec<String>,
}

impl CheckSummary {
    fn warn(&mut self, description: String, value: f64) {
        log::warn!("{}: {} ({})", self.package, description, value);
        self.warnings.push(CheckEntry { description, value });
    }

    pub fn is_ok(&self) -> bool {
        self.warnings.is_empty()
    }

    /// human readable report
    pub fn summarize(&self) -> String {
        let mut text = format!("{} PACKAGE DATA VALIDATION:\n", self.package);

        if !self.warnings.is_empty() {
            text.push_str(&format!("  {} Warnings:\n", self.warnings.len()));
            for warning in &self.warnings {
                text.push_str(&format!("    {}\n", warning));
            }
        }

        if !self.passed.is_empty() {
            text.push_str("  Checks that passed:\n");
            for passed in &self.passed {
                text.push_str(&format!("    {}\n", passed));
            }
        }

        text
    }
}

impl Recharge {
    /// Check the package for suspicious input.
    ///
    /// With `transmissivity` given, the mean recharge of every stress period is
    /// divided by the mean transmissivity of the active columns and compared with
    /// `thresholds`. `active` marks the active columns `(nrow, ncol)`; every column
    /// is active if it is `None`. A layer option other than
    /// [`RechargeOption::HighestActive`] is always reported.
    pub fn check(
        &self,
        nper: usize,
        transmissivity: Option<Transmissivity<'_>>,
        active: Option<ArrayView2<'_, bool>>,
        thresholds: &CheckThresholds,
    ) -> Result<CheckSummary, PackageError> {
        let shape = self.rech.shape();
        let mut summary = CheckSummary {
            package: self.config.name.clone(),
            ..CheckSummary::default()
        };

        if let Some(active) = &active {
            expect_shape("active", &[shape.0, shape.1], active.shape())?;
        }

        if let Some(transmissivity) = transmissivity {
            let nlay = transmissivity.hk.len_of(Axis(0));
            expect_shape("hk", &[nlay, shape.0, shape.1], transmissivity.hk.shape())?;
            expect_shape(
                "thickness",
                &[nlay, shape.0, shape.1],
                transmissivity.thickness.shape(),
            )?;

            // transmissivity of every column, summed over the layers
            let column = (&transmissivity.hk * &transmissivity.thickness).sum_axis(Axis(0));

            let mut total = 0.0;
            let mut count = 0usize;
            Zip::indexed(&column).for_each(|index, t| {
                if active.as_ref().map(|a| a[index]).unwrap_or(true) {
                    total += *t;
                    count += 1;
                }
            });

            let t_mean = if count > 0 { total / count as f64 } else { 0.0 };

            if t_mean != 0.0 {
                self.check_ratio(nper, t_mean, thresholds, &mut summary);
            }
        }

        if self.nrchop != RechargeOption::HighestActive {
            summary.warn(
                "Variable NRCHOP set to value other than 3".into(),
                self.nrchop as i32 as f64,
            );
        } else {
            summary.passed.push("Variable NRCHOP set to 3.".into());
        }

        Ok(summary)
    }

    fn check_ratio(
        &self,
        nper: usize,
        t_mean: f64,
        thresholds: &CheckThresholds,
        summary: &mut CheckSummary,
    ) {
        let ratios: Vec<f64> = (0..nper)
            .map(|kper| {
                self.rech
                    .get(kper)
                    .and_then(|rech| rech.mean())
                    .map(f64::from)
                    .unwrap_or(0.0)
                    / t_mean
            })
            .collect();

        let below: Vec<f64> = ratios.iter().copied().filter(|r| *r < thresholds.rt_min).collect();
        let above: Vec<f64> = ratios.iter().copied().filter(|r| *r > thresholds.rt_max).collect();

        if !below.is_empty() {
            summary.warn(
                format!(
                    "Mean R/T ratio < checker warning threshold of {} for {} stress periods",
                    thresholds.rt_min,
                    below.len()
                ),
                below.iter().copied().fold(f64::INFINITY, f64::min),
            );
        }

        if !above.is_empty() {
            summary.warn(
                format!(
                    "Mean R/T ratio > checker warning threshold of {} for {} stress periods",
                    thresholds.rt_max,
                    above.len()
                ),
                above.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            );
        }

        if below.is_empty() && above.is_empty() {
            summary.passed.push(format!(
                "Mean R/T is between {} and {}",
                thresholds.rt_min, thresholds.rt_max
            ));
        }
    }
}

fn expect_shape(name: &str, expected: &[usize], actual: &[usize]) -> Result<(), ShapeMismatch> {
    if expected != actual {
        return Err(ShapeMismatch::new(name.into(), expected.to_vec(), actual.to_vec()));
    }
    Ok(())
}
