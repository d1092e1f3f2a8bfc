use crate::deviation::fractional_deviation;
use crate::error::{MantleError, Result};
use crate::math_utils::rms;
use crate::property::Property;
use crate::scenario::{OBSERVED_PROPERTIES, ScenarioOutcome};
use crate::temp_utils::{m_to_km, pa_to_gpa};
use colored::Colorize;
use std::fs::File;
use std::io;
use std::path::Path;

/// A named column of values over the report's depth rows.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportColumn {
    pub label: String,
    pub values: Vec<f64>,
}

/// RMS of the fractional difference between a model column and an observed one.
#[derive(Clone, Debug, PartialEq)]
pub struct Misfit {
    pub model: String,
    pub observed: String,
    pub rms_fraction: f64,
}

/// Side-by-side table of model and reference series over depth.
///
/// Presentation only: the report arranges series that were computed elsewhere.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonReport {
    pub title: String,
    depths_m: Vec<f64>,
    columns: Vec<ReportColumn>,
    misfits: Vec<Misfit>,
}

impl ComparisonReport {
    pub fn new(title: &str, depths_m: Vec<f64>) -> Self {
        Self {
            title: title.to_string(),
            depths_m,
            columns: Vec::new(),
            misfits: Vec::new(),
        }
    }

    /// Lay out a scenario outcome: pressure, the seismic model, the reference
    /// rock, then dVs/Vs and drho/rho of every perturbation (in percent).
    pub fn from_outcome(outcome: &ScenarioOutcome) -> Result<Self> {
        let mut report = Self::new(&outcome.name, outcome.depths_m.clone());
        report.add_column(
            "pressure_gpa",
            outcome.pressures_pa.iter().map(|p| pa_to_gpa(*p)).collect(),
        )?;

        let reference = &outcome.reference;
        report.add_column(
            "temperature_k",
            reference.series.require(Property::Temperature)?.to_vec(),
        )?;

        for property in OBSERVED_PROPERTIES {
            let observed_label = format!("{} {}", outcome.seismic_model, property);
            let model_label = format!("model {}", property);
            report.add_column(&observed_label, outcome.observed.require(property)?.to_vec())?;
            report.add_column(&model_label, reference.series.require(property)?.to_vec())?;
            report.add_misfit(&model_label, &observed_label)?;
        }

        for perturbed in &outcome.perturbed {
            for (property, symbol) in [(Property::SWaveVelocity, "dVs/Vs"), (Property::Density, "drho/rho")] {
                if let Some(values) = perturbed.deviation.get(property) {
                    report.add_column(
                        &format!("{} {} %", perturbed.run.label, symbol),
                        values.iter().map(|v| v * 100.0).collect(),
                    )?;
                }
            }
        }
        Ok(report)
    }

    pub fn depths_m(&self) -> &[f64] {
        &self.depths_m
    }

    pub fn columns(&self) -> &[ReportColumn] {
        &self.columns
    }

    pub fn misfits(&self) -> &[Misfit] {
        &self.misfits
    }

    pub fn column(&self, label: &str) -> Option<&ReportColumn> {
        self.columns.iter().find(|c| c.label == label)
    }

    pub fn add_column(&mut self, label: &str, values: Vec<f64>) -> Result<()> {
        if values.len() != self.depths_m.len() {
            return Err(MantleError::Alignment {
                expected: self.depths_m.len(),
                found: values.len(),
            });
        }
        self.columns.push(ReportColumn {
            label: label.to_string(),
            values,
        });
        Ok(())
    }

    /// Record the RMS fractional misfit of `model_label` against `observed_label`.
    pub fn add_misfit(&mut self, model_label: &str, observed_label: &str) -> Result<()> {
        let find = |label: &str| {
            self.column(label).ok_or_else(|| {
                MantleError::Evaluation(format!("report has no column '{}'", label))
            })
        };
        let model = find(model_label)?;
        let observed = find(observed_label)?;
        let relative = fractional_deviation(&model.values, &observed.values)?;
        if let Some(rms_fraction) = rms(&relative) {
            self.misfits.push(Misfit {
                model: model_label.to_string(),
                observed: observed_label.to_string(),
                rms_fraction,
            });
        }
        Ok(())
    }

    fn write_rows<W: io::Write>(&self, writer: &mut csv::Writer<W>) -> Result<()> {
        writer.write_record(
            std::iter::once("depth_km").chain(self.columns.iter().map(|c| c.label.as_str())),
        )?;
        for (row, depth) in self.depths_m.iter().enumerate() {
            let record: Vec<String> = std::iter::once(m_to_km(*depth))
                .chain(self.columns.iter().map(|c| c.values[row]))
                .map(|value| value.to_string())
                .collect();
            writer.write_record(&record)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        self.write_rows(&mut writer)?;
        let bytes = writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))?;
        String::from_utf8(bytes).map_err(|err| MantleError::Evaluation(err.to_string()))
    }

    /// Write the table to `file_path` (created or truncated).
    pub fn write_csv<P: AsRef<Path>>(&self, file_path: P) -> Result<()> {
        let path = file_path.as_ref();
        let file = File::create(path).map_err(|source| MantleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = csv::Writer::from_writer(file);
        self.write_rows(&mut writer)
    }

    /// Print the table and the misfit summary to stdout.
    pub fn print_table(&self) {
        println!("{}", format!("=== {} ===", self.title).bold());

        let header: Vec<String> = std::iter::once("depth_km".to_string())
            .chain(self.columns.iter().map(|c| c.label.clone()))
            .collect();
        println!("{}", header.join(" | ").cyan());

        for (row, depth) in self.depths_m.iter().enumerate() {
            let mut cells = vec![format!("{:>8.1}", m_to_km(*depth))];
            for column in &self.columns {
                let value = column.values[row];
                let cell = format!("{:>12.4}", value);
                let cell = if !column.label.ends_with('%') {
                    cell.normal().to_string()
                } else if value < 0.0 {
                    cell.blue().to_string()
                } else {
                    cell.red().to_string()
                };
                cells.push(cell);
            }
            println!("{}", cells.join(" | "));
        }

        for misfit in &self.misfits {
            let percent = misfit.rms_fraction * 100.0;
            let line = format!(
                "RMS misfit {} vs {}: {:.2}%",
                misfit.model, misfit.observed, percent
            );
            if percent < 2.0 {
                println!("{}", line.green());
            } else {
                println!("{}", line.yellow());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_columns_must_align() {
        let mut report = ComparisonReport::new("toy", vec![1000.0e3, 2000.0e3]);
        assert!(report.add_column("a", vec![1.0, 2.0]).is_ok());
        assert!(matches!(
            report.add_column("b", vec![1.0]),
            Err(MantleError::Alignment { expected: 2, found: 1 })
        ));
        assert_eq!(report.columns().len(), 1);
    }

    #[test]
    fn test_misfit_is_rms_fraction() {
        let mut report = ComparisonReport::new("toy", vec![1000.0e3, 2000.0e3]);
        report.add_column("model", vec![101.0, 99.0]).unwrap();
        report.add_column("observed", vec![100.0, 100.0]).unwrap();
        report.add_misfit("model", "observed").unwrap();

        assert_eq!(report.misfits().len(), 1);
        assert_relative_eq!(report.misfits()[0].rms_fraction, 0.01, max_relative = 1e-9);
        assert!(report.add_misfit("model", "missing").is_err());
    }

    #[test]
    fn test_csv_layout() {
        let mut report = ComparisonReport::new("toy", vec![1000.0e3, 2000.0e3]);
        report.add_column("v_s, model", vec![6500.0, 7000.0]).unwrap();
        report.add_column("hot \"T0\" dVs/Vs %", vec![-0.5, -1.25]).unwrap();
        let csv = report.to_csv_string().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "depth_km,\"v_s, model\",\"hot \"\"T0\"\" dVs/Vs %\"");
        assert_eq!(lines[1], "1000,6500,-0.5");
        assert_eq!(lines[2], "2000,7000,-1.25");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_csv_to_bad_path_fails() {
        let report = ComparisonReport::new("toy", vec![]);
        assert!(matches!(
            report.write_csv("/no/such/dir/report.csv"),
            Err(MantleError::Io { .. })
        ));
    }
}
