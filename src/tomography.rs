use crate::error::{MantleError, Result};
use crate::json_parser::JsonParser;
use crate::math_utils::interpolate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A vertical section through a 3D shear-velocity tomography model.
///
/// `dvs[depth_index][profile_index]` is the fractional shear-velocity
/// deviation (dVs/Vs) at `depths[depth_index]` (m) below the surface point at
/// `longitudes[profile_index]` (degrees).
///
/// The section is taken as it comes: only the JSON shape is checked by serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomographySection {
    pub longitudes: Vec<f64>,
    pub depths: Vec<f64>,
    pub dvs: Vec<Vec<f64>>,
}

impl TomographySection {
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        JsonParser::from_file(file_path)
    }

    pub fn from_json_str(json_str: &str) -> Result<Self> {
        JsonParser::from_str(json_str)
    }

    /// dVs/Vs down one profile, one value per depth row.
    ///
    /// `None` if the profile index is past the end of any row.
    pub fn profile(&self, profile_index: usize) -> Option<Vec<f64>> {
        self.dvs
            .iter()
            .map(|row| row.get(profile_index).copied())
            .collect()
    }

    /// Index of the profile whose longitude is closest to `longitude`
    /// (wrapping around 360°).
    pub fn nearest_profile(&self, longitude: f64) -> Option<usize> {
        let angular_distance = |lon: f64| {
            let delta = (lon - longitude).rem_euclid(360.0);
            delta.min(360.0 - delta)
        };
        self.longitudes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| angular_distance(**a).total_cmp(&angular_distance(**b)))
            .map(|(index, _)| index)
    }

    /// Resample one profile onto `depths_m` by linear interpolation.
    ///
    /// Depths outside the section are an evaluation error; the section's depth
    /// list is assumed ascending.
    pub fn profile_at_depths(&self, profile_index: usize, depths_m: &[f64]) -> Result<Vec<f64>> {
        let column = self.profile(profile_index).ok_or_else(|| {
            MantleError::Evaluation(format!(
                "tomography: profile {} not present in every depth row",
                profile_index
            ))
        })?;
        if column.len() != self.depths.len() {
            return Err(MantleError::Alignment {
                expected: self.depths.len(),
                found: column.len(),
            });
        }
        depths_m
            .iter()
            .map(|depth| {
                interpolate(&self.depths, &column, *depth).ok_or_else(|| {
                    MantleError::Evaluation(format!(
                        "tomography: depth {:.0} m outside the section",
                        depth
                    ))
                })
            })
            .collect()
    }
}
