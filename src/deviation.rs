use crate::error::{MantleError, Result};
use crate::property::{Property, PropertySeries};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `(modified[i] - reference[i]) / reference[i]` for every index.
///
/// Indices where the reference is zero come out as `NaN`.
pub fn fractional_deviation(modified: &[f64], reference: &[f64]) -> Result<Vec<f64>> {
    if modified.len() != reference.len() {
        return Err(MantleError::Alignment {
            expected: reference.len(),
            found: modified.len(),
        });
    }
    Ok(modified
        .iter()
        .zip(reference)
        .map(|(value, base)| {
            if *base == 0.0 {
                f64::NAN
            } else {
                (value - base) / base
            }
        })
        .collect())
}

/// Per-property fractional deviations, index-aligned with the compared series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviationSeries {
    len: usize,
    values: BTreeMap<Property, Vec<f64>>,
}

impl DeviationSeries {
    pub fn get(&self, property: Property) -> Option<&[f64]> {
        self.values.get(&property).map(Vec::as_slice)
    }

    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Compare every property present in both series.
///
/// Both series must come from the same grid; differing lengths are an
/// alignment error.
pub fn deviation(modified: &PropertySeries, reference: &PropertySeries) -> Result<DeviationSeries> {
    if modified.len() != reference.len() {
        return Err(MantleError::Alignment {
            expected: reference.len(),
            found: modified.len(),
        });
    }

    let mut values = BTreeMap::new();
    for property in reference.properties() {
        let Some(changed) = modified.get(property) else {
            continue;
        };
        let base = reference.require(property)?;
        if base.contains(&0.0) {
            warn!("reference '{}' has zero entries; their deviation is NaN", property);
        }
        values.insert(property, fractional_deviation(changed, base)?);
    }

    Ok(DeviationSeries {
        len: reference.len(),
        values,
    })
}
