use crate::error::{MantleError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named scalar that can be requested from a rock or a seismic model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Pressure,
    Temperature,
    Gravity,
    Density,
    PWaveVelocity,
    SWaveVelocity,
    BulkSoundVelocity,
    AdiabaticBulkModulus,
    IsothermalBulkModulus,
    ShearModulus,
    Gruneisen,
    ThermalExpansivity,
}

impl Property {
    /// Short column label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Property::Pressure => "pressure_pa",
            Property::Temperature => "temperature_k",
            Property::Gravity => "gravity_m_s2",
            Property::Density => "density_kg_m3",
            Property::PWaveVelocity => "v_p_m_s",
            Property::SWaveVelocity => "v_s_m_s",
            Property::BulkSoundVelocity => "v_phi_m_s",
            Property::AdiabaticBulkModulus => "k_s_pa",
            Property::IsothermalBulkModulus => "k_t_pa",
            Property::ShearModulus => "g_pa",
            Property::Gruneisen => "gruneisen",
            Property::ThermalExpansivity => "alpha_per_k",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered (pressure, temperature) sample points.
///
/// Pressure is conventionally increasing but that is not enforced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleGrid {
    pressures_pa: Vec<f64>,
    temperatures_k: Vec<f64>,
}

impl SampleGrid {
    pub fn new(pressures_pa: Vec<f64>, temperatures_k: Vec<f64>) -> Result<Self> {
        if pressures_pa.len() != temperatures_k.len() {
            return Err(MantleError::Alignment {
                expected: pressures_pa.len(),
                found: temperatures_k.len(),
            });
        }
        Ok(Self {
            pressures_pa,
            temperatures_k,
        })
    }

    pub fn pressures(&self) -> &[f64] {
        &self.pressures_pa
    }

    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures_k
    }

    pub fn len(&self) -> usize {
        self.pressures_pa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressures_pa.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.pressures_pa
            .iter()
            .copied()
            .zip(self.temperatures_k.iter().copied())
    }
}

/// Parallel series of derived scalars, index-aligned with the grid they came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySeries {
    len: usize,
    values: BTreeMap<Property, Vec<f64>>,
}

impl PropertySeries {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            values: BTreeMap::new(),
        }
    }

    /// Add (or replace) one column; its length must match the series.
    pub fn insert(&mut self, property: Property, values: Vec<f64>) -> Result<()> {
        if values.len() != self.len {
            return Err(MantleError::Alignment {
                expected: self.len,
                found: values.len(),
            });
        }
        self.values.insert(property, values);
        Ok(())
    }

    pub fn get(&self, property: Property) -> Option<&[f64]> {
        self.values.get(&property).map(Vec::as_slice)
    }

    /// Like `get`, but a missing column is an evaluation error
    pub fn require(&self, property: Property) -> Result<&[f64]> {
        self.get(property).ok_or_else(|| {
            MantleError::Evaluation(format!("series has no '{}' column", property))
        })
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_requires_matching_lengths() {
        assert!(SampleGrid::new(vec![1.0, 2.0], vec![300.0, 400.0]).is_ok());
        let result = SampleGrid::new(vec![1.0, 2.0], vec![300.0]);
        assert!(matches!(result, Err(MantleError::Alignment { expected: 2, found: 1 })));
    }

    #[test]
    fn test_grid_points() {
        let grid = SampleGrid::new(vec![1.0, 2.0], vec![300.0, 400.0]).unwrap();
        let points: Vec<_> = grid.points().collect();
        assert_eq!(points, vec![(1.0, 300.0), (2.0, 400.0)]);
        assert_eq!(grid.len(), 2);
        assert!(!grid.is_empty());
    }

    #[test]
    fn test_series_columns() {
        let mut series = PropertySeries::new(3);
        series.insert(Property::Density, vec![4000.0, 4500.0, 5000.0]).unwrap();
        assert!(series.insert(Property::SWaveVelocity, vec![6000.0]).is_err());

        assert_eq!(series.get(Property::Density), Some(&[4000.0, 4500.0, 5000.0][..]));
        assert_eq!(series.get(Property::SWaveVelocity), None);
        assert!(series.require(Property::SWaveVelocity).is_err());
        assert_eq!(series.properties().collect::<Vec<_>>(), vec![Property::Density]);
    }

    #[test]
    fn test_property_names_round_trip_through_json() {
        let json = serde_json::to_string(&Property::SWaveVelocity).unwrap();
        assert_eq!(json, "\"s_wave_velocity\"");
        let parsed: Property = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Property::SWaveVelocity);
    }
}
