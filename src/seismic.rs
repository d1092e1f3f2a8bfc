//! 1D seismic reference models.
//!
//! `Prem` evaluates the isotropic Preliminary Reference Earth Model
//! (Dziewonski & Anderson, 1981) from its regional polynomials. `SeismicTable`
//! holds any tabulated model, e.g. one loaded from JSON.

use crate::constants::{
    EARTH_RADIUS_KM, EARTH_RADIUS_M, G_CM3_TO_KG_M3, GRAVITATIONAL_CONSTANT, KM_S_TO_M_S, KM_TO_M,
};
use crate::error::{MantleError, Result};
use crate::json_parser::JsonParser;
use crate::math_utils::{interpolate, lerp};
use crate::property::{Property, PropertySeries};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;

/// A depth-indexed reference model.
pub trait SeismicModel {
    fn name(&self) -> &str;

    /// One property at one depth (m).
    fn property_at(&self, property: Property, depth_m: f64) -> Result<f64>;

    /// Depths (m) the model is natively defined on, within `[min_depth_m, max_depth_m]`.
    fn internal_depth_list(&self, min_depth_m: f64, max_depth_m: f64) -> Vec<f64>;

    /// Evaluate several properties at several depths, index-aligned with `depths_m`.
    fn evaluate(&self, properties: &[Property], depths_m: &[f64]) -> Result<PropertySeries> {
        let mut series = PropertySeries::new(depths_m.len());
        for property in properties {
            let column = depths_m
                .iter()
                .map(|depth| self.property_at(*property, *depth))
                .collect::<Result<Vec<f64>>>()?;
            series.insert(*property, column)?;
        }
        Ok(series)
    }

    fn pressures(&self, depths_m: &[f64]) -> Result<Vec<f64>> {
        depths_m
            .iter()
            .map(|depth| self.property_at(Property::Pressure, *depth))
            .collect()
    }
}

fn unsupported(model: &str, property: Property) -> MantleError {
    MantleError::Evaluation(format!("{} does not provide '{}'", model, property))
}

/// One PREM shell: outer radius and cubic coefficients in x = r / R.
struct PremRegion {
    top_radius_km: f64,
    density: [f64; 4],
    vp: [f64; 4],
    vs: [f64; 4],
}

const fn region(top_radius_km: f64, density: [f64; 4], vp: [f64; 4], vs: [f64; 4]) -> PremRegion {
    PremRegion {
        top_radius_km,
        density,
        vp,
        vs,
    }
}

const LOWER_MANTLE_DENSITY: [f64; 4] = [7.9565, -6.4761, 5.5283, -3.0807];

static PREM_REGIONS: [PremRegion; 12] = [
    // inner core
    region(1221.5, [13.0885, 0.0, -8.8381, 0.0], [11.2622, 0.0, -6.3640, 0.0], [3.6678, 0.0, -4.4475, 0.0]),
    // outer core
    region(3480.0, [12.5815, -1.2638, -3.6426, -5.5281], [11.0487, -4.0362, 4.8023, -13.5732], [0.0; 4]),
    // D''
    region(3630.0, LOWER_MANTLE_DENSITY, [15.3891, -5.3181, 5.5242, -2.5514], [6.9254, 1.4672, -2.0834, 0.9783]),
    // lower mantle
    region(5600.0, LOWER_MANTLE_DENSITY, [24.9520, -40.4673, 51.4832, -26.6419], [11.1671, -13.7818, 17.4575, -9.2777]),
    region(5701.0, LOWER_MANTLE_DENSITY, [29.2766, -23.6027, 5.5242, -2.5514], [22.3459, -17.2473, -2.0834, 0.9783]),
    // transition zone
    region(5771.0, [5.3197, -1.4836, 0.0, 0.0], [19.0957, -9.8672, 0.0, 0.0], [9.9839, -4.9324, 0.0, 0.0]),
    region(5971.0, [11.2494, -8.0298, 0.0, 0.0], [39.7027, -32.6166, 0.0, 0.0], [22.3512, -18.5856, 0.0, 0.0]),
    region(6151.0, [7.1089, -3.8045, 0.0, 0.0], [20.3926, -12.2569, 0.0, 0.0], [8.9496, -4.4597, 0.0, 0.0]),
    // low-velocity zone and lid (isotropic)
    region(6346.6, [2.6910, 0.6924, 0.0, 0.0], [4.1875, 3.9382, 0.0, 0.0], [2.1519, 2.3481, 0.0, 0.0]),
    // crust
    region(6356.0, [2.900, 0.0, 0.0, 0.0], [6.800, 0.0, 0.0, 0.0], [3.900, 0.0, 0.0, 0.0]),
    region(6368.0, [2.600, 0.0, 0.0, 0.0], [5.800, 0.0, 0.0, 0.0], [3.200, 0.0, 0.0, 0.0]),
    // ocean
    region(6371.0, [1.020, 0.0, 0.0, 0.0], [1.450, 0.0, 0.0, 0.0], [0.0; 4]),
];

fn cubic(coefficients: &[f64; 4], x: f64) -> f64 {
    coefficients[0] + x * (coefficients[1] + x * (coefficients[2] + x * coefficients[3]))
}

/// Discontinuities belong to the deeper shell.
fn prem_region(radius_km: f64) -> &'static PremRegion {
    PREM_REGIONS
        .iter()
        .find(|r| radius_km <= r.top_radius_km)
        .unwrap_or(&PREM_REGIONS[PREM_REGIONS.len() - 1])
}

/// Spacing of the hydrostatic integration and of the internal depth list
const PREM_INTEGRATION_STEP_KM: f64 = 1.0;
const PREM_NODE_SPACING_KM: f64 = 10.0;

/// Gravity and pressure on a 1 km radius grid, integrated from the density profile.
struct HydrostaticProfile {
    gravity_m_s2: Vec<f64>,
    pressure_pa: Vec<f64>,
}

static PREM_HYDROSTATIC: Lazy<HydrostaticProfile> = Lazy::new(|| {
    let n = (EARTH_RADIUS_KM / PREM_INTEGRATION_STEP_KM).round() as usize;
    let dr_m = PREM_INTEGRATION_STEP_KM * KM_TO_M;
    let mid_density = |i: usize| -> f64 {
        let r_km = (i as f64 - 0.5) * PREM_INTEGRATION_STEP_KM;
        cubic(&prem_region(r_km).density, r_km / EARTH_RADIUS_KM) * G_CM3_TO_KG_M3
    };

    // enclosed mass, midpoint rule
    let mut gravity = vec![0.0; n + 1];
    let mut mass = 0.0;
    for i in 1..=n {
        let r_mid_m = (i as f64 - 0.5) * dr_m;
        mass += 4.0 * PI * r_mid_m * r_mid_m * mid_density(i) * dr_m;
        let r_m = i as f64 * dr_m;
        gravity[i] = GRAVITATIONAL_CONSTANT * mass / (r_m * r_m);
    }

    // hydrostatic pressure, integrated inward from a free surface
    let mut pressure = vec![0.0; n + 1];
    for i in (1..=n).rev() {
        let g_mid = 0.5 * (gravity[i] + gravity[i - 1]);
        pressure[i - 1] = pressure[i] + mid_density(i) * g_mid * dr_m;
    }

    HydrostaticProfile {
        gravity_m_s2: gravity,
        pressure_pa: pressure,
    }
});

impl HydrostaticProfile {
    fn at(values: &[f64], radius_km: f64) -> f64 {
        let position = radius_km / PREM_INTEGRATION_STEP_KM;
        let lower = (position.floor() as usize).min(values.len() - 1);
        let upper = (lower + 1).min(values.len() - 1);
        lerp(values[lower], values[upper], position - lower as f64)
    }
}

/// Isotropic PREM.
#[derive(Debug, Clone, Default)]
pub struct Prem;

impl Prem {
    pub fn new() -> Self {
        Prem
    }

    fn radius_km(&self, depth_m: f64) -> Result<f64> {
        let depth_km = depth_m / KM_TO_M;
        if !depth_km.is_finite() || !(0.0..=EARTH_RADIUS_KM).contains(&depth_km) {
            return Err(MantleError::Evaluation(format!(
                "PREM: depth {:.0} m outside [0, {:.0}] m",
                depth_m, EARTH_RADIUS_M
            )));
        }
        Ok(EARTH_RADIUS_KM - depth_km)
    }
}

impl SeismicModel for Prem {
    fn name(&self) -> &str {
        "PREM"
    }

    fn property_at(&self, property: Property, depth_m: f64) -> Result<f64> {
        let radius_km = self.radius_km(depth_m)?;
        let shell = prem_region(radius_km);
        let x = radius_km / EARTH_RADIUS_KM;
        let vp = cubic(&shell.vp, x) * KM_S_TO_M_S;
        let vs = cubic(&shell.vs, x) * KM_S_TO_M_S;
        match property {
            Property::Density => Ok(cubic(&shell.density, x) * G_CM3_TO_KG_M3),
            Property::PWaveVelocity => Ok(vp),
            Property::SWaveVelocity => Ok(vs),
            Property::BulkSoundVelocity => Ok((vp * vp - 4.0 / 3.0 * vs * vs).sqrt()),
            Property::Pressure => Ok(HydrostaticProfile::at(&PREM_HYDROSTATIC.pressure_pa, radius_km)),
            Property::Gravity => Ok(HydrostaticProfile::at(&PREM_HYDROSTATIC.gravity_m_s2, radius_km)),
            other => Err(unsupported(self.name(), other)),
        }
    }

    fn internal_depth_list(&self, min_depth_m: f64, max_depth_m: f64) -> Vec<f64> {
        let nodes = (EARTH_RADIUS_KM / PREM_NODE_SPACING_KM).floor() as usize;
        (0..=nodes)
            .map(|i| i as f64 * PREM_NODE_SPACING_KM)
            .chain(std::iter::once(EARTH_RADIUS_KM))
            .map(|depth_km| depth_km * KM_TO_M)
            .filter(|depth| *depth >= min_depth_m && *depth <= max_depth_m)
            .collect()
    }
}

/// A model given as columns over ascending depth nodes, interpolated linearly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicTable {
    pub name: String,
    pub depths_m: Vec<f64>,
    pub pressure_pa: Vec<f64>,
    #[serde(default)]
    pub gravity_m_s2: Option<Vec<f64>>,
    pub density_kg_m3: Vec<f64>,
    pub v_p_m_s: Vec<f64>,
    pub v_s_m_s: Vec<f64>,
}

impl SeismicTable {
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        let table: SeismicTable = JsonParser::from_str(json_str)?;
        table.check()?;
        Ok(table)
    }

    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let table: SeismicTable = JsonParser::from_file(file_path)?;
        table.check()?;
        Ok(table)
    }

    /// Sample another model on `depths_m`.
    pub fn tabulate(model: &dyn SeismicModel, depths_m: &[f64]) -> Result<Self> {
        let column = |property: Property| -> Result<Vec<f64>> {
            depths_m.iter().map(|d| model.property_at(property, *d)).collect()
        };
        let table = SeismicTable {
            name: model.name().to_string(),
            depths_m: depths_m.to_vec(),
            pressure_pa: column(Property::Pressure)?,
            gravity_m_s2: column(Property::Gravity).ok(),
            density_kg_m3: column(Property::Density)?,
            v_p_m_s: column(Property::PWaveVelocity)?,
            v_s_m_s: column(Property::SWaveVelocity)?,
        };
        table.check()?;
        Ok(table)
    }

    fn check(&self) -> Result<()> {
        let expected = self.depths_m.len();
        let mut columns = vec![&self.pressure_pa, &self.density_kg_m3, &self.v_p_m_s, &self.v_s_m_s];
        if let Some(gravity) = &self.gravity_m_s2 {
            columns.push(gravity);
        }
        if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
            return Err(MantleError::Alignment {
                expected,
                found: bad.len(),
            });
        }
        if self.depths_m.windows(2).any(|w| w[1] <= w[0]) {
            return Err(MantleError::Evaluation(format!(
                "{}: depth nodes must be strictly increasing",
                self.name
            )));
        }
        Ok(())
    }

    fn lookup(&self, values: &[f64], depth_m: f64) -> Result<f64> {
        interpolate(&self.depths_m, values, depth_m).ok_or_else(|| {
            MantleError::Evaluation(format!(
                "{}: depth {:.0} m outside the table",
                self.name, depth_m
            ))
        })
    }
}

impl SeismicModel for SeismicTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn property_at(&self, property: Property, depth_m: f64) -> Result<f64> {
        match property {
            Property::Pressure => self.lookup(&self.pressure_pa, depth_m),
            Property::Density => self.lookup(&self.density_kg_m3, depth_m),
            Property::PWaveVelocity => self.lookup(&self.v_p_m_s, depth_m),
            Property::SWaveVelocity => self.lookup(&self.v_s_m_s, depth_m),
            Property::BulkSoundVelocity => {
                let vp = self.lookup(&self.v_p_m_s, depth_m)?;
                let vs = self.lookup(&self.v_s_m_s, depth_m)?;
                Ok((vp * vp - 4.0 / 3.0 * vs * vs).sqrt())
            }
            Property::Gravity => match &self.gravity_m_s2 {
                Some(gravity) => self.lookup(gravity, depth_m),
                None => Err(unsupported(&self.name, property)),
            },
            other => Err(unsupported(&self.name, other)),
        }
    }

    fn internal_depth_list(&self, min_depth_m: f64, max_depth_m: f64) -> Vec<f64> {
        self.depths_m
            .iter()
            .copied()
            .filter(|depth| *depth >= min_depth_m && *depth <= max_depth_m)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math_utils::linspace;
    use crate::assert_deviation;
    use approx::assert_relative_eq;
    use more_asserts::{assert_gt, assert_lt};

    #[test]
    fn test_prem_values_at_1000_km() {
        let prem = Prem::new();
        // published PREM: rho 4.580 g/cm³, vp 11.463 km/s, vs 6.397 km/s
        assert_deviation!(prem.property_at(Property::Density, 1000.0e3).unwrap(), 4580.0, 0.1);
        assert_deviation!(prem.property_at(Property::PWaveVelocity, 1000.0e3).unwrap(), 11463.0, 0.1);
        assert_deviation!(prem.property_at(Property::SWaveVelocity, 1000.0e3).unwrap(), 6397.0, 0.1);
    }

    #[test]
    fn test_prem_hydrostatics() {
        let prem = Prem::new();
        assert_eq!(prem.property_at(Property::Pressure, 0.0).unwrap(), 0.0);
        assert_deviation!(prem.property_at(Property::Gravity, 0.0).unwrap(), 9.82, 1.0);
        // core-mantle boundary ~135.8 GPa, centre ~364 GPa
        assert_deviation!(prem.property_at(Property::Pressure, 2891.0e3).unwrap(), 135.8e9, 1.0);
        assert_deviation!(prem.property_at(Property::Pressure, 6371.0e3).unwrap(), 363.9e9, 1.0);
        assert_relative_eq!(prem.property_at(Property::Gravity, 6371.0e3).unwrap(), 0.0);
    }

    #[test]
    fn test_prem_outer_core_has_no_shear() {
        let prem = Prem::new();
        assert_eq!(prem.property_at(Property::SWaveVelocity, 4000.0e3).unwrap(), 0.0);
        assert_gt!(prem.property_at(Property::SWaveVelocity, 2800.0e3).unwrap(), 7000.0);
    }

    #[test]
    fn test_prem_rejects_bad_requests() {
        let prem = Prem::new();
        assert!(prem.property_at(Property::Density, -1.0).is_err());
        assert!(prem.property_at(Property::Density, 7000.0e3).is_err());
        assert!(prem.property_at(Property::Temperature, 1000.0e3).is_err());
    }

    #[test]
    fn test_prem_evaluate_is_aligned() {
        let prem = Prem::new();
        let depths = linspace(750.0e3, 2700.0e3, 20);
        let series = prem
            .evaluate(&[Property::Pressure, Property::SWaveVelocity], &depths)
            .unwrap();
        assert_eq!(series.len(), 20);
        let pressures = series.get(Property::Pressure).unwrap();
        for pair in pressures.windows(2) {
            assert_lt!(pair[0], pair[1]);
        }
        assert_eq!(prem.pressures(&depths).unwrap(), pressures);
    }

    #[test]
    fn test_prem_internal_depth_list() {
        let prem = Prem::new();
        let depths = prem.internal_depth_list(750.0e3, 2700.0e3);
        assert_eq!(depths.first(), Some(&750.0e3));
        assert_eq!(depths.last(), Some(&2700.0e3));
        assert_eq!(depths.len(), 196);

        let all = prem.internal_depth_list(0.0, 1.0e9);
        assert_eq!(all.last(), Some(&6371.0e3));
    }

    #[test]
    fn test_table_interpolates_tabulated_prem() {
        let prem = Prem::new();
        let nodes = prem.internal_depth_list(700.0e3, 2800.0e3);
        let table = SeismicTable::tabulate(&prem, &nodes).unwrap();

        let exact = prem.property_at(Property::SWaveVelocity, 1505.0e3).unwrap();
        let interpolated = table.property_at(Property::SWaveVelocity, 1505.0e3).unwrap();
        assert_relative_eq!(exact, interpolated, max_relative = 1e-4);
        assert!(table.property_at(Property::Density, 3000.0e3).is_err());
        assert_eq!(table.internal_depth_list(1000.0e3, 1020.0e3), vec![1000.0e3, 1010.0e3, 1020.0e3]);
    }

    #[test]
    fn test_table_from_json() {
        let json = r#"{
            "name": "toy",
            "depths_m": [0.0, 1000.0],
            "pressure_pa": [0.0, 1.0e7],
            "density_kg_m3": [3000.0, 3100.0],
            "v_p_m_s": [8000.0, 8100.0],
            "v_s_m_s": [4500.0, 4600.0]
        }"#;
        let table = SeismicTable::from_json_str(json).unwrap();
        assert_eq!(table.name(), "toy");
        assert_relative_eq!(table.property_at(Property::Density, 500.0).unwrap(), 3050.0);
        assert!(table.property_at(Property::Gravity, 500.0).is_err());

        let ragged = json.replace("[4500.0, 4600.0]", "[4500.0]");
        assert!(matches!(
            SeismicTable::from_json_str(&ragged),
            Err(MantleError::Alignment { expected: 2, found: 1 })
        ));
    }
}
