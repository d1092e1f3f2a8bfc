//! Unit helpers for pressures and depths.
//!
//! Everything inside the crate is SI; these are for printed output.

use crate::constants::{GPA_TO_PA, KM_TO_M};

pub fn pa_to_gpa(pressure_pa: f64) -> f64 {
    pressure_pa / GPA_TO_PA
}

pub fn m_to_km(depth_m: f64) -> f64 {
    depth_m / KM_TO_M
}
