use crate::composite::{Composite, CompositeState};
use crate::error::{MantleError, Result};
use crate::property::{Property, PropertySeries, SampleGrid};
use log::debug;

type Accessor = fn(&CompositeState) -> f64;

/// How to read `property` off a rock's state; `None` for properties a rock cannot produce.
fn accessor(property: Property) -> Option<Accessor> {
    match property {
        Property::Pressure => Some(|s: &CompositeState| s.pressure_pa),
        Property::Temperature => Some(|s: &CompositeState| s.temperature_k),
        Property::Density => Some(|s: &CompositeState| s.density_kg_m3),
        Property::PWaveVelocity => Some(CompositeState::p_wave_velocity),
        Property::SWaveVelocity => Some(CompositeState::s_wave_velocity),
        Property::BulkSoundVelocity => Some(CompositeState::bulk_sound_velocity),
        Property::AdiabaticBulkModulus => Some(|s: &CompositeState| s.adiabatic_bulk_modulus_pa),
        Property::IsothermalBulkModulus => Some(|s: &CompositeState| s.isothermal_bulk_modulus_pa),
        Property::ShearModulus => Some(|s: &CompositeState| s.shear_modulus_pa),
        Property::Gruneisen => Some(|s: &CompositeState| s.gruneisen),
        Property::ThermalExpansivity => Some(|s: &CompositeState| s.thermal_expansivity_per_k),
        Property::Gravity => None,
    }
}

/// Evaluate `properties` of `composite` at every point of `grid`.
///
/// The output columns are index-aligned with the grid. The first sample that
/// cannot be evaluated aborts the whole call.
pub fn evaluate(composite: &Composite, grid: &SampleGrid, properties: &[Property]) -> Result<PropertySeries> {
    // resolve every request before touching the grid
    let readers = properties
        .iter()
        .map(|property| {
            accessor(*property).ok_or_else(|| {
                MantleError::Evaluation(format!(
                    "{}: cannot produce '{}'",
                    composite.name(),
                    property
                ))
            })
        })
        .collect::<Result<Vec<Accessor>>>()?;

    debug!(
        "evaluating {} over {} samples ({} properties)",
        composite.name(),
        grid.len(),
        properties.len()
    );

    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(grid.len()); properties.len()];
    for (pressure, temperature) in grid.points() {
        let state = composite.state_at(pressure, temperature)?;
        for (column, read) in columns.iter_mut().zip(&readers) {
            column.push(read(&state));
        }
    }

    let mut series = PropertySeries::new(grid.len());
    for (property, column) in properties.iter().zip(columns) {
        series.insert(*property, column)?;
    }
    Ok(series)
}
