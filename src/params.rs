//! Physical constants of the reaction and the reactor vessel.
//!
//! The reference system is the saponification of ethyl acetate with sodium
//! hydroxide in a jacketed glass cylinder cooled by water at 295 K. Rate data
//! follow Borovinskaya et al. (2019, Applied Sciences 9(3)); the reaction
//! enthalpy combines NIST and Active Thermochemical Tables values.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Name recorded in run metadata for the reference reaction.
pub const REACTION_NAME: &str = "ethyl_acetate_saponification";

/// Reference temperature (K) for the reaction enthalpy correction.
pub const REFERENCE_TEMPERATURE: f64 = 298.0;

/// Geometry and wall properties of a jacketed cylindrical vessel.
///
/// Used to derive the heat-transfer-area-to-volume term `UA/V`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselGeometry {
    /// Interior diameter (m).
    pub diameter: f64,
    /// Interior height (m).
    pub height: f64,
    /// Wall thickness (m).
    pub wall_thickness: f64,
    /// Wall thermal conductivity (W m^-1 K^-1).
    pub wall_conductivity: f64,
    /// Interior convection coefficient (W m^-2 K^-1).
    pub inner_film_coefficient: f64,
    /// Exterior (jacket) convection coefficient (W m^-2 K^-1).
    pub outer_film_coefficient: f64,
}

impl Default for VesselGeometry {
    fn default() -> Self {
        Self {
            diameter: 0.0635,
            height: 0.316,
            wall_thickness: 0.005,
            wall_conductivity: 1.1,
            inner_film_coefficient: 500.0,
            outer_film_coefficient: 1000.0,
        }
    }
}

impl VesselGeometry {
    /// Overall heat-transfer coefficient U (W m^-2 K^-1) through film, wall, film.
    #[must_use]
    pub fn overall_coefficient(&self) -> f64 {
        1.0 / (1.0 / self.inner_film_coefficient
            + self.wall_thickness / self.wall_conductivity
            + 1.0 / self.outer_film_coefficient)
    }

    /// Exterior heat-exchange area (m^2): jacketed side wall plus half the end caps.
    #[must_use]
    pub fn exchange_area(&self) -> f64 {
        let outer_diameter = self.diameter + 2.0 * self.wall_thickness;
        let outer_height = self.height + 2.0 * self.wall_thickness;
        PI * outer_diameter * outer_height + PI * outer_diameter.powi(2) / 2.0
    }

    /// Interior liquid volume (m^3).
    #[must_use]
    pub fn volume(&self) -> f64 {
        PI * (self.diameter / 2.0).powi(2) * self.height
    }

    /// `UA/V` (W m^-3 K^-1), the constant that appears in the energy balance.
    #[must_use]
    pub fn ua_per_volume(&self) -> f64 {
        self.overall_coefficient() * self.exchange_area() / self.volume()
    }

    /// Validate the geometry.
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("diameter", self.diameter)?;
        positive("height", self.height)?;
        positive("wall_thickness", self.wall_thickness)?;
        positive("wall_conductivity", self.wall_conductivity)?;
        positive("inner_film_coefficient", self.inner_film_coefficient)?;
        positive("outer_film_coefficient", self.outer_film_coefficient)?;
        Ok(())
    }
}

/// Immutable constants consumed by the kinetic model.
///
/// Passed explicitly to [`KineticModel`](crate::kinetics::KineticModel) so that
/// tests can swap in alternate fluids or vessel geometries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalParameters {
    /// Ideal gas constant R (J mol^-1 K^-1).
    pub gas_constant: f64,
    /// Arrhenius pre-exponential factor Ar (m^3 mol^-1 s^-1).
    pub pre_exponential_factor: f64,
    /// Uncatalyzed activation energy Ea (J mol^-1).
    pub activation_energy: f64,
    /// Reaction enthalpy at 298 K (J mol^-1); negative for exothermic.
    pub reaction_enthalpy_ref: f64,
    /// Heat-transfer-area-to-volume term UA/V (W m^-3 K^-1).
    pub ua_per_volume: f64,
    /// Bulk heat capacity Cp (J kg^-1 K^-1), constant in temperature.
    pub heat_capacity: f64,
    /// Bulk density rho (kg m^-3).
    pub density: f64,
    /// Jacket coolant temperature (K).
    pub coolant_temperature: f64,
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self::ethyl_acetate_saponification()
    }
}

impl PhysicalParameters {
    /// Constants for ethyl acetate saponification in the default vessel.
    #[must_use]
    pub fn ethyl_acetate_saponification() -> Self {
        Self::from_vessel(&VesselGeometry::default(), 295.0)
    }

    /// Reference reaction constants with `UA/V` derived from a vessel geometry.
    #[must_use]
    pub fn from_vessel(vessel: &VesselGeometry, coolant_temperature: f64) -> Self {
        Self {
            gas_constant: 8.314,
            pre_exponential_factor: 10.0e6 / 1000.0,
            activation_energy: 45_380.0,
            reaction_enthalpy_ref: -50_210.0,
            ua_per_volume: vessel.ua_per_volume(),
            // Water dominates the bulk heat capacity.
            heat_capacity: 4100.0,
            density: 1050.0,
            coolant_temperature,
        }
    }

    /// Returns a copy with a different activation energy.
    #[must_use]
    pub const fn with_activation_energy(mut self, activation_energy: f64) -> Self {
        self.activation_energy = activation_energy;
        self
    }

    /// Validate the constants.
    ///
    /// Everything must be finite; everything but the reaction enthalpy must be
    /// strictly positive.
    pub fn validate(&self) -> Result<(), ValidationError> {
        positive("gas_constant", self.gas_constant)?;
        positive("pre_exponential_factor", self.pre_exponential_factor)?;
        positive("activation_energy", self.activation_energy)?;
        if !self.reaction_enthalpy_ref.is_finite() {
            return Err(ValidationError::NonFiniteParameter {
                field: "reaction_enthalpy_ref".to_string(),
                value: self.reaction_enthalpy_ref,
            });
        }
        positive("ua_per_volume", self.ua_per_volume)?;
        positive("heat_capacity", self.heat_capacity)?;
        positive("density", self.density)?;
        positive("coolant_temperature", self.coolant_temperature)?;
        Ok(())
    }
}

pub(crate) fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveParameter {
            field: field.to_string(),
            value,
        })
    }
}
