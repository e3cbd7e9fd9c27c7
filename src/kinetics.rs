//! Second-order kinetics coupled with the reactor energy balance.
//!
//! Species balances, with `rA = k(T) * CA * CB` and Arrhenius
//! `k(T) = Ar * exp(-Ea / (R T))`:
//!
//! ```text
//! dCA/dt = dCB/dt = -rA
//! dCC/dt = dCD/dt = +rA
//! ```
//!
//! Energy balance with negligible shaft work and a temperature-corrected
//! reaction enthalpy `dH(T) = dH_298 + Cp (T - 298)`:
//!
//! ```text
//! dT/dt = ( -UA/V (T - Tcool) - dH(T) rA ) / (rho Cp)
//! ```

use crate::params::{PhysicalParameters, REFERENCE_TEMPERATURE};
use crate::state::ReactorState;

/// Right-hand side of the reactor ODE system.
///
/// The activation energy is held separately from the shared constants because
/// each run may use a catalytically perturbed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KineticModel {
    params: PhysicalParameters,
    activation_energy: f64,
}

impl KineticModel {
    /// Model using the base activation energy from `params`.
    #[must_use]
    pub const fn new(params: PhysicalParameters) -> Self {
        Self {
            activation_energy: params.activation_energy,
            params,
        }
    }

    /// Model using an explicit (effective) activation energy.
    #[must_use]
    pub const fn with_activation_energy(params: PhysicalParameters, activation_energy: f64) -> Self {
        Self {
            params,
            activation_energy,
        }
    }

    /// The physical constants in use.
    #[must_use]
    pub const fn params(&self) -> &PhysicalParameters {
        &self.params
    }

    /// The effective activation energy (J/mol).
    #[must_use]
    pub const fn activation_energy(&self) -> f64 {
        self.activation_energy
    }

    /// Arrhenius rate constant at `temperature`.
    ///
    /// Non-positive or extreme temperatures yield non-finite values; they are
    /// returned as-is.
    #[must_use]
    pub fn rate_constant(&self, temperature: f64) -> f64 {
        self.params.pre_exponential_factor
            * (-self.activation_energy / (self.params.gas_constant * temperature)).exp()
    }

    /// Reaction enthalpy (J/mol) at `temperature`.
    #[must_use]
    pub fn reaction_enthalpy(&self, temperature: f64) -> f64 {
        self.params.reaction_enthalpy_ref
            + self.params.heat_capacity * (temperature - REFERENCE_TEMPERATURE)
    }

    /// Reaction rate rA (mol m^-3 s^-1).
    #[must_use]
    pub fn reaction_rate(&self, state: &ReactorState) -> f64 {
        self.rate_constant(state.temperature) * state.ca * state.cb
    }

    /// Instantaneous time derivative of `state`.
    #[must_use]
    pub fn derivative(&self, state: &ReactorState) -> ReactorState {
        let p = &self.params;
        let t = state.temperature;
        let ra = self.reaction_rate(state);

        let cooling = -p.ua_per_volume * (t - p.coolant_temperature);
        let generation = -self.reaction_enthalpy(t) * ra;

        ReactorState {
            ca: -ra,
            cb: -ra,
            cc: ra,
            cd: ra,
            temperature: (cooling + generation) / (p.density * p.heat_capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> KineticModel {
        KineticModel::new(PhysicalParameters::default())
    }

    #[test]
    fn mass_balance_symmetry() {
        let m = model();
        for &(ca, cb, t) in &[
            (1000.0, 1000.0, 298.15),
            (12.5, 1400.0, 353.0),
            (0.0, 700.0, 278.0),
            (1500.0, 3.0, 999.0),
        ] {
            let d = m.derivative(&ReactorState::charge(ca, cb, t));
            assert_eq!(d.ca, d.cb);
            assert_eq!(d.cc, d.cd);
            assert_eq!(d.ca, -d.cc);
            assert!(d.ca <= 0.0);
        }
    }

    #[test]
    fn rate_constant_follows_arrhenius() {
        let m = model();
        let p = m.params();
        let t = 310.0;
        let expected = p.pre_exponential_factor * (-p.activation_energy / (p.gas_constant * t)).exp();
        assert_eq!(m.rate_constant(t), expected);
        assert!(m.rate_constant(330.0) > m.rate_constant(310.0));
    }

    #[test]
    fn catalysis_speeds_up_reaction() {
        let params = PhysicalParameters::default();
        let base = KineticModel::new(params);
        let catalyzed = KineticModel::with_activation_energy(params, params.activation_energy * 0.5);
        let state = ReactorState::charge(500.0, 500.0, 300.0);
        assert!(catalyzed.reaction_rate(&state) > base.reaction_rate(&state));
    }

    #[test]
    fn enthalpy_correction_is_zero_at_reference() {
        let m = model();
        assert_eq!(m.reaction_enthalpy(REFERENCE_TEMPERATURE), m.params().reaction_enthalpy_ref);
    }

    #[test]
    fn no_reaction_relaxes_toward_coolant() {
        let m = model();
        // Without reactant B nothing reacts; only jacket cooling acts.
        let hot = m.derivative(&ReactorState::charge(1000.0, 0.0, 320.0));
        assert_eq!(hot.ca, 0.0);
        assert!(hot.temperature < 0.0);

        let cold = m.derivative(&ReactorState::charge(1000.0, 0.0, 280.0));
        assert!(cold.temperature > 0.0);
    }

    #[test]
    fn exothermic_reaction_heats_the_charge() {
        let m = model();
        let coolant = m.params().coolant_temperature;
        let d = m.derivative(&ReactorState::charge(1000.0, 1000.0, coolant));
        assert!(d.temperature > 0.0);
    }

    #[test]
    fn zero_temperature_propagates_non_finite() {
        let m = model();
        let d = m.derivative(&ReactorState::charge(1000.0, 1000.0, 0.0));
        // exp(-inf) = 0 so the rate vanishes, but a negative temperature blows up.
        assert!(d.is_finite());
        let d = m.derivative(&ReactorState::charge(1000.0, 1000.0, -1.0e-3));
        assert!(!d.is_finite());
    }
}
