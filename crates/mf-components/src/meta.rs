//! Shared component identity and rating data.

use crate::error::{ComponentError, ComponentResult};
use mf_core::units::{kw, rpm, to_kw, to_rpm, AngularSpeed, Power};
use serde::{Deserialize, Serialize};

/// Tolerance on the load ratio before a component counts as overloaded.
pub const LOAD_TOLERANCE: f64 = 0.01;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    None,
    MainEngine,
    AuxEngine,
    Generator,
    PropulsionDrive,
    OtherLoad,
    PtiPto,
    BatterySystem,
    FuelCellSystem,
    Rectifier,
    MainEngineWithGearbox,
    ElectricMotor,
    Genset,
    Transformer,
    Inverter,
    CircuitBreaker,
    ActiveFrontEnd,
    PowerConverter,
    SynchronousMachine,
    InductionMachine,
    Gearbox,
    FuelCell,
    PropellerLoad,
    OtherMechanicalLoad,
    Battery,
    Supercapacitor,
    SupercapacitorSystem,
    ShorePower,
    Cogas,
    Coges,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PowerRole {
    None,
    Source,
    Consumer,
    PtiPto,
    EnergyStorage,
    Transmission,
}

/// Advisory ramp limits in percent of rated power per second. The solver
/// does not enforce these; they are carried for downstream consumers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RampLimits {
    pub up_percent_per_second: f64,
    pub down_percent_per_second: f64,
}

/// Identity and ratings shared by every component.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentMeta {
    pub uid: String,
    pub name: String,
    pub kind: ComponentKind,
    pub role: PowerRole,
    pub rated_power: Power,
    pub rated_speed: AngularSpeed,
    /// Ordering among sources that must carry base load first; 0 means no
    /// base-load priority.
    pub base_load_order: u32,
    pub ramp_limits: Option<RampLimits>,
}

impl ComponentMeta {
    pub fn new(
        name: &str,
        kind: ComponentKind,
        role: PowerRole,
        rated_power_kw: f64,
    ) -> ComponentResult<Self> {
        if !(rated_power_kw.is_finite() && rated_power_kw > 0.0) {
            return Err(ComponentError::Configuration {
                what: format!(
                    "rated power of component '{name}' must be positive, got {rated_power_kw}"
                ),
            });
        }
        Ok(Self {
            uid: name.to_string(),
            name: name.to_string(),
            kind,
            role,
            rated_power: kw(rated_power_kw),
            rated_speed: rpm(0.0),
            base_load_order: 0,
            ramp_limits: None,
        })
    }

    pub fn with_uid(mut self, uid: &str) -> Self {
        self.uid = uid.to_string();
        self
    }

    pub fn with_rated_speed_rpm(mut self, speed_rpm: f64) -> Self {
        self.rated_speed = rpm(speed_rpm);
        self
    }

    pub fn with_base_load_order(mut self, order: u32) -> Self {
        self.base_load_order = order;
        self
    }

    pub fn with_ramp_limits(mut self, limits: RampLimits) -> Self {
        self.ramp_limits = Some(limits);
        self
    }

    pub fn rated_kw(&self) -> f64 {
        to_kw(self.rated_power)
    }

    pub fn rated_rpm(&self) -> f64 {
        to_rpm(self.rated_speed)
    }

    /// Load ratio for a signed power in kW.
    pub fn load_ratio(&self, power_kw: f64) -> f64 {
        power_kw.abs() / self.rated_kw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_rated_power() {
        assert!(ComponentMeta::new("m", ComponentKind::Generator, PowerRole::Source, 0.0).is_err());
        assert!(
            ComponentMeta::new("m", ComponentKind::Generator, PowerRole::Source, -10.0).is_err()
        );
    }

    #[test]
    fn load_ratio_uses_absolute_power() {
        let meta =
            ComponentMeta::new("m", ComponentKind::Generator, PowerRole::Source, 1000.0).unwrap();
        assert!((meta.load_ratio(500.0) - 0.5).abs() < 1e-12);
        assert!((meta.load_ratio(-500.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn builder_setters() {
        let meta = ComponentMeta::new("m", ComponentKind::Genset, PowerRole::Source, 1000.0)
            .unwrap()
            .with_uid("uid-1")
            .with_rated_speed_rpm(720.0)
            .with_base_load_order(2);
        assert_eq!(meta.uid, "uid-1");
        assert!((meta.rated_rpm() - 720.0).abs() < 1e-9);
        assert_eq!(meta.base_load_order, 2);
    }
}
