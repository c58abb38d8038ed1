//! Topology schema definitions.
//!
//! This is the wire format describing a machinery system: switchboards and
//! shaft lines carrying tagged subsystem definitions. Powers are kW,
//! speeds rpm, curves are tabulated over load ratio.

use mf_components::{ComponentKind, EngineCycle, NoxCalculationMethod};
use mf_fuel::{EmissionSpecies, FuelKind, FuelOrigin};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemDef {
    pub name: String,
    pub propulsion_type: PropulsionType,
    #[serde(default)]
    pub fuel_storage: Vec<FuelStorageDef>,
    #[serde(default = "default_max_load_percentage")]
    pub maximum_allowed_genset_load_percentage: f64,
    #[serde(default = "default_max_load_percentage")]
    pub maximum_allowed_fuel_cell_load_percentage: f64,
    #[serde(default)]
    pub average_base_load_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electric_system: Option<ElectricSystemDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanical_system: Option<MechanicalSystemDef>,
}

fn default_max_load_percentage() -> f64 {
    100.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PropulsionType {
    Mechanical,
    Electric,
    Hybrid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuelStorageDef {
    pub fuel: FuelKind,
    pub capacity_kg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElectricSystemDef {
    pub switchboards: Vec<SwitchboardDef>,
    #[serde(default)]
    pub bus_ties: Vec<BusTieDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusTieDef {
    pub switchboards: (u32, u32),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SwitchboardDef {
    pub id: u32,
    pub subsystems: Vec<SubsystemDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MechanicalSystemDef {
    pub shaftlines: Vec<ShaftLineDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShaftLineDef {
    pub id: u32,
    pub subsystems: Vec<SubsystemDef>,
}

/// Fields shared by every subsystem variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CommonDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Position along the bus, for drawing and reporting only.
    #[serde(default)]
    pub order_from_bus: u32,
    #[serde(default)]
    pub base_load_order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ramp_limits: Option<RampLimitsDef>,
}

/// Advisory ramp limits; the solver carries but does not enforce them.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RampLimitsDef {
    pub up_percent_per_second: f64,
    pub down_percent_per_second: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SubsystemDef {
    Genset {
        name: String,
        #[serde(flatten)]
        common: CommonDef,
        engine: EngineDef,
        generator: MachineDef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rectifier: Option<MachineDef>,
    },
    FuelCellSystem {
        name: String,
        #[serde(flatten)]
        common: CommonDef,
        rated_power_kw: f64,
        efficiency: CurveDef,
        fuel: FuelSpecDef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        converter: Option<MachineDef>,
        #[serde(default = "default_number_modules")]
        number_modules: u32,
    },
    Coges {
        name: String,
        #[serde(flatten)]
        common: CommonDef,
        cogas: CogasDef,
        generator: MachineDef,
    },
    ShorePower {
        name: String,
        #[serde(flatten)]
        common: CommonDef,
        rated_power_kw: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        converter: Option<MachineDef>,
    },
    Battery {
        name: String,
        #[serde(flatten)]
        common: CommonDef,
        rated_capacity_kwh: f64,
        charging_rate_c: f64,
        discharging_rate_c: f64,
        #[serde(default = "default_soc0")]
        soc0: f64,
        #[serde(default = "default_battery_efficiency")]
        eff_charging: f64,
        #[serde(default = "default_battery_efficiency")]
        eff_discharging: f64,
        #[serde(default)]
        soe_min: f64,
        #[serde(default = "default_soe_max")]
        soe_max: f64,
        #[serde(default)]
        self_discharge_per_day: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        converter: Option<MachineDef>,
    },
    Supercapacitor {
        name: String,
        #[serde(flatten)]
        common: CommonDef,
        rated_capacity_wh: f64,
        rated_power_kw: f64,
        #[serde(default = "default_soc0")]
        soc0: f64,
        #[serde(default = "default_supercap_efficiency")]
        eff_charging: f64,
        #[serde(default = "default_supercap_efficiency")]
        eff_discharging: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        converter: Option<MachineDef>,
    },
    PropulsionDrive {
        name: String,
        #[serde(flatten)]
        common: CommonDef,
        components: Vec<MachineDef>,
    },
    OtherLoad {
        name: String,
        #[serde(flatten)]
        common: CommonDef,
        components: Vec<MachineDef>,
    },
    PtiPto {
        name: String,
        #[serde(flatten)]
        common: CommonDef,
        components: Vec<MachineDef>,
        shaftline_id: u32,
    },
    MainEngine {
        name: String,
        #[serde(flatten)]
        common: CommonDef,
        engine: EngineDef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gearbox: Option<MachineDef>,
    },
    PropellerLoad {
        name: String,
        #[serde(flatten)]
        common: CommonDef,
        components: Vec<MachineDef>,
    },
    OtherMechanicalLoad {
        name: String,
        #[serde(flatten)]
        common: CommonDef,
        components: Vec<MachineDef>,
    },
}

impl SubsystemDef {
    pub fn name(&self) -> &str {
        match self {
            SubsystemDef::Genset { name, .. }
            | SubsystemDef::FuelCellSystem { name, .. }
            | SubsystemDef::Coges { name, .. }
            | SubsystemDef::ShorePower { name, .. }
            | SubsystemDef::Battery { name, .. }
            | SubsystemDef::Supercapacitor { name, .. }
            | SubsystemDef::PropulsionDrive { name, .. }
            | SubsystemDef::OtherLoad { name, .. }
            | SubsystemDef::PtiPto { name, .. }
            | SubsystemDef::MainEngine { name, .. }
            | SubsystemDef::PropellerLoad { name, .. }
            | SubsystemDef::OtherMechanicalLoad { name, .. } => name,
        }
    }
}

fn default_number_modules() -> u32 {
    1
}

fn default_soc0() -> f64 {
    0.8
}

fn default_battery_efficiency() -> f64 {
    0.975
}

fn default_supercap_efficiency() -> f64 {
    0.995
}

fn default_soe_max() -> f64 {
    1.0
}

/// Efficiency-curve machine: generator, transformer, rectifier, inverter,
/// frequency converter, gearbox, motor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MachineDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ComponentKind>,
    pub rated_power_kw: f64,
    #[serde(default)]
    pub rated_speed_rpm: f64,
    pub efficiency: CurveDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineDef {
    pub name: String,
    pub rated_power_kw: f64,
    #[serde(default)]
    pub rated_speed_rpm: f64,
    pub bsfc: CurveDef,
    pub fuel: FuelSpecDef,
    #[serde(default)]
    pub cycle: EngineCycle,
    #[serde(default)]
    pub nox_calculation_method: NoxCalculationMethod,
    #[serde(default)]
    pub emission_curves: Vec<EmissionCurveDef>,
    /// Present for dual-fuel engines; the main fuel ignites off this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pilot: Option<PilotFuelDef>,
    /// Further fuel configurations for multi-fuel engines.
    #[serde(default)]
    pub additional_fuel_modes: Vec<FuelModeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PilotFuelDef {
    pub bsfc: CurveDef,
    pub fuel: FuelSpecDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuelModeDef {
    pub bsfc: CurveDef,
    pub fuel: FuelSpecDef,
    #[serde(default)]
    pub cycle: EngineCycle,
    #[serde(default)]
    pub emission_curves: Vec<EmissionCurveDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FuelSpecDef {
    pub kind: FuelKind,
    pub origin: FuelOrigin,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CogasDef {
    pub name: String,
    pub rated_power_kw: f64,
    pub efficiency: CurveDef,
    pub fuel: FuelSpecDef,
    #[serde(default)]
    pub emission_curves: Vec<EmissionCurveDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmissionCurveDef {
    pub species: EmissionSpecies,
    pub points: Vec<CurvePointDef>,
}

/// Tabulated curve over load ratio; a single point means a constant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurveDef {
    pub points: Vec<CurvePointDef>,
}

impl CurveDef {
    pub fn constant(y: f64) -> Self {
        Self {
            points: vec![CurvePointDef { x: 1.0, y }],
        }
    }

    pub fn from_points(points: &[(f64, f64)]) -> Self {
        Self {
            points: points
                .iter()
                .map(|(x, y)| CurvePointDef { x: *x, y: *y })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurvePointDef {
    pub x: f64,
    pub y: f64,
}

/// Stable uid, generated when the topology does not carry one.
pub fn uid_or_random(uid: &Option<String>) -> String {
    uid.clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}
