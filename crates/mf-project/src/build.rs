//! Build machinery systems from the topology schema.

use crate::schema::{
    CommonDef, CurveDef, EmissionCurveDef, EngineDef, MachineDef, PropulsionType, SubsystemDef,
    SystemDef, uid_or_random,
};
use crate::validate::validate_system;
use crate::{ProjectError, ProjectResult};
use mf_components::{
    Battery, Cogas, Coges, ComponentKind, ComponentMeta, Consumer, ElectricMachine, Engine,
    EngineDualFuel, EngineMultiFuel, EngineVariant, EnergyStorage, FuelCell, FuelCellSystem,
    Genset, MainEngine, PowerConverter, PowerRole, PowerSource, PtiPto, RampLimits, SerialChain,
    ShorePower, Supercapacitor,
};
use mf_core::curve::{Curve, EfficiencyCurve};
use mf_core::{ShaftLineId, SwitchboardId};
use mf_fuel::EmissionSpecies;
use mf_machinery::{
    ElectricPowerSystem, HybridPropulsionSystem, MachineryError,
    MechanicalPropulsionSystem, MechanicalPropulsionSystemWithElectricPowerSystem, ShaftLine,
    Switchboard,
};
use std::collections::BTreeMap;

/// A buildable machinery system of any propulsion type.
#[derive(Clone, Debug)]
pub enum MachinerySystem {
    Electric(ElectricPowerSystem),
    Mechanical(MechanicalPropulsionSystem),
    MechanicalWithElectric(MechanicalPropulsionSystemWithElectricPowerSystem),
    Hybrid(HybridPropulsionSystem),
}

impl MachinerySystem {
    pub fn name(&self) -> &str {
        match self {
            MachinerySystem::Electric(s) => &s.name,
            MachinerySystem::Mechanical(s) => &s.name,
            MachinerySystem::MechanicalWithElectric(s) => &s.name,
            MachinerySystem::Hybrid(s) => &s.name,
        }
    }
}

/// Build an in-memory machinery system from a validated topology.
pub fn build_system(def: &SystemDef) -> ProjectResult<MachinerySystem> {
    validate_system(def)?;
    match def.propulsion_type {
        PropulsionType::Electric => Ok(MachinerySystem::Electric(build_electric(def)?)),
        PropulsionType::Mechanical => {
            let mechanical = build_mechanical(def)?;
            if def.electric_system.is_some() {
                let electric = build_electric(def)?;
                Ok(MachinerySystem::MechanicalWithElectric(
                    MechanicalPropulsionSystemWithElectricPowerSystem::new(
                        &def.name, electric, mechanical,
                    ),
                ))
            } else {
                Ok(MachinerySystem::Mechanical(mechanical))
            }
        }
        PropulsionType::Hybrid => {
            let electric = build_electric(def)?;
            let mechanical = build_mechanical(def)?;
            Ok(MachinerySystem::Hybrid(HybridPropulsionSystem::new(
                &def.name, electric, mechanical,
            )?))
        }
    }
}

fn build_electric(def: &SystemDef) -> ProjectResult<ElectricPowerSystem> {
    let electric = def.electric_system.as_ref().ok_or_else(|| {
        ProjectError::Machinery(MachineryError::Configuration {
            what: "topology has no electric system".to_string(),
        })
    })?;

    let mut switchboards = Vec::new();
    for swb_def in &electric.switchboards {
        let swb_id = SwitchboardId(swb_def.id);
        let mut sources = Vec::new();
        let mut consumers = Vec::new();
        let mut storages = Vec::new();
        let mut pti_ptos = Vec::new();
        for subsystem in &swb_def.subsystems {
            match subsystem {
                SubsystemDef::Genset {
                    name,
                    common,
                    engine,
                    generator,
                    rectifier,
                } => {
                    let engine = build_engine_variant(engine)?;
                    let generator = ElectricMachine::new(build_machine(
                        generator,
                        ComponentKind::Generator,
                        PowerRole::Source,
                    )?);
                    let rectifier = rectifier
                        .as_ref()
                        .map(|r| build_machine(r, ComponentKind::Rectifier, PowerRole::Transmission))
                        .transpose()?;
                    let mut genset = Genset::new(name, engine, generator, rectifier)?;
                    apply_common(&mut genset.meta, common);
                    sources.push(PowerSource::Genset(genset));
                }
                SubsystemDef::FuelCellSystem {
                    name,
                    common,
                    rated_power_kw,
                    efficiency,
                    fuel,
                    converter,
                    number_modules,
                } => {
                    let modules = (*number_modules).max(1);
                    let module_meta = ComponentMeta::new(
                        &format!("{name} module"),
                        ComponentKind::FuelCell,
                        PowerRole::Source,
                        rated_power_kw / modules as f64,
                    )?;
                    let fuel_cell = FuelCell::new(
                        module_meta,
                        build_efficiency(efficiency)?,
                        fuel.kind,
                        fuel.origin,
                    );
                    let converter = converter
                        .as_ref()
                        .map(|c| {
                            build_machine(c, ComponentKind::PowerConverter, PowerRole::Transmission)
                        })
                        .transpose()?;
                    let mut meta = ComponentMeta::new(
                        name,
                        ComponentKind::FuelCellSystem,
                        PowerRole::Source,
                        *rated_power_kw,
                    )?;
                    apply_common(&mut meta, common);
                    sources.push(PowerSource::FuelCellSystem(FuelCellSystem::new(
                        meta, fuel_cell, converter, modules,
                    )));
                }
                SubsystemDef::Coges {
                    name,
                    common,
                    cogas,
                    generator,
                } => {
                    let cogas_meta = ComponentMeta::new(
                        &cogas.name,
                        ComponentKind::Cogas,
                        PowerRole::Source,
                        cogas.rated_power_kw,
                    )?;
                    let plant = Cogas::new(
                        cogas_meta,
                        build_efficiency(&cogas.efficiency)?,
                        cogas.fuel.kind,
                        cogas.fuel.origin,
                        build_emission_map(&cogas.emission_curves)?,
                    );
                    let generator = ElectricMachine::new(build_machine(
                        generator,
                        ComponentKind::Generator,
                        PowerRole::Source,
                    )?);
                    let mut meta = ComponentMeta::new(
                        name,
                        ComponentKind::Coges,
                        PowerRole::Source,
                        generator.meta().rated_kw(),
                    )?;
                    apply_common(&mut meta, common);
                    sources.push(PowerSource::Coges(Coges::new(meta, plant, generator)));
                }
                SubsystemDef::ShorePower {
                    name,
                    common,
                    rated_power_kw,
                    converter,
                } => {
                    let mut shore = ShorePower::new(name, *rated_power_kw)?;
                    if let Some(converter) = converter {
                        shore = shore.with_converter(build_machine(
                            converter,
                            ComponentKind::Transformer,
                            PowerRole::Transmission,
                        )?);
                    }
                    apply_common(&mut shore.meta, common);
                    sources.push(PowerSource::ShorePower(shore));
                }
                SubsystemDef::Battery {
                    name,
                    common,
                    rated_capacity_kwh,
                    charging_rate_c,
                    discharging_rate_c,
                    soc0,
                    eff_charging,
                    eff_discharging,
                    soe_min,
                    soe_max,
                    self_discharge_per_day,
                    converter,
                } => {
                    let mut battery =
                        Battery::new(name, *rated_capacity_kwh, *charging_rate_c, *discharging_rate_c)?
                            .with_soe_window(*soe_min, *soe_max)?
                            .with_soc0(*soc0)?
                            .with_efficiencies(*eff_charging, *eff_discharging)?
                            .with_self_discharge_per_day(*self_discharge_per_day)?;
                    if let Some(converter) = converter {
                        battery = battery.with_converter(build_machine(
                            converter,
                            ComponentKind::PowerConverter,
                            PowerRole::Transmission,
                        )?);
                    }
                    apply_common(&mut battery.meta, common);
                    storages.push(EnergyStorage::Battery(battery));
                }
                SubsystemDef::Supercapacitor {
                    name,
                    common,
                    rated_capacity_wh,
                    rated_power_kw,
                    soc0,
                    eff_charging,
                    eff_discharging,
                    converter,
                } => {
                    let mut cap = Supercapacitor::new(name, *rated_capacity_wh, *rated_power_kw)?
                        .with_soc0(*soc0)?
                        .with_efficiencies(*eff_charging, *eff_discharging)?;
                    if let Some(converter) = converter {
                        cap = cap.with_converter(build_machine(
                            converter,
                            ComponentKind::PowerConverter,
                            PowerRole::Transmission,
                        )?);
                    }
                    apply_common(&mut cap.meta, common);
                    storages.push(EnergyStorage::Supercapacitor(cap));
                }
                SubsystemDef::PropulsionDrive {
                    name,
                    common,
                    components,
                } => {
                    consumers.push(build_consumer(
                        name,
                        common,
                        components,
                        ComponentKind::PropulsionDrive,
                    )?);
                }
                SubsystemDef::OtherLoad {
                    name,
                    common,
                    components,
                } => {
                    consumers.push(build_consumer(
                        name,
                        common,
                        components,
                        ComponentKind::OtherLoad,
                    )?);
                }
                SubsystemDef::PtiPto {
                    name,
                    common,
                    components,
                    shaftline_id,
                } => {
                    pti_ptos.push(build_pti_pto(
                        name,
                        common,
                        components,
                        swb_id,
                        ShaftLineId(*shaftline_id),
                    )?);
                }
                _ => {
                    // Mechanical subsystems on a switchboard are rejected
                    // by validation.
                }
            }
        }
        switchboards.push(Switchboard::new(swb_id, sources, consumers, storages, pti_ptos)?);
    }

    let ties: Vec<(SwitchboardId, SwitchboardId)> = electric
        .bus_ties
        .iter()
        .map(|t| (SwitchboardId(t.switchboards.0), SwitchboardId(t.switchboards.1)))
        .collect();

    Ok(ElectricPowerSystem::new(&def.name, switchboards, &ties)?.with_load_limits(
        def.maximum_allowed_genset_load_percentage / 100.0,
        def.maximum_allowed_fuel_cell_load_percentage / 100.0,
        def.average_base_load_percentage / 100.0,
    ))
}

fn build_mechanical(def: &SystemDef) -> ProjectResult<MechanicalPropulsionSystem> {
    let mechanical = def.mechanical_system.as_ref().ok_or_else(|| {
        ProjectError::Machinery(MachineryError::Configuration {
            what: "topology has no mechanical system".to_string(),
        })
    })?;

    let mut shaft_lines = Vec::new();
    for line_def in &mechanical.shaftlines {
        let line_id = ShaftLineId(line_def.id);
        let mut main_engines = Vec::new();
        let mut consumers = Vec::new();
        let mut pti_ptos = Vec::new();
        for subsystem in &line_def.subsystems {
            match subsystem {
                SubsystemDef::MainEngine {
                    name,
                    common,
                    engine,
                    gearbox,
                } => {
                    let engine_variant = build_engine_variant(engine)?;
                    let gearbox = gearbox
                        .as_ref()
                        .map(|g| build_machine(g, ComponentKind::Gearbox, PowerRole::Transmission))
                        .transpose()?;
                    let mut main_engine = MainEngine::new(name, engine_variant, gearbox)?;
                    apply_common(&mut main_engine.meta, common);
                    main_engines.push(main_engine);
                }
                SubsystemDef::PropellerLoad {
                    name,
                    common,
                    components,
                } => {
                    consumers.push(build_consumer(
                        name,
                        common,
                        components,
                        ComponentKind::PropellerLoad,
                    )?);
                }
                SubsystemDef::OtherMechanicalLoad {
                    name,
                    common,
                    components,
                } => {
                    consumers.push(build_consumer(
                        name,
                        common,
                        components,
                        ComponentKind::OtherMechanicalLoad,
                    )?);
                }
                SubsystemDef::PtiPto {
                    name,
                    common,
                    components,
                    shaftline_id,
                } => {
                    // Declared under a shaft line: no switchboard side.
                    pti_ptos.push(build_pti_pto(
                        name,
                        common,
                        components,
                        SwitchboardId(0),
                        ShaftLineId(*shaftline_id),
                    )?);
                }
                _ => {}
            }
        }

        // The shared PTI/PTO machines declared on the switchboards also
        // live on their shaft line.
        if let Some(electric) = &def.electric_system {
            for swb_def in &electric.switchboards {
                for subsystem in &swb_def.subsystems {
                    if let SubsystemDef::PtiPto {
                        name,
                        common,
                        components,
                        shaftline_id,
                    } = subsystem
                    {
                        if *shaftline_id == line_def.id {
                            pti_ptos.push(build_pti_pto(
                                name,
                                common,
                                components,
                                SwitchboardId(swb_def.id),
                                line_id,
                            )?);
                        }
                    }
                }
            }
        }

        shaft_lines.push(ShaftLine::new(line_id, main_engines, consumers, pti_ptos)?);
    }

    Ok(
        MechanicalPropulsionSystem::new(&def.name, shaft_lines)?.with_load_limits(
            def.maximum_allowed_genset_load_percentage / 100.0,
            def.average_base_load_percentage / 100.0,
        ),
    )
}

fn apply_common(meta: &mut ComponentMeta, common: &CommonDef) {
    meta.uid = uid_or_random(&common.uid);
    meta.base_load_order = common.base_load_order;
    meta.ramp_limits = common.ramp_limits.map(|r| RampLimits {
        up_percent_per_second: r.up_percent_per_second,
        down_percent_per_second: r.down_percent_per_second,
    });
}

fn build_curve(def: &CurveDef) -> ProjectResult<Curve> {
    if def.points.len() == 1 {
        Ok(Curve::constant(def.points[0].y)?)
    } else {
        let points: Vec<(f64, f64)> = def.points.iter().map(|p| (p.x, p.y)).collect();
        Ok(Curve::from_points(&points)?)
    }
}

fn build_efficiency(def: &CurveDef) -> ProjectResult<EfficiencyCurve> {
    if def.points.len() == 1 {
        Ok(EfficiencyCurve::constant(def.points[0].y)?)
    } else {
        let points: Vec<(f64, f64)> = def.points.iter().map(|p| (p.x, p.y)).collect();
        Ok(EfficiencyCurve::from_points(&points)?)
    }
}

fn build_machine(
    def: &MachineDef,
    default_kind: ComponentKind,
    role: PowerRole,
) -> ProjectResult<PowerConverter> {
    let meta = ComponentMeta::new(
        &def.name,
        def.kind.unwrap_or(default_kind),
        role,
        def.rated_power_kw,
    )?
    .with_rated_speed_rpm(def.rated_speed_rpm);
    Ok(PowerConverter::new(meta, build_efficiency(&def.efficiency)?))
}

fn build_emission_map(
    defs: &[EmissionCurveDef],
) -> ProjectResult<BTreeMap<EmissionSpecies, Curve>> {
    let mut map = BTreeMap::new();
    for def in defs {
        let points: Vec<(f64, f64)> = def.points.iter().map(|p| (p.x, p.y)).collect();
        let curve = if points.len() == 1 {
            Curve::constant(points[0].1)?
        } else {
            Curve::from_points(&points)?
        };
        map.insert(def.species, curve);
    }
    Ok(map)
}

fn build_single_engine(
    def: &EngineDef,
    kind: ComponentKind,
) -> ProjectResult<Engine> {
    let meta = ComponentMeta::new(&def.name, kind, PowerRole::Source, def.rated_power_kw)?
        .with_rated_speed_rpm(def.rated_speed_rpm);
    Ok(Engine::new(
        meta,
        build_curve(&def.bsfc)?,
        def.fuel.kind,
        def.fuel.origin,
        def.cycle,
        def.nox_calculation_method,
        build_emission_map(&def.emission_curves)?,
    )?)
}

fn build_engine_variant(def: &EngineDef) -> ProjectResult<EngineVariant> {
    let base = build_single_engine(def, ComponentKind::AuxEngine)?;
    if let Some(pilot) = &def.pilot {
        return Ok(EngineVariant::DualFuel(EngineDualFuel::new(
            base,
            build_curve(&pilot.bsfc)?,
            pilot.fuel.kind,
            pilot.fuel.origin,
        )));
    }
    if !def.additional_fuel_modes.is_empty() {
        let mut modes = vec![base];
        for mode in &def.additional_fuel_modes {
            let meta = ComponentMeta::new(
                &def.name,
                ComponentKind::AuxEngine,
                PowerRole::Source,
                def.rated_power_kw,
            )?
            .with_rated_speed_rpm(def.rated_speed_rpm);
            modes.push(Engine::new(
                meta,
                build_curve(&mode.bsfc)?,
                mode.fuel.kind,
                mode.fuel.origin,
                mode.cycle,
                def.nox_calculation_method,
                build_emission_map(&mode.emission_curves)?,
            )?);
        }
        return Ok(EngineVariant::MultiFuel(EngineMultiFuel::new(modes)?));
    }
    Ok(EngineVariant::Single(base))
}

fn build_consumer(
    name: &str,
    common: &CommonDef,
    components: &[MachineDef],
    kind: ComponentKind,
) -> ProjectResult<Consumer> {
    let converters = components
        .iter()
        .map(|m| build_machine(m, ComponentKind::PowerConverter, PowerRole::Transmission))
        .collect::<ProjectResult<Vec<_>>>()?;
    let mut chain = SerialChain::new(name, kind, PowerRole::Consumer, converters)?;
    apply_common(&mut chain.meta, common);
    Ok(Consumer::new(chain))
}

fn build_pti_pto(
    name: &str,
    common: &CommonDef,
    components: &[MachineDef],
    switchboard_id: SwitchboardId,
    shaftline_id: ShaftLineId,
) -> ProjectResult<PtiPto> {
    let converters = components
        .iter()
        .map(|m| build_machine(m, ComponentKind::SynchronousMachine, PowerRole::PtiPto))
        .collect::<ProjectResult<Vec<_>>>()?;
    let mut chain = SerialChain::new(name, ComponentKind::PtiPto, PowerRole::PtiPto, converters)?;
    apply_common(&mut chain.meta, common);
    Ok(PtiPto::new(chain, switchboard_id, shaftline_id))
}
