//! Integration tests for the switchboard and shaftline balance.

use mf_components::{
    Battery, ComponentKind, ComponentMeta, Consumer, ElectricMachine, EnergyStorage, Engine,
    EngineCycle, EngineVariant, Genset, MainEngine, NoxCalculationMethod, PowerConverter,
    PowerRole, PowerSource, PtiPto, SerialChain, ShorePower,
};
use mf_core::curve::{Curve, EfficiencyCurve};
use mf_core::{ShaftLineId, SwitchboardId};
use mf_fuel::{FuelKind, FuelOrigin};
use mf_machinery::{
    ElectricPowerSystem, MachineryError, MechanicalPropulsionSystem,
    MechanicalPropulsionSystemWithElectricPowerSystem, ShaftLine, Switchboard,
};
use mf_results::TimeSteps;
use std::collections::BTreeMap;

fn engine(name: &str, rated_kw: f64) -> Engine {
    Engine::new(
        ComponentMeta::new(name, ComponentKind::AuxEngine, PowerRole::Source, rated_kw)
            .unwrap()
            .with_rated_speed_rpm(750.0),
        Curve::constant(200.0).unwrap(),
        FuelKind::Diesel,
        FuelOrigin::Fossil,
        EngineCycle::Diesel,
        NoxCalculationMethod::Tier2,
        BTreeMap::new(),
    )
    .unwrap()
}

fn genset(name: &str, rated_kw: f64, generator_eta: f64) -> PowerSource {
    let generator = ElectricMachine::new(PowerConverter::new(
        ComponentMeta::new(
            &format!("{name} generator"),
            ComponentKind::Generator,
            PowerRole::Source,
            rated_kw,
        )
        .unwrap(),
        EfficiencyCurve::constant(generator_eta).unwrap(),
    ));
    PowerSource::Genset(
        Genset::new(
            name,
            EngineVariant::Single(engine(&format!("{name} engine"), rated_kw * 1.2)),
            generator,
            None,
        )
        .unwrap(),
    )
}

fn hotel_load(name: &str, rated_kw: f64) -> Consumer {
    Consumer::new(
        SerialChain::new(
            name,
            ComponentKind::OtherLoad,
            PowerRole::Consumer,
            vec![PowerConverter::new(
                ComponentMeta::new(
                    &format!("{name} feeder"),
                    ComponentKind::Transformer,
                    PowerRole::Transmission,
                    rated_kw,
                )
                .unwrap(),
                EfficiencyCurve::constant(1.0).unwrap(),
            )],
        )
        .unwrap(),
    )
}

fn switchboard(
    id: u32,
    sources: Vec<PowerSource>,
    consumers: Vec<Consumer>,
    storages: Vec<EnergyStorage>,
) -> Switchboard {
    Switchboard::new(SwitchboardId(id), sources, consumers, storages, vec![]).unwrap()
}

#[test]
fn single_genset_carries_the_whole_load() {
    let swb = switchboard(
        1,
        vec![genset("genset 1", 1000.0, 0.95)],
        vec![hotel_load("hotel", 1000.0)],
        vec![],
    );
    let mut system = ElectricPowerSystem::new("plant", vec![swb], &[]).unwrap();
    system.set_consumer_load_kw("hotel", &[475.0, 475.0]).unwrap();
    let warnings = system.solve(&TimeSteps::Uniform(60.0), false).unwrap();
    assert!(warnings.is_empty());
    let slot = &system.switchboards[0].sources[0];
    assert!((slot.power_output_kw[0] - 475.0).abs() < 1e-9);
    assert!((slot.power_output_kw[1] - 475.0).abs() < 1e-9);
}

#[test]
fn two_equal_gensets_share_evenly() {
    let swb = switchboard(
        1,
        vec![genset("genset 1", 1000.0, 1.0), genset("genset 2", 1000.0, 1.0)],
        vec![hotel_load("hotel", 2000.0)],
        vec![],
    );
    let mut system = ElectricPowerSystem::new("plant", vec![swb], &[]).unwrap();
    system.set_consumer_load_kw("hotel", &[700.0]).unwrap();
    system.solve(&TimeSteps::Uniform(3600.0), false).unwrap();
    for slot in &system.switchboards[0].sources {
        assert!((slot.power_output_kw[0] - 350.0).abs() < 1e-9);
    }
}

#[test]
fn load_sharing_weight_biases_the_split() {
    let swb = switchboard(
        1,
        vec![genset("genset 1", 1000.0, 1.0), genset("genset 2", 1000.0, 1.0)],
        vec![hotel_load("hotel", 2000.0)],
        vec![],
    );
    let mut system = ElectricPowerSystem::new("plant", vec![swb], &[]).unwrap();
    system.set_consumer_load_kw("hotel", &[600.0]).unwrap();
    system.set_source_load_sharing("genset 1", &[2.0]).unwrap();
    system.set_source_load_sharing("genset 2", &[1.0]).unwrap();
    system.solve(&TimeSteps::Uniform(60.0), false).unwrap();
    assert!((system.switchboards[0].sources[0].power_output_kw[0] - 400.0).abs() < 1e-9);
    assert!((system.switchboards[0].sources[1].power_output_kw[0] - 200.0).abs() < 1e-9);
}

#[test]
fn capacity_cap_redistributes_to_the_larger_genset() {
    let swb = switchboard(
        1,
        vec![genset("small", 400.0, 1.0), genset("large", 1600.0, 1.0)],
        vec![hotel_load("hotel", 2000.0)],
        vec![],
    );
    let mut system = ElectricPowerSystem::new("plant", vec![swb], &[])
        .unwrap()
        .with_load_limits(0.5, 1.0, 0.0);
    // Equal weights would put 500 kW on the small genset; its cap is
    // 200 kW, so the excess lands on the large one.
    system.set_consumer_load_kw("hotel", &[1000.0]).unwrap();
    system.set_source_load_sharing("small", &[1.0]).unwrap();
    system.set_source_load_sharing("large", &[1.0]).unwrap();
    system.solve(&TimeSteps::Uniform(60.0), false).unwrap();
    assert!((system.switchboards[0].sources[0].power_output_kw[0] - 200.0).abs() < 1e-9);
    assert!((system.switchboards[0].sources[1].power_output_kw[0] - 800.0).abs() < 1e-9);
}

#[test]
fn infeasible_demand_is_an_error_in_strict_mode() {
    let swb = switchboard(
        1,
        vec![genset("genset 1", 500.0, 1.0)],
        vec![hotel_load("hotel", 2000.0)],
        vec![],
    );
    let mut system = ElectricPowerSystem::new("plant", vec![swb], &[]).unwrap();
    system.set_consumer_load_kw("hotel", &[800.0]).unwrap();
    let err = system.solve(&TimeSteps::Uniform(60.0), false).unwrap_err();
    match err {
        MachineryError::PowerBalance {
            timestep, residual_kw, ..
        } => {
            assert_eq!(timestep, 0);
            assert!((residual_kw - 300.0).abs() < 1e-6);
        }
        other => panic!("expected a power balance error, got {other}"),
    }
}

#[test]
fn infeasible_demand_becomes_a_warning_when_ignored() {
    let swb = switchboard(
        1,
        vec![genset("genset 1", 500.0, 1.0)],
        vec![hotel_load("hotel", 2000.0)],
        vec![],
    );
    let mut system = ElectricPowerSystem::new("plant", vec![swb], &[]).unwrap();
    system.set_consumer_load_kw("hotel", &[800.0, 400.0]).unwrap();
    let warnings = system.solve(&TimeSteps::Uniform(60.0), true).unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].timestep, 0);
    assert!((warnings[0].residual_kw - 300.0).abs() < 1e-6);
    // The clipped distribution still loads the genset fully.
    assert!((system.switchboards[0].sources[0].power_output_kw[0] - 500.0).abs() < 1e-9);
}

#[test]
fn shore_power_covers_the_load_before_the_genset() {
    let shore = PowerSource::ShorePower(ShorePower::new("shore 1", 1000.0).unwrap());
    let swb = switchboard(
        1,
        vec![shore, genset("genset 1", 1000.0, 0.95)],
        vec![hotel_load("hotel", 1000.0)],
        vec![],
    );
    let mut system = ElectricPowerSystem::new("plant", vec![swb], &[]).unwrap();
    system.set_consumer_load_kw("hotel", &[500.0]).unwrap();
    system.set_source_status("genset 1", &[false]).unwrap();
    system.solve(&TimeSteps::Uniform(600.0), false).unwrap();
    assert!((system.switchboards[0].sources[0].power_output_kw[0] - 500.0).abs() < 1e-9);
    assert_eq!(system.switchboards[0].sources[1].power_output_kw[0], 0.0);
}

#[test]
fn battery_serves_the_peak_above_genset_capacity() {
    let battery = Battery::new("battery 1", 500.0, 1.0, 1.0)
        .unwrap()
        .with_soc0(0.8)
        .unwrap()
        .with_efficiencies(0.97, 0.97)
        .unwrap();
    let swb = switchboard(
        1,
        vec![genset("genset 1", 500.0, 1.0)],
        vec![hotel_load("hotel", 1000.0)],
        vec![EnergyStorage::Battery(battery)],
    );
    let mut system = ElectricPowerSystem::new("plant", vec![swb], &[]).unwrap();
    system.set_consumer_load_kw("hotel", &[800.0]).unwrap();
    system.solve(&TimeSteps::Uniform(600.0), false).unwrap();

    let genset_slot = &system.switchboards[0].sources[0];
    let battery_slot = &system.switchboards[0].storages[0];
    assert!((genset_slot.power_output_kw[0] - 500.0).abs() < 1e-9);
    assert!((battery_slot.power_input_kw[0] + 300.0).abs() < 1e-9);
    let expected_dsoc = 300.0 * 600.0 / (500.0 * 3600.0 * 0.97);
    assert!((battery_slot.soc[1] - (0.8 - expected_dsoc)).abs() < 1e-9);
    assert!((expected_dsoc - 0.1031).abs() < 1e-4);
}

#[test]
fn staged_charging_adds_to_the_genset_load() {
    let battery = Battery::new("battery 1", 500.0, 1.0, 1.0)
        .unwrap()
        .with_soc0(0.5)
        .unwrap();
    let swb = switchboard(
        1,
        vec![genset("genset 1", 1000.0, 1.0)],
        vec![hotel_load("hotel", 1000.0)],
        vec![EnergyStorage::Battery(battery)],
    );
    let mut system = ElectricPowerSystem::new("plant", vec![swb], &[]).unwrap();
    system.set_consumer_load_kw("hotel", &[400.0]).unwrap();
    system.set_storage_dispatch_kw("battery 1", &[200.0]).unwrap();
    system.solve(&TimeSteps::Uniform(60.0), false).unwrap();
    assert!((system.switchboards[0].sources[0].power_output_kw[0] - 600.0).abs() < 1e-9);
    assert!(system.switchboards[0].storages[0].soc[1] > 0.5);
}

#[test]
fn closed_bus_tie_pools_the_demand() {
    let swb1 = switchboard(
        1,
        vec![genset("genset 1", 1000.0, 1.0)],
        vec![hotel_load("hotel", 2000.0)],
        vec![],
    );
    let swb2 = switchboard(2, vec![genset("genset 2", 1000.0, 1.0)], vec![], vec![]);
    let mut system = ElectricPowerSystem::new(
        "plant",
        vec![swb1, swb2],
        &[(SwitchboardId(1), SwitchboardId(2))],
    )
    .unwrap();
    system.set_consumer_load_kw("hotel", &[800.0, 800.0]).unwrap();
    system.set_bus_tie_status(0, &[true, false]).unwrap();
    system.solve(&TimeSteps::Uniform(60.0), false).unwrap();

    // Closed at t=0: both gensets share. Open at t=1: switchboard 1 alone.
    assert!((system.switchboards[0].sources[0].power_output_kw[0] - 400.0).abs() < 1e-9);
    assert!((system.switchboards[1].sources[0].power_output_kw[0] - 400.0).abs() < 1e-9);
    assert!((system.switchboards[0].sources[0].power_output_kw[1] - 800.0).abs() < 1e-9);
    assert!(system.switchboards[1].sources[0].power_output_kw[1].abs() < 1e-9);
}

#[test]
fn base_load_source_is_loaded_first() {
    let mut priority = genset("priority", 1000.0, 1.0);
    match &mut priority {
        PowerSource::Genset(g) => g.meta.base_load_order = 1,
        _ => unreachable!(),
    }
    let swb = switchboard(
        1,
        vec![priority, genset("trailing", 1000.0, 1.0)],
        vec![hotel_load("hotel", 2000.0)],
        vec![],
    );
    let mut system = ElectricPowerSystem::new("plant", vec![swb], &[])
        .unwrap()
        .with_load_limits(1.0, 1.0, 0.5);
    system.set_consumer_load_kw("hotel", &[600.0]).unwrap();
    system.solve(&TimeSteps::Uniform(60.0), false).unwrap();
    // 500 kW base level plus half of the remaining 100 kW.
    assert!((system.switchboards[0].sources[0].power_output_kw[0] - 550.0).abs() < 1e-9);
    assert!((system.switchboards[0].sources[1].power_output_kw[0] - 50.0).abs() < 1e-9);
}

fn propeller(name: &str, rated_kw: f64) -> Consumer {
    Consumer::new(
        SerialChain::new(
            name,
            ComponentKind::PropellerLoad,
            PowerRole::Consumer,
            vec![PowerConverter::new(
                ComponentMeta::new(
                    &format!("{name} shaft"),
                    ComponentKind::Gearbox,
                    PowerRole::Transmission,
                    rated_kw,
                )
                .unwrap(),
                EfficiencyCurve::constant(1.0).unwrap(),
            )],
        )
        .unwrap(),
    )
}

fn pti_pto(name: &str, rated_kw: f64, eta: f64) -> PtiPto {
    PtiPto::new(
        SerialChain::new(
            name,
            ComponentKind::PtiPto,
            PowerRole::PtiPto,
            vec![PowerConverter::new(
                ComponentMeta::new(
                    &format!("{name} machine"),
                    ComponentKind::SynchronousMachine,
                    PowerRole::PtiPto,
                    rated_kw,
                )
                .unwrap(),
                EfficiencyCurve::constant(eta).unwrap(),
            )],
        )
        .unwrap(),
        SwitchboardId(1),
        ShaftLineId(1),
    )
}

fn main_engine(name: &str, rated_kw: f64) -> MainEngine {
    MainEngine::new(name, EngineVariant::Single(engine(name, rated_kw)), None).unwrap()
}

#[test]
fn shaftline_splits_load_by_rated_power() {
    let line = ShaftLine::new(
        ShaftLineId(1),
        vec![main_engine("me 1", 2000.0), main_engine("me 2", 1000.0)],
        vec![propeller("propeller", 3000.0)],
        vec![],
    )
    .unwrap();
    let mut system = MechanicalPropulsionSystem::new("mech", vec![line]).unwrap();
    system.set_consumer_load_kw("propeller", &[1500.0]).unwrap();
    system.solve(&TimeSteps::Uniform(60.0), false).unwrap();
    assert!((system.shaft_lines[0].main_engines[0].power_output_kw[0] - 1000.0).abs() < 1e-9);
    assert!((system.shaft_lines[0].main_engines[1].power_output_kw[0] - 500.0).abs() < 1e-9);
}

#[test]
fn full_pti_drives_the_propeller_from_the_electric_side() {
    let line = ShaftLine::new(
        ShaftLineId(1),
        vec![main_engine("me 1", 2000.0)],
        vec![propeller("propeller", 3000.0)],
        vec![pti_pto("pti/pto 1", 1000.0, 0.9)],
    )
    .unwrap();
    let mechanical = MechanicalPropulsionSystem::new("mech", vec![line]).unwrap();

    let swb = Switchboard::new(
        SwitchboardId(1),
        vec![genset("genset 1", 1000.0, 1.0)],
        vec![],
        vec![],
        vec![pti_pto("pti/pto 1", 1000.0, 0.9)],
    )
    .unwrap();
    let electric = ElectricPowerSystem::new("plant", vec![swb], &[]).unwrap();

    let mut system = MechanicalPropulsionSystemWithElectricPowerSystem::new(
        "combined", electric, mechanical,
    );
    system
        .mechanical
        .set_consumer_load_kw("propeller", &[800.0])
        .unwrap();
    system
        .mechanical
        .set_main_engine_status("me 1", &[false])
        .unwrap();
    system.mechanical.set_full_pti("pti/pto 1", &[true]).unwrap();

    let (elec_warnings, mech_warnings) =
        system.solve(&TimeSteps::Uniform(600.0), false).unwrap();
    assert!(elec_warnings.is_empty());
    assert!(mech_warnings.is_empty());

    let mech_pti = &system.mechanical.shaft_lines[0].pti_ptos[0];
    assert!((mech_pti.shaft_power_kw[0] - 800.0).abs() < 1e-9);
    assert!((mech_pti.electric_power_kw[0] - 800.0 / 0.9).abs() < 1e-6);
    // The genset carries the PTI draw.
    assert!(
        (system.electric.switchboards[0].sources[0].power_output_kw[0] - 800.0 / 0.9).abs()
            < 1e-6
    );
    // The main engine stays unloaded.
    assert_eq!(
        system.mechanical.shaft_lines[0].main_engines[0].power_output_kw[0],
        0.0
    );
}

#[test]
fn full_pti_beyond_the_machine_rating_fails() {
    let line = ShaftLine::new(
        ShaftLineId(1),
        vec![main_engine("me 1", 2000.0)],
        vec![propeller("propeller", 3000.0)],
        vec![pti_pto("pti/pto 1", 500.0, 0.9)],
    )
    .unwrap();
    let mut system = MechanicalPropulsionSystem::new("mech", vec![line]).unwrap();
    system.set_consumer_load_kw("propeller", &[800.0]).unwrap();
    system.set_main_engine_status("me 1", &[false]).unwrap();
    system.set_full_pti("pti/pto 1", &[true]).unwrap();
    let err = system.solve(&TimeSteps::Uniform(60.0), false).unwrap_err();
    assert!(matches!(err, MachineryError::PowerBalance { .. }));
}

#[test]
fn solving_twice_is_deterministic() {
    let build = || {
        let swb = switchboard(
            1,
            vec![genset("genset 1", 1000.0, 0.95), genset("genset 2", 1000.0, 0.95)],
            vec![hotel_load("hotel", 2000.0)],
            vec![],
        );
        ElectricPowerSystem::new("plant", vec![swb], &[]).unwrap()
    };
    let load: Vec<f64> = (0..32).map(|i| 300.0 + 13.0 * i as f64).collect();

    let mut a = build();
    a.set_consumer_load_kw("hotel", &load).unwrap();
    a.solve(&TimeSteps::Uniform(60.0), false).unwrap();

    let mut b = build();
    b.set_consumer_load_kw("hotel", &load).unwrap();
    b.solve(&TimeSteps::Uniform(60.0), false).unwrap();

    for (sa, sb) in a.switchboards[0].sources.iter().zip(&b.switchboards[0].sources) {
        assert_eq!(sa.power_output_kw, sb.power_output_kw);
    }
}
