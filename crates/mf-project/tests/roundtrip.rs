//! Schema round-trip and build tests.

use mf_project::{build_system, validate_system, MachinerySystem, SystemDef};

const DIESEL_ELECTRIC_YAML: &str = r#"
name: diesel electric ferry
propulsion_type: electric
maximum_allowed_genset_load_percentage: 80.0
fuel_storage:
  - fuel: diesel
    capacity_kg: 50000.0
electric_system:
  switchboards:
    - id: 1
      subsystems:
        - type: Genset
          name: genset 1
          engine:
            name: aux engine 1
            rated_power_kw: 1100.0
            rated_speed_rpm: 750.0
            bsfc:
              points:
                - { x: 0.5, y: 205.0 }
                - { x: 0.75, y: 198.0 }
                - { x: 1.0, y: 202.0 }
            fuel: { kind: diesel, origin: fossil }
            cycle: diesel
            nox_calculation_method: tier2
          generator:
            name: generator 1
            rated_power_kw: 1000.0
            rated_speed_rpm: 750.0
            efficiency:
              points:
                - { x: 1.0, y: 0.95 }
        - type: OtherLoad
          name: hotel load
          components:
            - name: feeder
              rated_power_kw: 800.0
              efficiency:
                points:
                  - { x: 1.0, y: 1.0 }
        - type: PropulsionDrive
          name: propulsion drive 1
          components:
            - name: drive transformer
              kind: transformer
              rated_power_kw: 1200.0
              efficiency:
                points:
                  - { x: 1.0, y: 0.98 }
            - name: drive inverter
              kind: inverter
              rated_power_kw: 1200.0
              efficiency:
                points:
                  - { x: 1.0, y: 0.97 }
        - type: Battery
          name: battery 1
          rated_capacity_kwh: 500.0
          charging_rate_c: 1.0
          discharging_rate_c: 1.0
          soc0: 0.8
"#;

#[test]
fn yaml_parses_validates_and_builds() {
    let def: SystemDef = serde_yaml::from_str(DIESEL_ELECTRIC_YAML).unwrap();
    validate_system(&def).unwrap();
    let system = build_system(&def).unwrap();
    match system {
        MachinerySystem::Electric(electric) => {
            assert_eq!(electric.switchboards.len(), 1);
            let swb = &electric.switchboards[0];
            assert_eq!(swb.sources.len(), 1);
            assert_eq!(swb.consumers.len(), 2);
            assert_eq!(swb.storages.len(), 1);
            assert!((electric.max_genset_load_fraction - 0.8).abs() < 1e-12);
        }
        other => panic!("expected an electric system, got {}", other.name()),
    }
}

#[test]
fn json_round_trip_preserves_the_definition() {
    let def: SystemDef = serde_yaml::from_str(DIESEL_ELECTRIC_YAML).unwrap();
    let json = serde_json::to_string(&def).unwrap();
    let back: SystemDef = serde_json::from_str(&json).unwrap();
    assert_eq!(def, back);
}

#[test]
fn duplicate_component_names_are_rejected() {
    let mut def: SystemDef = serde_yaml::from_str(DIESEL_ELECTRIC_YAML).unwrap();
    let electric = def.electric_system.as_mut().unwrap();
    let duplicated = electric.switchboards[0].subsystems[1].clone();
    electric.switchboards[0].subsystems.push(duplicated);
    assert!(validate_system(&def).is_err());
}

#[test]
fn electric_propulsion_requires_an_electric_system() {
    let mut def: SystemDef = serde_yaml::from_str(DIESEL_ELECTRIC_YAML).unwrap();
    def.electric_system = None;
    assert!(validate_system(&def).is_err());
}

#[test]
fn percentages_outside_range_are_rejected() {
    let mut def: SystemDef = serde_yaml::from_str(DIESEL_ELECTRIC_YAML).unwrap();
    def.maximum_allowed_genset_load_percentage = 130.0;
    assert!(validate_system(&def).is_err());
}

#[test]
fn non_monotone_curves_are_rejected() {
    let yaml = DIESEL_ELECTRIC_YAML.replace("{ x: 0.75, y: 198.0 }", "{ x: 0.5, y: 198.0 }");
    let def: SystemDef = serde_yaml::from_str(&yaml).unwrap();
    assert!(validate_system(&def).is_err());
}

const HYBRID_YAML: &str = r#"
name: hybrid vessel
propulsion_type: hybrid
electric_system:
  switchboards:
    - id: 1
      subsystems:
        - type: Genset
          name: genset 1
          engine:
            name: aux engine 1
            rated_power_kw: 1100.0
            rated_speed_rpm: 750.0
            bsfc:
              points: [{ x: 1.0, y: 200.0 }]
            fuel: { kind: diesel, origin: fossil }
          generator:
            name: generator 1
            rated_power_kw: 1000.0
            efficiency:
              points: [{ x: 1.0, y: 0.95 }]
        - type: OtherLoad
          name: hotel load
          components:
            - name: feeder
              rated_power_kw: 500.0
              efficiency:
                points: [{ x: 1.0, y: 1.0 }]
        - type: PtiPto
          name: shaft machine 1
          shaftline_id: 1
          components:
            - name: shaft generator
              rated_power_kw: 1000.0
              efficiency:
                points: [{ x: 1.0, y: 0.9 }]
mechanical_system:
  shaftlines:
    - id: 1
      subsystems:
        - type: MainEngine
          name: main engine 1
          engine:
            name: main engine 1 core
            rated_power_kw: 4000.0
            rated_speed_rpm: 120.0
            bsfc:
              points: [{ x: 1.0, y: 180.0 }]
            fuel: { kind: hfo, origin: fossil }
        - type: PropellerLoad
          name: propeller 1
          components:
            - name: shaft bearing
              rated_power_kw: 4000.0
              efficiency:
                points: [{ x: 1.0, y: 0.99 }]
"#;

#[test]
fn hybrid_topology_builds_with_shared_pti_pto() {
    let def: SystemDef = serde_yaml::from_str(HYBRID_YAML).unwrap();
    let system = build_system(&def).unwrap();
    match system {
        MachinerySystem::Hybrid(hybrid) => {
            assert_eq!(hybrid.electric.switchboards[0].pti_ptos.len(), 1);
            assert_eq!(hybrid.mechanical.shaft_lines[0].pti_ptos.len(), 1);
            assert_eq!(
                hybrid.electric.switchboards[0].pti_ptos[0].name(),
                hybrid.mechanical.shaft_lines[0].pti_ptos[0].name()
            );
        }
        other => panic!("expected a hybrid system, got {}", other.name()),
    }
}

#[test]
fn pti_pto_referencing_a_missing_shaftline_is_rejected() {
    let yaml = HYBRID_YAML.replace("shaftline_id: 1", "shaftline_id: 9");
    let def: SystemDef = serde_yaml::from_str(&yaml).unwrap();
    assert!(validate_system(&def).is_err());
}
