use clap::{Parser, Subcommand};
use mf_app::{run_id_for, RunInputs, RunOptions};
use mf_project::SystemDef;
use mf_results::{RunManifest, RunStore};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mf-cli")]
#[command(about = "marineflow CLI - marine machinery fuel and emission simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a topology file
    Validate {
        /// Path to the topology YAML or JSON file
        system_path: PathBuf,
    },
    /// Run a simulation
    Run {
        /// Path to the topology YAML or JSON file
        system_path: PathBuf,
        /// Path to the run inputs YAML or JSON file
        inputs_path: PathBuf,
        /// Path to run options YAML or JSON (defaults: IMO fuels,
        /// sum-with-interval integration)
        #[arg(long)]
        options: Option<PathBuf>,
        /// Continue past infeasible timesteps, recording warnings
        #[arg(long)]
        ignore_power_balance: bool,
        /// Write the result JSON here instead of the run store
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List stored runs next to a topology file
    Runs {
        system_path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Validate { system_path } => cmd_validate(&system_path),
        Commands::Run {
            system_path,
            inputs_path,
            options,
            ignore_power_balance,
            output,
        } => cmd_run(
            &system_path,
            &inputs_path,
            options.as_deref(),
            ignore_power_balance,
            output.as_deref(),
        ),
        Commands::Runs { system_path } => cmd_runs(&system_path),
    };
    if let Err(message) = outcome {
        eprintln!("error: {message}");
        std::process::exit(1);
    }
}

fn load_system(path: &Path) -> Result<SystemDef, String> {
    let loaded = if path.extension().is_some_and(|e| e == "json") {
        mf_project::load_json(path)
    } else {
        mf_project::load_yaml(path)
    };
    loaded.map_err(|e| e.to_string())
}

fn load_inputs(path: &Path) -> Result<RunInputs, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    if path.extension().is_some_and(|e| e == "json") {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    }
}

fn cmd_validate(system_path: &Path) -> Result<(), String> {
    println!("Validating topology: {}", system_path.display());
    let system = load_system(system_path)?;
    println!("✓ Topology '{}' is valid", system.name);
    Ok(())
}

fn cmd_run(
    system_path: &Path,
    inputs_path: &Path,
    options_path: Option<&Path>,
    ignore_power_balance: bool,
    output: Option<&Path>,
) -> Result<(), String> {
    let system_def = load_system(system_path)?;
    let inputs = load_inputs(inputs_path)?;
    let mut options = match options_path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
            serde_yaml::from_str::<RunOptions>(&content).map_err(|e| e.to_string())?
        }
        None => RunOptions::default(),
    };
    options.ignore_power_balance |= ignore_power_balance;

    println!("Running system: {}", system_def.name);
    let result = mf_app::run_service::run_from_def(&system_def, &inputs, &options)
        .map_err(|e| e.to_string())?;

    for (label, sub) in [
        ("electric", &result.electric_system),
        ("mechanical", &result.mechanical_system),
    ] {
        if let Some(res) = sub {
            println!("\n{label} system:");
            println!("  Duration:      {:.1} s", res.duration_s);
            println!("  Fuel:          {:.3} kg", res.fuel_consumption_total_kg());
            println!(
                "  CO2 (WtW):     {:.3} kg",
                res.co2_emission_total_kg.well_to_wake
            );
            println!(
                "  Genset hours:  {:.2} h",
                res.running_hours_genset_total_hr
            );
            if !res.warnings.is_empty() {
                println!("  Warnings:      {}", res.warnings.len());
            }
        }
    }

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
            std::fs::write(path, json).map_err(|e| e.to_string())?;
            println!("\n✓ Result written to {}", path.display());
        }
        None => {
            let run_id =
                run_id_for(&system_def, &inputs, &options).map_err(|e| e.to_string())?;
            let store = RunStore::for_project(system_path).map_err(|e| e.to_string())?;
            let manifest = RunManifest {
                run_id: run_id.clone(),
                system_name: system_def.name.clone(),
                solver_version: mf_app::run_service::SOLVER_VERSION.to_string(),
                fuel_regime: format!("{:?}", options.fuel_regime),
                integration_rule: format!("{:?}", options.integration_rule),
                timestamp: None,
            };
            store.save_run(&manifest, &result).map_err(|e| e.to_string())?;
            println!("\n✓ Run stored: {run_id}");
        }
    }
    Ok(())
}

fn cmd_runs(system_path: &Path) -> Result<(), String> {
    let store = RunStore::for_project(system_path).map_err(|e| e.to_string())?;
    let runs = store.list_runs().map_err(|e| e.to_string())?;
    if runs.is_empty() {
        println!("No stored runs");
    } else {
        println!("Stored runs:");
        for manifest in runs {
            println!("  {} ({})", manifest.run_id, manifest.system_name);
        }
    }
    Ok(())
}
