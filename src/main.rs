//! Drive-cycle expansion entry point: CLI wiring and report printing.

mod cli;

use std::fmt::Display;
use std::process;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use drivecycle::engine::{Engine, find_overlaps};
use drivecycle::io::{export_csv, export_json, export_schedule_csv, export_step_table_csv};
use drivecycle::model::CycleConfig;

use cli::Cli;

fn fail(message: impl Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let config = CycleConfig::from_json_file(&cli.config).unwrap_or_else(|e| fail(e));
    let (settings, settings_name) = cli.engine_settings().unwrap_or_else(|e| fail(e));

    let errors = settings.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Config problems are reported but only fatal under --strict
    let problems = config.validate();
    for p in &problems {
        warn!("{p}");
    }
    for overlap in find_overlaps(&config.calendar_rules) {
        info!("{overlap}");
    }
    if cli.strict && !problems.is_empty() {
        fail(format!("{} config problem(s), aborting (--strict)", problems.len()));
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(drivecycle::api::AppState { settings });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new()
            .unwrap_or_else(|e| fail(format!("failed to create tokio runtime: {e}")));
        if let Err(e) = rt.block_on(drivecycle::api::serve(state, addr)) {
            fail(format!("API server: {e}"));
        }
        return;
    }

    #[cfg(feature = "tui")]
    if cli.tui {
        if let Err(e) = drivecycle::tui::run(config, settings, &settings_name) {
            fail(format!("TUI crashed: {e}"));
        }
        return;
    }

    info!(settings = %settings_name, "expanding {}", cli.config.display());
    let engine = Engine::new(settings);
    let report = engine.run(&config);

    for day in &report.days {
        println!("{day}");
    }

    if let Some(granularity) = cli.granularity {
        println!("\n--- Periods ({granularity}) ---");
        for p in report.periods(granularity) {
            println!(
                "{:<14} {:>12.0} s .. {:>12.0} s",
                p.label, p.start_time, p.end_time
            );
        }
    }

    println!("\n{}", report.stats());

    if !report.skipped.is_empty() {
        println!("\n--- Skipped Steps ---");
        for (reason, count) in report.skipped.iter() {
            println!("{reason:<18} {count}");
        }
    }

    if !report.warnings.is_empty() {
        println!("\n--- Warnings ---");
        for w in &report.warnings {
            println!("{w}");
        }
    }

    if let Some(path) = &cli.csv {
        if let Err(e) = export_csv(&report.profile, path) {
            fail(format!("failed to write CSV: {e}"));
        }
        eprintln!("Profile written to {}", path.display());
    }
    if let Some(path) = &cli.schedule_csv {
        if let Err(e) = export_schedule_csv(&report.days, path) {
            fail(format!("failed to write schedule CSV: {e}"));
        }
        eprintln!("Schedule written to {}", path.display());
    }
    if let Some(path) = &cli.steps_csv {
        let rows = engine.step_table(&config, &report.days);
        if let Err(e) = export_step_table_csv(&rows, path) {
            fail(format!("failed to write step table CSV: {e}"));
        }
        eprintln!("Step table written to {}", path.display());
    }
    if let Some(path) = &cli.json {
        if let Err(e) = export_json(&config, path) {
            fail(format!("failed to write JSON: {e}"));
        }
        eprintln!("Config written to {}", path.display());
    }
}
