use log::{LevelFilter, error, info, warn};
use serde::Serialize;
use std::time::Instant;

use runqc::cli::core::{Commands, get_cli};
use runqc::cli::process::{ProcessSettings, check_process_settings};
use runqc::cli::reference::{ReferenceAction, ReferenceSettings, check_reference_settings};
use runqc::data_types::catalog::GIAB_CATALOG;
use runqc::data_types::layout::ProjectLayout;
use runqc::parsing::csv_layouts::CsvLayoutTable;
use runqc::pipeline::Pipeline;
use runqc::reference::checker::ReferenceChecker;
use runqc::reference::provisioner::ReferenceProvisioner;
use runqc::toolkit::runner::{CommandRunner, ToolRunner, probe_tool};
use runqc::toolkit::variant_tools::{BCFTOOLS, TABIX};
use runqc::util::json_io::save_json;

/// Set up logging before we check the other settings
fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

/// Makes sure the variant tools can run at all before any stage starts
fn probe_variant_tools(runner: &dyn ToolRunner) {
    for program in [BCFTOOLS, TABIX] {
        match probe_tool(runner, program) {
            Ok(version) => info!("Found {program}: {version}"),
            Err(e) => {
                error!("Error while probing {program}: {:#}", anyhow::Error::from(e));
                std::process::exit(exitcode::UNAVAILABLE);
            }
        }
    }
}

fn print_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            error!("Error while serializing output: {e}");
            std::process::exit(exitcode::SOFTWARE);
        }
    }
}

fn run_process(settings: ProcessSettings) {
    // start the timer
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_process_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let runner = CommandRunner;
    if settings.needs_variant_tools() {
        probe_variant_tools(&runner);
    }

    let layout = ProjectLayout::new(&settings.project_root);
    let csv_layouts = match settings.csv_layouts.as_deref() {
        Some(filename) => {
            info!("Loading CSV layouts from {filename:?}...");
            match CsvLayoutTable::from_layout_file(filename) {
                Ok(t) => t,
                Err(e) => {
                    error!("Error while loading CSV layouts: {e:#}");
                    std::process::exit(exitcode::CONFIG);
                }
            }
        },
        None => CsvLayoutTable::dragen_default()
    };
    info!("Loaded {} CSV layouts and {} catalog samples", csv_layouts.len(), GIAB_CATALOG.len());

    let pipeline = Pipeline::new(&layout, &GIAB_CATALOG, &runner, &csv_layouts);
    let report = match pipeline.run_pipeline(&settings.pipeline_request()) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while starting the pipeline: {e:#}");
            std::process::exit(exitcode::TEMPFAIL);
        }
    };

    if let Some(report_fn) = settings.report.as_deref() {
        info!("Saving run report to {report_fn:?}...");
        if let Err(e) = save_json(&report, report_fn) {
            error!("Error while saving run report: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    if !report.is_success() {
        error!("Processing finished with failed stages after {} seconds.", start_time.elapsed().as_secs_f64());
        std::process::exit(exitcode::SOFTWARE);
    }
    info!("Processing completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_reference(settings: ReferenceSettings) {
    init_logging(settings.verbosity);

    let settings = match check_reference_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let layout = ProjectLayout::new(&settings.project_root);
    let checker = ReferenceChecker::new(&layout, &GIAB_CATALOG);
    match settings.action {
        ReferenceAction::Status => print_json(&checker.reference_status(&settings.sample)),
        ReferenceAction::Check => print_json(&checker.check_references(&settings.sample)),
        ReferenceAction::Setup => {
            let runner = CommandRunner;
            let provisioner = ReferenceProvisioner::new(checker, &runner);
            let outcome = provisioner.ensure_references(&settings.sample, true);
            print_json(&outcome);
            if !outcome.ready {
                warn!("References are not ready: {}", outcome.message);
                std::process::exit(exitcode::UNAVAILABLE);
            }
        }
    }
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Process(settings) => {
            run_process(*settings);
        },
        Commands::Reference(settings) => {
            run_reference(*settings);
        }
    }
}
