//! Exelius bootstrap CLI
//!
//! Usage:
//!   bootstrap                 Sync submodules, acquire Premake, generate build files
//!   bootstrap -v              Same, with detailed output
//!   bootstrap -f              Force a submodule update even when all are present
//!   bootstrap -s              Sync submodules only, then exit

use anyhow::{Context, Result};
use clap::Parser;
use exelius_bootstrap::helpers::consent::StdinPrompt;
use exelius_bootstrap::helpers::process::SystemRunner;
use exelius_bootstrap::{Bootstrap, Console, Error, Report, RunConfig, Settings, Sink};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "bootstrap")]
#[command(about = "Prepare a developer machine to build the Exelius engine")]
#[command(version)]
struct Cli {
    /// Print detailed progress
    #[arg(short, long)]
    verbose: bool,

    /// Run the submodule update even if every submodule is present
    #[arg(short, long)]
    full: bool,

    /// Only sync submodules, then exit
    #[arg(short, long)]
    submodule: bool,

    /// Fail the run when project generation fails
    #[arg(long)]
    strict: bool,

    /// Project root
    #[arg(short = 'C', long, default_value = ".")]
    root: PathBuf,

    /// Settings file (defaults to bootstrap.toml in the project root)
    #[arg(long, env = "EXELIUS_BOOTSTRAP_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let console = Console::new(cli.verbose);

    match run(&cli, &console) {
        Ok(report) => {
            summarize(&report, &console);
            ExitCode::SUCCESS
        }
        Err(err) => {
            console.error(&format!("{:#}", err));
            let code = err.downcast_ref::<Error>().map(Error::exit_code).unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli, console: &Console) -> Result<Report> {
    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("Project root not found: {}", cli.root.display()))?;

    let config = RunConfig {
        verbose: cli.verbose,
        force_submodule_update: cli.full,
        submodules_only: cli.submodule,
        strict: cli.strict,
    };
    let settings = Settings::load(&root, cli.config.as_deref())?;
    let sdk_root = std::env::var(&settings.vulkan.env_var).ok();

    let bootstrap = Bootstrap::detect(root, config, settings).with_sdk_root(sdk_root);
    let report = bootstrap.run(&SystemRunner, &mut StdinPrompt, console)?;
    Ok(report)
}

fn summarize(report: &Report, console: &Console) {
    let subs = &report.submodules;
    console.detail(&format!(
        "{} submodule(s) declared, {} missing{}",
        subs.declared.len(),
        subs.missing.len(),
        if subs.updated { ", updated" } else { "" }
    ));
    if let Some(premake) = &report.premake {
        console.detail(&format!("Premake: {}", premake.state));
    }
    if let Some(sdk) = &report.sdk {
        if let Some(libs) = &sdk.debug_libs {
            console.detail(&format!("Vulkan debug libraries: {}", libs.state));
        }
    }
    match report.downloads() {
        0 => {}
        n => console.info(&format!("{} download(s) this run", n)),
    }
}
