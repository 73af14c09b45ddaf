//! Command implementations

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::toml_config::RepairConfig;
use crate::app::{AppContainer, RepairRequest};
use crate::cli::Cli;
use crate::domain::model::AnalysisReport;
use crate::engine::ScratchWorkspace;
use crate::error::{VidfixError, VidfixResult};
use crate::utils::default_output_path;

/// What the user answered at the confirmation prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Proceed,
    Cancel,
}

/// Empty input, `y` and `yes` proceed; anything else cancels
pub fn parse_confirmation(answer: &str) -> Confirmation {
    match answer.trim().to_lowercase().as_str() {
        "" | "y" | "yes" => Confirmation::Proceed,
        _ => Confirmation::Cancel,
    }
}

/// Ask `Continue? (Y/n)`; a closed input stream cancels
pub fn confirm<R: BufRead>(mut reader: R) -> io::Result<Confirmation> {
    print!("Continue? (Y/n): ");
    io::stdout().flush()?;

    let mut answer = String::new();
    if reader.read_line(&mut answer)? == 0 {
        println!();
        return Ok(Confirmation::Cancel);
    }
    Ok(parse_confirmation(&answer))
}

fn print_banner() {
    println!("{}", "=".repeat(60));
    println!("vidfix - MP4 repair");
    println!("   Fixes frozen sections and local playback stutter");
    println!("{}", "=".repeat(60));
}

fn print_plan(report: &AnalysisReport) {
    println!("\n{}", "=".repeat(60));
    println!("Repair plan");
    println!("{}", "=".repeat(60));
    for step in report.strategy.steps() {
        println!("  {}", step);
    }
    println!("\n{}", "=".repeat(60));
}

/// Analyze, confirm, repair and verify one file.
///
/// Cancelling at the prompt is a success; a failed or interrupted repair
/// is an error.
pub async fn repair(cli: &Cli, config: &RepairConfig) -> Result<()> {
    let input = cli.input.as_path();
    if !input.is_file() {
        return Err(VidfixError::InputFileNotFound {
            path: input.to_path_buf(),
        }
        .into());
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input));
    if same_file(input, &output) {
        anyhow::bail!("Output path must differ from the input: {}", output.display());
    }

    print_banner();
    info!(input = %input.display(), output = %output.display(), "Starting repair");

    let container = AppContainer::new(config);
    let report = container.analyze_interactor().analyze(input).await;

    print_plan(&report);
    if !cli.yes {
        let answer = confirm(io::stdin().lock()).context("Failed to read confirmation")?;
        if answer == Confirmation::Cancel {
            println!("Cancelled");
            return Ok(());
        }
    }

    let workspace = ScratchWorkspace::create().context("Failed to create scratch directory")?;
    println!("Scratch: {}", workspace.path().display());

    let request = RepairRequest {
        input,
        output: &output,
        workspace: &workspace,
    };
    let repair_interactor = container.repair_interactor();

    let outcome = interruptible(repair_interactor.execute(&report, &request)).await;

    workspace.close();

    if let Err(e) = outcome {
        warn!("Repair failed: {}", e);
        return Err(e).context("Repair failed");
    }

    println!("\n{}", "=".repeat(60));
    println!("Done");
    println!("{}", "=".repeat(60));
    let verification = interruptible(container.verify_interactor().verify(&output, &report))
        .await
        .context("Verification failed")?;
    println!("{}", verification);

    Ok(())
}

/// Race `work` against Ctrl-C.
///
/// Once the first call installs the SIGINT handler the default action is
/// gone for the rest of the process, so every phase that spawns tools after
/// the prompt goes through here.
async fn interruptible<T, F>(work: F) -> VidfixResult<T>
where
    F: Future<Output = VidfixResult<T>>,
{
    tokio::select! {
        result = work => result,
        // a handler that fails to install disables this branch
        Ok(()) = tokio::signal::ctrl_c() => {
            println!("\n\nInterrupted");
            Err(VidfixError::Interrupted)
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
