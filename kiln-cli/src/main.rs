mod bake;

use anyhow::Context as _;
use clap::Parser;
use kiln_cache::Context;
use std::path::PathBuf;
use std::process::ExitCode;

/// Bake author-time assets into the runtime content cache.
#[derive(Parser, Debug)]
#[command(name = "kiln-bake", version, about)]
struct Args {
    /// Output cache directory.
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Input resource files. Inputs must live under the current working
    /// directory; materials may reference shaders baked earlier in the
    /// same list.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(&args) {
        Ok(failures) if failures == 0 => ExitCode::SUCCESS,
        Ok(failures) => {
            log::error!("{failures} input(s) failed to bake");
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<usize> {
    let context = Context::new(&args.output)
        .with_context(|| format!("opening cache at {}", args.output.display()))?;
    let source_root = std::env::current_dir().context("resolving source root")?;

    // Sequential by design: a failed input never aborts the batch, and
    // later materials may depend on shaders baked just before them.
    let mut failures = 0usize;
    for input in &args.inputs {
        if let Err(e) = bake::bake_one(&context, &source_root, input) {
            log::error!("failed to bake {}: {e:#}", input.display());
            failures += 1;
        }
    }
    Ok(failures)
}
