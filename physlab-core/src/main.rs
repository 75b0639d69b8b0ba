use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use physlab_core::logging;
use physlab_core::{Frame, PresetLoader, ScenarioKind};

/// Headless runner for the physlab teaching scenarios
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding `<name>.yaml` presets
    #[arg(long, global = true, default_value = "presets")]
    presets: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a preset and print one JSON frame per sampled step
    Run {
        /// Preset name, without the .yaml extension
        preset: String,

        /// Number of steps to run
        #[arg(long, default_value_t = 600)]
        steps: usize,

        /// Print every K-th frame
        #[arg(long, default_value_t = 1)]
        every: usize,

        /// Switch position for circuit presets
        #[arg(long, value_enum, default_value_t = Switch::Charge)]
        switch: Switch,
    },
    /// List available presets
    List,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    Charge,
    Discharge,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let loader = PresetLoader::new(&args.presets);
    match args.command {
        Command::List => list(&loader),
        Command::Run {
            preset,
            steps,
            every,
            switch,
        } => run(&loader, &preset, steps, every.max(1), switch),
    }
}

fn list(loader: &PresetLoader) -> Result<()> {
    let names = loader
        .list()
        .with_context(|| format!("listing presets in {}", loader.base_path().display()))?;
    if names.is_empty() {
        log::warn!("no presets found in {}", loader.base_path().display());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for name in names {
        let preset = loader.load(&name)?;
        writeln!(out, "{name:<20} {:<10} {}", preset.parameters.kind(), preset.description)?;
    }
    Ok(())
}

fn run(loader: &PresetLoader, name: &str, steps: usize, every: usize, switch: Switch) -> Result<()> {
    let preset = loader
        .load(name)
        .with_context(|| format!("loading preset `{name}`"))?;
    log::info!("running {} ({}) for {steps} steps", preset.name, preset.parameters.kind());

    let mut lab = preset.controller();
    if lab.kind() == ScenarioKind::Circuit {
        match switch {
            Switch::Charge => lab.charge()?,
            Switch::Discharge => lab.discharge()?,
        }
    } else {
        lab.play();
    }

    let mut out = BufWriter::new(io::stdout().lock());
    emit(&mut out, &lab.frame())?;

    for step in 1..=steps {
        let outcome = lab.advance();
        for event in &outcome.events {
            log::info!("t={:.3}s {:?}", lab.frame().elapsed, event);
        }
        let stopped = !lab.is_running();
        if step % every == 0 || stopped {
            emit(&mut out, &lab.frame())?;
        }
        if stopped {
            break;
        }
    }

    out.flush()?;
    Ok(())
}

fn emit(out: &mut impl Write, frame: &Frame) -> Result<()> {
    serde_json::to_writer(&mut *out, frame)?;
    writeln!(out)?;
    Ok(())
}
