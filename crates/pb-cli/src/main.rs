use anyhow::{Context, Result};
use clap::Parser;
use pb_cli::{CliArgs, Command, export_json, new_snapshot, palette_listing, parse_background};
use pb_core::model::CanvasConfig;
use std::io::Write;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse();
    match args.command {
        Command::Export {
            input,
            output,
            title,
        } => {
            let json = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let html = export_json(&json, &title)
                .with_context(|| format!("exporting {}", input.display()))?;
            emit(output.as_deref(), &html)
        }
        Command::New {
            kinds,
            output,
            width,
            height,
            background,
        } => {
            let config = CanvasConfig {
                width,
                height,
                background: parse_background(&background)?,
            };
            let json = new_snapshot(&kinds, config)?;
            emit(output.as_deref(), &json)
        }
        Command::Prefabs => emit(None, &palette_listing()),
    }
}

fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes()).context("writing to stdout")?;
            if !text.ends_with('\n') {
                writeln!(stdout).context("writing to stdout")?;
            }
        }
    }
    Ok(())
}
