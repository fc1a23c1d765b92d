//! Headless entry points behind the `pb` binary.
//!
//! Each subcommand is a plain function over strings so it can be tested
//! without touching the filesystem; `main.rs` only does I/O.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pb_core::model::{CanvasConfig, PrefabKind};
use pb_core::snapshot::CanvasSnapshot;
use pb_core::{Color, Point};
use pb_editor::EditorSession;
use pb_render::ExportOptions;
use pb_render::layout::rendered_height;
use std::path::PathBuf;

/// Left edge and vertical gap used when stacking elements for `new`.
pub const STACK_MARGIN: f64 = 20.0;

#[derive(Debug, Parser)]
#[command(name = "pb")]
#[command(about = "Prefab Builder: build canvas snapshots and export them to HTML")]
#[command(version)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export a snapshot JSON file to a standalone HTML document
    Export {
        /// Snapshot JSON written by the editor
        input: PathBuf,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Document title
        #[arg(long, default_value = "Prefab Export")]
        title: String,
    },

    /// Build a snapshot from palette ids, stacked top to bottom
    New {
        /// Prefab ids in placement order (unknown ids become placeholders)
        #[arg(required = true)]
        kinds: Vec<String>,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Canvas width in pixels
        #[arg(long, default_value = "960")]
        width: f64,

        /// Canvas height in pixels
        #[arg(long, default_value = "640")]
        height: f64,

        /// Canvas background as hex
        #[arg(long, default_value = "#ffffff")]
        background: String,
    },

    /// List the prefab palette
    Prefabs,
}

/// Render snapshot JSON as an export document.
pub fn export_json(json: &str, title: &str) -> Result<String> {
    let snapshot = CanvasSnapshot::from_json(json).context("reading snapshot")?;
    let mut session = EditorSession::from_snapshot(snapshot);
    session.export_options = ExportOptions {
        title: title.to_string(),
    };
    Ok(session.export_html())
}

/// Place each kind in order, one below the other, and return the
/// snapshot JSON.
pub fn new_snapshot(kinds: &[String], config: CanvasConfig) -> Result<String> {
    let mut session = EditorSession::new(config);
    let mut y = STACK_MARGIN;
    for kind in kinds {
        let id = session.place_at(kind, Point::new(STACK_MARGIN, y));
        if let Some(element) = session.canvas().get(id) {
            if !element.kind.is_known() {
                log::warn!("unknown prefab {kind:?}, placing a placeholder");
            }
            y += rendered_height(element) + STACK_MARGIN;
        }
    }
    session.select(None);
    session
        .snapshot()
        .to_json()
        .context("encoding snapshot")
}

/// One palette id per line.
pub fn palette_listing() -> String {
    PrefabKind::PALETTE
        .iter()
        .map(|kind| format!("{kind}\n"))
        .collect()
}

pub fn parse_background(hex: &str) -> Result<Color> {
    Color::from_hex(hex).with_context(|| format!("invalid background color {hex:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_stacks_elements_vertically() {
        let json = new_snapshot(&kinds(&["nav", "card"]), CanvasConfig::default()).unwrap();
        let snapshot = CanvasSnapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.elements.len(), 2);
        assert_eq!(snapshot.next_id, 3);
        let nav = &snapshot.elements[0];
        let card = &snapshot.elements[1];
        assert_eq!(nav.position, Point::new(20.0, 20.0));
        assert_eq!(card.position.x, 20.0);
        assert_eq!(card.position.y, 20.0 + rendered_height(nav) + 20.0);
    }

    #[test]
    fn new_then_export() {
        let json = new_snapshot(&kinds(&["hero", "mystery"]), CanvasConfig::default()).unwrap();
        let html = export_json(&json, "Landing").unwrap();
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<title>Landing</title>"));
        assert!(html.contains("pf-hero"));
        assert!(html.contains("mystery"));
        assert!(!html.contains("pf-handle"));
    }

    #[test]
    fn export_reports_bad_json() {
        let err = export_json("{", "x").unwrap_err();
        assert!(format!("{err:#}").starts_with("reading snapshot"));
    }

    #[test]
    fn palette_in_display_order() {
        assert_eq!(palette_listing(), "hero\nnav\ncard\nbutton\nimage\n");
    }

    #[test]
    fn args_parse() {
        let args = CliArgs::parse_from(["pb", "new", "hero", "card", "-o", "out.json"]);
        match args.command {
            Command::New { kinds, output, width, .. } => {
                assert_eq!(kinds, vec!["hero", "card"]);
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert_eq!(width, 960.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
