//! Replay command: drives the built-in page with a scripted event sequence.

use crate::cli::common::{CliError, CliResult};
use crate::config::Config;
use crate::dom::{Key, KeyEvent};
use crate::ui::markup::restaurant_page;
use crate::ui::{Page, PageSnapshot};
use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Replay an event script against the built-in restaurant page
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Path to a JSON array of steps
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Configuration file (defaults to the user configuration)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output the final snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

/// One scripted input event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Click the first element matching `target`
    Click { target: String },
    /// Move focus to the first element matching `target`
    Focus { target: String },
    /// Press `key` (DOM key name) on the focused element
    Key {
        key: String,
        #[serde(default)]
        shift: bool,
    },
    /// Scroll the window to `y`
    Scroll { y: f64 },
    /// Resize the viewport
    Resize { inner_width: f64, client_width: f64 },
    /// Type `value` into a form control
    Input { target: String, value: String },
    /// Submit a form
    Submit { target: String },
    /// Move the clock forward
    Advance { ms: u64 },
    /// Run one animation frame
    Frame,
    /// Run until nothing is pending
    Settle,
    /// Footer entered or left the viewport
    Footer { in_view: bool },
    /// Horizontal touch swipe starting on `target`
    Swipe { target: String, from: f64, to: f64 },
    /// A CSS transition finished on `target`
    TransitionEnd {
        target: String,
        #[serde(default = "default_transition_property")]
        property: String,
    },
}

fn default_transition_property() -> String {
    "height".to_string()
}

impl ReplayArgs {
    /// Execute replay command
    pub fn execute(&self) -> CliResult<()> {
        let config = match &self.config {
            Some(path) => Config::load_from(path).map_err(|e| {
                CliError::validation(format!("Failed to load configuration: {e:#}"))
            })?,
            None => Config::load()
                .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?,
        };
        let steps = read_script(&self.script)?;
        info!("Replaying {} steps from {}", steps.len(), self.script.display());

        let snapshot = replay(config, &steps)?;

        if self.json {
            let json = serde_json::to_string_pretty(&snapshot)
                .map_err(|e| CliError::io(format!("Failed to serialize snapshot to JSON: {e}")))?;
            println!("{json}");
        } else {
            output_human_readable(&snapshot);
        }
        Ok(())
    }
}

/// Parses a replay script.
pub fn parse_script(source: &str) -> Result<Vec<Step>> {
    serde_json::from_str(source).context("Invalid replay script")
}

fn read_script(path: &Path) -> CliResult<Vec<Step>> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        CliError::io(format!("Failed to read script {}: {}", path.display(), e))
    })?;
    Ok(parse_script(&source)?)
}

/// Mounts the built-in page, applies `steps` and returns the final state.
pub fn replay(config: Config, steps: &[Step]) -> Result<PageSnapshot> {
    let mut page = Page::mount(restaurant_page(), config)?;
    page.load();
    for (index, step) in steps.iter().enumerate() {
        apply(&mut page, step).with_context(|| format!("Step {} ({step:?}) failed", index + 1))?;
    }
    page.snapshot()
}

fn apply(page: &mut Page, step: &Step) -> Result<()> {
    debug!("step {step:?}");
    match step {
        Step::Click { target } => {
            let node = page.query(target)?;
            page.click(node)?;
        }
        Step::Focus { target } => {
            let node = page.query(target)?;
            page.focus(node);
        }
        Step::Key { key, shift } => {
            let key = Key::from_dom(key);
            let event = if *shift {
                KeyEvent::shifted(key)
            } else {
                KeyEvent::new(key)
            };
            page.key_down(event)?;
        }
        Step::Scroll { y } => page.scroll_to(*y),
        Step::Resize {
            inner_width,
            client_width,
        } => page.resize(*inner_width, *client_width),
        Step::Input { target, value } => {
            let node = page.query(target)?;
            page.input(node, value);
        }
        Step::Submit { target } => {
            let node = page.query(target)?;
            page.submit(node)?;
        }
        Step::Advance { ms } => page.advance(*ms)?,
        Step::Frame => page.run_animation_frame()?,
        Step::Settle => page.settle()?,
        Step::Footer { in_view } => page.footer_intersection(*in_view),
        Step::Swipe { target, from, to } => {
            let node = page.query(target)?;
            page.touch_start(node, *from);
            page.touch_move(*to);
            page.touch_end();
        }
        Step::TransitionEnd { target, property } => {
            let node = page.query(target)?;
            page.transition_end(node, property);
        }
    }
    Ok(())
}

fn output_human_readable(snapshot: &PageSnapshot) {
    let state = |value: Option<String>| value.unwrap_or_else(|| "(absent)".to_string());
    println!("Page State");
    println!("==========");
    println!();
    println!(
        "  Overlay:       {}",
        state(snapshot.overlay.map(|s| format!("{s:?}").to_lowercase()))
    );
    println!(
        "  Modal:         {}",
        state(snapshot.modal.map(|s| format!("{s:?}").to_lowercase()))
    );
    println!("  Bottom bar:    {}", if snapshot.bottom_bar_visible { "shown" } else { "hidden" });
    if snapshot.expanded_submenus.is_empty() {
        println!("  Submenus:      (none)");
    } else {
        println!("  Submenus:      {}", snapshot.expanded_submenus.join(", "));
    }
    println!("  Focused:       {}", snapshot.focused);
    println!("  Toast:         {}", state(snapshot.toast.clone()));
    println!(
        "  Testimonial:   {}",
        state(snapshot.carousel_index.map(|i| (i + 1).to_string()))
    );
    if !snapshot.invalid_fields.is_empty() {
        let names: Vec<&str> = snapshot.invalid_fields.iter().map(|f| f.name()).collect();
        println!("  Invalid:       {}", names.join(", "));
    }
    println!("  Scroll:        {}", snapshot.scroll_y);
    println!("  Clock:         {} ms", snapshot.now_ms);
}
