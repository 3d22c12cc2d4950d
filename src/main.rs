//! # Salat Widget Entry Point
//!
//! This binary wakes the widget on a fixed cadence, redraws it from persisted
//! state, and refreshes the underlying data in the background when it runs
//! out or goes stale. It supports a one-line output for status bars (default)
//! and a framed card (`--card`).

// Test modules
#[cfg(test)]
mod tests;

use chrono::Local;
use salat_widget_lib::config::{Config, CONFIG_FILE};
use salat_widget_lib::renderer::{draw_ascii, draw_line};
use salat_widget_lib::wake::ClockWatch;
use salat_widget_lib::widget::{Widget, WidgetView};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Command line options.
#[derive(Debug, PartialEq, Eq)]
struct Args {
    /// Render once (refreshing first if needed) and exit
    once: bool,
    /// Framed card instead of a single line
    card: bool,
    /// Configuration file
    config_path: PathBuf,
}

fn parse_args<I>(args: I) -> anyhow::Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = Args {
        once: false,
        card: false,
        config_path: PathBuf::from(CONFIG_FILE),
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--once" => parsed.once = true,
            "--card" => parsed.card = true,
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config needs a path"))?;
                parsed.config_path = PathBuf::from(path);
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(parsed)
}

fn render<W: Write>(view: &WidgetView, card: bool, out: &mut W) -> io::Result<()> {
    if card {
        draw_ascii(view, out)?;
    } else {
        writeln!(out, "{}", draw_line(view))?;
    }
    out.flush()
}

fn render_stdout(view: &WidgetView, card: bool) -> io::Result<()> {
    render(view, card, &mut io::stdout().lock())
}

/// Refresh and render the result, logging rather than propagating failures.
async fn refresh_and_render(widget: Arc<Widget>, card: bool) {
    match widget.refresh(&Local::now()).await {
        Ok(Some(view)) => {
            if let Err(e) = render_stdout(&view, card) {
                tracing::warn!(error = %e, "cannot write widget output");
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "cannot persist widget state"),
    }
}

/// Render once, refreshing first if the stored state calls for it.
///
/// A refresh that fails for any reason, including an unwritable state file,
/// falls back to whatever the stored state shows. Only output errors escape.
async fn run_once<W: Write>(widget: &Widget, card: bool, out: &mut W) -> io::Result<()> {
    let presentation = widget.tick(&Local::now());
    if !presentation.needs_refresh {
        return render(&presentation.view, card, out);
    }

    let view = match widget.refresh(&Local::now()).await {
        Ok(Some(view)) => view,
        Ok(None) => presentation.view,
        Err(e) => {
            tracing::warn!(error = %e, "cannot persist widget state");
            presentation.view
        }
    };
    render(&view, card, out)
}

async fn run_loop(widget: Arc<Widget>, card: bool) -> anyhow::Result<()> {
    let period = Duration::from_secs(widget.config().widget.tick_seconds.max(1));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let tolerance = Duration::from_secs(widget.config().widget.clock_jump_tolerance_secs);
    let mut watch = ClockWatch::new(tolerance);
    let mut in_flight: Option<JoinHandle<()>> = None;

    tracing::info!(tick_secs = period.as_secs(), "widget running");

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }

        let now = Local::now();
        let clock_changed = watch.observe(&now, Instant::now());
        let presentation = widget.tick(&now);
        render_stdout(&presentation.view, card)?;

        let idle = in_flight.as_ref().map_or(true, JoinHandle::is_finished);
        if (presentation.needs_refresh || clock_changed) && idle {
            in_flight = Some(tokio::spawn(refresh_and_render(Arc::clone(&widget), card)));
        }
    }

    Ok(())
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for the widget output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = parse_args(env::args().skip(1))?;
    let config = Config::load_from_path(&args.config_path);
    let widget = Arc::new(Widget::new(config)?);

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    if args.once {
        rt.block_on(run_once(&widget, args.card, &mut io::stdout().lock()))?;
        Ok(())
    } else {
        rt.block_on(run_loop(widget, args.card))
    }
}
