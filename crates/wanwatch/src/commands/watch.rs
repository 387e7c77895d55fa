//! `wanwatch watch`: background polling with live events and bandwidth.
//!
//! Link events print as the monitor records them. After every
//! successful poll the current link table (or, for structured formats,
//! the full snapshot) is printed. Runs until Ctrl-C or `--count` polls.

use tabled::Tabled;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use wanwatch_core::{LinkEvent, Monitor, MonitorConfig, MonitorSnapshot};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

// ── Table row ────────────────────────────────────────────────────────

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "Interface")]
    name: String,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "Since")]
    since: String,
    #[tabled(rename = "In 10s")]
    in_short: String,
    #[tabled(rename = "Out 10s")]
    out_short: String,
    #[tabled(rename = "In 60s")]
    in_long: String,
    #[tabled(rename = "Out 60s")]
    out_long: String,
}

fn link_rows(snapshot: &MonitorSnapshot, color: bool) -> Vec<LinkRow> {
    snapshot
        .links
        .iter()
        .map(|(name, state)| {
            let windows = snapshot.bandwidth.get(name).map_or(&[][..], Vec::as_slice);
            let rate_for = |secs: u64| {
                windows
                    .iter()
                    .find(|w| w.window_secs == secs)
                    .and_then(|w| w.rate.as_ref())
            };
            let (in_short, out_short) = output::rate_cells(rate_for(10));
            let (in_long, out_long) = output::rate_cells(rate_for(60));

            LinkRow {
                name: name.clone(),
                link: output::paint_status(state.link_up, color),
                since: state.last_change_time.format(TIME_FORMAT).to_string(),
                in_short,
                out_short,
                in_long,
                out_long,
            }
        })
        .collect()
}

fn render_snapshot(
    snapshot: &MonitorSnapshot,
    global: &GlobalOpts,
    color: bool,
) -> Result<String, CliError> {
    output::render_single(
        global.output,
        snapshot,
        |snap| {
            let polled = snap
                .last_poll_at
                .map_or_else(|| "never".into(), |t| t.format(TIME_FORMAT).to_string());
            let header = output::dim(&format!("polled {polled} via {}", snap.method), color);
            format!("{header}\n{}", output::render_table(&link_rows(snap, color)))
        },
        |snap| {
            snap.links
                .iter()
                .map(|(name, state)| format!("{name}\t{}", state.link_up))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )
}

fn format_event(event: &LinkEvent, color: bool) -> String {
    let when = output::dim(&event.timestamp.format(TIME_FORMAT).to_string(), color);
    let kind = output::paint_event(event.event, color);
    match event.duration_secs {
        Some(secs) => format!(
            "{when}  {}  {kind}  (previous state lasted {})",
            event.interface_name,
            output::format_duration(secs)
        ),
        None => format!("{when}  {}  {kind}  (first observation)", event.interface_name),
    }
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(
    config: MonitorConfig,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let monitor = Monitor::new(config)?;
    debug!(
        endpoint = %monitor.config().source.endpoint(),
        interval_secs = monitor.config().refresh_interval.as_secs(),
        "starting watch"
    );
    let mut latest = monitor.latest();
    let mut events = monitor.events();
    let color = output::should_color(global.color);
    let print_events = !global.output.is_structured();

    monitor.start().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut polls: u64 = 0;

    let result = loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => {
                info!("interrupted");
                break Ok(());
            }
            received = events.recv(), if print_events => match received {
                Ok(event) => output::print_output(&format_event(&event, color), global.quiet),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event output fell behind"),
                Err(RecvError::Closed) => break Ok(()),
            },
            changed = latest.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let snapshot = monitor.snapshot().await;
                match render_snapshot(&snapshot, global, color) {
                    Ok(out) => output::print_output(&out, global.quiet),
                    Err(e) => break Err(e),
                }
                polls += 1;
                if args.count.is_some_and(|count| polls >= count) {
                    break Ok(());
                }
            }
        }
    };

    monitor.shutdown().await;
    result
}
