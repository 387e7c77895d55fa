//! `wanwatch poll`: one acquisition, no tracking.

use tabled::Tabled;
use tracing::debug;

use wanwatch_core::{Acquisition, InterfaceStatus, MonitorConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ────────────────────────────────────────────────────────

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Interface")]
    name: String,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "IP Address")]
    ip_address: String,
    #[tabled(rename = "Subnet Mask")]
    subnet_mask: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "Mode")]
    ip_mode: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Comment")]
    comment: String,
}

impl InterfaceRow {
    fn new(iface: &InterfaceStatus, color: bool) -> Self {
        Self {
            name: iface.name.clone(),
            link: output::paint_status(iface.link_up, color),
            ip_address: output::or_dash(iface.ip_address.as_deref()),
            subnet_mask: output::or_dash(iface.subnet_mask.as_deref()),
            speed: output::or_dash(iface.link_speed.as_deref()),
            ip_mode: output::or_dash(iface.ip_mode.as_deref()),
            zone: output::or_dash(iface.zone.as_deref()),
            comment: output::or_dash(iface.comment.as_deref()),
        }
    }
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(config: &MonitorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let source = Acquisition::from_config(config)?;
    debug!(
        method = source.method(),
        endpoint = %config.source.endpoint(),
        wanted = %config.wanted,
        "polling once"
    );
    let interfaces = source.poll(&config.wanted).await?;

    let color = output::should_color(global.color);
    let out = output::render_list(
        global.output,
        &interfaces,
        |iface| InterfaceRow::new(iface, color),
        |iface| format!("{}\t{}", iface.name, iface.link_up),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
