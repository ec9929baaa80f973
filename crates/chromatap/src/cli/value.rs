//! `value` subcommand — send one manual color report.

use std::path::Path;

use chromatap_lib::osc::{MessageSink, OscMessage, UdpSink};

use super::{Result, color};

pub(super) fn cmd_value(input: &str, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path);
    let c = color::parse_color(input)?;
    let mut sink = UdpSink::connect(&config.osc_host, config.osc_port)?;
    let msg = OscMessage::value(c);
    sink.send(&msg)?;
    println!("{msg} -> {}", sink.target());
    Ok(())
}
