//! `run` subcommand — the appliance loop (buttons in, LEDs and OSC out).

use std::path::Path;

use chromatap_lib::context::{ApplianceLoop, DeviceContext};
use chromatap_lib::control::{CommandSource, NoCommands};

use super::keys::TerminalKeys;
use super::{Config, RUNNING, Result, color};

/// Open backends, build the loop, and show the startup color.
fn appliance_setup(config: &Config) -> Result<ApplianceLoop> {
    let ctx = DeviceContext::open(config)?;
    println!("[camera]  {}", ctx.backends.camera);
    println!(
        "[buttons] {} ({} channels, shutter = {})",
        ctx.backends.input,
        config.button_pins.len(),
        config.shutter_channel
    );
    println!("[leds]    {} ({} LEDs)", ctx.backends.strip, config.led_count);
    println!("[osc]     {}", ctx.backends.target);

    let mut lp = ctx.into_loop(config)?;
    lp.startup()?;
    println!(
        "[color]   startup -> {}",
        color::format_color(lp.resolved())
    );
    Ok(lp)
}

/// Drive ticks until exit. Shutdown runs inside `run` on every path.
fn appliance_loop(lp: &mut ApplianceLoop, commands: &mut impl CommandSource) -> Result<()> {
    lp.run(commands, &RUNNING)
}

fn appliance_teardown(lp: &mut ApplianceLoop) {
    // Idempotent; already done unless the loop never started.
    lp.shutdown();
    println!();
    println!(
        "{} capture(s), last color {}.",
        lp.captures(),
        color::format_color(lp.resolved())
    );
    println!("Done.");
}

pub(super) fn cmd_run(config_path: Option<&Path>, no_keys: bool) -> Result<()> {
    let config = super::validated(super::load_config(config_path))?;

    // Banner
    println!("Chromatap — press the shutter button to sample a color.");
    if no_keys {
        println!("Press Ctrl+C to exit (turns the LEDs off).");
    } else {
        println!("Keys: s = capture, q / Esc = exit (turns the LEDs off).");
    }
    println!();

    let mut lp = appliance_setup(&config)?;
    println!();

    let result = if no_keys {
        appliance_loop(&mut lp, &mut NoCommands)
    } else {
        let mut keys = TerminalKeys::enable()?;
        appliance_loop(&mut lp, &mut keys)
    };

    appliance_teardown(&mut lp);
    result
}
