//! leap_hue — command-line entry point.

use std::net::{IpAddr, ToSocketAddrs};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use leap_hue::app::{self, parse_light_list, AppConfig};

/// Drive Philips Hue lights with your hand.
///
/// Palm height maps to brightness, lateral offset to saturation and depth
/// to hue; each axis can be disabled independently.
#[derive(Parser)]
#[command(name = "leap_hue")]
#[command(version)]
struct Cli {
    /// IP address or hostname of the Hue bridge
    #[arg(short = 'b', long = "bridge")]
    bridge: String,

    /// Lights to control, by name or index, comma-separated (default: all)
    #[arg(short = 'l', long = "lightbulb")]
    lightbulb: Option<String>,

    /// Leave brightness untouched
    #[arg(long = "no-bri")]
    no_bri: bool,

    /// Leave saturation untouched
    #[arg(long = "no-sat")]
    no_sat: bool,

    /// Leave hue untouched
    #[arg(long = "no-hue")]
    no_hue: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Leap Hue — palm-position light controller             ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: scripted palm sweep  (use --features leap for hardware)");
    println!();

    let addr = resolve_bridge_addr(&cli.bridge)?;

    let mut cfg = AppConfig::new(addr);
    if let Some(raw) = cli.lightbulb.as_deref() {
        cfg.lights = parse_light_list(raw);
    }
    cfg.bri = !cli.no_bri;
    cfg.sat = !cli.no_sat;
    cfg.hue = !cli.no_hue;

    app::run(cfg)?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Accept a literal IP or resolve a hostname to one.
fn resolve_bridge_addr(raw: &str) -> anyhow::Result<IpAddr> {
    if let Ok(ip) = raw.parse::<IpAddr>() {
        return Ok(ip);
    }
    let mut addrs = (raw, 80_u16)
        .to_socket_addrs()
        .with_context(|| format!("cannot resolve bridge address `{}`", raw))?;
    addrs
        .next()
        .map(|a| a.ip())
        .ok_or_else(|| anyhow::anyhow!("no addresses found for `{}`", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_ip_parses_without_dns() {
        assert_eq!(
            resolve_bridge_addr("192.168.1.2").unwrap(),
            "192.168.1.2".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn missing_bridge_flag_is_a_usage_error() {
        assert!(Cli::try_parse_from(["leap_hue"]).is_err());
    }

    #[test]
    fn axis_flags_default_to_enabled() {
        let cli = Cli::try_parse_from(["leap_hue", "-b", "192.168.1.2"]).unwrap();
        assert!(!cli.no_bri && !cli.no_sat && !cli.no_hue);
    }

    #[test]
    fn light_list_flag_is_comma_separated() {
        let cli =
            Cli::try_parse_from(["leap_hue", "-b", "192.168.1.2", "-l", "Desk,Shelf"]).unwrap();
        assert_eq!(parse_light_list(cli.lightbulb.as_deref().unwrap()), ["Desk", "Shelf"]);
    }
}
