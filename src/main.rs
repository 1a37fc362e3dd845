use anyhow::{bail, Context};
use std::path::PathBuf;
use tracing::info;

use rota_allocator::config::{RotaConfig, ServerSettings};
use rota_allocator::display::{print_week_schedule, write_week_to_file};
use rota_allocator::schedule::schedule_from_path;
use rota_allocator::{logging, web};

const USAGE: &str = "usage: rota-allocator [--config <file>] web [port]\n       \
                     rota-allocator [--config <file>] <roster.xlsx|roster.csv> [--json] [--out <file>]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = take_option(&mut args, "--config")?.map(PathBuf::from);
    let config = RotaConfig::load(config_path.as_deref()).context("loading staffing config")?;

    // Web mode
    if args.first().map(String::as_str) == Some("web") {
        let port = match args.get(1) {
            Some(p) => Some(p.parse::<u16>().with_context(|| format!("invalid port \"{}\"", p))?),
            None => None,
        };
        let settings = ServerSettings::from_env(port);
        println!("Access the site at http://localhost:{}", settings.port);
        web::start_server(settings, config).await?;
        return Ok(());
    }

    // CLI mode
    let out_path = take_option(&mut args, "--out")?.map(PathBuf::from);
    let as_json = take_flag(&mut args, "--json");
    let Some(roster_path) = args.first() else {
        bail!(USAGE);
    };

    info!(path = %roster_path, "processing roster file");
    let schedule = schedule_from_path(&config, roster_path)
        .with_context(|| format!("processing {}", roster_path))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
    } else {
        print_week_schedule(&schedule);
    }

    if let Some(out_path) = out_path {
        write_week_to_file(&schedule, &out_path)?;
        println!("\nRota saved to {}", out_path.display());
    }

    Ok(())
}

/// Removes `name <value>` from the argument list and returns the value.
/// A trailing `name` with nothing after it is a usage error.
fn take_option(args: &mut Vec<String>, name: &str) -> anyhow::Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    args.remove(pos);
    if pos >= args.len() {
        bail!("{} needs a value\n{}", name, USAGE);
    }
    Ok(Some(args.remove(pos)))
}

fn take_flag(args: &mut Vec<String>, name: &str) -> bool {
    match args.iter().position(|a| a == name) {
        Some(pos) => {
            args.remove(pos);
            true
        }
        None => false,
    }
}
