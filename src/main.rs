/*
 * This file is part of Tuffan.
 *
 * Copyright (C) 2025 Tuffan contributors
 *
 * Tuffan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Tuffan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Tuffan. If not, see <https://www.gnu.org/licenses/>.
 */

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, bail, Context};

use tuffan::config::{config_path, load_settings};
use tuffan::fan::Preset;
use tuffan::snapshot::TemperatureSample;
use tuffan::{logger, system, FanController, RefreshStatus};

const USAGE: &str = "usage: tuffan [--logging] [--root <dir>] [--load-modules] [status [--json] | scan [--json] | set <percent> | preset <name>]";

enum Command {
    Status { json: bool },
    Scan { json: bool },
    Set(i32),
    Preset(String),
}

struct Args {
    logging: bool,
    root: Option<PathBuf>,
    load_modules: bool,
    command: Command,
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut logging = false;
    let mut root = None;
    let mut load_modules = false;
    let mut json = false;
    let mut positional: Vec<&str> = Vec::new();

    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--logging" => logging = true,
            "--load-modules" => load_modules = true,
            "--json" => json = true,
            "--root" => {
                let dir = it.next().ok_or_else(|| anyhow!("--root needs a directory"))?;
                root = Some(PathBuf::from(dir));
            }
            "-h" | "--help" => bail!(USAGE),
            other => positional.push(other),
        }
    }

    let command = match positional.as_slice() {
        [] | ["status"] => Command::Status { json },
        ["scan"] => Command::Scan { json },
        ["set", pct] => Command::Set(pct.parse().with_context(|| format!("invalid percent: {}", pct))?),
        ["preset", name] => Command::Preset(name.to_string()),
        _ => bail!(USAGE),
    };

    Ok(Args { logging, root, load_modules, command })
}

fn format_temp(t: &TemperatureSample) -> String {
    format!("{:>4}°C  {}", t.celsius.round() as i64, t.severity().status_text())
}

fn print_status(ctl: &FanController) {
    let dmi = Path::new(system::DMI_ID_DIR);
    let machine = system::read_machine_name(dmi);
    if !machine.is_empty() {
        println!("{}", machine);
    }
    if ctl.controller_path().is_none() && !system::is_asus_machine(dmi) {
        println!("No ASUS embedded controller found; fan control is unavailable.");
    }
    if ctl.status() == RefreshStatus::Placeholder {
        println!("No hardware sensors found; showing placeholder values.");
    }
    let snap = ctl.snapshot();
    println!("{:<16}{}", snap.cpu_package.label, format_temp(&snap.cpu_package));
    println!("{:<16}{}", snap.chipset.label, format_temp(&snap.chipset));
    let fan = ctl.fan_state();
    let mode = ctl.fan_mode().map(|m| format!("{:?}", m).to_lowercase()).unwrap_or_else(|| "-".into());
    println!(
        "{:<16}{} rpm  {}%  mode {}  preset {}",
        "Fan",
        fan.rpm,
        fan.percent,
        mode,
        Preset::for_percent(fan.percent).name()
    );
    for t in ctl.auxiliary_temperatures() {
        println!("  {:<14}{}", t.label, format_temp(t));
    }
    if let Some(hot) = snap.hottest().filter(|_| !snap.is_placeholder()) {
        println!("Hottest: {} at {}°C", hot.label, hot.celsius.round() as i64);
    }
}

fn require_root() {
    if unsafe { libc::geteuid() } != 0 {
        eprintln!("Error: changing the fan speed requires root privileges.");
        eprintln!("Please run with: sudo {}", std::env::args().next().unwrap_or_else(|| "tuffan".to_string()));
        process::exit(1);
    }
}

fn main() -> anyhow::Result<()> {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(2);
        }
    };

    let mut settings = load_settings().with_context(|| format!("loading {}", config_path().display()))?;
    if let Some(root) = args.root {
        settings.hwmon_root = root;
    }

    if args.logging || settings.logging {
        if let Some(path) = logger::init_logging(&settings.log_path) {
            logger::log_event("startup", serde_json::json!({ "args": raw, "log": path.display().to_string() }));
        }
    }

    if args.load_modules {
        let loaded = system::load_sensor_modules();
        logger::log_event("modules_loaded", serde_json::json!({ "modules": loaded }));
    }

    let mut ctl = FanController::new(&settings);

    match args.command {
        Command::Status { json } => {
            ctl.refresh();
            if json {
                println!("{}", serde_json::to_string_pretty(ctl.snapshot())?);
            } else {
                print_status(&ctl);
            }
        }
        Command::Scan { json } => {
            let devices = ctl.root().enumerate_devices();
            if json {
                println!("{}", serde_json::to_string_pretty(&devices)?);
                return Ok(());
            }
            if devices.is_empty() {
                println!("No hwmon devices under {}", settings.hwmon_root.display());
            }
            for d in devices {
                let class = d.class.map(|c| c.label()).unwrap_or("-");
                println!("{:<28} {:<20} {}", d.path.display(), d.name, class);
            }
        }
        Command::Set(percent) => {
            if settings.hwmon_root == Path::new(tuffan::hwmon::HWMON_ROOT) {
                require_root();
            }
            ctl.refresh();
            if !ctl.set_fixed_fan_percent(percent) {
                let warning = ctl.take_permission_warning().unwrap_or_default();
                eprintln!("{}", warning);
                process::exit(1);
            }
            println!("Fan set to {}% ({} rpm)", ctl.fan_state().percent, ctl.fan_state().rpm);
        }
        Command::Preset(name) => {
            if settings.hwmon_root == Path::new(tuffan::hwmon::HWMON_ROOT) {
                require_root();
            }
            ctl.refresh();
            let preset = Preset::parse(&name);
            if !ctl.apply_preset(&name) {
                let warning = ctl.take_permission_warning().unwrap_or_default();
                eprintln!("{}", warning);
                process::exit(1);
            }
            match preset.percent() {
                Some(p) => println!("Applied {} preset ({}%)", preset.name(), p),
                None => println!("Custom: fan left at {}%", ctl.fan_state().percent),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_default_status() {
        let a = parse_args(&args(&[])).unwrap();
        assert!(matches!(a.command, Command::Status { json: false }));
        assert!(!a.logging);
    }

    #[test]
    fn test_parse_set_with_flags() {
        let a = parse_args(&args(&["--logging", "--root", "/tmp/hw", "set", "-5"])).unwrap();
        assert!(a.logging);
        assert_eq!(a.root, Some(PathBuf::from("/tmp/hw")));
        assert!(matches!(a.command, Command::Set(-5)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&["set", "fast"])).is_err());
        assert!(parse_args(&args(&["--root"])).is_err());
        assert!(parse_args(&args(&["frobnicate"])).is_err());
    }

    #[test]
    fn test_parse_preset_and_json() {
        let a = parse_args(&args(&["preset", "Turbo"])).unwrap();
        assert!(matches!(a.command, Command::Preset(ref n) if n == "Turbo"));
        let a = parse_args(&args(&["status", "--json", "--load-modules"])).unwrap();
        assert!(matches!(a.command, Command::Status { json: true }));
        assert!(a.load_modules);
    }
}
