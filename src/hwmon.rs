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

//! Hardware-monitor discovery and sensor reading.
//!
//! Every device under the hwmon root exposes a `name` file plus uniform
//! `temp<N>_input`, `temp<N>_label` and `fan<N>_input` channels. Devices are
//! located by matching fragments of their declared name.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;

use crate::logger;
use crate::snapshot::TemperatureSample;

pub const HWMON_ROOT: &str = "/sys/class/hwmon";

/// Milli-vs-unit heuristic: raw temperatures above this magnitude are taken to
/// be in thousandths of a degree.
pub const MILLI_THRESHOLD: f64 = 200.0;

/// Device classes the controller knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    VendorEc,
    CpuPackage,
    Chipset,
    Nvme,
    AcpiThermal,
}

impl DeviceClass {
    pub const ALL: [DeviceClass; 5] = [
        DeviceClass::VendorEc,
        DeviceClass::CpuPackage,
        DeviceClass::Chipset,
        DeviceClass::Nvme,
        DeviceClass::AcpiThermal,
    ];

    /// Name fragments identifying this class, matched case-insensitively.
    pub fn needles(self) -> &'static [&'static str] {
        match self {
            DeviceClass::VendorEc => &["asus", "asus-nb-wmi"],
            DeviceClass::CpuPackage => &["coretemp"],
            DeviceClass::Chipset => &["pch", "pch_cannonlake"],
            DeviceClass::Nvme => &["nvme"],
            DeviceClass::AcpiThermal => &["acpitz", "acpi"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceClass::VendorEc => "vendor embedded controller",
            DeviceClass::CpuPackage => "CPU package",
            DeviceClass::Chipset => "chipset",
            DeviceClass::Nvme => "NVMe",
            DeviceClass::AcpiThermal => "ACPI thermal zone",
        }
    }

    /// First class whose needles match the declared device name.
    pub fn classify(name: &str) -> Option<DeviceClass> {
        Self::ALL.into_iter().find(|c| name_matches(name, c.needles()))
    }
}

/// One monitor directory as seen by `scan`.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub path: PathBuf,
    pub name: String,
    pub class: Option<DeviceClass>,
}

/// Handle on the hwmon root directory.
#[derive(Debug, Clone)]
pub struct HwmonRoot {
    path: PathBuf,
}

impl Default for HwmonRoot {
    fn default() -> Self {
        Self::new(HWMON_ROOT)
    }
}

impl HwmonRoot {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // hwmon* subdirectories ordered by numeric suffix, so hwmon2 sorts before hwmon10.
    fn candidates(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.path) else {
            return Vec::new();
        };
        let mut dirs: Vec<(Option<usize>, String, PathBuf)> = entries
            .flatten()
            .filter_map(|ent| {
                let fname = ent.file_name().to_string_lossy().into_owned();
                let path = ent.path();
                if !fname.starts_with("hwmon") || !path.is_dir() {
                    return None;
                }
                Some((extract_index(&fname, "hwmon", ""), fname, path))
            })
            .collect();
        dirs.sort_by(|a, b| match (a.0, b.0) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.1.cmp(&b.1),
        });
        dirs.into_iter().map(|(_, _, p)| p).collect()
    }

    /// First directory whose `name` contains any of `needles`.
    pub fn find_by_name(&self, needles: &[&str]) -> Option<PathBuf> {
        let found = self.candidates().into_iter().find(|dir| {
            read_trimmed(dir.join("name"))
                .map(|name| name_matches(&name, needles))
                .unwrap_or(false)
        });
        logger::log_event(
            "discovery",
            json!({
                "needles": needles,
                "path": found.as_ref().map(|p| p.display().to_string()),
            }),
        );
        found
    }

    pub fn find_class(&self, class: DeviceClass) -> Option<PathBuf> {
        self.find_by_name(class.needles())
    }

    /// Every monitor directory with its declared name and class.
    pub fn enumerate_devices(&self) -> Vec<DeviceInfo> {
        self.candidates()
            .into_iter()
            .map(|path| {
                let name = read_trimmed(path.join("name")).unwrap_or_else(|_| "unknown".into());
                let class = DeviceClass::classify(&name);
                DeviceInfo { path, name, class }
            })
            .collect()
    }
}

fn name_matches(name: &str, needles: &[&str]) -> bool {
    let name = name.to_lowercase();
    needles.iter().any(|n| name.contains(&n.to_lowercase()))
}

/// Parse a raw temperature reading into whole degrees Celsius.
///
/// Unparseable input yields `0.0`. Values above [`MILLI_THRESHOLD`] are
/// treated as millidegrees.
pub fn parse_temperature(raw: &str) -> f64 {
    let val = match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => return 0.0,
    };
    if val > MILLI_THRESHOLD {
        val / 1000.0
    } else {
        val
    }
}

// Channel files matching prefix<N>suffix, ordered by N.
fn channel_files(dir: &Path, prefix: &str, suffix: &str) -> Vec<(usize, PathBuf)> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut out: Vec<(usize, PathBuf)> = entries
        .flatten()
        .filter_map(|f| {
            let fname = f.file_name();
            let idx = extract_index(&fname.to_string_lossy(), prefix, suffix)?;
            Some((idx, f.path()))
        })
        .collect();
    out.sort_by_key(|(idx, _)| *idx);
    out
}

/// Read every temperature channel in `dir`, labelled from `temp<N>_label`
/// or `temp<N>` when no label exists.
pub fn read_temps(dir: &Path) -> Vec<TemperatureSample> {
    channel_files(dir, "temp", "_input")
        .into_iter()
        .map(|(idx, input)| {
            let base = format!("temp{}", idx);
            let label = read_trimmed(dir.join(format!("{}_label", base)))
                .ok()
                .filter(|l| !l.is_empty())
                .unwrap_or(base);
            let raw = read_trimmed(&input).unwrap_or_default();
            TemperatureSample::new(label, parse_temperature(&raw))
        })
        .collect()
}

/// First tachometer channel that parses as an integer, or 0 when none does.
pub fn read_fan_rpm(dir: &Path) -> u32 {
    channel_files(dir, "fan", "_input")
        .into_iter()
        .find_map(|(_, p)| read_trimmed(p).ok()?.parse::<u32>().ok())
        .unwrap_or(0)
}

pub(crate) fn read_trimmed<P: AsRef<Path>>(p: P) -> io::Result<String> {
    let mut s = String::new();
    fs::File::open(p)?.read_to_string(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn extract_index(fname: &str, prefix: &str, suffix: &str) -> Option<usize> {
    if fname.len() >= prefix.len() + suffix.len() && fname.starts_with(prefix) && fname.ends_with(suffix) {
        let mid = &fname[prefix.len()..fname.len() - suffix.len()];
        mid.parse().ok()
    } else {
        None
    }
}
