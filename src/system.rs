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

use std::fs;
use std::path::Path;
use std::process::Command;

pub const DMI_ID_DIR: &str = "/sys/devices/virtual/dmi/id";

/// Kernel drivers backing the device classes the controller reads.
pub const SENSOR_MODULES: &[&str] = &["coretemp", "asus_nb_wmi", "asus_wmi", "nvme"];

/// Machine model from DMI, e.g. "ASUSTeK COMPUTER INC. TUF Gaming FX705GE".
pub fn read_machine_name(dmi_dir: &Path) -> String {
    let read_trim = |f: &str| -> Option<String> {
        fs::read_to_string(dmi_dir.join(f))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let vendor = read_trim("sys_vendor").or_else(|| read_trim("board_vendor"));
    let product = read_trim("product_name").or_else(|| read_trim("board_name"));
    match (vendor, product) {
        (Some(v), Some(p)) => format!("{} {}", v, p),
        (Some(v), None) => v,
        (None, Some(p)) => p,
        (None, None) => String::new(),
    }
}

pub fn is_asus_machine(dmi_dir: &Path) -> bool {
    read_machine_name(dmi_dir).to_lowercase().contains("asus")
}

/// Best-effort `modprobe` of the sensor drivers. Returns the modules that
/// loaded successfully.
pub fn load_sensor_modules() -> Vec<&'static str> {
    SENSOR_MODULES
        .iter()
        .copied()
        .filter(|module| {
            Command::new("modprobe")
                .arg("-q")
                .arg(module)
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_machine_name_vendor_and_product() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("sys_vendor"), "ASUSTeK COMPUTER INC.\n").unwrap();
        fs::write(dir.path().join("product_name"), "TUF Gaming FX705GE_FX705GE\n").unwrap();

        assert_eq!(read_machine_name(dir.path()), "ASUSTeK COMPUTER INC. TUF Gaming FX705GE_FX705GE");
        assert!(is_asus_machine(dir.path()));
    }

    #[test]
    fn test_machine_name_board_fallback() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("board_name"), "FX705GE\n").unwrap();
        fs::write(dir.path().join("sys_vendor"), "\n").unwrap();

        assert_eq!(read_machine_name(dir.path()), "FX705GE");
        assert!(!is_asus_machine(dir.path()));
    }

    #[test]
    fn test_machine_name_missing() {
        assert_eq!(read_machine_name(Path::new("/nonexistent/dmi")), "");
    }
}
