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

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FanError, Result};
use crate::hwmon::HWMON_ROOT;
use crate::logger::DEFAULT_LOG_PATH;

/// Environment variable overriding `hwmon_root`.
pub const HWMON_ROOT_ENV: &str = "TUFFAN_HWMON_ROOT";

fn default_hwmon_root() -> PathBuf { PathBuf::from(HWMON_ROOT) }
fn default_log_path() -> PathBuf { PathBuf::from(DEFAULT_LOG_PATH) }

/// Runtime settings. Fan speeds are never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_hwmon_root")]
    pub hwmon_root: PathBuf,
    /// Write JSON event logs to `log_path`.
    #[serde(default)]
    pub logging: bool,
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hwmon_root: default_hwmon_root(),
            logging: false,
            log_path: default_log_path(),
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("tuffan").join("config.json");
    }
    if let Ok(home) = env::var("HOME") {
        return Path::new(&home)
            .join(".config")
            .join("tuffan")
            .join("config.json");
    }
    PathBuf::from("/etc/tuffan/config.json")
}

pub fn validate_settings(settings: &Settings) -> std::result::Result<(), String> {
    if settings.hwmon_root.as_os_str().is_empty() {
        return Err("hwmon_root must not be empty".to_string());
    }
    if !settings.hwmon_root.is_absolute() {
        return Err(format!("hwmon_root must be absolute: {}", settings.hwmon_root.display()));
    }
    if settings.logging && settings.log_path.as_os_str().is_empty() {
        return Err("log_path must not be empty when logging is enabled".to_string());
    }
    Ok(())
}

/// Parse and validate settings from `path`. A missing file yields defaults.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let mut settings = match fs::read_to_string(path) {
        Ok(data) => serde_json::from_str::<Settings>(&data)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Settings::default(),
        Err(e) => return Err(e.into()),
    };
    if let Ok(root) = env::var(HWMON_ROOT_ENV) {
        if !root.is_empty() {
            settings.hwmon_root = PathBuf::from(root);
        }
    }
    validate_settings(&settings).map_err(FanError::Config)?;
    Ok(settings)
}

pub fn load_settings() -> Result<Settings> {
    load_settings_from(&config_path())
}
