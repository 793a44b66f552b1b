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

//! PWM channel protocol for the vendor embedded controller.
//!
//! # Modes
//!
//! `pwm1_enable` holds the literal token `2` when software drives the duty
//! cycle. Any other content is treated as firmware-driven (auto).
//!
//! # Duty cycle
//!
//! `pwm1` is expressed against the ceiling in `pwm1_max`, or 255 when that
//! file is missing. Writes truncate the scaled value; reads round it back to
//! a percentage.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::json;

use crate::error::{FanError, Result};
use crate::hwmon::read_trimmed;
use crate::logger;

pub const PWM_FILE: &str = "pwm1";
pub const PWM_ENABLE_FILE: &str = "pwm1_enable";
pub const PWM_MAX_FILE: &str = "pwm1_max";

/// Conventional 8-bit PWM ceiling used when `pwm1_max` is unusable.
pub const DEFAULT_PWM_MAX: u32 = 255;

pub const MANUAL_TOKEN: &str = "2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FanMode {
    Auto,
    Manual,
}

impl FanMode {
    pub fn from_token(token: &str) -> FanMode {
        if token.trim() == MANUAL_TOKEN {
            FanMode::Manual
        } else {
            FanMode::Auto
        }
    }
}

/// Current mode, or `None` when the controller has no mode file.
pub fn read_pwm_mode(dir: &Path) -> Option<FanMode> {
    read_trimmed(dir.join(PWM_ENABLE_FILE)).ok().map(|s| FanMode::from_token(&s))
}

pub fn read_pwm_max(dir: &Path) -> u32 {
    read_trimmed(dir.join(PWM_MAX_FILE))
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_PWM_MAX)
}

pub fn read_pwm_value(dir: &Path) -> u32 {
    read_trimmed(dir.join(PWM_FILE))
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(0)
}

/// Raw duty value for `percent` of `scale`, truncated.
pub fn duty_for_percent(percent: u8, scale: u32) -> u32 {
    let percent = u64::from(percent.min(100));
    (percent * u64::from(scale) / 100) as u32
}

/// Percentage for a raw duty value, rounded to nearest.
pub fn percent_for_duty(raw: u32, scale: u32) -> u8 {
    if scale == 0 {
        return 0;
    }
    (f64::from(raw) * 100.0 / f64::from(scale)).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    AlreadyManual,
    Switched,
}

/// Put the controller in manual mode, writing only if it is not already.
pub fn ensure_manual_mode(dir: &Path) -> Result<ModeChange> {
    let path = dir.join(PWM_ENABLE_FILE);
    if !path.exists() {
        return Err(FanError::ModeUnavailable(path));
    }
    if let Ok(current) = read_trimmed(&path) {
        if current == MANUAL_TOKEN {
            return Ok(ModeChange::AlreadyManual);
        }
    }
    fs::write(&path, MANUAL_TOKEN).map_err(|source| FanError::ModeWrite { path: path.clone(), source })?;
    logger::log_event("mode_switch", json!({ "path": path.display().to_string(), "mode": "manual" }));
    Ok(ModeChange::Switched)
}

pub fn write_duty(dir: &Path, value: u32) -> Result<()> {
    let path = dir.join(PWM_FILE);
    fs::write(&path, value.to_string()).map_err(|source| FanError::DutyWrite { path, value, source })
}

/// Progress of a manual-mode-then-duty write sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ControlStage {
    Unknown,
    ModeVerified,
    DutyWritten,
}

/// One write sequence against a controller directory.
///
/// Each step short-circuits on failure and leaves `stage()` at the last
/// step that completed.
#[derive(Debug)]
pub struct FanWrite<'a> {
    dir: &'a Path,
    stage: ControlStage,
}

impl<'a> FanWrite<'a> {
    pub fn new(dir: &'a Path) -> Self {
        Self { dir, stage: ControlStage::Unknown }
    }

    pub fn stage(&self) -> ControlStage {
        self.stage
    }

    pub fn enable_manual(&mut self) -> Result<ModeChange> {
        let change = ensure_manual_mode(self.dir)?;
        self.stage = ControlStage::ModeVerified;
        Ok(change)
    }

    /// Write `percent` of the channel's ceiling, verifying the mode first if
    /// that has not happened yet. Returns the raw value written.
    pub fn write_percent(&mut self, percent: u8) -> Result<u32> {
        if self.stage == ControlStage::Unknown {
            self.enable_manual()?;
        }
        let scale = read_pwm_max(self.dir);
        let value = duty_for_percent(percent, scale);
        write_duty(self.dir, value)?;
        self.stage = ControlStage::DutyWritten;
        logger::log_event(
            "pwm_write",
            json!({
                "path": self.dir.display().to_string(),
                "percent": percent,
                "scale": scale,
                "written": value,
            }),
        );
        Ok(value)
    }
}

/// Named fan presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Preset {
    Silent,
    Performance,
    Turbo,
    Custom,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Silent, Preset::Performance, Preset::Turbo, Preset::Custom];

    /// Case-insensitive exact match. Unknown names map to `Custom`.
    pub fn parse(name: &str) -> Preset {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .unwrap_or(Preset::Custom)
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Silent => "Silent",
            Preset::Performance => "Performance",
            Preset::Turbo => "Turbo",
            Preset::Custom => "Custom",
        }
    }

    /// Fixed percentage, or `None` for `Custom` which leaves the fan alone.
    pub fn percent(self) -> Option<u8> {
        match self {
            Preset::Silent => Some(30),
            Preset::Performance => Some(65),
            Preset::Turbo => Some(85),
            Preset::Custom => None,
        }
    }

    /// The preset whose percentage is exactly `percent`, else `Custom`.
    pub fn for_percent(percent: u8) -> Preset {
        Self::ALL
            .into_iter()
            .find(|p| p.percent() == Some(percent))
            .unwrap_or(Preset::Custom)
    }
}
