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

//! Cached sensor state handed to the presentation layer.

use serde::Serialize;

use crate::fan::FanMode;

/// One normalized temperature reading in whole-degree Celsius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureSample {
    pub label: String,
    pub celsius: f64,
}

impl TemperatureSample {
    pub fn new<S: Into<String>>(label: S, celsius: f64) -> Self {
        Self { label: label.into(), celsius }
    }

    pub fn severity(&self) -> Severity {
        Severity::of(self.celsius)
    }
}

/// Last known fan speed and duty-cycle setting.
///
/// `rpm` is 0 when no tachometer exists, which does not mean the fan stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FanSample {
    pub rpm: u32,
    pub percent: u8,
}

/// Whether a snapshot holds real measurements or the fixed placeholder set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshStatus {
    Real,
    Placeholder,
}

/// Coarse temperature bands used for display colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Cool,
    Normal,
    Elevated,
    High,
}

impl Severity {
    pub fn of(celsius: f64) -> Severity {
        if celsius >= 70.0 {
            Severity::High
        } else if celsius >= 55.0 {
            Severity::Elevated
        } else if celsius >= 40.0 {
            Severity::Normal
        } else {
            Severity::Cool
        }
    }

    pub fn status_text(self) -> &'static str {
        match self {
            Severity::High => "High",
            Severity::Elevated => "Elevated",
            Severity::Normal => "Normal",
            Severity::Cool => "Cool",
        }
    }
}

pub const CPU_PACKAGE_LABEL: &str = "CPU Package";
pub const CHIPSET_LABEL: &str = "PCH";

/// Aggregate of every reading taken in one refresh pass.
///
/// Always replaced as a whole, never field by field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub status: RefreshStatus,
    pub cpu_package: TemperatureSample,
    pub chipset: TemperatureSample,
    pub fan: FanSample,
    pub fan_mode: Option<FanMode>,
    pub auxiliary: Vec<TemperatureSample>,
}

impl Snapshot {
    /// An empty real snapshot that a refresh pass fills in.
    pub(crate) fn blank(percent: u8) -> Self {
        Self {
            status: RefreshStatus::Real,
            cpu_package: TemperatureSample::new(CPU_PACKAGE_LABEL, 0.0),
            chipset: TemperatureSample::new(CHIPSET_LABEL, 0.0),
            fan: FanSample { rpm: 0, percent },
            fan_mode: None,
            auxiliary: Vec::new(),
        }
    }

    /// Fixed, clearly synthetic data shown when no sensor exists at all.
    pub fn placeholder() -> Self {
        let auxiliary = ["CPU Core 1", "CPU Core 2", "NVMe Drive", "PCH", "ACPI Zone 1", "ACPI Zone 2"]
            .into_iter()
            .map(|label| TemperatureSample::new(label, 0.0))
            .collect();
        Self {
            status: RefreshStatus::Placeholder,
            cpu_package: TemperatureSample::new(CPU_PACKAGE_LABEL, 0.0),
            chipset: TemperatureSample::new(CHIPSET_LABEL, 0.0),
            fan: FanSample::default(),
            fan_mode: None,
            auxiliary,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.status == RefreshStatus::Placeholder
    }

    /// Hottest reading across the whole snapshot.
    pub fn hottest(&self) -> Option<&TemperatureSample> {
        std::iter::once(&self.cpu_package)
            .chain(std::iter::once(&self.chipset))
            .chain(self.auxiliary.iter())
            .max_by(|a, b| a.celsius.total_cmp(&b.celsius))
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::placeholder()
    }
}
