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

//! The controller object the presentation layer talks to.
//!
//! All calls are synchronous and run on the caller's thread. The controller
//! holds no locks; callers sharing it across threads must wrap it themselves.

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::config::Settings;
use crate::error::{FanError, Result};
use crate::fan::{self, FanMode, FanWrite, Preset};
use crate::hwmon::{self, DeviceClass, HwmonRoot};
use crate::logger;
use crate::snapshot::{
    FanSample, RefreshStatus, Snapshot, TemperatureSample, CHIPSET_LABEL, CPU_PACKAGE_LABEL,
};

pub struct FanController {
    root: HwmonRoot,
    // Vendor EC directory, reused across writes until a write fails.
    ec_path: Option<PathBuf>,
    snapshot: Snapshot,
    last_error: Option<FanError>,
    warned: bool,
}

impl FanController {
    pub fn new(settings: &Settings) -> Self {
        Self::with_root(HwmonRoot::new(&settings.hwmon_root))
    }

    pub fn with_root(root: HwmonRoot) -> Self {
        Self {
            root,
            ec_path: None,
            snapshot: Snapshot::placeholder(),
            last_error: None,
            warned: false,
        }
    }

    pub fn root(&self) -> &HwmonRoot {
        &self.root
    }

    /// Cached controller directory, if discovery has found one.
    pub fn controller_path(&self) -> Option<&Path> {
        self.ec_path.as_deref()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn status(&self) -> RefreshStatus {
        self.snapshot.status
    }

    pub fn cpu_package_temperature(&self) -> f64 {
        self.snapshot.cpu_package.celsius
    }

    pub fn chipset_temperature(&self) -> f64 {
        self.snapshot.chipset.celsius
    }

    pub fn fan_state(&self) -> FanSample {
        self.snapshot.fan
    }

    pub fn fan_mode(&self) -> Option<FanMode> {
        self.snapshot.fan_mode
    }

    pub fn auxiliary_temperatures(&self) -> &[TemperatureSample] {
        &self.snapshot.auxiliary
    }

    pub fn last_error(&self) -> Option<&FanError> {
        self.last_error.as_ref()
    }

    /// Re-read every sensor category and replace the snapshot.
    ///
    /// Falls back to [`Snapshot::placeholder`] when nothing at all was found.
    pub fn refresh(&mut self) -> RefreshStatus {
        let mut next = Snapshot::blank(self.snapshot.fan.percent);
        let mut any_sensor = false;

        if let Some(dir) = self.root.find_class(DeviceClass::CpuPackage) {
            for t in hwmon::read_temps(&dir) {
                any_sensor = true;
                let label = t.label.to_lowercase();
                if label.contains("package") || label.contains("id 0") {
                    next.cpu_package = TemperatureSample::new(CPU_PACKAGE_LABEL, t.celsius);
                }
                next.auxiliary.push(t);
            }
        }

        if let Some(dir) = self.root.find_class(DeviceClass::Chipset) {
            if let Some(first) = hwmon::read_temps(&dir).into_iter().next() {
                any_sensor = true;
                next.chipset = TemperatureSample::new(CHIPSET_LABEL, first.celsius);
                next.auxiliary.push(first);
            }
        }

        if let Some(dir) = self.root.find_class(DeviceClass::Nvme) {
            for t in hwmon::read_temps(&dir) {
                any_sensor = true;
                next.auxiliary.push(TemperatureSample::new("NVMe Drive", t.celsius));
            }
        }

        if let Some(dir) = self.root.find_class(DeviceClass::AcpiThermal) {
            for (i, t) in hwmon::read_temps(&dir).into_iter().enumerate() {
                any_sensor = true;
                next.auxiliary.push(TemperatureSample::new(format!("ACPI Zone {}", i + 1), t.celsius));
            }
        }

        self.ec_path = self.root.find_class(DeviceClass::VendorEc);
        if let Some(dir) = &self.ec_path {
            let scale = fan::read_pwm_max(dir);
            next.fan = FanSample {
                rpm: hwmon::read_fan_rpm(dir),
                percent: fan::percent_for_duty(fan::read_pwm_value(dir), scale),
            };
            next.fan_mode = fan::read_pwm_mode(dir);
            any_sensor = true;
        }

        if !any_sensor {
            logger::log_event("placeholder_snapshot", json!({ "root": self.root.path().display().to_string() }));
            next = Snapshot::placeholder();
        }

        logger::log_event(
            "refresh",
            json!({
                "status": next.status,
                "cpu_package": next.cpu_package.celsius,
                "chipset": next.chipset.celsius,
                "fan": next.fan,
                "auxiliary": next.auxiliary.len(),
            }),
        );
        self.snapshot = next;
        self.snapshot.status
    }

    /// Drive the fan at a fixed percentage. Returns false if any step failed.
    ///
    /// The cached percentage is updated even on failure so the UI reflects
    /// the requested state; `last_error` explains what went wrong.
    pub fn set_fixed_fan_percent(&mut self, percent: i32) -> bool {
        let clamped = percent.clamp(0, 100) as u8;
        match self.write_fan_percent(clamped) {
            Ok(()) => {
                self.last_error = None;
                true
            }
            Err(e) => {
                self.snapshot.fan.percent = clamped;
                logger::log_event(
                    "pwm_write_failed",
                    json!({
                        "percent": clamped,
                        "step": e.step().map(|s| format!("{:?}", s)),
                        "error": e.to_string(),
                    }),
                );
                self.last_error = Some(e);
                false
            }
        }
    }

    fn write_fan_percent(&mut self, percent: u8) -> Result<()> {
        let dir = match self.ec_path.clone().or_else(|| self.root.find_class(DeviceClass::VendorEc)) {
            Some(dir) => dir,
            None => {
                self.snapshot.fan.rpm = 0;
                return Err(FanError::ControllerNotFound(self.root.path().to_path_buf()));
            }
        };

        let mut write = FanWrite::new(&dir);
        if let Err(e) = write.write_percent(percent) {
            // Stale or broken handle: discover again next time.
            self.ec_path = None;
            return Err(e);
        }

        // Never mix real fan values into the placeholder set.
        if self.snapshot.is_placeholder() {
            self.refresh();
            if self.snapshot.is_placeholder() {
                self.snapshot = Snapshot::blank(percent);
            }
        }
        self.snapshot.fan = FanSample { rpm: hwmon::read_fan_rpm(&dir), percent };
        self.snapshot.fan_mode = Some(FanMode::Manual);
        self.ec_path = Some(dir);
        Ok(())
    }

    /// Apply a named preset. `Custom` and unknown names leave the fan as is
    /// and report success.
    pub fn apply_preset(&mut self, name: &str) -> bool {
        match Preset::parse(name).percent() {
            Some(percent) => self.set_fixed_fan_percent(i32::from(percent)),
            None => true,
        }
    }

    /// The write-failure warning, handed out at most once per controller.
    pub fn take_permission_warning(&mut self) -> Option<String> {
        if self.warned {
            return None;
        }
        let err = self.last_error.as_ref()?;
        self.warned = true;
        let hint = if err.is_permission_denied() {
            format!(
                "Run as root or grant write access to {}/*/{} and {}.",
                self.root.path().display(),
                fan::PWM_FILE,
                fan::PWM_ENABLE_FILE,
            )
        } else {
            format!(
                "Check that the fan controller under {} exposes {} and {} and that they are writable (root privileges are usually required).",
                self.root.path().display(),
                fan::PWM_FILE,
                fan::PWM_ENABLE_FILE,
            )
        };
        Some(format!("Cannot write the fan PWM value.\n\nReason: {}\n\n{}", err, hint))
    }
}
