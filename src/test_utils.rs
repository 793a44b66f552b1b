/*
 * Test utilities for Tuffan
 *
 * Builds throwaway hwmon trees in a temporary directory so discovery,
 * sensor reading and PWM writes can be exercised without real hardware.
 */

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::controller::FanController;
use crate::hwmon::HwmonRoot;

/// A fake `/sys/class/hwmon` rooted in a temporary directory.
pub struct FakeHwmon {
    dir: TempDir,
}

impl FakeHwmon {
    pub fn new() -> Self {
        Self { dir: TempDir::new().expect("create temp dir") }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn root(&self) -> HwmonRoot {
        HwmonRoot::new(self.dir.path())
    }

    pub fn fan_controller(&self) -> FanController {
        FanController::with_root(self.root())
    }

    /// Create `hwmon<idx>` without a `name` file.
    pub fn bare_device(&self, idx: usize) -> PathBuf {
        let dir = self.dir.path().join(format!("hwmon{}", idx));
        fs::create_dir_all(&dir).expect("create device dir");
        dir
    }

    /// Create `hwmon<idx>` declaring `name`.
    pub fn device(&self, idx: usize, name: &str) -> PathBuf {
        let dir = self.bare_device(idx);
        self.write(&dir, "name", &format!("{}\n", name));
        dir
    }

    /// An ASUS embedded controller with a single PWM channel and tachometer.
    pub fn controller(&self, idx: usize, enable: &str, max: Option<&str>) -> PathBuf {
        let dir = self.device(idx, "asus-nb-wmi");
        self.write(&dir, "pwm1", "0");
        self.write(&dir, "pwm1_enable", enable);
        if let Some(max) = max {
            self.write(&dir, "pwm1_max", max);
        }
        self.write(&dir, "fan1_input", "2600");
        dir
    }

    pub fn write(&self, dir: &Path, file: &str, contents: &str) {
        fs::write(dir.join(file), contents).expect("write fake sysfs file");
    }

    pub fn read(&self, dir: &Path, file: &str) -> String {
        fs::read_to_string(dir.join(file)).expect("read fake sysfs file").trim().to_string()
    }

    /// A full FX705GE-style tree: ACPI zones, PCH, coretemp, NVMe and the EC.
    pub fn laptop(&self) -> PathBuf {
        let acpi = self.device(0, "acpitz");
        self.write(&acpi, "temp1_input", "45000");
        self.write(&acpi, "temp2_input", "47000");

        let pch = self.device(1, "pch_cannonlake");
        self.write(&pch, "temp1_input", "52000");

        let core = self.device(2, "coretemp");
        self.write(&core, "temp1_input", "60000");
        self.write(&core, "temp1_label", "Package id 0");
        self.write(&core, "temp2_input", "58000");
        self.write(&core, "temp2_label", "Core 0");
        self.write(&core, "temp3_input", "59000");
        self.write(&core, "temp3_label", "Core 1");

        let nvme = self.device(3, "nvme");
        self.write(&nvme, "temp1_input", "38850");
        self.write(&nvme, "temp1_label", "Composite");

        let ec = self.controller(4, "2", None);
        self.write(&ec, "pwm1", "128");
        ec
    }
}

impl Default for FakeHwmon {
    fn default() -> Self {
        Self::new()
    }
}
