/*
 * Integration tests for Tuffan
 *
 * These tests drive the public controller API against a fake hwmon tree
 * and check the read and write paths end to end.
 */

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use tuffan::config::{load_settings_from, HWMON_ROOT_ENV};
use tuffan::fan::{duty_for_percent, DEFAULT_PWM_MAX};
use tuffan::hwmon::{DeviceClass, HwmonRoot};
use tuffan::{ControlStep, FanController, FanSample, RefreshStatus, Snapshot};

fn device(root: &Path, idx: usize, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(format!("hwmon{}", idx));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("name"), format!("{}\n", name)).unwrap();
    for (file, contents) in files {
        fs::write(dir.join(file), contents).unwrap();
    }
    dir
}

fn read(dir: &Path, file: &str) -> String {
    fs::read_to_string(dir.join(file)).unwrap().trim().to_string()
}

fn fx705ge(root: &Path) -> PathBuf {
    device(root, 0, "acpitz", &[("temp1_input", "27800")]);
    device(root, 1, "coretemp", &[
        ("temp1_input", "64000"),
        ("temp1_label", "Package id 0"),
        ("temp2_input", "62000"),
        ("temp2_label", "Core 0"),
    ]);
    device(root, 2, "pch_cannonlake", &[("temp1_input", "55")]);
    device(root, 3, "asus-nb-wmi", &[
        ("pwm1", "0"),
        ("pwm1_enable", "1"),
        ("fan1_input", "3300"),
    ])
}

#[test]
fn test_read_then_write_then_read() {
    let tmp = TempDir::new().unwrap();
    let ec = fx705ge(tmp.path());
    let mut ctl = FanController::with_root(HwmonRoot::new(tmp.path()));

    assert_eq!(ctl.refresh(), RefreshStatus::Real);
    assert_eq!(ctl.cpu_package_temperature(), 64.0);
    assert_eq!(ctl.chipset_temperature(), 55.0);
    assert_eq!(ctl.fan_state(), FanSample { rpm: 3300, percent: 0 });

    assert!(ctl.apply_preset("performance"));
    assert_eq!(read(&ec, "pwm1_enable"), "2");
    assert_eq!(read(&ec, "pwm1"), duty_for_percent(65, DEFAULT_PWM_MAX).to_string());

    ctl.refresh();
    assert_eq!(ctl.fan_state().percent, 65);
    let labels: Vec<&str> = ctl.auxiliary_temperatures().iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, ["Package id 0", "Core 0", "temp1", "ACPI Zone 1"]);
}

#[test]
fn test_duplicate_labels_allowed() {
    let tmp = TempDir::new().unwrap();
    device(tmp.path(), 0, "pch_cannonlake", &[("temp1_input", "50000"), ("temp1_label", "PCH")]);
    let mut ctl = FanController::with_root(HwmonRoot::new(tmp.path()));

    assert_eq!(ctl.refresh(), RefreshStatus::Real);
    assert_eq!(ctl.snapshot().chipset.label, "PCH");
    assert_eq!(ctl.auxiliary_temperatures()[0].label, "PCH");
}

#[test]
fn test_total_absence_placeholder() {
    let tmp = TempDir::new().unwrap();
    let mut ctl = FanController::with_root(HwmonRoot::new(tmp.path()));

    assert_eq!(ctl.refresh(), RefreshStatus::Placeholder);
    assert!(ctl.snapshot().is_placeholder());
    assert_eq!(ctl.snapshot(), &Snapshot::placeholder());
    assert_eq!(ctl.auxiliary_temperatures().len(), 6);
}

#[test]
fn test_write_failure_reports_and_recovers() {
    let tmp = TempDir::new().unwrap();
    let ec = device(tmp.path(), 0, "asus", &[("pwm1", "40"), ("fan1_input", "1800")]);
    let mut ctl = FanController::with_root(HwmonRoot::new(tmp.path()));
    ctl.refresh();

    assert!(!ctl.set_fixed_fan_percent(90));
    assert_eq!(ctl.last_error().and_then(|e| e.step()), Some(ControlStep::EnableManual));
    assert_eq!(ctl.fan_state().percent, 90);
    assert!(ctl.take_permission_warning().is_some());
    assert!(ctl.take_permission_warning().is_none());

    // Once the mode file appears, the next request re-discovers and succeeds.
    fs::write(ec.join("pwm1_enable"), "0").unwrap();
    assert!(ctl.set_fixed_fan_percent(90));
    assert_eq!(read(&ec, "pwm1"), "229");
    assert!(ctl.last_error().is_none());
}

#[test]
fn test_scan_classifies_devices() {
    let tmp = TempDir::new().unwrap();
    fx705ge(tmp.path());
    device(tmp.path(), 4, "BAT0", &[]);

    let devices = HwmonRoot::new(tmp.path()).enumerate_devices();
    let classes: Vec<Option<DeviceClass>> = devices.iter().map(|d| d.class).collect();
    assert_eq!(
        classes,
        vec![
            Some(DeviceClass::AcpiThermal),
            Some(DeviceClass::CpuPackage),
            Some(DeviceClass::Chipset),
            Some(DeviceClass::VendorEc),
            None,
        ]
    );
}

#[test]
#[serial]
fn test_settings_drive_controller_root() {
    let tmp = TempDir::new().unwrap();
    fx705ge(tmp.path());
    let cfg_dir = TempDir::new().unwrap();
    let cfg = cfg_dir.path().join("config.json");
    fs::write(&cfg, format!(r#"{{ "hwmon_root": "{}" }}"#, tmp.path().display())).unwrap();

    std::env::remove_var(HWMON_ROOT_ENV);
    let settings = load_settings_from(&cfg).unwrap();
    let mut ctl = FanController::new(&settings);
    assert_eq!(ctl.refresh(), RefreshStatus::Real);
    assert_eq!(ctl.fan_state().rpm, 3300);
}
