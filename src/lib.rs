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

//! Tuffan - thermal sensors and fan control for ASUS TUF laptops
//!
//! This library discovers the hwmon devices of the laptop, reads and
//! normalizes their temperatures, and drives the single PWM fan channel of
//! the vendor embedded controller.

pub mod error;
pub mod hwmon;
pub mod fan;
pub mod snapshot;
pub mod controller;
pub mod config;
pub mod system;
pub mod logger;

pub use controller::FanController;
pub use error::{ControlStep, FanError};
pub use snapshot::{FanSample, RefreshStatus, Snapshot, TemperatureSample};

#[cfg(test)]
pub mod test_utils;
