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

//! Error type shared by the hwmon, fan control and configuration layers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias using [`FanError`].
pub type Result<T> = std::result::Result<T, FanError>;

/// The step of a fan write sequence an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlStep {
    Discover,
    EnableManual,
    WriteDuty,
}

#[derive(Error, Debug)]
pub enum FanError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No fan controller found under {0}")]
    ControllerNotFound(PathBuf),

    #[error("PWM mode file not available: {0}")]
    ModeUnavailable(PathBuf),

    #[error("Failed to switch fan to manual mode via {path}: {source}")]
    ModeWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write PWM value {value} to {path}: {source}")]
    DutyWrite {
        path: PathBuf,
        value: u32,
        #[source]
        source: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl FanError {
    /// Which step of the write sequence failed, if this is a control error.
    pub fn step(&self) -> Option<ControlStep> {
        match self {
            FanError::ControllerNotFound(_) => Some(ControlStep::Discover),
            FanError::ModeUnavailable(_) | FanError::ModeWrite { .. } => Some(ControlStep::EnableManual),
            FanError::DutyWrite { .. } => Some(ControlStep::WriteDuty),
            _ => None,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        match self {
            FanError::Io(e) => e.kind() == io::ErrorKind::PermissionDenied,
            FanError::ModeWrite { source, .. } | FanError::DutyWrite { source, .. } => {
                source.kind() == io::ErrorKind::PermissionDenied
            }
            _ => false,
        }
    }
}
