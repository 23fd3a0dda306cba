// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Doclocker application layer.

pub mod services;

pub use services::data_dir::{data_dir, data_subdir};
pub use services::locker_services::LockerServices;
