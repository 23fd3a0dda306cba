// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: bridges a locker front end to the doclocker backend crates.
//
// Each operation returns data a UI can display directly and logs what it did
// to the access log.

pub mod data_dir;
pub mod locker_services;
