// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model for frame annotations and review records.

pub mod annotation;
pub mod review;
