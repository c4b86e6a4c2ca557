// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O collaborators: media, local storage, remote feedback, review files.

pub mod feedback;
pub mod media;
pub mod serialization;
pub mod store;
