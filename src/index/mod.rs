// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

pub mod flat;

pub use flat::{FlatIndex, IndexError};
