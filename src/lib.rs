// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! harmonia - a music theory engine.
//!
//! Spell scales, build and name chords, walk the modes of a key and lead
//! voices between chords.

pub mod config;
pub mod error;
pub mod music;

pub use error::{Error, Result};
