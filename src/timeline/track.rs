// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Instrument tracks.

use serde::{Deserialize, Serialize};

/// A named instrument track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Track name (unique within a piece)
    pub name: String,
    /// Free-form instrument name, resolved to a GM program at export
    pub instrument: String,
}

impl Track {
    /// Create a new track
    pub fn new(name: impl Into<String>, instrument: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instrument: instrument.into(),
        }
    }
}
