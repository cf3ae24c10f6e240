// Licensed under the Apache-2.0 license

//! Access policies attached to fields.
//!
//! Software and hardware access use the same four-valued vocabulary as
//! SystemRDL (`r`, `w`, `rw`, `na`). Read and write side effects are limited
//! to the subset the generators know how to lower.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access policy for one side (software or hardware) of a field.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    /// Read only.
    R,
    /// Write only.
    W,
    /// Read and write.
    #[default]
    Rw,
    /// No access.
    Na,
}

impl AccessType {
    pub fn can_read(self) -> bool {
        matches!(self, AccessType::R | AccessType::Rw)
    }

    pub fn can_write(self) -> bool {
        matches!(self, AccessType::W | AccessType::Rw)
    }

    /// Short label as it appears in register descriptions.
    pub fn label(self) -> &'static str {
        match self {
            AccessType::R => "r",
            AccessType::W => "w",
            AccessType::Rw => "rw",
            AccessType::Na => "na",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Side effect of a software read.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OnReadType {
    /// Clear the field to zero on read.
    Rclr,
    /// Set all field bits on read.
    Rset,
}

impl fmt::Display for OnReadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OnReadType::Rclr => "rclr",
            OnReadType::Rset => "rset",
        })
    }
}

/// Side effect of a software write.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OnWriteType {
    /// Bits written as one are cleared.
    Woclr,
    /// Bits written as one are set.
    Woset,
    /// Any write clears the field.
    Wclr,
    /// Any write sets the field.
    Wset,
}

impl fmt::Display for OnWriteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OnWriteType::Woclr => "woclr",
            OnWriteType::Woset => "woset",
            OnWriteType::Wclr => "wclr",
            OnWriteType::Wset => "wset",
        })
    }
}
