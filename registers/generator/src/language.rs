// Licensed under the Apache-2.0 license

//! Target hardware-description flavor.

use std::fmt;
use std::str::FromStr;

/// Hardware description language of the generated register block.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum HdlLanguage {
    #[default]
    SystemVerilog,
    Verilog,
}

impl HdlLanguage {
    /// Extension of the module (and package) files.
    pub fn extension(self) -> &'static str {
        match self {
            HdlLanguage::SystemVerilog => "sv",
            HdlLanguage::Verilog => "v",
        }
    }

    /// Extension of the RTL-side header.
    pub fn header_extension(self) -> &'static str {
        match self {
            HdlLanguage::SystemVerilog => "svh",
            HdlLanguage::Verilog => "vh",
        }
    }

    /// SystemVerilog splits type definitions into a separate package unit.
    pub fn needs_package(self) -> bool {
        self == HdlLanguage::SystemVerilog
    }

    /// Keyword for a procedurally assigned variable.
    pub fn var(self) -> &'static str {
        match self {
            HdlLanguage::SystemVerilog => "logic",
            HdlLanguage::Verilog => "reg",
        }
    }

    /// Keyword for a continuously assigned net.
    pub fn net(self) -> &'static str {
        match self {
            HdlLanguage::SystemVerilog => "logic",
            HdlLanguage::Verilog => "wire",
        }
    }

    pub fn always_ff(self) -> &'static str {
        match self {
            HdlLanguage::SystemVerilog => "always_ff @(posedge clk)",
            HdlLanguage::Verilog => "always @(posedge clk)",
        }
    }

    pub fn always_comb(self) -> &'static str {
        match self {
            HdlLanguage::SystemVerilog => "always_comb",
            HdlLanguage::Verilog => "always @(*)",
        }
    }
}

impl fmt::Display for HdlLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HdlLanguage::SystemVerilog => "SystemVerilog",
            HdlLanguage::Verilog => "Verilog",
        })
    }
}

impl FromStr for HdlLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "systemverilog" | "sv" => Ok(HdlLanguage::SystemVerilog),
            "verilog" | "v" => Ok(HdlLanguage::Verilog),
            _ => Err(format!(
                "unknown target language {s:?} (expected SystemVerilog or Verilog)"
            )),
        }
    }
}
