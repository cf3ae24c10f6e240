// Licensed under the Apache-2.0 license

//! CPU bus interface adapters.
//!
//! Every adapter lowers one bus protocol onto the internal request/response
//! strobes the register block is written against:
//!
//! ```text
//! bus ports ──▶ adapter logic ──▶ cpuif_req, cpuif_req_is_wr, cpuif_addr, cpuif_wr_data
//!           ◀──               ◀── cpuif_rd_ack, cpuif_rd_data, cpuif_rd_err,
//!                                 cpuif_wr_ack, cpuif_wr_err
//! ```
//!
//! The renderer only ever talks to the [`CpuInterface`] trait, so a new
//! protocol is a new implementation of it.

mod apb4;
mod axi4lite;

pub use apb4::Apb4Cpuif;
pub use axi4lite::Axi4LiteCpuif;

use crate::language::HdlLanguage;
use std::fmt::{self, Write};
use std::str::FromStr;

/// How the bus is exposed on the module boundary.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PortStyle {
    /// A single SystemVerilog interface modport port.
    #[default]
    Interface,
    /// One port per bus signal.
    Flattened,
}

impl FromStr for PortStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "interface" => Ok(PortStyle::Interface),
            "flattened" | "flat" => Ok(PortStyle::Flattened),
            _ => Err(format!(
                "unknown port style {s:?} (expected interface or flattened)"
            )),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Input,
    Output,
}

/// Width of a bus signal, resolved against the design's bus widths.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SignalWidth {
    Bit,
    Addr,
    Data,
    Strobe,
    Fixed(u32),
}

/// One signal of a bus protocol, named as in the protocol specification.
#[derive(Clone, Copy, Debug)]
pub struct BusSignal {
    pub name: &'static str,
    pub dir: Direction,
    pub width: SignalWidth,
}

/// Design-level parameters an adapter needs to emit its fragments.
#[derive(Clone, Copy, Debug)]
pub struct CpuifParams {
    pub language: HdlLanguage,
    pub data_width: u64,
    pub addr_width: u32,
}

impl CpuifParams {
    fn resolve(&self, width: SignalWidth) -> u64 {
        match width {
            SignalWidth::Bit => 1,
            SignalWidth::Addr => u64::from(self.addr_width),
            SignalWidth::Data => self.data_width,
            SignalWidth::Strobe => (self.data_width / 8).max(1),
            SignalWidth::Fixed(w) => u64::from(w),
        }
    }
}

/// Protocol-specific fragments for the generated register block.
pub trait CpuInterface: Send + Sync {
    /// Human-readable protocol name.
    fn name(&self) -> &'static str;

    fn port_style(&self) -> PortStyle;

    /// Port declaration(s) placed in the module port list, without a
    /// trailing comma.
    fn port_declaration(&self, params: &CpuifParams) -> String;

    /// Concrete reference to the abstract bus signal `name` inside the module.
    fn signal(&self, name: &str) -> String;

    /// Maximum number of transactions accepted before the first completes.
    fn max_outstanding(&self) -> usize;

    fn supports_data_width(&self, width: u64) -> bool;

    /// Interface modports only exist in SystemVerilog.
    fn supports_language(&self, language: HdlLanguage) -> bool {
        self.port_style() == PortStyle::Flattened || language == HdlLanguage::SystemVerilog
    }

    /// Emit the glue between the bus ports and the internal `cpuif_*` strobes.
    fn render_logic(&self, params: &CpuifParams, out: &mut String) -> fmt::Result;
}

/// Bus protocols known to the generator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BusProtocol {
    #[default]
    Axi4Lite,
    Apb4,
}

impl FromStr for BusProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "axi4lite" | "axil" => Ok(BusProtocol::Axi4Lite),
            "apb4" | "apb" => Ok(BusProtocol::Apb4),
            _ => Err(format!(
                "unknown bus protocol {s:?} (expected axi4-lite or apb4)"
            )),
        }
    }
}

/// Selection of the bus interface adapter for a run.
#[derive(Clone, Debug, Default)]
pub struct BusOptions {
    pub protocol: BusProtocol,
    pub port_style: PortStyle,
    /// Outstanding-transaction bound; only meaningful for AXI4-Lite.
    pub max_outstanding: Option<usize>,
}

impl BusOptions {
    pub fn new(protocol: BusProtocol) -> Self {
        Self {
            protocol,
            ..Default::default()
        }
    }

    pub fn port_style(mut self, style: PortStyle) -> Self {
        self.port_style = style;
        self
    }

    pub fn max_outstanding(mut self, max: usize) -> Self {
        self.max_outstanding = Some(max);
        self
    }

    pub fn build(&self) -> Box<dyn CpuInterface> {
        match self.protocol {
            BusProtocol::Axi4Lite => {
                let mut cpuif = Axi4LiteCpuif::new(self.port_style);
                if let Some(max) = self.max_outstanding {
                    cpuif = cpuif.with_max_outstanding(max);
                }
                Box::new(cpuif)
            }
            BusProtocol::Apb4 => Box::new(Apb4Cpuif::new(self.port_style)),
        }
    }
}

/// Flattened port list for a signal table, one `input wire`/`output wire`
/// per signal named `<prefix><signal>`.
fn flattened_ports(prefix: &str, signals: &[BusSignal], params: &CpuifParams) -> String {
    let mut ports = Vec::with_capacity(signals.len());
    for sig in signals {
        let dir = match sig.dir {
            Direction::Input => "input",
            Direction::Output => "output",
        };
        let width = params.resolve(sig.width);
        let range = if width > 1 {
            format!("[{}:0] ", width - 1)
        } else {
            String::new()
        };
        ports.push(format!(
            "{dir} wire {range}{prefix}{}",
            sig.name.to_ascii_lowercase()
        ));
    }
    ports.join(",\n")
}

/// Declarations of the internal strobe bus, shared by every adapter.
pub fn render_strobe_declarations(params: &CpuifParams, out: &mut String) -> fmt::Result {
    let net = params.language.net();
    let aw = params.addr_width;
    let dw = params.data_width;
    writeln!(out, "    {net} cpuif_req;")?;
    writeln!(out, "    {net} cpuif_req_is_wr;")?;
    writeln!(out, "    {net} [{}:0] cpuif_addr;", aw - 1)?;
    writeln!(out, "    {net} [{}:0] cpuif_wr_data;", dw - 1)?;
    writeln!(out, "    {net} cpuif_rd_ack;")?;
    writeln!(out, "    {net} [{}:0] cpuif_rd_data;", dw - 1)?;
    writeln!(out, "    {net} cpuif_rd_err;")?;
    writeln!(out, "    {net} cpuif_wr_ack;")?;
    writeln!(out, "    {net} cpuif_wr_err;")
}
