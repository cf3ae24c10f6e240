// Licensed under the Apache-2.0 license

use super::{
    flattened_ports, BusSignal, CpuInterface, CpuifParams, Direction, PortStyle, SignalWidth,
};
use std::fmt::{self, Write};

const SIGNALS: &[BusSignal] = &[
    BusSignal { name: "PSEL", dir: Direction::Input, width: SignalWidth::Bit },
    BusSignal { name: "PENABLE", dir: Direction::Input, width: SignalWidth::Bit },
    BusSignal { name: "PWRITE", dir: Direction::Input, width: SignalWidth::Bit },
    BusSignal { name: "PPROT", dir: Direction::Input, width: SignalWidth::Fixed(3) },
    BusSignal { name: "PADDR", dir: Direction::Input, width: SignalWidth::Addr },
    BusSignal { name: "PWDATA", dir: Direction::Input, width: SignalWidth::Data },
    BusSignal { name: "PSTRB", dir: Direction::Input, width: SignalWidth::Strobe },
    BusSignal { name: "PREADY", dir: Direction::Output, width: SignalWidth::Bit },
    BusSignal { name: "PRDATA", dir: Direction::Output, width: SignalWidth::Data },
    BusSignal { name: "PSLVERR", dir: Direction::Output, width: SignalWidth::Bit },
];

/// APB4 completer. The protocol has a single transfer in flight by
/// construction.
#[derive(Clone, Debug)]
pub struct Apb4Cpuif {
    style: PortStyle,
}

impl Apb4Cpuif {
    pub fn new(style: PortStyle) -> Self {
        Self { style }
    }
}

impl CpuInterface for Apb4Cpuif {
    fn name(&self) -> &'static str {
        "APB4"
    }

    fn port_style(&self) -> PortStyle {
        self.style
    }

    fn port_declaration(&self, params: &CpuifParams) -> String {
        match self.style {
            PortStyle::Interface => "apb4_intf.slave s_apb".to_string(),
            PortStyle::Flattened => flattened_ports("s_apb_", SIGNALS, params),
        }
    }

    fn signal(&self, name: &str) -> String {
        match self.style {
            PortStyle::Interface => format!("s_apb.{}", name.to_lowercase()),
            PortStyle::Flattened => format!("s_apb_{}", name.to_lowercase()),
        }
    }

    fn max_outstanding(&self) -> usize {
        1
    }

    fn supports_data_width(&self, width: u64) -> bool {
        matches!(width, 8 | 16 | 32)
    }

    fn render_logic(&self, params: &CpuifParams, out: &mut String) -> fmt::Result {
        let lang = params.language;
        let var = lang.var();
        let dw = params.data_width;
        let s = |name: &str| self.signal(name);

        writeln!(out, "    // APB4: the setup phase issues the request, the access")?;
        writeln!(out, "    // phase completes once the registered response is ready")?;
        writeln!(out, "    {var} apb_ack_q;")?;
        writeln!(out, "    {var} [{}:0] apb_rdata_q;", dw - 1)?;
        writeln!(out, "    {var} apb_err_q;")?;
        writeln!(out)?;
        writeln!(out, "    assign cpuif_req = {} && !{};", s("PSEL"), s("PENABLE"))?;
        writeln!(out, "    assign cpuif_req_is_wr = {};", s("PWRITE"))?;
        writeln!(out, "    assign cpuif_addr = {};", s("PADDR"))?;
        writeln!(out, "    assign cpuif_wr_data = {};", s("PWDATA"))?;
        writeln!(out)?;
        writeln!(out, "    {} begin", lang.always_ff())?;
        writeln!(out, "        if (rst) begin")?;
        writeln!(out, "            apb_ack_q <= 1'b0;")?;
        writeln!(out, "            apb_rdata_q <= {dw}'h0;")?;
        writeln!(out, "            apb_err_q <= 1'b0;")?;
        writeln!(out, "        end else begin")?;
        writeln!(out, "            apb_ack_q <= cpuif_rd_ack || cpuif_wr_ack;")?;
        writeln!(out, "            apb_rdata_q <= cpuif_rd_data;")?;
        writeln!(out, "            apb_err_q <= cpuif_rd_err || cpuif_wr_err;")?;
        writeln!(out, "        end")?;
        writeln!(out, "    end")?;
        writeln!(out)?;
        writeln!(out, "    assign {} = apb_ack_q;", s("PREADY"))?;
        writeln!(out, "    assign {} = apb_rdata_q;", s("PRDATA"))?;
        writeln!(out, "    assign {} = apb_err_q;", s("PSLVERR"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::HdlLanguage;

    #[test]
    fn test_apb_logic() {
        let cpuif = Apb4Cpuif::new(PortStyle::Flattened);
        let params = CpuifParams {
            language: HdlLanguage::Verilog,
            data_width: 16,
            addr_width: 12,
        };
        let mut out = String::new();
        cpuif.render_logic(&params, &mut out).unwrap();
        assert!(out.contains("assign cpuif_req = s_apb_psel && !s_apb_penable;"));
        assert!(out.contains("reg [15:0] apb_rdata_q;"));
        assert!(out.contains("assign s_apb_pslverr = apb_err_q;"));
        let ports = cpuif.port_declaration(&params);
        assert!(ports.contains("input wire [11:0] s_apb_paddr"));
        assert!(ports.contains("input wire [1:0] s_apb_pstrb"));
    }

    #[test]
    fn test_apb_widths() {
        let cpuif = Apb4Cpuif::new(PortStyle::Interface);
        assert!(cpuif.supports_data_width(32));
        assert!(!cpuif.supports_data_width(64));
        assert_eq!(cpuif.signal("PRDATA"), "s_apb.prdata");
    }
}
