// Licensed under the Apache-2.0 license

//! AXI4-Lite slave adapter.

use super::{
    flattened_ports, BusSignal, CpuInterface, CpuifParams, Direction, PortStyle, SignalWidth,
};
use crate::util::clog2;
use std::fmt::{self, Write};

/// Outstanding-transaction bound used when none is configured.
pub const DEFAULT_MAX_OUTSTANDING: usize = 1;

const SIGNALS: &[BusSignal] = &[
    BusSignal { name: "AWVALID", dir: Direction::Input, width: SignalWidth::Bit },
    BusSignal { name: "AWREADY", dir: Direction::Output, width: SignalWidth::Bit },
    BusSignal { name: "AWADDR", dir: Direction::Input, width: SignalWidth::Addr },
    BusSignal { name: "AWPROT", dir: Direction::Input, width: SignalWidth::Fixed(3) },
    BusSignal { name: "WVALID", dir: Direction::Input, width: SignalWidth::Bit },
    BusSignal { name: "WREADY", dir: Direction::Output, width: SignalWidth::Bit },
    BusSignal { name: "WDATA", dir: Direction::Input, width: SignalWidth::Data },
    BusSignal { name: "WSTRB", dir: Direction::Input, width: SignalWidth::Strobe },
    BusSignal { name: "BVALID", dir: Direction::Output, width: SignalWidth::Bit },
    BusSignal { name: "BREADY", dir: Direction::Input, width: SignalWidth::Bit },
    BusSignal { name: "BRESP", dir: Direction::Output, width: SignalWidth::Fixed(2) },
    BusSignal { name: "ARVALID", dir: Direction::Input, width: SignalWidth::Bit },
    BusSignal { name: "ARREADY", dir: Direction::Output, width: SignalWidth::Bit },
    BusSignal { name: "ARADDR", dir: Direction::Input, width: SignalWidth::Addr },
    BusSignal { name: "ARPROT", dir: Direction::Input, width: SignalWidth::Fixed(3) },
    BusSignal { name: "RVALID", dir: Direction::Output, width: SignalWidth::Bit },
    BusSignal { name: "RREADY", dir: Direction::Input, width: SignalWidth::Bit },
    BusSignal { name: "RDATA", dir: Direction::Output, width: SignalWidth::Data },
    BusSignal { name: "RRESP", dir: Direction::Output, width: SignalWidth::Fixed(2) },
];

/// AXI4-Lite slave exposed as `axi4l_if.slave AXIL` or as flattened
/// `s_axil_*` ports.
#[derive(Clone, Debug)]
pub struct Axi4LiteCpuif {
    style: PortStyle,
    max_outstanding: usize,
}

impl Axi4LiteCpuif {
    pub fn new(style: PortStyle) -> Self {
        Self {
            style,
            max_outstanding: DEFAULT_MAX_OUTSTANDING,
        }
    }

    /// Override the outstanding-transaction bound. Zero is rejected by the
    /// design validator.
    pub fn with_max_outstanding(mut self, max: usize) -> Self {
        self.max_outstanding = max;
        self
    }

    fn render_single(&self, params: &CpuifParams, out: &mut String) -> fmt::Result {
        let lang = params.language;
        let var = lang.var();
        let net = lang.net();
        let dw = params.data_width;
        let s = |name: &str| self.signal(name);

        writeln!(out, "    // AXI4-Lite: a new request is accepted only once the previous")?;
        writeln!(out, "    // response has been taken")?;
        writeln!(out, "    {var} axil_busy;")?;
        writeln!(out, "    {var} axil_rvalid_q;")?;
        writeln!(out, "    {var} [{}:0] axil_rdata_q;", dw - 1)?;
        writeln!(out, "    {var} axil_rerr_q;")?;
        writeln!(out, "    {var} axil_bvalid_q;")?;
        writeln!(out, "    {var} axil_berr_q;")?;
        writeln!(out, "    {net} axil_wr_req;")?;
        writeln!(out, "    {net} axil_rd_req;")?;
        writeln!(out)?;
        writeln!(
            out,
            "    assign axil_wr_req = !axil_busy && {} && {};",
            s("AWVALID"),
            s("WVALID")
        )?;
        writeln!(
            out,
            "    assign axil_rd_req = !axil_busy && !axil_wr_req && {};",
            s("ARVALID")
        )?;
        self.render_request(out)?;
        writeln!(out)?;
        writeln!(out, "    {} begin", lang.always_ff())?;
        writeln!(out, "        if (rst) begin")?;
        writeln!(out, "            axil_busy <= 1'b0;")?;
        writeln!(out, "            axil_rvalid_q <= 1'b0;")?;
        writeln!(out, "            axil_rdata_q <= {dw}'h0;")?;
        writeln!(out, "            axil_rerr_q <= 1'b0;")?;
        writeln!(out, "            axil_bvalid_q <= 1'b0;")?;
        writeln!(out, "            axil_berr_q <= 1'b0;")?;
        writeln!(out, "        end else begin")?;
        writeln!(out, "            if (cpuif_req) begin")?;
        writeln!(out, "                axil_busy <= 1'b1;")?;
        writeln!(out, "            end")?;
        writeln!(out, "            if (cpuif_rd_ack) begin")?;
        writeln!(out, "                axil_rvalid_q <= 1'b1;")?;
        writeln!(out, "                axil_rdata_q <= cpuif_rd_data;")?;
        writeln!(out, "                axil_rerr_q <= cpuif_rd_err;")?;
        writeln!(out, "            end else if (axil_rvalid_q && {}) begin", s("RREADY"))?;
        writeln!(out, "                axil_rvalid_q <= 1'b0;")?;
        writeln!(out, "                axil_busy <= 1'b0;")?;
        writeln!(out, "            end")?;
        writeln!(out, "            if (cpuif_wr_ack) begin")?;
        writeln!(out, "                axil_bvalid_q <= 1'b1;")?;
        writeln!(out, "                axil_berr_q <= cpuif_wr_err;")?;
        writeln!(out, "            end else if (axil_bvalid_q && {}) begin", s("BREADY"))?;
        writeln!(out, "                axil_bvalid_q <= 1'b0;")?;
        writeln!(out, "                axil_busy <= 1'b0;")?;
        writeln!(out, "            end")?;
        writeln!(out, "        end")?;
        writeln!(out, "    end")?;
        writeln!(out)?;
        writeln!(out, "    assign {} = axil_rvalid_q;", s("RVALID"))?;
        writeln!(out, "    assign {} = axil_rdata_q;", s("RDATA"))?;
        writeln!(out, "    assign {} = axil_rerr_q ? 2'b10 : 2'b00;", s("RRESP"))?;
        writeln!(out, "    assign {} = axil_bvalid_q;", s("BVALID"))?;
        writeln!(out, "    assign {} = axil_berr_q ? 2'b10 : 2'b00;", s("BRESP"))
    }

    fn render_queued(&self, params: &CpuifParams, out: &mut String) -> fmt::Result {
        let lang = params.language;
        let var = lang.var();
        let net = lang.net();
        let dw = params.data_width;
        let depth = self.max_outstanding as u64;
        let last = depth - 1;
        let cw = clog2(depth + 1);
        let pw = clog2(depth);
        let s = |name: &str| self.signal(name);

        writeln!(out, "    // AXI4-Lite: up to {depth} requests in flight, responses")?;
        writeln!(out, "    // returned in request order")?;
        writeln!(out, "    {var} [{}:0] axil_count;", cw - 1)?;
        writeln!(out, "    {var} [{}:0] axil_push_ptr;", pw - 1)?;
        writeln!(out, "    {var} [{}:0] axil_pop_ptr;", pw - 1)?;
        writeln!(out, "    {var} axil_resp_is_wr [0:{last}];")?;
        writeln!(out, "    {var} [{}:0] axil_resp_data [0:{last}];", dw - 1)?;
        writeln!(out, "    {var} axil_resp_err [0:{last}];")?;
        writeln!(out, "    {net} axil_full;")?;
        writeln!(out, "    {net} axil_wr_req;")?;
        writeln!(out, "    {net} axil_rd_req;")?;
        writeln!(out, "    {net} axil_push;")?;
        writeln!(out, "    {net} axil_pop;")?;
        writeln!(out, "    {net} axil_rvalid;")?;
        writeln!(out, "    {net} axil_bvalid;")?;
        writeln!(out)?;
        writeln!(out, "    assign axil_full = (axil_count == {cw}'d{depth});")?;
        writeln!(
            out,
            "    assign axil_wr_req = !axil_full && {} && {};",
            s("AWVALID"),
            s("WVALID")
        )?;
        writeln!(
            out,
            "    assign axil_rd_req = !axil_full && !axil_wr_req && {};",
            s("ARVALID")
        )?;
        self.render_request(out)?;
        writeln!(out)?;
        writeln!(out, "    assign axil_push = cpuif_rd_ack || cpuif_wr_ack;")?;
        writeln!(
            out,
            "    assign axil_rvalid = (axil_count != {cw}'d0) && !axil_resp_is_wr[axil_pop_ptr];"
        )?;
        writeln!(
            out,
            "    assign axil_bvalid = (axil_count != {cw}'d0) && axil_resp_is_wr[axil_pop_ptr];"
        )?;
        writeln!(
            out,
            "    assign axil_pop = (axil_rvalid && {}) || (axil_bvalid && {});",
            s("RREADY"),
            s("BREADY")
        )?;
        writeln!(out)?;
        writeln!(out, "    {} begin", lang.always_ff())?;
        writeln!(out, "        if (rst) begin")?;
        writeln!(out, "            axil_count <= {cw}'d0;")?;
        writeln!(out, "            axil_push_ptr <= {pw}'d0;")?;
        writeln!(out, "            axil_pop_ptr <= {pw}'d0;")?;
        writeln!(out, "        end else begin")?;
        writeln!(out, "            if (axil_push) begin")?;
        writeln!(out, "                axil_resp_is_wr[axil_push_ptr] <= cpuif_req_is_wr;")?;
        writeln!(out, "                axil_resp_data[axil_push_ptr] <= cpuif_rd_data;")?;
        writeln!(
            out,
            "                axil_resp_err[axil_push_ptr] <= cpuif_req_is_wr ? cpuif_wr_err : cpuif_rd_err;"
        )?;
        writeln!(
            out,
            "                axil_push_ptr <= (axil_push_ptr == {pw}'d{last}) ? {pw}'d0 : axil_push_ptr + {pw}'d1;"
        )?;
        writeln!(out, "            end")?;
        writeln!(out, "            if (axil_pop) begin")?;
        writeln!(
            out,
            "                axil_pop_ptr <= (axil_pop_ptr == {pw}'d{last}) ? {pw}'d0 : axil_pop_ptr + {pw}'d1;"
        )?;
        writeln!(out, "            end")?;
        writeln!(out, "            if (axil_push && !axil_pop) begin")?;
        writeln!(out, "                axil_count <= axil_count + {cw}'d1;")?;
        writeln!(out, "            end else if (!axil_push && axil_pop) begin")?;
        writeln!(out, "                axil_count <= axil_count - {cw}'d1;")?;
        writeln!(out, "            end")?;
        writeln!(out, "        end")?;
        writeln!(out, "    end")?;
        writeln!(out)?;
        writeln!(out, "    assign {} = axil_rvalid;", s("RVALID"))?;
        writeln!(out, "    assign {} = axil_resp_data[axil_pop_ptr];", s("RDATA"))?;
        writeln!(
            out,
            "    assign {} = axil_resp_err[axil_pop_ptr] ? 2'b10 : 2'b00;",
            s("RRESP")
        )?;
        writeln!(out, "    assign {} = axil_bvalid;", s("BVALID"))?;
        writeln!(
            out,
            "    assign {} = axil_resp_err[axil_pop_ptr] ? 2'b10 : 2'b00;",
            s("BRESP")
        )
    }

    /// Request-side assignments common to both shapes. Writes win over reads
    /// when both arrive in the same cycle.
    fn render_request(&self, out: &mut String) -> fmt::Result {
        let s = |name: &str| self.signal(name);
        writeln!(out, "    assign cpuif_req = axil_wr_req || axil_rd_req;")?;
        writeln!(out, "    assign cpuif_req_is_wr = axil_wr_req;")?;
        writeln!(
            out,
            "    assign cpuif_addr = axil_wr_req ? {} : {};",
            s("AWADDR"),
            s("ARADDR")
        )?;
        writeln!(out, "    assign cpuif_wr_data = {};", s("WDATA"))?;
        writeln!(out, "    assign {} = axil_wr_req;", s("AWREADY"))?;
        writeln!(out, "    assign {} = axil_wr_req;", s("WREADY"))?;
        writeln!(out, "    assign {} = axil_rd_req;", s("ARREADY"))
    }
}

impl CpuInterface for Axi4LiteCpuif {
    fn name(&self) -> &'static str {
        "AXI4-Lite"
    }

    fn port_style(&self) -> PortStyle {
        self.style
    }

    fn port_declaration(&self, params: &CpuifParams) -> String {
        match self.style {
            PortStyle::Interface => "axi4l_if.slave AXIL".to_string(),
            PortStyle::Flattened => flattened_ports("s_axil_", SIGNALS, params),
        }
    }

    fn signal(&self, name: &str) -> String {
        match self.style {
            PortStyle::Interface => format!("AXIL.{}", name.to_lowercase()),
            PortStyle::Flattened => format!("s_axil_{}", name.to_lowercase()),
        }
    }

    fn max_outstanding(&self) -> usize {
        self.max_outstanding
    }

    fn supports_data_width(&self, width: u64) -> bool {
        matches!(width, 32 | 64)
    }

    fn render_logic(&self, params: &CpuifParams, out: &mut String) -> fmt::Result {
        if self.max_outstanding <= 1 {
            self.render_single(params, out)
        } else {
            self.render_queued(params, out)
        }
    }
}
