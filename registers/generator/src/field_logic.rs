// Licensed under the Apache-2.0 license

//! Storage and next-state logic for every field.
//!
//! Software accesses take precedence over hardware updates in the same
//! cycle.

use crate::addr_decode::AddressDecoder;
use crate::design::DesignState;
use crate::hwif::{self, vector_range, Hwif};
use crate::language::HdlLanguage;
use crate::util::hdl_hex;
use csrgen_model::{Field, OnReadType, OnWriteType, RegisterRef};
use std::fmt::{self, Write};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct FieldLogic<'a> {
    regs: Arc<[RegisterRef<'a>]>,
    language: HdlLanguage,
    hwif: Hwif,
}

impl<'a> FieldLogic<'a> {
    pub fn new(state: &DesignState<'a>) -> Self {
        Self {
            regs: Arc::clone(&state.regs),
            language: state.language,
            hwif: Hwif::new(state),
        }
    }

    pub fn storage(reg: &RegisterRef<'_>, field: &Field) -> String {
        format!("field_storage_{}_{}", reg.ident(), field.name)
    }

    /// Expression for the current value of a field: its flop, the hardware
    /// input for `hw=w` wires, or its reset constant.
    pub fn value(&self, reg: &RegisterRef<'_>, field: &Field) -> String {
        if field.needs_storage() {
            Self::storage(reg, field)
        } else if field.is_hw_wire() {
            self.hwif.input(reg, field, "next")
        } else {
            hdl_hex(u64::from(field.width()), field.reset.unwrap_or(0))
        }
    }

    /// Value stored on a software write, given the written data slice.
    fn write_value(reg: &RegisterRef<'_>, field: &Field, data: &str) -> String {
        let width = u64::from(field.width());
        let storage = Self::storage(reg, field);
        match field.onwrite {
            None => data.to_string(),
            Some(OnWriteType::Woclr) => format!("{storage} & ~{data}"),
            Some(OnWriteType::Woset) => format!("{storage} | {data}"),
            Some(OnWriteType::Wclr) => hdl_hex(width, 0),
            Some(OnWriteType::Wset) => hdl_hex(width, field.value_mask()),
        }
    }

    pub fn render(&self, out: &mut String) -> fmt::Result {
        let lang = self.language;
        for reg in self.regs.iter() {
            let strobe = AddressDecoder::strobe(reg);
            for field in reg.fields() {
                if !field.needs_storage() {
                    continue;
                }
                let storage = Self::storage(reg, field);
                let width = u64::from(field.width());
                let data = format!("decoded_wr_data[{}:{}]", field.high, field.low);
                writeln!(out, "    // {}.{}", reg.path_string("."), field.name)?;
                writeln!(
                    out,
                    "    {} {}{storage};",
                    lang.var(),
                    vector_range(field.width())
                )?;
                writeln!(out, "    {} begin", lang.always_ff())?;
                writeln!(out, "        if (rst) begin")?;
                writeln!(
                    out,
                    "            {storage} <= {};",
                    hdl_hex(width, field.reset.unwrap_or(0))
                )?;
                writeln!(out, "        end else begin")?;

                let mut branches = Vec::new();
                if field.sw.can_write() {
                    branches.push((
                        format!("{strobe} && decoded_req_is_wr"),
                        Self::write_value(reg, field, &data),
                    ));
                }
                if let Some(onread) = field.onread {
                    let value = match onread {
                        OnReadType::Rclr => hdl_hex(width, 0),
                        OnReadType::Rset => hdl_hex(width, field.value_mask()),
                    };
                    branches.push((format!("{strobe} && !decoded_req_is_wr"), value));
                }
                if hwif::has_we(field) {
                    branches.push((
                        self.hwif.input(reg, field, "we"),
                        self.hwif.input(reg, field, "next"),
                    ));
                }
                for (i, (cond, value)) in branches.iter().enumerate() {
                    let kw = if i == 0 { "if" } else { "end else if" };
                    writeln!(out, "            {kw} ({cond}) begin")?;
                    writeln!(out, "                {storage} <= {value};")?;
                }
                if !branches.is_empty() {
                    writeln!(out, "            end")?;
                }
                writeln!(out, "        end")?;
                writeln!(out, "    end")?;
                writeln!(out)?;
            }
        }
        self.render_outputs(out)
    }

    fn render_outputs(&self, out: &mut String) -> fmt::Result {
        for reg in self.regs.iter() {
            for field in reg.fields() {
                if hwif::has_value(field) {
                    writeln!(
                        out,
                        "    assign {} = {};",
                        self.hwif.output(reg, field),
                        self.value(reg, field)
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::DesignOptions;
    use csrgen_model::{AccessType, AddrMap, Block, Node, Register};

    fn render(top: &AddrMap, options: DesignOptions) -> String {
        let state = DesignState::new(top, options);
        let mut out = String::new();
        FieldLogic::new(&state).render(&mut out).unwrap();
        out
    }

    #[test]
    fn test_rw_field() {
        let top = Block::new("foo").with_child(Node::Reg(
            Register::new("ctrl", 0).with_field(
                Field::new("CTRL", 7, 0, AccessType::Rw, AccessType::R).with_reset(0x5a),
            ),
        ));
        let out = render(&top, DesignOptions::default());
        assert!(out.contains("    logic [7:0] field_storage_ctrl_CTRL;"));
        assert!(out.contains("field_storage_ctrl_CTRL <= 8'h5a;"));
        assert!(out.contains(
            "if (decoded_reg_strb_ctrl && decoded_req_is_wr) begin\n                field_storage_ctrl_CTRL <= decoded_wr_data[7:0];"
        ));
        assert!(out.contains("assign hwif_out.ctrl.CTRL.value = field_storage_ctrl_CTRL;"));
    }

    #[test]
    fn test_side_effects_and_precedence() {
        let top = Block::new("foo").with_child(Node::Reg(
            Register::new("irq", 0)
                .with_field(
                    Field::new("pending", 3, 0, AccessType::Rw, AccessType::Rw)
                        .with_onwrite(OnWriteType::Woclr),
                )
                .with_field(
                    Field::new("sticky", 4, 4, AccessType::R, AccessType::Na)
                        .with_onread(OnReadType::Rclr),
                ),
        ));
        let out = render(&top, DesignOptions::default());
        let sw = out
            .find("field_storage_irq_pending <= field_storage_irq_pending & ~decoded_wr_data[3:0];")
            .unwrap();
        let hw = out
            .find("end else if (hwif_in.irq.pending.we) begin")
            .unwrap();
        assert!(sw < hw);
        assert!(out.contains(
            "if (decoded_reg_strb_irq && !decoded_req_is_wr) begin\n                field_storage_irq_sticky <= 1'h0;"
        ));
    }

    #[test]
    fn test_verilog_wire_field() {
        let top = Block::new("foo").with_child(Node::Reg(
            Register::new("status", 0)
                .with_field(Field::new("level", 15, 0, AccessType::R, AccessType::W))
                .with_field(Field::new("mode", 17, 16, AccessType::W, AccessType::R)),
        ));
        let state = DesignState::new(&top, DesignOptions::default().language(HdlLanguage::Verilog));
        let logic = FieldLogic::new(&state);
        let fields = state.regs[0].fields();
        assert_eq!(logic.value(&state.regs[0], fields[0]), "hwif_in_status_level_next");
        let mut out = String::new();
        logic.render(&mut out).unwrap();
        assert!(out.contains("    reg [1:0] field_storage_status_mode;"));
        assert!(out.contains("always @(posedge clk) begin"));
        assert!(!out.contains("field_storage_status_level"));
    }
}
