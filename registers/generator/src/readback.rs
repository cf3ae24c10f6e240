// Licensed under the Apache-2.0 license

use crate::addr_decode::AddressDecoder;
use crate::design::DesignState;
use crate::field_logic::FieldLogic;
use crate::language::HdlLanguage;
use crate::util::hdl_hex;
use csrgen_model::RegisterRef;
use std::fmt::{self, Write};
use std::sync::Arc;

/// Read data mux and the response strobes back to the bus adapter.
///
/// Every request completes in the cycle it is issued. Errors are never
/// signalled; unmapped addresses read as zero.
#[derive(Clone, Debug)]
pub struct Readback<'a> {
    regs: Arc<[RegisterRef<'a>]>,
    language: HdlLanguage,
    data_width: u64,
    fields: FieldLogic<'a>,
}

impl<'a> Readback<'a> {
    pub fn new(state: &DesignState<'a>) -> Self {
        Self {
            regs: Arc::clone(&state.regs),
            language: state.language,
            data_width: state.data_width,
            fields: FieldLogic::new(state),
        }
    }

    pub fn render(&self, out: &mut String) -> fmt::Result {
        let lang = self.language;
        let dw = self.data_width;
        writeln!(out, "    {} [{}:0] readback_data;", lang.var(), dw - 1)?;
        writeln!(out, "    {} begin", lang.always_comb())?;
        writeln!(out, "        readback_data = {};", hdl_hex(dw, 0))?;
        for reg in self.regs.iter() {
            let readable: Vec<_> = reg.fields().into_iter().filter(|f| f.sw.can_read()).collect();
            if readable.is_empty() {
                continue;
            }
            writeln!(out, "        if ({}) begin", AddressDecoder::strobe(reg))?;
            for field in readable {
                writeln!(
                    out,
                    "            readback_data[{}:{}] = {};",
                    field.high,
                    field.low,
                    self.fields.value(reg, field)
                )?;
            }
            writeln!(out, "        end")?;
        }
        writeln!(out, "    end")?;
        writeln!(out)?;
        writeln!(out, "    assign cpuif_rd_ack = decoded_req && !decoded_req_is_wr;")?;
        writeln!(out, "    assign cpuif_rd_data = readback_data;")?;
        writeln!(out, "    assign cpuif_rd_err = 1'b0;")?;
        writeln!(out, "    assign cpuif_wr_ack = decoded_req && decoded_req_is_wr;")?;
        writeln!(out, "    assign cpuif_wr_err = 1'b0;")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::DesignOptions;
    use csrgen_model::{AccessType, Block, Field, Node, Register};

    #[test]
    fn test_readback_mux() {
        let top = Block::new("foo")
            .with_child(Node::Reg(
                Register::new("ctrl", 0)
                    .with_field(Field::new("CTRL", 7, 0, AccessType::Rw, AccessType::R))
                    .with_field(Field::new("STATUS", 31, 8, AccessType::R, AccessType::W)),
            ))
            .with_child(Node::Reg(
                Register::new("kick", 4)
                    .with_field(Field::new("go", 0, 0, AccessType::W, AccessType::R)),
            ));
        let state = DesignState::new(&top, DesignOptions::default());
        let mut out = String::new();
        Readback::new(&state).render(&mut out).unwrap();
        assert!(out.contains("        readback_data = 32'h0000_0000;"));
        assert!(out.contains("            readback_data[7:0] = field_storage_ctrl_CTRL;"));
        assert!(out.contains("            readback_data[31:8] = hwif_in.ctrl.STATUS.next;"));
        assert!(!out.contains("decoded_reg_strb_kick"));
        assert!(out.contains("assign cpuif_rd_err = 1'b0;"));
    }
}
