// Licensed under the Apache-2.0 license

use crate::design::DesignState;
use crate::language::HdlLanguage;
use crate::util::hdl_hex;
use csrgen_model::RegisterRef;
use std::fmt::{self, Write};
use std::sync::Arc;

/// Per-register decode strobes, asserted for the cycle a request hits the
/// register's address. Byte-lane bits below the bus word are ignored, so any
/// byte address inside a register selects it.
#[derive(Clone, Debug)]
pub struct AddressDecoder<'a> {
    regs: Arc<[RegisterRef<'a>]>,
    language: HdlLanguage,
    addr_width: u32,
    data_width: u64,
}

impl<'a> AddressDecoder<'a> {
    pub fn new(state: &DesignState<'a>) -> Self {
        Self {
            regs: Arc::clone(&state.regs),
            language: state.language,
            addr_width: state.addr_width,
            data_width: state.data_width,
        }
    }

    pub fn strobe(reg: &RegisterRef<'_>) -> String {
        format!("decoded_reg_strb_{}", reg.ident())
    }

    /// Number of byte-lane address bits within one bus word. At least one
    /// address bit is always compared.
    fn word_lsb(&self) -> u32 {
        let lanes = (self.data_width / 8).max(1).trailing_zeros();
        lanes.min(self.addr_width.saturating_sub(1))
    }

    pub fn render(&self, out: &mut String) -> fmt::Result {
        let net = self.language.net();
        for reg in self.regs.iter() {
            writeln!(out, "    {net} {};", Self::strobe(reg))?;
        }
        writeln!(out, "    {net} decoded_req;")?;
        writeln!(out, "    {net} decoded_req_is_wr;")?;
        writeln!(out, "    {net} [{}:0] decoded_wr_data;", self.data_width - 1)?;
        writeln!(out)?;
        let lsb = self.word_lsb();
        let aw = self.addr_width;
        let addr = if lsb == 0 {
            "cpuif_addr".to_string()
        } else {
            format!("cpuif_addr[{}:{lsb}]", aw.saturating_sub(1))
        };
        for reg in self.regs.iter() {
            writeln!(
                out,
                "    assign {} = cpuif_req && ({addr} == {});",
                Self::strobe(reg),
                hdl_hex(u64::from(aw.saturating_sub(lsb)), reg.address() >> lsb)
            )?;
        }
        writeln!(out, "    assign decoded_req = cpuif_req;")?;
        writeln!(out, "    assign decoded_req_is_wr = cpuif_req_is_wr;")?;
        writeln!(out, "    assign decoded_wr_data = cpuif_wr_data;")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::DesignOptions;
    use csrgen_model::{AccessType, Block, Field, Node, Register};

    #[test]
    fn test_decode() {
        let f = || Field::new("x", 31, 0, AccessType::Rw, AccessType::R);
        let top = Block::new("foo")
            .with_child(Node::Reg(Register::new("b", 4).with_field(f())))
            .with_child(Node::Reg(Register::new("a", 0).with_field(f())));
        let state = DesignState::new(&top, DesignOptions::default().address_width(12));
        let mut out = String::new();
        AddressDecoder::new(&state).render(&mut out).unwrap();
        let a = out
            .find("assign decoded_reg_strb_a = cpuif_req && (cpuif_addr[11:2] == 10'h000);")
            .unwrap();
        let b = out
            .find("assign decoded_reg_strb_b = cpuif_req && (cpuif_addr[11:2] == 10'h001);")
            .unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_decode_ignores_byte_lanes() {
        let top = Block::new("foo")
            .with_child(Node::Reg(
                Register::new("a", 0)
                    .with_size(8)
                    .with_field(Field::new("x", 63, 0, AccessType::Rw, AccessType::R)),
            ))
            .with_child(Node::Reg(
                Register::new("b", 8)
                    .with_size(8)
                    .with_field(Field::new("x", 63, 0, AccessType::Rw, AccessType::R)),
            ));
        let state = DesignState::new(&top, DesignOptions::default());
        let mut out = String::new();
        AddressDecoder::new(&state).render(&mut out).unwrap();
        assert!(out.contains("(cpuif_addr[31:3] == 29'h0000_0001);"), "{out}");

        let byte = Block::new("foo").with_child(Node::Reg(
            Register::new("a", 1)
                .with_size(1)
                .with_field(Field::new("x", 7, 0, AccessType::Rw, AccessType::R)),
        ));
        let state = DesignState::new(&byte, DesignOptions::default().address_width(8));
        let mut out = String::new();
        AddressDecoder::new(&state).render(&mut out).unwrap();
        assert!(out.contains("(cpuif_addr == 8'h01);"), "{out}");
    }
}
