// Licensed under the Apache-2.0 license

//! Hardware-side interface of the generated register block.
//!
//! Fields that hardware writes (`hw=w` or `hw=rw`) appear on `hwif_in`;
//! fields hardware reads (`hw=r` or `hw=rw`) appear on `hwif_out`.
//! SystemVerilog bundles both into packed structs defined in the package;
//! Verilog gets one flat port per member.

use crate::design::DesignState;
use crate::language::HdlLanguage;
use csrgen_model::{AccessType, Field, RegisterRef};
use std::fmt::{self, Write};

/// Field has a `next` input from hardware.
pub fn has_next(field: &Field) -> bool {
    field.hw.can_write()
}

/// Field has a `we` input qualifying `next`.
pub fn has_we(field: &Field) -> bool {
    field.hw == AccessType::Rw
}

/// Field drives a `value` output to hardware.
pub fn has_value(field: &Field) -> bool {
    field.hw.can_read()
}

#[derive(Clone, Debug)]
pub struct Hwif {
    language: HdlLanguage,
    /// Lower-case module name; scopes the package type names.
    scope: String,
    package: String,
}

impl Hwif {
    pub fn new(state: &DesignState<'_>) -> Self {
        Self {
            language: state.language,
            scope: state.module_name.to_lowercase(),
            package: state.package_name.clone(),
        }
    }

    pub fn has_inputs(regs: &[RegisterRef<'_>]) -> bool {
        regs.iter().flat_map(|r| r.fields()).any(has_next)
    }

    pub fn has_outputs(regs: &[RegisterRef<'_>]) -> bool {
        regs.iter().flat_map(|r| r.fields()).any(has_value)
    }

    /// Reference to a `hwif_in` member (`next` or `we`).
    pub fn input(&self, reg: &RegisterRef<'_>, field: &Field, member: &str) -> String {
        match self.language {
            HdlLanguage::SystemVerilog => {
                format!("hwif_in.{}.{}.{member}", reg.ident(), field.name)
            }
            HdlLanguage::Verilog => format!("hwif_in_{}_{}_{member}", reg.ident(), field.name),
        }
    }

    /// Reference to the `hwif_out` value of a field.
    pub fn output(&self, reg: &RegisterRef<'_>, field: &Field) -> String {
        match self.language {
            HdlLanguage::SystemVerilog => format!("hwif_out.{}.{}.value", reg.ident(), field.name),
            HdlLanguage::Verilog => format!("hwif_out_{}_{}_value", reg.ident(), field.name),
        }
    }

    pub fn in_type(&self) -> String {
        format!("{}__in_t", self.scope)
    }

    pub fn out_type(&self) -> String {
        format!("{}__out_t", self.scope)
    }

    /// Module port declarations for the hardware interface, without
    /// trailing commas. Empty directions are omitted.
    pub fn port_declarations(&self, regs: &[RegisterRef<'_>]) -> Vec<String> {
        let mut ports = Vec::new();
        match self.language {
            HdlLanguage::SystemVerilog => {
                if Self::has_inputs(regs) {
                    ports.push(format!("input {}::{} hwif_in", self.package, self.in_type()));
                }
                if Self::has_outputs(regs) {
                    ports.push(format!("output {}::{} hwif_out", self.package, self.out_type()));
                }
            }
            HdlLanguage::Verilog => {
                for reg in regs {
                    for field in reg.fields() {
                        let range = vector_range(field.width());
                        if has_next(field) {
                            ports.push(format!("input wire {range}{}", self.input(reg, field, "next")));
                        }
                        if has_we(field) {
                            ports.push(format!("input wire {}", self.input(reg, field, "we")));
                        }
                        if has_value(field) {
                            ports.push(format!("output wire {range}{}", self.output(reg, field)));
                        }
                    }
                }
            }
        }
        ports
    }

    /// Packed struct typedefs for the package, innermost first.
    pub fn render_typedefs(&self, regs: &[RegisterRef<'_>], out: &mut String) -> fmt::Result {
        if Self::has_inputs(regs) {
            self.render_direction(regs, "in", out)?;
        }
        if Self::has_outputs(regs) {
            self.render_direction(regs, "out", out)?;
        }
        Ok(())
    }

    fn render_direction(&self, regs: &[RegisterRef<'_>], dir: &str, out: &mut String) -> fmt::Result {
        let scope = &self.scope;
        let mut reg_members = Vec::new();
        for reg in regs {
            let ident = reg.ident();
            let fields: Vec<&Field> = reg
                .fields()
                .into_iter()
                .filter(|f| if dir == "in" { has_next(f) } else { has_value(f) })
                .collect();
            if fields.is_empty() {
                continue;
            }
            for field in &fields {
                let range = vector_range(field.width());
                writeln!(out, "    typedef struct packed {{")?;
                if dir == "in" {
                    writeln!(out, "        logic {range}next;")?;
                    if has_we(field) {
                        writeln!(out, "        logic we;")?;
                    }
                } else {
                    writeln!(out, "        logic {range}value;")?;
                }
                writeln!(out, "    }} {scope}__{ident}__{}__{dir}_t;", field.name)?;
                writeln!(out)?;
            }
            writeln!(out, "    typedef struct packed {{")?;
            for field in &fields {
                writeln!(out, "        {scope}__{ident}__{0}__{dir}_t {0};", field.name)?;
            }
            writeln!(out, "    }} {scope}__{ident}__{dir}_t;")?;
            writeln!(out)?;
            reg_members.push(ident);
        }
        writeln!(out, "    typedef struct packed {{")?;
        for ident in &reg_members {
            writeln!(out, "        {scope}__{ident}__{dir}_t {ident};")?;
        }
        writeln!(out, "    }} {scope}__{dir}_t;")?;
        writeln!(out)
    }
}

/// `[w-1:0] ` for vectors, nothing for single bits.
pub fn vector_range(width: u32) -> String {
    if width > 1 {
        format!("[{}:0] ", width - 1)
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::DesignOptions;
    use csrgen_model::{AddrMap, Block, Node, Register};

    fn top() -> AddrMap {
        Block::new("foo").with_child(Node::Reg(
            Register::new("ctrl", 0)
                .with_field(Field::new("CTRL", 7, 0, AccessType::Rw, AccessType::R))
                .with_field(Field::new("STATUS", 30, 8, AccessType::R, AccessType::W))
                .with_field(Field::new("BUSY", 31, 31, AccessType::R, AccessType::Rw)),
        ))
    }

    #[test]
    fn test_sv_interface() {
        let top = top();
        let state = DesignState::new(&top, DesignOptions::default());
        let hwif = Hwif::new(&state);
        assert_eq!(
            hwif.port_declarations(&state.regs),
            [
                "input foo_pkg::foo__in_t hwif_in",
                "output foo_pkg::foo__out_t hwif_out"
            ]
        );
        let fields = state.regs[0].fields();
        assert_eq!(hwif.input(&state.regs[0], fields[1], "next"), "hwif_in.ctrl.STATUS.next");
        assert_eq!(hwif.output(&state.regs[0], fields[0]), "hwif_out.ctrl.CTRL.value");

        let mut out = String::new();
        hwif.render_typedefs(&state.regs, &mut out).unwrap();
        assert!(out.contains("        logic [22:0] next;\n    } foo__ctrl__STATUS__in_t;"));
        assert!(out.contains("        logic next;\n        logic we;\n    } foo__ctrl__BUSY__in_t;"));
        assert!(out.contains("        foo__ctrl__in_t ctrl;\n    } foo__in_t;"));
        assert!(out.contains("foo__ctrl__CTRL__out_t CTRL;"));
        assert!(!out.contains("foo__ctrl__STATUS__out_t"));
    }

    #[test]
    fn test_verilog_ports() {
        let top = top();
        let state =
            DesignState::new(&top, DesignOptions::default().language(HdlLanguage::Verilog));
        let hwif = Hwif::new(&state);
        assert_eq!(
            hwif.port_declarations(&state.regs),
            [
                "output wire [7:0] hwif_out_ctrl_CTRL_value",
                "input wire [22:0] hwif_in_ctrl_STATUS_next",
                "input wire hwif_in_ctrl_BUSY_next",
                "input wire hwif_in_ctrl_BUSY_we",
                "output wire hwif_out_ctrl_BUSY_value",
            ]
        );
    }

    #[test]
    fn test_no_ports_without_hardware_access() {
        let top = Block::new("foo").with_child(Node::Reg(
            Register::new("scratch", 0)
                .with_field(Field::new("x", 31, 0, AccessType::Rw, AccessType::Na)),
        ));
        let state = DesignState::new(&top, DesignOptions::default());
        let hwif = Hwif::new(&state);
        assert!(hwif.port_declarations(&state.regs).is_empty());
        let mut out = String::new();
        hwif.render_typedefs(&state.regs, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
