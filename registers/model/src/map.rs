// Licensed under the Apache-2.0 license

//! Read-only register-map view over an elaborated tree.
//!
//! [`RegisterMap::registers`] produces the register ordering every generated
//! artifact shares: depth-first, with siblings visited in ascending address
//! order. Artifacts rendered from the same list agree on register indices.

use crate::tree::{AddrMap, Block, Field, Node, Register};

/// A register placed in the address space of the top-level address map.
#[derive(Clone, Debug, PartialEq)]
pub struct RegisterRef<'a> {
    reg: &'a Register,
    /// Path segments from the top-level address map down to the register.
    path: Vec<&'a str>,
    /// Byte address relative to the top-level address map. `None` when the
    /// sum of the offsets along the path does not fit in 64 bits.
    address: Option<u64>,
}

impl<'a> RegisterRef<'a> {
    pub fn register(&self) -> &'a Register {
        self.reg
    }

    pub fn name(&self) -> &'a str {
        &self.reg.name
    }

    pub fn path(&self) -> &[&'a str] {
        &self.path
    }

    pub fn path_string(&self, sep: &str) -> String {
        self.path.join(sep)
    }

    /// Flattened name below the top-level address map, e.g. `rf_ctrl`.
    pub fn ident(&self) -> String {
        self.path[1..].join("_")
    }

    /// Saturates at `u64::MAX` when the address overflows.
    pub fn address(&self) -> u64 {
        self.address.unwrap_or(u64::MAX)
    }

    pub fn address_overflows(&self) -> bool {
        self.address.is_none()
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.reg.size
    }

    /// Width in bits.
    pub fn width(&self) -> u64 {
        self.reg.width()
    }

    pub fn desc(&self) -> Option<&'a str> {
        self.reg.desc.as_deref()
    }

    /// Fields in ascending bit order.
    pub fn fields(&self) -> Vec<&'a Field> {
        let mut fields: Vec<&'a Field> = self.reg.fields.iter().collect();
        fields.sort_by_key(|f| f.low);
        fields
    }

    /// Composite reset value. Fields without a reset contribute zero.
    pub fn reset(&self) -> u64 {
        self.reg
            .fields
            .iter()
            .filter_map(|f| f.reset.map(|r| (r & f.value_mask()) << f.low.min(63)))
            .fold(0, |acc, v| acc | v)
    }

    pub fn is_sw_readable(&self) -> bool {
        self.reg.fields.iter().any(|f| f.sw.can_read())
    }

    pub fn is_sw_writable(&self) -> bool {
        self.reg.fields.iter().any(|f| f.sw.can_write())
    }
}

/// Query interface over the elaborated tree rooted at one address map.
#[derive(Clone, Copy, Debug)]
pub struct RegisterMap<'a> {
    top: &'a AddrMap,
}

impl<'a> RegisterMap<'a> {
    pub fn new(top: &'a AddrMap) -> Self {
        Self { top }
    }

    pub fn top(&self) -> &'a AddrMap {
        self.top
    }

    /// All registers of the map in generation order.
    pub fn registers(&self) -> Vec<RegisterRef<'a>> {
        let mut out = Vec::new();
        collect(self.top, Some(0), vec![self.top.name.as_str()], &mut out);
        out
    }

    /// Registers below the addrmap or regfile at `scope` (path segments
    /// below the top, e.g. `["rf0"]`). Addresses stay relative to the top.
    pub fn registers_in(&self, scope: &[&str]) -> Option<Vec<RegisterRef<'a>>> {
        let mut block = self.top;
        let mut base = Some(0u64);
        let mut path = vec![self.top.name.as_str()];
        for segment in scope {
            let child = block.children.iter().find_map(|c| match c {
                Node::Addrmap(b) | Node::Regfile(b) if b.name == *segment => Some(b),
                _ => None,
            })?;
            base = base.and_then(|b| b.checked_add(child.offset));
            path.push(child.name.as_str());
            block = child;
        }
        let mut out = Vec::new();
        collect(block, base, path, &mut out);
        Some(out)
    }
}

fn collect<'a>(
    block: &'a Block,
    base: Option<u64>,
    path: Vec<&'a str>,
    out: &mut Vec<RegisterRef<'a>>,
) {
    for child in block.children_by_address() {
        let mut child_path = path.clone();
        child_path.push(child.name());
        match child {
            Node::Reg(reg) => out.push(RegisterRef {
                reg,
                path: child_path,
                address: base.and_then(|b| b.checked_add(reg.offset)),
            }),
            Node::Addrmap(inner) | Node::Regfile(inner) => {
                collect(inner, base.and_then(|b| b.checked_add(inner.offset)), child_path, out)
            }
        }
    }
}
