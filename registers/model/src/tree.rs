// Licensed under the Apache-2.0 license

//! The elaborated register tree.
//!
//! This is the hand-off format of the upstream register-description compiler:
//! every parameter is resolved, arrays are unrolled and offsets are concrete.
//! The tree is loaded once per run and treated as immutable afterwards.
//!
//! ```text
//! addrmap (top)
//! ├── reg          # fixed-size addressable unit
//! │   └── field    # bit range [high:low] with access policies
//! ├── regfile      # grouping with its own offset
//! │   └── reg ...
//! └── addrmap      # nested address map
//! ```

use crate::access::{AccessType, OnReadType, OnWriteType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default register size in bytes when the description omits it.
pub const DEFAULT_REG_SIZE: u64 = 4;

fn default_reg_size() -> u64 {
    DEFAULT_REG_SIZE
}

/// Errors raised while loading an elaborated tree.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON register tree: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid Hjson register tree: {0}")]
    Hjson(String),
    #[error("unsupported register tree format {0:?} (expected .json or .hjson)")]
    UnknownFormat(PathBuf),
    #[error("top-level node must be an addrmap, found {0}")]
    NotAnAddrmap(&'static str),
}

/// Any child of an address map or register file.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Addrmap(Block),
    Regfile(Block),
    Reg(Register),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Addrmap(block) | Node::Regfile(block) => &block.name,
            Node::Reg(reg) => &reg.name,
        }
    }

    /// Offset relative to the parent node.
    pub fn offset(&self) -> u64 {
        match self {
            Node::Addrmap(block) | Node::Regfile(block) => block.offset,
            Node::Reg(reg) => reg.offset,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Addrmap(_) => "addrmap",
            Node::Regfile(_) => "regfile",
            Node::Reg(_) => "reg",
        }
    }
}

/// An address map or register file: a named group of children at an offset.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Block {
    pub name: String,
    #[serde(default)]
    pub offset: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// The root of an elaborated tree is always an address map.
pub type AddrMap = Block;

impl Block {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn at(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Children sorted by ascending offset. Equal offsets keep source order.
    pub fn children_by_address(&self) -> Vec<&Node> {
        let mut children: Vec<&Node> = self.children.iter().collect();
        children.sort_by_key(|c| c.offset());
        children
    }

    /// Load a tree from a `.json` or `.hjson` file.
    pub fn from_file(path: &Path) -> Result<AddrMap, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("hjson") => Self::from_hjson_str(&text),
            _ => Err(LoadError::UnknownFormat(path.to_path_buf())),
        }
    }

    pub fn from_json_str(text: &str) -> Result<AddrMap, LoadError> {
        let node: Node = serde_json::from_str(text)?;
        Self::top_from_node(node)
    }

    pub fn from_hjson_str(text: &str) -> Result<AddrMap, LoadError> {
        let node: Node = serde_hjson::from_str(text).map_err(|e| LoadError::Hjson(e.to_string()))?;
        Self::top_from_node(node)
    }

    fn top_from_node(node: Node) -> Result<AddrMap, LoadError> {
        match node {
            Node::Addrmap(top) => Ok(top),
            other => Err(LoadError::NotAnAddrmap(other.kind())),
        }
    }
}

/// A fixed-size addressable register.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Register {
    pub name: String,
    pub offset: u64,
    /// Size in bytes.
    #[serde(default = "default_reg_size")]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Register {
    pub fn new(name: &str, offset: u64) -> Self {
        Self {
            name: name.to_string(),
            offset,
            size: DEFAULT_REG_SIZE,
            desc: None,
            fields: Vec::new(),
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Width in bits. Saturates for sizes no register can have.
    pub fn width(&self) -> u64 {
        self.size.saturating_mul(8)
    }
}

/// A named bit range `[high:low]` within a register.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Field {
    pub name: String,
    pub high: u32,
    pub low: u32,
    #[serde(default)]
    pub sw: AccessType,
    #[serde(default)]
    pub hw: AccessType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onread: Option<OnReadType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onwrite: Option<OnWriteType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl Field {
    pub fn new(name: &str, high: u32, low: u32, sw: AccessType, hw: AccessType) -> Self {
        Self {
            name: name.to_string(),
            high,
            low,
            sw,
            hw,
            reset: None,
            onread: None,
            onwrite: None,
            desc: None,
        }
    }

    pub fn with_reset(mut self, reset: u64) -> Self {
        self.reset = Some(reset);
        self
    }

    pub fn with_onread(mut self, onread: OnReadType) -> Self {
        self.onread = Some(onread);
        self
    }

    pub fn with_onwrite(mut self, onwrite: OnWriteType) -> Self {
        self.onwrite = Some(onwrite);
        self
    }

    /// Width in bits. Zero for a malformed range with `high < low`.
    pub fn width(&self) -> u32 {
        if self.high < self.low {
            0
        } else {
            self.high - self.low + 1
        }
    }

    pub fn shift(&self) -> u32 {
        self.low
    }

    /// Unshifted all-ones value of the field width.
    pub fn value_mask(&self) -> u64 {
        match self.width() {
            0 => 0,
            w if w >= 64 => u64::MAX,
            w => (1u64 << w) - 1,
        }
    }

    /// Mask of the field bits in register position.
    pub fn mask(&self) -> u64 {
        if self.low >= 64 {
            return 0;
        }
        self.value_mask() << self.low
    }

    /// Whether the generated hardware keeps a flop for this field.
    ///
    /// Software-writable fields, fields with read side effects and fields
    /// hardware updates through a write enable (`hw=rw`) are stored. Everything
    /// else is either a constant or a wire from the hardware interface.
    pub fn needs_storage(&self) -> bool {
        self.sw.can_write() || self.onread.is_some() || self.hw == AccessType::Rw
    }

    /// The field is driven continuously by hardware (`hw=w`).
    pub fn is_hw_wire(&self) -> bool {
        self.hw == AccessType::W
    }

    pub fn bit_range(&self) -> String {
        format!("[{}:{}]", self.high, self.low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FOO_JSON: &str = r#"{
        "type": "addrmap",
        "name": "foo",
        "children": [
            { "type": "reg", "name": "ctrl_reg", "offset": 0,
              "fields": [
                { "name": "CTRL", "high": 7, "low": 0, "sw": "rw", "hw": "r", "reset": 0 },
                { "name": "STATUS", "high": 31, "low": 8, "sw": "r", "hw": "w" }
              ] }
        ]
    }"#;

    #[test]
    fn test_load_json() {
        let top = Block::from_json_str(FOO_JSON).unwrap();
        assert_eq!(top.name, "foo");
        let Node::Reg(reg) = &top.children[0] else {
            panic!("expected register");
        };
        assert_eq!(reg.size, DEFAULT_REG_SIZE);
        assert_eq!(reg.fields[1].sw, AccessType::R);
        assert_eq!(reg.fields[1].width(), 24);
        assert_eq!(reg.fields[1].mask(), 0xFFFF_FF00);
    }

    #[test]
    fn test_load_hjson() {
        let text = r#"
        {
          type: addrmap
          name: top
          children: [
            {
              type: regfile
              name: rf
              offset: 16
              children: [
                {
                  type: reg
                  name: r0
                  offset: 0
                  fields: [
                    {
                      name: f
                      high: 0
                      low: 0
                    }
                  ]
                }
              ]
            }
          ]
        }
        "#;
        let top = Block::from_hjson_str(text).unwrap();
        let Node::Regfile(rf) = &top.children[0] else {
            panic!("expected regfile");
        };
        assert_eq!(rf.offset, 16);
        assert_eq!(rf.children.len(), 1);
    }

    #[test]
    fn test_top_must_be_addrmap() {
        let err = Block::from_json_str(r#"{ "type": "reg", "name": "r", "offset": 0 }"#)
            .unwrap_err();
        assert!(matches!(err, LoadError::NotAnAddrmap("reg")));
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let mut file = tempfile::Builder::new().suffix(".rdl").tempfile().unwrap();
        file.write_all(FOO_JSON.as_bytes()).unwrap();
        let err = Block::from_file(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::UnknownFormat(_)));
    }

    #[test]
    fn test_from_file_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(FOO_JSON.as_bytes()).unwrap();
        let top = Block::from_file(file.path()).unwrap();
        assert_eq!(top.children.len(), 1);
    }

    #[test]
    fn test_field_storage_rules() {
        let rw = Field::new("a", 0, 0, AccessType::Rw, AccessType::R);
        assert!(rw.needs_storage());
        let wire = Field::new("b", 3, 0, AccessType::R, AccessType::W);
        assert!(!wire.needs_storage());
        assert!(wire.is_hw_wire());
        let constant = Field::new("c", 3, 0, AccessType::R, AccessType::Na);
        assert!(!constant.needs_storage());
        let rclr = constant.clone().with_onread(OnReadType::Rclr);
        assert!(rclr.needs_storage());
    }

    #[test]
    fn test_full_width_mask() {
        let f = Field::new("wide", 63, 0, AccessType::Rw, AccessType::R);
        assert_eq!(f.value_mask(), u64::MAX);
        assert_eq!(f.mask(), u64::MAX);
    }

    #[test]
    fn test_huge_register_width_saturates() {
        assert_eq!(Register::new("r", 0).with_size(u64::MAX).width(), u64::MAX);
        assert_eq!(Register::new("r", 0).width(), 32);
    }
}
