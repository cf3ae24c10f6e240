// Licensed under the Apache-2.0 license

//! Depth-first traversal of the elaborated tree with listener callbacks.

use crate::tree::{AddrMap, Block, Field, Node, Register};

/// A non-field node visited by the [`Walker`].
#[derive(Clone, Copy, Debug)]
pub enum Component<'a> {
    Addrmap(&'a Block),
    Regfile(&'a Block),
    Reg(&'a Register),
}

impl<'a> Component<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Component::Addrmap(b) | Component::Regfile(b) => &b.name,
            Component::Reg(r) => &r.name,
        }
    }

    fn from_node(node: &'a Node) -> Self {
        match node {
            Node::Addrmap(b) => Component::Addrmap(b),
            Node::Regfile(b) => Component::Regfile(b),
            Node::Reg(r) => Component::Reg(r),
        }
    }
}

/// Callbacks invoked during a walk. All methods default to doing nothing.
pub trait Listener {
    type Error;

    fn enter_component(&mut self, _component: Component<'_>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn enter_field(&mut self, _field: &Field) -> Result<(), Self::Error> {
        Ok(())
    }

    fn exit_component(&mut self, _component: Component<'_>) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Walks a tree in the same order [`crate::RegisterMap::registers`] lists
/// registers. Every node is visited exactly once.
#[derive(Clone, Copy, Debug, Default)]
pub struct Walker;

impl Walker {
    pub fn walk<L: Listener>(&self, top: &AddrMap, listener: &mut L) -> Result<(), L::Error> {
        self.visit(Component::Addrmap(top), listener)
    }

    fn visit<L: Listener>(&self, component: Component<'_>, listener: &mut L) -> Result<(), L::Error> {
        listener.enter_component(component)?;
        match component {
            Component::Addrmap(block) | Component::Regfile(block) => {
                for child in block.children_by_address() {
                    self.visit(Component::from_node(child), listener)?;
                }
            }
            Component::Reg(reg) => {
                let mut fields: Vec<&Field> = reg.fields.iter().collect();
                fields.sort_by_key(|f| f.low);
                for field in fields {
                    listener.enter_field(field)?;
                }
            }
        }
        listener.exit_component(component)
    }
}
