// Licensed under the Apache-2.0 license

//! Plain-text dump of the register hierarchy.
//!
//! ```text
//! FOO
//! 	ctrl
//! 		[7:0] CTRL sw=rw
//! 		[31:8] STATUS sw=r
//! ```

use csrgen_model::{AddrMap, Component, Field, Listener, Walker};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Name of the dump inside the output directory.
pub const TREE_FILE: &str = "csr.tree";

/// Listener writing one tab-indented line per node to `out`.
pub struct TreePrinter<W: Write> {
    out: W,
    depth: usize,
}

impl<W: Write> TreePrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, depth: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn indent(&mut self) -> io::Result<()> {
        for _ in 0..self.depth {
            self.out.write_all(b"\t")?;
        }
        Ok(())
    }
}

impl<W: Write> Listener for TreePrinter<W> {
    type Error = io::Error;

    fn enter_component(&mut self, component: Component<'_>) -> io::Result<()> {
        self.indent()?;
        writeln!(self.out, "{}", component.name())?;
        self.depth += 1;
        Ok(())
    }

    fn enter_field(&mut self, field: &Field) -> io::Result<()> {
        self.indent()?;
        writeln!(self.out, "{} {} sw={}", field.bit_range(), field.name, field.sw)
    }

    fn exit_component(&mut self, _component: Component<'_>) -> io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }
}

/// Walk `top` and write the dump to `path`.
pub fn print_tree(top: &AddrMap, path: &Path) -> io::Result<()> {
    let mut printer = TreePrinter::new(BufWriter::new(File::create(path)?));
    Walker.walk(top, &mut printer)?;
    printer.into_inner().flush()
}
