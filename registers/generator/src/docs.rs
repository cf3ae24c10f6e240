// Licensed under the Apache-2.0 license

//! Browsable documentation for the register map.

use csrgen_model::{AddrMap, RegisterRef};
use std::fmt::{self, Write as _};
use std::io;
use std::path::{Path, PathBuf};

/// Produces documentation for an elaborated tree into a directory.
pub trait DocExporter: Send + Sync {
    /// `regs` is the run's register list, in generation order. Returns the
    /// files written.
    fn export(
        &self,
        top: &AddrMap,
        regs: &[RegisterRef<'_>],
        dir: &Path,
    ) -> io::Result<Vec<PathBuf>>;
}

/// Writes a single self-contained `index.html` with one table per register.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlExporter;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl HtmlExporter {
    pub fn render(&self, top: &AddrMap, regs: &[RegisterRef<'_>]) -> Result<String, fmt::Error> {
        let mut html = String::new();
        self.render_into(top, regs, &mut html)?;
        Ok(html)
    }

    fn render_into(
        &self,
        top: &AddrMap,
        regs: &[RegisterRef<'_>],
        html: &mut String,
    ) -> fmt::Result {
        let title = escape(&top.name);
        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, "<html>")?;
        writeln!(html, "<head>")?;
        writeln!(html, "<meta charset=\"utf-8\">")?;
        writeln!(html, "<title>{title} registers</title>")?;
        writeln!(
            html,
            "<style>table {{ border-collapse: collapse; margin-bottom: 2em; }} \
             td, th {{ border: 1px solid #999; padding: 2px 8px; }}</style>"
        )?;
        writeln!(html, "</head>")?;
        writeln!(html, "<body>")?;
        writeln!(html, "<h1>{title}</h1>")?;
        if let Some(desc) = &top.desc {
            writeln!(html, "<p>{}</p>", escape(desc))?;
        }
        for reg in regs {
            let path = escape(&reg.path_string("."));
            writeln!(html, "<h2 id=\"{}\">{path}</h2>", escape(&reg.ident()))?;
            writeln!(
                html,
                "<p>Address: 0x{:08x}, reset: 0x{:x}</p>",
                reg.address(),
                reg.reset()
            )?;
            if let Some(desc) = reg.desc() {
                writeln!(html, "<p>{}</p>", escape(desc))?;
            }
            writeln!(html, "<table>")?;
            writeln!(
                html,
                "<tr><th>Bits</th><th>Field</th><th>SW</th><th>HW</th><th>Reset</th><th>Description</th></tr>"
            )?;
            for field in reg.fields().into_iter().rev() {
                let reset = field
                    .reset
                    .map(|r| format!("0x{r:x}"))
                    .unwrap_or_else(|| "-".to_string());
                writeln!(
                    html,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{reset}</td><td>{}</td></tr>",
                    field.bit_range(),
                    escape(&field.name),
                    field.sw,
                    field.hw,
                    escape(field.desc.as_deref().unwrap_or(""))
                )?;
            }
            writeln!(html, "</table>")?;
        }
        writeln!(html, "</body>")?;
        writeln!(html, "</html>")
    }
}

impl DocExporter for HtmlExporter {
    fn export(
        &self,
        top: &AddrMap,
        regs: &[RegisterRef<'_>],
        dir: &Path,
    ) -> io::Result<Vec<PathBuf>> {
        let path = dir.join("index.html");
        let html = self
            .render(top, regs)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        std::fs::write(&path, html)?;
        Ok(vec![path])
    }
}
