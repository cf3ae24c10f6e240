// Licensed under the Apache-2.0 license

use super::banner;
use crate::context::ModuleContext;
use crate::cpuif::render_strobe_declarations;
use std::fmt::{self, Write};

fn section(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "    //{}", "-".repeat(74))?;
    writeln!(out, "    // {title}")?;
    writeln!(out, "    //{}", "-".repeat(74))
}

pub(super) fn render(template: &str, ctx: &ModuleContext<'_>, out: &mut String) -> fmt::Result {
    let params = ctx.cpuif_params();

    writeln!(out, "{}", banner("//", template))?;
    writeln!(out)?;
    writeln!(out, "module {} (", ctx.module_name)?;
    let mut ports = vec!["input wire clk".to_string(), "input wire rst".to_string()];
    ports.extend(
        ctx.cpuif
            .port_declaration(&params)
            .split(",\n")
            .map(str::to_string),
    );
    ports.extend(ctx.hwif.port_declarations(ctx.regs));
    let last = ports.len() - 1;
    for (i, port) in ports.iter().enumerate() {
        let sep = if i == last { "" } else { "," };
        writeln!(out, "    {port}{sep}")?;
    }
    writeln!(out, ");")?;

    section(out, &format!("CPU bus interface ({})", ctx.cpuif.name()))?;
    render_strobe_declarations(&params, out)?;
    writeln!(out)?;
    ctx.cpuif.render_logic(&params, out)?;

    section(out, "Address decode")?;
    ctx.address_decoder.render(out)?;

    section(out, "Field logic")?;
    ctx.field_logic.render(out)?;

    section(out, "Readback")?;
    ctx.readback.render(out)?;
    writeln!(out, "endmodule")
}
