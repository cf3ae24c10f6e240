// Licensed under the Apache-2.0 license

use super::banner;
use crate::context::{RtlHeaderContext, SwHeaderContext};
use crate::util::{c_hex, hdl_hex};
use std::fmt::{self, Write};

pub(super) fn render_rtl_offsets(
    template: &str,
    ctx: &RtlHeaderContext<'_>,
    out: &mut String,
) -> fmt::Result {
    let guard = ctx.guard();
    writeln!(out, "{}", banner("//", template))?;
    writeln!(out)?;
    writeln!(out, "`ifndef {guard}")?;
    writeln!(out, "`define {guard}")?;
    writeln!(out)?;
    writeln!(out, "`define {} {}", ctx.num_regs_symbol(), ctx.regs.len())?;
    for reg in ctx.regs {
        writeln!(
            out,
            "`define {}_OFFSET {}",
            ctx.symbol(reg),
            hdl_hex(32, ctx.offset(reg))
        )?;
    }
    writeln!(out)?;
    writeln!(out, "`endif")
}

pub(super) fn render_sw_offsets(
    template: &str,
    ctx: &SwHeaderContext<'_>,
    out: &mut String,
) -> fmt::Result {
    let guard = ctx.guard("offsets");
    writeln!(out, "{}", banner("//", template))?;
    writeln!(out)?;
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    writeln!(out)?;
    for reg in ctx.regs {
        writeln!(out, "#define {}_OFFSET {}", ctx.symbol(reg), c_hex(ctx.offset(reg)))?;
    }
    writeln!(out)?;
    writeln!(out, "#endif /* {guard} */")
}

pub(super) fn render_sw_defines(
    template: &str,
    ctx: &SwHeaderContext<'_>,
    out: &mut String,
) -> fmt::Result {
    let guard = ctx.guard("defines");
    writeln!(out, "{}", banner("//", template))?;
    writeln!(out)?;
    writeln!(out, "#ifndef {guard}")?;
    writeln!(out, "#define {guard}")?;
    for reg in ctx.regs {
        let symbol = ctx.symbol(reg);
        writeln!(out)?;
        writeln!(out, "/* {} */", reg.path_string("."))?;
        writeln!(out, "#define {symbol}_RESET {}", c_hex(reg.reset()))?;
        for field in reg.fields() {
            let name = ctx.field_symbol(reg, field);
            writeln!(out, "#define {name}_SHIFT {}U", field.shift())?;
            writeln!(out, "#define {name}_WIDTH {}U", field.width())?;
            writeln!(out, "#define {name}_MASK {}", c_hex(field.mask()))?;
            if let Some(reset) = field.reset {
                writeln!(out, "#define {name}_RESET {}", c_hex(reset))?;
            }
        }
    }
    writeln!(out)?;
    writeln!(out, "#endif /* {guard} */")
}
