// Licensed under the Apache-2.0 license

use super::banner;
use crate::context::PackageContext;
use std::fmt::{self, Write};

pub(super) fn render(template: &str, ctx: &PackageContext<'_>, out: &mut String) -> fmt::Result {
    writeln!(out, "{}", banner("//", template))?;
    writeln!(out)?;
    writeln!(out, "package {};", ctx.package_name)?;
    writeln!(out)?;
    ctx.hwif.render_typedefs(ctx.regs, out)?;
    writeln!(out, "endpackage")
}
