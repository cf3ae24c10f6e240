// Licensed under the Apache-2.0 license

//! Utility functions for identifiers and literal formatting.
//!
//! This module provides the naming conventions shared by the HDL and C
//! outputs (upper-case macro names, identifier checks) and the literal
//! formats each output language expects.

/// Converts a name to an upper-case macro-style identifier.
///
/// Punctuation and whitespace become single underscores and trailing
/// underscores are dropped.
///
/// # Examples
/// ```
/// use csrgen_generator::util::macro_case;
/// assert_eq!(macro_case("foo.ctrl"), "FOO_CTRL");
/// assert_eq!(macro_case("rx-fifo level"), "RX_FIFO_LEVEL");
/// ```
pub fn macro_case(name: &str) -> String {
    let mut result = String::new();
    let mut prev = None;
    for c in name.chars() {
        if c.is_ascii_whitespace() || c.is_ascii_punctuation() {
            if prev != Some('_') && !result.is_empty() {
                result.push('_');
            }
            prev = Some('_');
            continue;
        }
        prev = Some(c);
        result.push(c.to_ascii_uppercase());
    }
    result.trim_end_matches('_').to_string()
}

/// Returns true if `name` is a plain identifier in SystemVerilog, Verilog and C:
/// a letter or underscore followed by letters, digits or underscores.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns true if `name` is reserved in SystemVerilog/Verilog.
///
/// HDL keywords are case-sensitive and all lower case, so `INPUT` is usable
/// while `input` is not.
pub fn is_hdl_keyword(name: &str) -> bool {
    HDL_KEYWORDS.binary_search(&name).is_ok()
}

/// Sorted SystemVerilog keyword list (a superset of Verilog-2005).
const HDL_KEYWORDS: &[&str] = &[
    "alias", "always", "always_comb", "always_ff", "always_latch", "and", "assert", "assign",
    "assume", "automatic", "before", "begin", "bind", "bins", "binsof", "bit", "break", "buf",
    "bufif0", "bufif1", "byte", "case", "casex", "casez", "cell", "chandle", "class", "clocking",
    "cmos", "config", "const", "constraint", "context", "continue", "cover", "covergroup",
    "coverpoint", "cross", "deassign", "default", "defparam", "design", "disable", "dist", "do",
    "edge", "else", "end", "endcase", "endclass", "endclocking", "endconfig", "endfunction",
    "endgenerate", "endgroup", "endinterface", "endmodule", "endpackage", "endprimitive",
    "endprogram", "endproperty", "endsequence", "endspecify", "endtable", "endtask", "enum",
    "event", "expect", "export", "extends", "extern", "final", "first_match", "for", "force",
    "foreach", "forever", "fork", "forkjoin", "function", "generate", "genvar", "highz0",
    "highz1", "if", "iff", "ifnone", "ignore_bins", "illegal_bins", "import", "incdir", "include",
    "initial", "inout", "input", "inside", "instance", "int", "integer", "interface",
    "intersect", "join", "join_any", "join_none", "large", "liblist", "library", "local",
    "localparam", "logic", "longint", "macromodule", "matches", "medium", "modport", "module",
    "nand", "negedge", "new", "nmos", "nor", "noshowcancelled", "not", "notif0", "notif1", "null",
    "or", "output", "package", "packed", "parameter", "pmos", "posedge", "primitive", "priority",
    "program", "property", "protected", "pull0", "pull1", "pulldown", "pullup",
    "pulsestyle_ondetect", "pulsestyle_onevent", "pure", "rand", "randc", "randcase",
    "randsequence", "rcmos", "real", "realtime", "ref", "reg", "release", "repeat", "return",
    "rnmos", "rpmos", "rtran", "rtranif0", "rtranif1", "scalared", "sequence", "shortint",
    "shortreal", "showcancelled", "signed", "small", "solve", "specify", "specparam", "static",
    "string", "strong0", "strong1", "struct", "super", "supply0", "supply1", "table", "tagged",
    "task", "this", "throughout", "time", "timeprecision", "timeunit", "tran", "tranif0",
    "tranif1", "tri", "tri0", "tri1", "triand", "trior", "trireg", "type", "typedef", "union",
    "unique", "unsigned", "use", "uwire", "var", "vectored", "virtual", "void", "wait",
    "wait_order", "wand", "weak0", "weak1", "while", "wildcard", "wire", "with", "within", "wor",
    "xnor", "xor",
];

/// Groups hex digits in fours with underscores, most significant first.
fn grouped_hex(val: u64, min_digits: usize) -> String {
    let digits = format!("{val:0min_digits$x}");
    let mut x = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i % 4 == 0 && i != 0 {
            x.push('_');
        }
        x.push(c);
    }
    x.chars().rev().collect()
}

/// Formats a sized HDL hex literal, zero-padded to the full width.
///
/// # Examples
/// ```
/// use csrgen_generator::util::hdl_hex;
/// assert_eq!(hdl_hex(32, 0x104), "32'h0000_0104");
/// assert_eq!(hdl_hex(3, 5), "3'h5");
/// ```
pub fn hdl_hex(width: u64, val: u64) -> String {
    let digits = ((width + 3) / 4).max(1) as usize;
    format!("{width}'h{}", grouped_hex(val, digits))
}

/// Formats an unsigned C hex constant.
///
/// # Examples
/// ```
/// use csrgen_generator::util::c_hex;
/// assert_eq!(c_hex(0), "0x0U");
/// assert_eq!(c_hex(0xff00), "0xFF00U");
/// ```
pub fn c_hex(val: u64) -> String {
    if val > u64::from(u32::MAX) {
        format!("0x{val:X}ULL")
    } else {
        format!("0x{val:X}U")
    }
}

/// Number of bits needed to index `n` distinct values (at least 1).
pub fn clog2(n: u64) -> u32 {
    if n <= 2 {
        1
    } else {
        64 - (n - 1).leading_zeros()
    }
}
