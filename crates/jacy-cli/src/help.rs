// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Help text.

use crate::output;

pub fn print_usage() {
    println!(
        "{} {} - Jacy language front end",
        output::title("jacy"),
        output::version(env!("CARGO_PKG_VERSION"))
    );
    println!();
    println!(
        "{}: {} {} {}",
        output::section_header("Usage"),
        output::command("jacy"),
        output::arg("[options]"),
        output::arg("<file>")
    );
    println!();
    println!("{}", output::section_header("Options:"));
    println!(
        "  {}  Dump intermediate state: tokens, ast, sugg, source, names, all",
        output::arg("-print=<list>")
    );
    println!(
        "  {}  Stop after `parser` or `name-resolution` (default)",
        output::arg("-compile-depth=<stage>")
    );
    println!("  {}  Wrap diagnostics at N columns (default 120)", output::arg("-wrap-len=<n>"));
    println!("  {}  Diagnostics as `human` (default) or `json`", output::arg("-format=<fmt>"));
    println!("  {}  Verbose compiler logging", output::arg("--dev"));
    println!("  {}  Show this help", output::arg("--help"));
    println!("  {}  Show version", output::arg("--version"));
    println!();
    println!("{}", output::section_header("Environment:"));
    println!("  {}  Log filter, e.g. `jacy_parser=debug`", output::arg("JACY_LOG"));
    println!("  {}  Disable / force colored output", output::arg("NO_COLOR, FORCE_COLOR"));
}
