//! Canonical pretty-printing for sluice configuration files.
//!
//! The printer walks the AST emitting tokens and whitespace instructions
//! into a buffer, then runs an internal column-aligning tab writer over the
//! result: runs of attributes on consecutive lines align on `=`, blocks
//! indent with tabs, and comments are reattached where the source had them.
//! Output is deterministic for a given AST.

mod printer;
mod tabwriter;
mod walker;

use std::io;

use sluice_ast::File;

use crate::printer::Printer;
use crate::tabwriter::TabWriter;

/// Pretty-prints `file` to `w`.
pub fn fprint(w: &mut dyn io::Write, file: &File) -> io::Result<()> {
    let mut printer = Printer::new(&file.source, &file.comments);
    walker::walk_file(&mut printer, file);
    printer.finish();

    let mut tw = TabWriter::new();
    tw.write(&printer.output);
    w.write_all(&tw.finish())
}

/// Pretty-prints `file` to a string.
pub fn format(file: &File) -> String {
    let mut out = Vec::new();
    fprint(&mut out, file).expect("writing to a Vec cannot fail");
    String::from_utf8(out).expect("printer output is valid UTF-8")
}
