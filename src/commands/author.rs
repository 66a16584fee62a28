//! `goodreader author <keyword>`: placeholder.

use std::io::{self, Write};

/// Prints the author query.
pub fn search_author(keyword: &str, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Searching for author: {keyword}")
}

/// CLI entry point.
pub fn execute(keyword: &str) -> io::Result<()> {
    search_author(keyword, &mut io::stdout().lock())
}
