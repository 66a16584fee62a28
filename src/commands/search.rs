//! `goodreader search <keyword>`: placeholder that prints canned results.

use std::io::{self, Write};

/// Prints the query followed by placeholder results.
pub fn search(keyword: &str, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Searching for: {keyword}")?;
    for result in ["Result 1", "Result 2", "Result 3"] {
        writeln!(out, "{result}")?;
    }
    Ok(())
}

/// CLI entry point.
pub fn execute(keyword: &str) -> io::Result<()> {
    search(keyword, &mut io::stdout().lock())
}
