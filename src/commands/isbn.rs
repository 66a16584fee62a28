//! `goodreader isbn <isbn-id>`: placeholder.

use std::io::{self, Write};

/// Prints the requested ISBN.
pub fn book_info_by_isbn(isbn_id: &str, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Fetching information for ISBN: {isbn_id}")
}

/// CLI entry point.
pub fn execute(isbn_id: &str) -> io::Result<()> {
    book_info_by_isbn(isbn_id, &mut io::stdout().lock())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isbn_echoes_id() {
        let mut out = Vec::new();
        book_info_by_isbn("9780441172719", &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Fetching information for ISBN: 9780441172719\n"
        );
    }
}
