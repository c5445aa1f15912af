//! Input helpers for interactive commands.

use std::io::BufRead;

/// Reads one trimmed line. `None` on EOF or a read error.
///
/// ```rust
/// # use kuhn_cli::io_utils::read_stdin_line;
/// let mut input = std::io::Cursor::new("bet\n");
/// assert_eq!(read_stdin_line(&mut input), Some("bet".to_string()));
/// assert_eq!(read_stdin_line(&mut input), None);
/// ```
pub fn read_stdin_line(stdin: &mut dyn BufRead) -> Option<String> {
    let mut line = String::new();
    match stdin.read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(strip_utf8_bom(line.trim()).to_string()),
        Err(_) => None,
    }
}

fn strip_utf8_bom(s: &str) -> &str {
    s.strip_prefix('\u{feff}').unwrap_or(s)
}
