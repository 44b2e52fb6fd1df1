use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

const PROMPT: &str = "-> Press Enter to continue...";

/// Pause between walkthrough steps
#[derive(Debug, Clone, Copy)]
pub struct Pause {
    enabled: bool,
}

impl Pause {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Wait for Enter on stdin; does nothing when pauses are disabled
    pub fn wait(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let stdin = io::stdin();
        let stdout = io::stdout();
        wait_for_enter(&mut stdin.lock(), &mut stdout.lock()).context("Failed to read from stdin")
    }
}

/// Print the prompt, consume one line, then print a blank line. EOF counts as Enter.
pub fn wait_for_enter<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> io::Result<()> {
    write!(writer, "{}", PROMPT)?;
    writer.flush()?;

    // Any bytes count as input, valid UTF-8 or not
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line)?;

    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_wait_consumes_one_line() {
        let mut input = Cursor::new("\nsecond\n");
        let mut output = Vec::new();

        wait_for_enter(&mut input, &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), format!("{}\n", PROMPT));
        let mut rest = String::new();
        input.read_line(&mut rest).unwrap();
        assert_eq!(rest, "second\n");
    }

    #[test]
    fn test_eof_continues() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert!(wait_for_enter(&mut input, &mut output).is_ok());
    }

    #[test]
    fn test_non_utf8_input_continues() {
        let mut input = Cursor::new(vec![0xff, 0xfe, b'\n', b'x', b'\n']);
        let mut output = Vec::new();

        wait_for_enter(&mut input, &mut output).unwrap();

        let mut rest = String::new();
        input.read_line(&mut rest).unwrap();
        assert_eq!(rest, "x\n");
    }

    #[test]
    fn test_disabled_pause_returns_immediately() {
        let pause = Pause::new(false);
        assert!(pause.wait().is_ok());
    }
}
