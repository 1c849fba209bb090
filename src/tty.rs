//! Console side of an interactive run: terminal detection and reading answers.

use std::io::{self, BufRead, IsTerminal, Write};

use monthshift::{Error, Result};

/// Prompts make sense only when a person is on both ends.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Ask on stderr (stdout carries the JSON envelope) and read one answer line.
pub fn prompt(message: &str) -> Result<String> {
    let stdin = io::stdin();
    let stderr = io::stderr();
    ask(&mut stdin.lock(), &mut stderr.lock(), message)
}

fn ask(input: &mut impl BufRead, out: &mut impl Write, message: &str) -> Result<String> {
    write!(out, "{}", message)
        .and_then(|_| out.flush())
        .map_err(|e| Error::internal_io(e.to_string(), Some("write prompt".to_string())))?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| Error::internal_io(e.to_string(), Some("read stdin".to_string())))?;
    if read == 0 {
        return Err(Error::internal_io(
            "input closed before an answer was given",
            Some("read stdin".to_string()),
        )
        .with_hint("Pass --from-month and --to-month to run without prompts"));
    }

    Ok(line.trim().to_string())
}

/// Print status message to stderr if running in a terminal.
pub fn status(message: &str) {
    if io::stderr().is_terminal() {
        eprintln!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn ask_writes_message_and_trims_answer() {
        let mut input = Cursor::new("  12 \n3\n");
        let mut out = Vec::new();

        let answer = ask(&mut input, &mut out, "New month (1-12): ").unwrap();

        assert_eq!(answer, "12");
        assert_eq!(String::from_utf8(out).unwrap(), "New month (1-12): ");
    }

    #[test]
    fn closed_input_is_an_error_with_flag_hint() {
        let mut input = Cursor::new("");
        let mut out = Vec::new();

        let err = ask(&mut input, &mut out, "Month to replace (1-12): ").unwrap_err();

        assert_eq!(err.code.as_str(), "internal.io_error");
        assert!(err.hints[0].message.contains("--from-month"));
    }
}
