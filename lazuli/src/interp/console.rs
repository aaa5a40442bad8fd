//! Host console used by the print and input built-ins
//!
//! Enum dispatch rather than a trait object: the interpreter is single
//! threaded and there are exactly two destinations.

use std::collections::VecDeque;
use std::io::BufRead;

use super::error::{RunResult, RuntimeError};

/// Where built-ins read input lines from and write output lines to.
#[derive(Debug)]
pub enum Console {
    /// Real process stdio.
    Stdio,
    /// Scripted input and captured output, for tests.
    Buffered {
        input: VecDeque<String>,
        output: Vec<String>,
    },
}

impl Console {
    /// Console over process stdio.
    pub fn stdio() -> Self {
        Console::Stdio
    }

    /// Console with scripted input lines and captured output.
    pub fn buffered(input: &[&str]) -> Self {
        Console::Buffered {
            input: input.iter().map(|line| line.to_string()).collect(),
            output: Vec::new(),
        }
    }

    /// Write one output line.
    pub fn write_line(&mut self, line: &str) {
        match self {
            Console::Stdio => println!("{line}"),
            Console::Buffered { output, .. } => output.push(line.to_string()),
        }
    }

    /// Read one input line. Running out of input is an IO error.
    pub fn read_line(&mut self) -> RunResult<String> {
        match self {
            Console::Stdio => std::io::stdin()
                .lock()
                .lines()
                .next()
                .ok_or_else(RuntimeError::end_of_input)?
                .map_err(|e| RuntimeError::io_error(&e.to_string())),
            Console::Buffered { input, .. } => {
                input.pop_front().ok_or_else(RuntimeError::end_of_input)
            }
        }
    }

    /// Captured output lines; always empty for the stdio console.
    pub fn output(&self) -> &[String] {
        match self {
            Console::Stdio => &[],
            Console::Buffered { output, .. } => output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::error::ErrorKind;

    #[test]
    fn test_buffered_captures_lines_in_order() {
        let mut console = Console::buffered(&[]);
        console.write_line("first");
        console.write_line("second");
        assert_eq!(console.output(), ["first", "second"]);
    }

    #[test]
    fn test_buffered_reads_scripted_input_in_order() {
        let mut console = Console::buffered(&["a", "b"]);
        assert_eq!(console.read_line().unwrap(), "a");
        assert_eq!(console.read_line().unwrap(), "b");
    }

    #[test]
    fn test_buffered_read_past_end_is_io_error() {
        let mut console = Console::buffered(&[]);
        let err = console.read_line().unwrap_err();
        assert_eq!(err.kind, ErrorKind::IoError);
        assert_eq!(err.message, "end of input");
    }

    #[test]
    fn test_buffered_output_starts_empty() {
        let console = Console::buffered(&["unused"]);
        assert!(console.output().is_empty());
    }

    #[test]
    fn test_stdio_output_is_empty() {
        let console = Console::stdio();
        assert!(console.output().is_empty());
    }
}
