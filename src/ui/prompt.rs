//! Line-oriented operator I/O.
//!
//! Workflows talk to the operator only through [`Prompt`], so they can be
//! driven from a terminal or from a script of answers.

use crate::error::{PqPkiError, Result};
use std::io::{self, BufRead, Write};

/// Minimal question/answer interface.
pub trait Prompt {
    /// Print one line.
    fn say(&mut self, line: &str) -> Result<()>;

    /// Print `question` and read one answer line, without its line ending.
    ///
    /// Closed input is reported as a `Storage` error of kind
    /// `UnexpectedEof`; see [`is_end_of_input`].
    fn ask(&mut self, question: &str) -> Result<String>;
}

/// Whether `err` means the operator's input stream ended.
pub fn is_end_of_input(err: &PqPkiError) -> bool {
    matches!(err, PqPkiError::Storage(e) if e.kind() == io::ErrorKind::UnexpectedEof)
}

/// [`Prompt`] over any reader and writer.
pub struct TextPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TextPrompt<R, W> {
    /// Wrap an input and an output stream.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the output stream (for inspecting what was printed).
    pub fn into_output(self) -> W {
        self.output
    }
}

impl TextPrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt for TextPrompt<R, W> {
    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(PqPkiError::Storage(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            )));
        }

        let trimmed = answer.trim_end_matches(['\n', '\r']).len();
        answer.truncate(trimmed);
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_ask_reads_line() {
        let mut prompt = TextPrompt::new(Cursor::new("hello world\r\nnext\n"), Vec::new());

        assert_eq!(prompt.ask("Q1: ").unwrap(), "hello world");
        assert_eq!(prompt.ask("Q2: ").unwrap(), "next");

        let output = String::from_utf8(prompt.into_output()).unwrap();
        assert_eq!(output, "Q1: Q2: ");
    }

    #[test]
    fn test_ask_at_end_of_input() {
        let mut prompt = TextPrompt::new(Cursor::new(""), Vec::new());

        let err = prompt.ask("Q: ").unwrap_err();
        assert!(is_end_of_input(&err));
    }

    #[test]
    fn test_empty_line_is_not_end_of_input() {
        let mut prompt = TextPrompt::new(Cursor::new("\n"), Vec::new());
        assert_eq!(prompt.ask("Q: ").unwrap(), "");
    }

    #[test]
    fn test_say_writes_line() {
        let mut prompt = TextPrompt::new(Cursor::new(""), Vec::new());
        prompt.say("one").unwrap();
        prompt.say("two").unwrap();

        assert_eq!(prompt.into_output(), b"one\ntwo\n");
    }
}
