//! Line accumulation: turns an input stream into validation fragments.
//!
//! A line whose last non-blank character is `:` opens a block. Following
//! lines are appended, each newline-terminated, until a blank line closes
//! the block. Any other line is a fragment on its own. Blank lines between
//! fragments are skipped.

use std::io::{self, BufRead, Write};

/// One unit of validation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    /// 1-based input line the fragment starts on.
    pub line: usize,
}

/// Prompt strings written before each read when running interactively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    pub primary: String,
    pub continuation: String,
}

pub struct FragmentReader<R, W> {
    input: R,
    prompt_out: W,
    prompts: Option<Prompts>,
    line_no: usize,
}

impl<R: BufRead> FragmentReader<R, io::Sink> {
    /// Reader without prompts, for files and pipes.
    pub fn quiet(input: R) -> Self {
        FragmentReader::new(input, io::sink(), None)
    }
}

impl<R: BufRead, W: Write> FragmentReader<R, W> {
    pub fn new(input: R, prompt_out: W, prompts: Option<Prompts>) -> Self {
        FragmentReader {
            input,
            prompt_out,
            prompts,
            line_no: 0,
        }
    }

    fn prompt(&mut self, continuation: bool) -> io::Result<()> {
        if let Some(prompts) = &self.prompts {
            let text = if continuation {
                &prompts.continuation
            } else {
                &prompts.primary
            };
            self.prompt_out.write_all(text.as_bytes())?;
            self.prompt_out.flush()?;
        }
        Ok(())
    }

    /// Next input line without its terminator; `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    /// Read the next fragment. A block still open at end of input is
    /// returned as it stands.
    pub fn next_fragment(&mut self) -> io::Result<Option<Fragment>> {
        let first = loop {
            self.prompt(false)?;
            match self.read_line()? {
                None => return Ok(None),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line,
            }
        };
        let start = self.line_no;

        if !first.trim_end().ends_with(':') {
            return Ok(Some(Fragment {
                text: first,
                line: start,
            }));
        }

        let mut text = first;
        text.push('\n');
        loop {
            self.prompt(true)?;
            match self.read_line()? {
                Some(line) if !line.trim().is_empty() => {
                    text.push_str(&line);
                    text.push('\n');
                }
                _ => break,
            }
        }
        Ok(Some(Fragment { text, line: start }))
    }
}

impl<R: BufRead, W: Write> Iterator for FragmentReader<R, W> {
    type Item = io::Result<Fragment>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_fragment().transpose()
    }
}
