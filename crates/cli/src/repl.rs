//! `jlcheck repl` -- the interactive read/validate loop.
//!
//! Reads fragments from stdin with the configured prompts and prints one
//! verdict per fragment. With `--quiet` only rejected fragments are
//! reported. End of input (Ctrl-D) ends the session.

use std::io;

use jlcheck_core::validate;

use crate::config::ReplSettings;
use crate::fragments::FragmentReader;
use crate::{print_verdict, OutputFormat};

pub fn run_repl(settings: &ReplSettings, output: OutputFormat, quiet: bool) {
    let stdin = io::stdin();
    let mut reader = FragmentReader::new(stdin.lock(), io::stdout(), Some(settings.prompts()));

    loop {
        match reader.next_fragment() {
            Ok(Some(fragment)) => {
                let verdict = validate(&fragment.text);
                if !(quiet && verdict.valid) {
                    print_verdict(&fragment, &verdict, output, None);
                }
            }
            Ok(None) => {
                // EOF (Ctrl-D)
                println!();
                break;
            }
            Err(e) => {
                eprintln!("error reading input: {}", e);
                break;
            }
        }
    }
}
