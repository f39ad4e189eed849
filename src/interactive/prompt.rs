//
//  circleci-cli
//  interactive/prompt.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Interactive Prompts Module
//!
//! Thin wrappers over `dialoguer` for the few places the CLI asks the user
//! something: confirming destructive actions and entering secret values.
//!
//! # Example
//!
//! ```no_run
//! use circleci_cli::interactive::prompt::{prompt_confirm_with_default, prompt_password};
//!
//! let value = prompt_password("Secret value").unwrap();
//! if prompt_confirm_with_default("Store it?", false).unwrap() {
//!     println!("stored {} characters", value.len());
//! }
//! ```

use std::io::{BufRead, IsTerminal};

use anyhow::{bail, Context, Result};
use dialoguer::{Confirm, Password};

/// Whether both stdin and stderr are attached to a terminal, so prompts can
/// be shown and answered.
pub fn can_prompt() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// Prompts for masked input. Empty input is accepted.
pub fn prompt_password(message: &str) -> Result<String> {
    let password = Password::new()
        .with_prompt(message)
        .allow_empty_password(true)
        .interact()?;
    Ok(password)
}

/// Prompts for a yes/no answer; Enter picks `default`.
pub fn prompt_confirm_with_default(message: &str, default: bool) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact()?;
    Ok(confirmed)
}

/// Reads the first line of `reader`, without its line terminator.
///
/// Used for secrets piped into the CLI, e.g.
/// `echo $TOKEN | circleci context secret store deploy AWS_KEY`.
pub fn read_secret_line(mut reader: impl BufRead) -> Result<String> {
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .context("Failed to read secret value from stdin")?;
    if read == 0 {
        bail!("No secret value provided on stdin");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_secret_line() {
        let value = read_secret_line("s3cr3t\nignored\n".as_bytes()).unwrap();
        assert_eq!(value, "s3cr3t");

        let value = read_secret_line("windows\r\n".as_bytes()).unwrap();
        assert_eq!(value, "windows");
    }

    #[test]
    fn test_read_secret_line_keeps_inner_whitespace() {
        let value = read_secret_line("  spaced out  \n".as_bytes()).unwrap();
        assert_eq!(value, "  spaced out  ");
    }

    #[test]
    fn test_read_secret_line_requires_input() {
        assert!(read_secret_line("".as_bytes()).is_err());
    }
}
