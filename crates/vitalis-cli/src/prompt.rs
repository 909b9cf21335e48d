//! Line-oriented terminal input.

use anyhow::{bail, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `label` and read one line without its terminator.
    pub async fn ask(&mut self, label: &str) -> Result<String> {
        print!("{label}: ");
        std::io::stdout().flush()?;
        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim_end_matches('\r').to_string()),
            None => bail!("input closed"),
        }
    }

    /// Ask a yes/no question; anything but "y" or "yes" is no.
    pub async fn confirm(&mut self, label: &str) -> Result<bool> {
        let answer = self.ask(&format!("{label} [y/N]")).await?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}
