//! Interactive menu loop.
//!
//! Reads choices line by line, so any `BufRead` works as input. End of input
//! exits the loop like choosing "Exit".

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use bulkcrypt_core::crypto::{Algorithm, Mode};
use bulkcrypt_core::stream::{run_job, EngineConfig, Job};

use crate::report::{print_summary, CliObserver};

pub struct Menu<R: BufRead, W: Write> {
    input: R,
    out: W,
    config: EngineConfig,
    json: bool,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, out: W, config: EngineConfig, json: bool) -> Self {
        Self { input, out, config, json }
    }

    /// Run until the user exits or input ends. Job errors are printed and the
    /// loop goes back to the top-level menu.
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.out)?;
            writeln!(self.out, "1. Encrypt")?;
            writeln!(self.out, "2. Decrypt")?;
            writeln!(self.out, "3. Exit")?;

            let mode = match self.prompt_number("Choose an option", 3)? {
                Some(1) => Mode::Encrypt,
                Some(2) => Mode::Decrypt,
                _ => return Ok(()),
            };

            let Some(path) = self.prompt_line("Path to a file or directory")? else {
                return Ok(());
            };

            for alg in Algorithm::ALL {
                writeln!(self.out, "{}. {} ({}-byte key)", alg.menu_number(), alg, alg.key_size())?;
            }
            let Some(n) = self.prompt_number("Choose an algorithm", Algorithm::ALL.len())? else {
                return Ok(());
            };
            let algorithm = Algorithm::from_menu_number(n as u8).context("algorithm menu out of sync")?;

            let Some(key) = self.prompt_key(algorithm)? else {
                return Ok(());
            };

            if let Err(e) = self.run_one(mode, algorithm, &key, PathBuf::from(path)) {
                writeln!(self.out, "Error: {e:#}")?;
            }
        }
    }

    fn run_one(&mut self, mode: Mode, algorithm: Algorithm, key: &[u8], root: PathBuf) -> Result<()> {
        let job = Job::from_root(mode, algorithm, key, &root)
            .with_context(|| format!("cannot prepare job for {}", root.display()))?;
        let report = run_job(&job, &self.config, &mut CliObserver::new(&mut self.out))?;
        print_summary(&mut self.out, &report, self.json)?;
        Ok(())
    }

    /// Re-prompt until the typed key has exactly the algorithm's key size.
    fn prompt_key(&mut self, algorithm: Algorithm) -> Result<Option<Vec<u8>>> {
        let expected = algorithm.key_size();
        loop {
            let Some(key) = self.prompt_line(&format!("Key ({expected} characters)"))? else {
                return Ok(None);
            };
            if key.len() == expected {
                return Ok(Some(key.into_bytes()));
            }
            writeln!(self.out, "Key must be exactly {expected} bytes, got {}", key.len())?;
        }
    }

    /// Re-prompt until a number in `1..=max` is entered.
    fn prompt_number(&mut self, label: &str, max: usize) -> Result<Option<usize>> {
        loop {
            let Some(line) = self.prompt_line(label)? else {
                return Ok(None);
            };
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=max).contains(&n) => return Ok(Some(n)),
                _ => writeln!(self.out, "Invalid choice, enter a number between 1 and {max}")?,
            }
        }
    }

    /// One line without its terminator; `None` at end of input.
    fn prompt_line(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{label}: ")?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        Ok(Some(trimmed.to_string()))
    }
}
