use anyhow::{bail, Result};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::interrupt::ConfirmationPromptGuard;

/// Interactive folder selection.
pub trait FolderChooser {
    /// `Ok(None)` when the user cancels.
    fn choose_folder(&mut self, start: &Path) -> Result<Option<PathBuf>>;
}

/// Asks for a folder path on the terminal.
///
/// Relative answers are resolved against the start folder and a leading `~`
/// against the home directory. An empty answer cancels.
pub struct PromptChooser<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> PromptChooser<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl PromptChooser<io::StdinLock<'static>, io::Stderr> {
    pub fn terminal() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> FolderChooser for PromptChooser<R, W> {
    fn choose_folder(&mut self, start: &Path) -> Result<Option<PathBuf>> {
        // Nothing has been touched yet, so an interrupt can exit right away
        let _guard = ConfirmationPromptGuard::activate();

        writeln!(self.writer, "Choose a folder (empty to cancel)")?;
        write!(self.writer, "{}> ", start.display())?;
        self.writer.flush()?;

        let mut answer = String::new();
        self.reader.read_line(&mut answer)?;
        let answer = answer.trim();

        if answer.is_empty() {
            return Ok(None);
        }

        let chosen = resolve_answer(start, answer);
        if !chosen.is_dir() {
            bail!("Not a directory: {}", chosen.display());
        }

        Ok(Some(chosen))
    }
}

fn resolve_answer(start: &Path, answer: &str) -> PathBuf {
    let expanded = match (answer.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with(['/', '\\']) => {
            home.join(rest.trim_start_matches(['/', '\\']))
        },
        _ => PathBuf::from(answer),
    };

    renamer_core::clean_path(&start.join(expanded))
}

/// Starting folder: the given one, else the home directory, else `.`
pub fn start_folder(start: Option<PathBuf>) -> PathBuf {
    start
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}
