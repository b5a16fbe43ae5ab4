use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exit status after SIGINT / SIGTERM
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Set while a confirmation prompt is waiting for input.
static CONFIRMATION_PROMPT_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Marks the confirmation prompt as active while in scope.
pub struct ConfirmationPromptGuard;

impl ConfirmationPromptGuard {
    pub fn activate() -> Self {
        CONFIRMATION_PROMPT_ACTIVE.store(true, Ordering::SeqCst);
        Self
    }
}

impl Drop for ConfirmationPromptGuard {
    fn drop(&mut self) {
        CONFIRMATION_PROMPT_ACTIVE.store(false, Ordering::SeqCst);
    }
}

pub fn confirmation_prompt_active() -> bool {
    CONFIRMATION_PROMPT_ACTIVE.load(Ordering::SeqCst)
}

/// Install SIGINT and SIGTERM handlers.
///
/// While a confirmation prompt is up the process exits at once, since nothing
/// has been touched yet. Otherwise the signal is only recorded in the
/// returned flag so a running execution is never cut off halfway.
pub fn install_handlers() -> Result<Arc<AtomicBool>> {
    let interrupted = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        if confirmation_prompt_active() {
            eprintln!("\nCancelled.");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        eprintln!("\nReceived SIGINT. Finishing current step...");
        flag.store(true, Ordering::SeqCst);
    })
    .context("Error setting SIGINT handler")?;

    let flag = Arc::clone(&interrupted);
    // SAFETY: the handler only touches atomics and calls the async-signal-safe `_exit`
    unsafe {
        signal_hook::low_level::register(signal_hook::consts::SIGTERM, move || {
            if confirmation_prompt_active() {
                signal_hook::low_level::exit(INTERRUPTED_EXIT_CODE);
            }
            flag.store(true, Ordering::SeqCst);
        })
        .context("Error setting SIGTERM handler")?;
    }

    Ok(interrupted)
}

/// Ask a yes/no question on stderr; anything but `y`/`yes` is a no.
pub fn confirm(question: &str) -> Result<bool> {
    confirm_with_input(question, &mut io::stdin().lock(), &mut io::stderr())
}

pub fn confirm_with_input<R: BufRead, W: Write>(
    question: &str,
    reader: &mut R,
    writer: &mut W,
) -> Result<bool> {
    let _guard = ConfirmationPromptGuard::activate();

    write!(writer, "{question} [y/N]: ")?;
    writer.flush()?;

    let mut response = String::new();
    reader.read_line(&mut response)?;
    let response = response.trim().to_lowercase();

    Ok(response == "y" || response == "yes")
}
