//! Confirmation for irreversible commands.

use std::io::{BufRead, IsTerminal, Write};

/// Ask before doing `action`. `--yes` skips the question; without a terminal
/// to ask on, the command is refused.
pub fn confirm(action: &str, assume_yes: bool) -> anyhow::Result<()> {
    if assume_yes {
        return Ok(());
    }

    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        anyhow::bail!("Refusing to {action} without confirmation, pass --yes");
    }

    eprint!("{action}? This cannot be undone [y/N] ");
    std::io::stderr().flush()?;
    answer(&mut stdin.lock(), action)
}

fn answer(input: &mut impl BufRead, action: &str) -> anyhow::Result<()> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok(()),
        _ => anyhow::bail!("Aborted, did not {action}"),
    }
}
