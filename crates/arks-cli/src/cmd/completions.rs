//! `arks completions`

use clap::CommandFactory;
use clap_complete::Shell;

use crate::Cli;

/// Print completions for `shell` to stdout.
pub fn completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "arks", &mut std::io::stdout());
}
