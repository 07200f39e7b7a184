use std::io::Write;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::Cli;

pub fn run(shell: Shell) -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Cli::command();
    let mut stdout = std::io::stdout();
    clap_complete::generate(shell, &mut cmd, "pomoline", &mut stdout);
    stdout.flush()?;
    Ok(())
}
