//! tally console entry point.
//!
//! Reads one line per iteration, dispatches it through the console, and
//! renders the result. The loop ends when the stop command's sentinel comes
//! back or stdin reaches EOF; errors render and the loop continues.

mod render;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use tally_console::{CommandOutput, Console, register_math_commands};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut console = Console::new("tally");
    register_math_commands(&mut console);
    log::info!("tally console ready");

    run(&console, &mut io::stdin().lock(), &mut io::stdout())?;
    Ok(())
}

/// Dispatch loop: prompt, read, dispatch, render, repeat until `Stop` or EOF.
fn run(console: &Console, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<()> {
    loop {
        write!(output, "\n{}: ", console.name())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break; // EOF behaves like stop.
        }

        match console.dispatch(line.trim()) {
            Ok(CommandOutput::Stop) => break,
            Ok(result) => render::render(output, &result)?,
            Err(e) => writeln!(output, "error: {e}")?,
        }
    }
    Ok(())
}
