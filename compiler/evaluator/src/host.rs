use std::io::{self, BufRead, Write};

/// The environment the builtins `print` and `input` interact with.
pub trait Host {
    /// Output a line of text.
    fn print(&mut self, text: &str) -> io::Result<()>;

    /// Read a line of text without its line terminator.
    fn input(&mut self) -> io::Result<String>;
}

/// The host connected to the standard output and input streams of the process.
#[derive(Default)]
pub struct Console;

impl Host for Console {
    fn print(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{text}")?;
        stdout.flush()
    }

    fn input(&mut self) -> io::Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;

        let length = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(length);
        Ok(line)
    }
}
