// Console layer: status lines on stdout and a spinner on stderr while a
// request is in flight. Colour and spinners are only used on a terminal so
// piped output (CI logs) stays plain text.

use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

pub struct Console {
    out: Box<dyn Write>,
    interactive: bool,
}

impl Console {
    /// Console on the process stdout; colour and spinners when it is a tty.
    pub fn stdout() -> Self {
        let interactive = io::stdout().is_tty();
        Console {
            out: Box::new(io::stdout()),
            interactive,
        }
    }

    /// Plain console writing to any sink, without spinners.
    pub fn plain(out: impl Write + 'static) -> Self {
        Console {
            out: Box::new(out),
            interactive: false,
        }
    }

    pub fn success(&mut self, msg: &str) {
        if self.interactive {
            self.line(&msg.green().to_string());
        } else {
            self.line(msg);
        }
    }

    pub fn failure(&mut self, msg: &str) {
        if self.interactive {
            self.line(&msg.red().to_string());
        } else {
            self.line(msg);
        }
    }

    /// Run `f` with a spinner showing `msg`, cleared when `f` returns.
    pub fn spin<T>(&self, msg: &str, f: impl FnOnce() -> T) -> T {
        if !self.interactive {
            return f();
        }
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(msg.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        let result = f();
        spinner.finish_and_clear();
        result
    }

    fn line(&mut self, msg: &str) {
        // write errors on the console are ignored
        let _ = writeln!(self.out, "{}", msg);
        let _ = self.out.flush();
    }
}
