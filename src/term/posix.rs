//! POSIX raw-mode backend, built on `termios` the same way the original
//! input handler enabled it: clear `ECHO`/`ICANON`, set `VMIN`/`VTIME` for
//! byte-at-a-time blocking reads, and restore the saved settings on drop.

use std::io::{self, Read, Write};

use libc::STDIN_FILENO;
use termios::{tcsetattr, Termios, ECHO, ICANON, TCSANOW, VMIN, VTIME};

use crate::error::Result;
use crate::term::RawTerminal;

pub struct PosixTerminal {
    orig: Termios,
}

impl PosixTerminal {
    pub fn new() -> Result<Self> {
        let orig = Termios::from_fd(STDIN_FILENO)?;
        let mut raw = orig;
        raw.c_lflag &= !(ECHO | ICANON);
        raw.c_cc[VMIN] = 1;
        raw.c_cc[VTIME] = 0;
        tcsetattr(STDIN_FILENO, TCSANOW, &raw)?;
        Ok(PosixTerminal { orig })
    }

    fn columns_via_ioctl(&self) -> Option<usize> {
        #[repr(C)]
        struct Winsize {
            ws_row: libc::c_ushort,
            ws_col: libc::c_ushort,
            ws_xpixel: libc::c_ushort,
            ws_ypixel: libc::c_ushort,
        }
        let mut ws = Winsize {
            ws_row: 0,
            ws_col: 0,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        // SAFETY: `ws` is a plain-old-data struct sized to match the kernel's
        // `struct winsize`, and `TIOCGWINSZ` only ever writes into it.
        let rc = unsafe { libc::ioctl(STDIN_FILENO, libc::TIOCGWINSZ, &mut ws) };
        if rc == 0 && ws.ws_col > 0 {
            Some(ws.ws_col as usize)
        } else {
            None
        }
    }
}

impl RawTerminal for PosixTerminal {
    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        io::stdin().read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(bytes)?;
        stdout.flush()?;
        Ok(())
    }

    fn columns(&self) -> Option<usize> {
        self.columns_via_ioctl()
    }
}

impl Drop for PosixTerminal {
    fn drop(&mut self) {
        // Best-effort: there's no sensible recovery if restoring the
        // terminal fails on the way out.
        let _ = tcsetattr(STDIN_FILENO, TCSANOW, &self.orig);
    }
}
