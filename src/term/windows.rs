//! Windows raw-mode backend.
//!
//! No Windows console-binding crate appears anywhere in this crate's
//! reference lineage, so this talks to `kernel32.dll` directly through a
//! minimal hand-written `extern "system"` surface rather than pull in a
//! dependency nothing else here uses. Only the handful of calls this
//! backend actually needs are declared.

use std::io;
use std::os::raw::{c_int, c_void};

use crate::error::Result;
use crate::term::RawTerminal;

type Handle = *mut c_void;
type Bool = c_int;

const STD_INPUT_HANDLE: u32 = 0xFFFF_FFF6; // (DWORD)-10
const STD_OUTPUT_HANDLE: u32 = 0xFFFF_FFF5; // (DWORD)-11
const ENABLE_ECHO_INPUT: u32 = 0x0004;
const ENABLE_LINE_INPUT: u32 = 0x0002;
const ENABLE_PROCESSED_INPUT: u32 = 0x0001;

#[repr(C)]
struct Coord {
    x: i16,
    y: i16,
}

#[repr(C)]
struct SmallRect {
    left: i16,
    top: i16,
    right: i16,
    bottom: i16,
}

#[repr(C)]
struct ConsoleScreenBufferInfo {
    size: Coord,
    cursor_position: Coord,
    attributes: u16,
    window: SmallRect,
    maximum_window_size: Coord,
}

extern "system" {
    fn GetStdHandle(nStdHandle: u32) -> Handle;
    fn GetConsoleMode(hConsoleHandle: Handle, lpMode: *mut u32) -> Bool;
    fn SetConsoleMode(hConsoleHandle: Handle, dwMode: u32) -> Bool;
    fn ReadConsoleA(
        hConsoleInput: Handle,
        lpBuffer: *mut u8,
        nNumberOfCharsToRead: u32,
        lpNumberOfCharsRead: *mut u32,
        pInputControl: *mut c_void,
    ) -> Bool;
    fn WriteConsoleA(
        hConsoleOutput: Handle,
        lpBuffer: *const u8,
        nNumberOfCharsToWrite: u32,
        lpNumberOfCharsWritten: *mut u32,
        lpReserved: *mut c_void,
    ) -> Bool;
    fn GetConsoleScreenBufferInfo(
        hConsoleOutput: Handle,
        lpConsoleScreenBufferInfo: *mut ConsoleScreenBufferInfo,
    ) -> Bool;
}

pub struct WindowsTerminal {
    stdin: Handle,
    stdout: Handle,
    orig_mode: u32,
}

impl WindowsTerminal {
    pub fn new() -> Result<Self> {
        // SAFETY: `GetStdHandle` with a documented standard-device constant
        // never fails in a way that invalidates the returned handle for the
        // lifetime of the process.
        let stdin = unsafe { GetStdHandle(STD_INPUT_HANDLE) };
        let stdout = unsafe { GetStdHandle(STD_OUTPUT_HANDLE) };

        let mut orig_mode = 0u32;
        // SAFETY: `stdin` is a valid console handle and `orig_mode` is a
        // plain `u32` the call writes into.
        if unsafe { GetConsoleMode(stdin, &mut orig_mode) } == 0 {
            return Err(io::Error::last_os_error().into());
        }

        let raw_mode = orig_mode & !(ENABLE_ECHO_INPUT | ENABLE_LINE_INPUT | ENABLE_PROCESSED_INPUT);
        // SAFETY: `stdin` is the same handle just queried above.
        if unsafe { SetConsoleMode(stdin, raw_mode) } == 0 {
            return Err(io::Error::last_os_error().into());
        }

        Ok(WindowsTerminal {
            stdin,
            stdout,
            orig_mode,
        })
    }
}

impl RawTerminal for WindowsTerminal {
    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        let mut read = 0u32;
        // SAFETY: `self.stdin` is a valid handle for the process lifetime;
        // the buffer and length pointers are valid stack locations.
        let ok = unsafe {
            ReadConsoleA(
                self.stdin,
                byte.as_mut_ptr(),
                1,
                &mut read,
                std::ptr::null_mut(),
            )
        };
        if ok == 0 || read == 0 {
            return Err(io::Error::last_os_error().into());
        }
        Ok(byte[0])
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut written = 0u32;
        // SAFETY: `bytes` outlives the call, and `self.stdout` is valid.
        let ok = unsafe {
            WriteConsoleA(
                self.stdout,
                bytes.as_ptr(),
                bytes.len() as u32,
                &mut written,
                std::ptr::null_mut(),
            )
        };
        if ok == 0 {
            return Err(io::Error::last_os_error().into());
        }
        Ok(())
    }

    fn columns(&self) -> Option<usize> {
        let mut info = ConsoleScreenBufferInfo {
            size: Coord { x: 0, y: 0 },
            cursor_position: Coord { x: 0, y: 0 },
            attributes: 0,
            window: SmallRect {
                left: 0,
                top: 0,
                right: 0,
                bottom: 0,
            },
            maximum_window_size: Coord { x: 0, y: 0 },
        };
        // SAFETY: `info` is sized and laid out to match the Win32 struct
        // this call expects, and `self.stdout` is a valid handle.
        let ok = unsafe { GetConsoleScreenBufferInfo(self.stdout, &mut info) };
        if ok == 0 {
            return None;
        }
        let cols = info.window.right - info.window.left + 1;
        if cols > 0 {
            Some(cols as usize)
        } else {
            None
        }
    }
}

impl Drop for WindowsTerminal {
    fn drop(&mut self) {
        // SAFETY: `self.stdin` was obtained from `GetStdHandle` in `new`
        // and is still valid.
        unsafe {
            SetConsoleMode(self.stdin, self.orig_mode);
        }
    }
}
