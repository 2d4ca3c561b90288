//! Byte-granular I/O between the machine and the host streams.
//!
//! The [`Console`] trait is the machine's only seam to the outside world:
//! the `inp` and `out` instructions exchange single bytes through it, and
//! both calls block the whole machine until the host completes them.

use crate::machine::errors::VmError;
use std::io::{self, Read, Write};

/// Blocking byte I/O used by the `inp` and `out` instructions.
pub trait Console {
    /// Reads one byte from the input stream, or `None` at end of input.
    fn input(&mut self) -> Result<Option<u8>, VmError>;
    /// Writes one byte to the output stream.
    fn output(&mut self, byte: u8) -> Result<(), VmError>;
}

/// Console over the process's standard streams.
///
/// Pending output is flushed before input blocks, so prompts written by the
/// running program appear before the read that waits on them.
pub struct StdConsole {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl StdConsole {
    pub fn new() -> StdConsole {
        StdConsole {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn input(&mut self) -> Result<Option<u8>, VmError> {
        self.stdout.flush()?;
        let mut buf = [0u8; 1];
        loop {
            match self.stdin.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn output(&mut self, byte: u8) -> Result<(), VmError> {
        self.stdout.write_all(&[byte])?;
        Ok(())
    }
}

impl Drop for StdConsole {
    fn drop(&mut self) {
        let _ = self.stdout.flush();
    }
}
