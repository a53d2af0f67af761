//! [`SerialLink`] – line-oriented link to the face-turning controller.
//!
//! # Protocol
//!
//! Moves are sent one at a time: the host writes a single move in standard
//! notation followed by `\n`, and the controller that drives that face
//! echoes the same move back on its own line once the turn is complete.
//! The next move is only sent after the echo.  Any other line (status
//! chatter, "Received move: …") is ignored.  The link waits for each echo
//! indefinitely; a closed stream or an I/O error is a failure.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use cubesight_types::{Algorithm, CubeError};
use tracing::{debug, instrument, trace};

use crate::actuator::Actuator;

/// Echo-confirmed controller link over any byte stream.
pub struct SerialLink<T: Read + Write> {
    id: String,
    port: BufReader<T>,
}

impl SerialLink<File> {
    /// Open a tty device (e.g. `/dev/ttyACM0`) for reading and writing.
    /// Line settings such as the baud rate are configured outside the
    /// process.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::Actuation`] if the device cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CubeError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| CubeError::Actuation {
                device: path.display().to_string(),
                details: format!("cannot open serial device: {e}"),
            })?;
        Ok(Self::new(path.display().to_string(), file))
    }
}

impl<T: Read + Write> SerialLink<T> {
    pub fn new(id: impl Into<String>, stream: T) -> Self {
        Self {
            id: id.into(),
            port: BufReader::new(stream),
        }
    }

    /// Consume the link and return the underlying stream.
    pub fn into_inner(self) -> T {
        self.port.into_inner()
    }

    fn fault(&self, details: String) -> CubeError {
        CubeError::Actuation {
            device: self.id.clone(),
            details,
        }
    }

    fn send_line(&mut self, text: &str) -> Result<(), CubeError> {
        let stream = self.port.get_mut();
        stream
            .write_all(text.as_bytes())
            .and_then(|()| stream.write_all(b"\n"))
            .and_then(|()| stream.flush())
            .map_err(|e| self.fault(format!("write failed: {e}")))
    }

    fn await_echo(&mut self, expected: &str) -> Result<(), CubeError> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .port
                .read_line(&mut line)
                .map_err(|e| self.fault(format!("read failed: {e}")))?;
            if read == 0 {
                return Err(self.fault(format!(
                    "link closed before '{expected}' was confirmed"
                )));
            }
            let reply = line.trim();
            if reply == expected {
                return Ok(());
            }
            trace!(device = %self.id, reply, "ignoring controller line");
        }
    }
}

impl<T: Read + Write + Send> Actuator for SerialLink<T> {
    fn id(&self) -> &str {
        &self.id
    }

    #[instrument(skip_all, fields(device = %self.id, algorithm = %algorithm))]
    fn rotate(&mut self, algorithm: &Algorithm) -> Result<(), CubeError> {
        for mv in algorithm.moves() {
            let text = mv.to_string();
            self.send_line(&text)?;
            self.await_echo(&text)?;
            trace!(device = %self.id, %mv, "move confirmed");
        }
        debug!(moves = algorithm.len(), "controller confirmed moves");
        Ok(())
    }
}
