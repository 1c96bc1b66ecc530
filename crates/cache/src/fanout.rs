//! Fan-out writer duplicating one byte stream into several sinks

use std::io::{self, Write};

struct Sink<'a> {
    writer: &'a mut dyn Write,
    /// Flushed after every chunk so the terminal sees output as it arrives
    live: bool,
}

/// Writes every chunk to each sink in order.
///
/// Each chunk is written completely to one sink before the next sink sees it,
/// so all sinks receive the same bytes in the same order. The first write
/// error stops the chunk and is returned as is.
#[derive(Default)]
pub struct FanOut<'a> {
    sinks: Vec<Sink<'a>>,
}

impl<'a> FanOut<'a> {
    /// An empty fan-out; writes succeed and go nowhere
    #[must_use]
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a sink that is flushed after each chunk
    #[must_use]
    pub fn live(mut self, writer: &'a mut dyn Write) -> Self {
        self.sinks.push(Sink { writer, live: true });
        self
    }

    /// Add a sink that is only flushed on [`Write::flush`]
    #[must_use]
    pub fn buffered(mut self, writer: &'a mut dyn Write) -> Self {
        self.sinks.push(Sink {
            writer,
            live: false,
        });
        self
    }
}

impl Write for FanOut<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for sink in &mut self.sinks {
            sink.writer.write_all(buf)?;
            if sink.live {
                sink.writer.flush()?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in &mut self.sinks {
            sink.writer.flush()?;
        }
        Ok(())
    }
}
