//! Blocking reader over a background parse pipeline.

use crate::cell::HeaderCell;
use crate::config::ReaderConfig;
use crate::error::{ParseError, ReadError};
use crate::header::Header;
use crate::parser::StreamingParser;
use crossbeam_channel::{unbounded, Receiver, Sender};
use plat_arena::Buffer;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long a blocked [`Reader::header`] call waits on the cell before
/// re-checking that the parser thread is still alive.
const HEADER_POLL: Duration = Duration::from_millis(10);

/// Reads a document from any byte source on background threads.
///
/// Construction spawns two threads: a producer that pulls fixed-size
/// chunks from the source and a parser that turns them into entity
/// [`Buffer`]s. The caller consumes buffers one at a time with
/// [`Reader::read`]; an empty buffer marks the end of the document.
///
/// Dropping the reader cancels the pipeline and joins both threads.
pub struct Reader {
    buffers: Receiver<Buffer>,
    header_cell: Arc<HeaderCell>,
    cancel: Arc<AtomicBool>,
    producer: Option<JoinHandle<()>>,
    parser: Option<JoinHandle<Result<(), ParseError>>>,
    finished: bool,
    error: Option<ReadError>,
}

impl Reader {
    /// Start reading from `source` with default configuration.
    pub fn new<R>(source: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Self::with_config(source, ReaderConfig::new())
    }

    /// Start reading from `source` with explicit configuration.
    pub fn with_config<R>(source: R, config: ReaderConfig) -> Self
    where
        R: Read + Send + 'static,
    {
        let (chunk_tx, chunk_rx) = unbounded();
        let (buffer_tx, buffer_rx) = unbounded();
        let header_cell = Arc::new(HeaderCell::new());
        let cancel = Arc::new(AtomicBool::new(false));

        let chunk_size = config.chunk_size.max(1);
        let producer_cancel = Arc::clone(&cancel);
        let producer =
            thread::spawn(move || read_chunks(source, chunk_size, chunk_tx, producer_cancel));

        let parser = StreamingParser::with_config(
            chunk_rx,
            buffer_tx,
            Arc::clone(&header_cell),
            config.filter,
            Arc::clone(&cancel),
            config.parser,
        );
        let parser = thread::spawn(move || parser.run());

        Self {
            buffers: buffer_rx,
            header_cell,
            cancel,
            producer: Some(producer),
            parser: Some(parser),
            finished: false,
            error: None,
        }
    }

    /// Read a document held in memory.
    pub fn from_string(document: impl Into<String>) -> Self {
        Self::new(io::Cursor::new(document.into().into_bytes()))
    }

    /// Block until the document header is known.
    ///
    /// Available as soon as the parser reaches the first entity, or
    /// earlier if the document ends or fails before that. A parser
    /// thread that dies without publishing an outcome surfaces as
    /// [`ReadError::ParserPanicked`] here, the same error [`read`]
    /// reports for it, rather than blocking forever.
    ///
    /// [`read`]: Reader::read
    pub fn header(&self) -> Result<Header, ReadError> {
        loop {
            if let Some(outcome) = self.header_cell.wait_for(HEADER_POLL) {
                return outcome.map_err(ReadError::from);
            }
            let alive = self.parser.as_ref().is_some_and(|handle| !handle.is_finished());
            if !alive {
                // The thread may have fulfilled the cell right before
                // it exited.
                return match self.header_cell.try_get() {
                    Some(outcome) => outcome.map_err(ReadError::from),
                    None => Err(ReadError::ParserPanicked),
                };
            }
        }
    }

    /// The header outcome without blocking.
    pub fn try_header(&self) -> Option<Result<Header, ReadError>> {
        self.header_cell
            .try_get()
            .map(|outcome| outcome.map_err(ReadError::from))
    }

    /// Fetch the next buffer of entities, blocking until the parser
    /// hands one over.
    ///
    /// An empty buffer means the document is done; further calls keep
    /// returning empty buffers. A failed parse returns the same error
    /// from every subsequent call.
    pub fn read(&mut self) -> Result<Buffer, ReadError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        if self.finished {
            return Ok(Buffer::new());
        }
        match self.buffers.recv() {
            Ok(buffer) => {
                if buffer.is_empty() {
                    self.finished = true;
                }
                Ok(buffer)
            }
            Err(_) => {
                // No end-of-stream marker before the channel dropped:
                // the parser stopped abnormally.
                match self.take_parser_error() {
                    Some(error) => {
                        self.error = Some(error.clone());
                        Err(error)
                    }
                    None => {
                        self.finished = true;
                        Ok(Buffer::new())
                    }
                }
            }
        }
    }

    /// Stop the pipeline and reclaim both threads.
    ///
    /// Requests cancellation, joins the producer and the parser, and
    /// reports the parser's failure if it had one. Safe to call more
    /// than once; `Drop` calls it as well.
    pub fn close(&mut self) -> Result<(), ReadError> {
        self.cancel.store(true, Ordering::Release);
        if let Some(producer) = self.producer.take() {
            let _ = producer.join();
        }
        if let Some(error) = self.take_parser_error() {
            self.error = Some(error.clone());
            return Err(error);
        }
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(())
    }

    fn take_parser_error(&mut self) -> Option<ReadError> {
        let handle = self.parser.take()?;
        match handle.join() {
            Ok(Ok(())) => None,
            Ok(Err(error)) => Some(ReadError::Parse(error)),
            Err(_) => Some(ReadError::ParserPanicked),
        }
    }
}

impl Drop for Reader {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

// A reader can be handed to a worker thread wholesale.
const _: fn() = || {
    fn assert_send<T: Send>() {}
    assert_send::<Reader>();
};

/// Producer loop: forward fixed-size chunks until the source is
/// exhausted or cancellation is requested, then send the end-of-input
/// marker. An I/O failure ends the stream early; the parser then sees
/// a truncated document.
fn read_chunks<R: Read>(
    mut source: R,
    chunk_size: usize,
    chunks: Sender<Vec<u8>>,
    cancel: Arc<AtomicBool>,
) {
    let mut scratch = vec![0u8; chunk_size];
    loop {
        if cancel.load(Ordering::Acquire) {
            break;
        }
        match source.read(&mut scratch) {
            Ok(0) => break,
            Ok(n) => {
                if chunks.send(scratch[..n].to_vec()).is_err() {
                    break;
                }
            }
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(_) => break,
        }
    }
    let _ = chunks.send(Vec::new());
}
