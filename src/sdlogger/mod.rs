//! Direct-to-SD-card telemetry logger.
//!
//! [`SdLogger`] multiplexes a byte-stream telemetry transport onto raw,
//! block-aligned writes to an SD card, coupling a byte producer's backpressure
//! signal (`check_free_space`) to the block-write cadence of a
//! [`SdCardDriver`], and maintaining a one-block index of log extents at a
//! fixed address.
//!
//! There is no filesystem here: the card is a flat linear address space. The
//! index page lives at [`index::INDEX_BLOCK_ADDR`]; log payload begins at
//! [`index::LOG_PAYLOAD_START`] and grows upward, one log at a time.
//!
//! # Known limitations (carried over from the reference design)
//!
//! - `log_len` is incremented in response to [`DriverEvent::Written`], which
//!   fires when the block has been handed off to the SPI transaction, not
//!   when the card has physically committed it. Power loss between those two
//!   points leaves the on-disk index mismatched with reality. This crate does
//!   not attempt to correct it, for the same reason the original doesn't: the
//!   driver interface has no way to ask the card "is this durably stored yet".
//! - A driver reporting [`SdCardStatus::Error`] has no recovery path; the
//!   state machine simply waits for `status()` to report something else.

pub mod driver;
pub mod index;
pub mod transport;

pub use driver::{DriverEvent, SdCardDriver, SdCardStatus};
pub use transport::{LoggingSink, TelemetrySink};

use crate::blockdevice::Block;
use crate::led::LedIndicator;
use crate::{debug, trace, warn};
use driver::STREAM_ENVELOPE;

/// Default capacity of the overflow buffer bytes are spilled into while the
/// card is busy committing a full block.
pub const DEFAULT_LOGGER_BUFFER_SIZE: usize = 1024;

/// One past the last payload index inside a streaming-write `output_buf`:
/// the 1-byte start-of-block flag plus a full block of payload.
const CARD_BUF_END: usize = STREAM_ENVELOPE + Block::LEN;

/// Soft cap on the number of log slots one index block can hold, given the
/// 9-byte header and 8-byte slots on the write side (507 usable payload
/// bytes after the 5-byte command envelope): `(507 - 9) / 8 = 62`.
pub const MAX_LOGS: u8 = 62;

/// State machine states, driven by the periodic tick and by driver status
/// transitions.
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerStatus {
    /// Waiting for the card's own init sequence to finish.
    Initializing,
    /// Index block read issued; waiting for it to land.
    RetrievingIndex,
    /// Idle, waiting for the switch to go ON.
    Ready,
    /// Accepting bytes; a multi-block write session is open.
    Logging,
    /// Switch went OFF; draining buffers and padding the final block.
    LoggingFinalBlock,
    /// Multi-block write session closed; waiting for the card to idle.
    StoppedLogging,
    /// Re-reading the index so it can be amended.
    GettingIndexForUpdate,
    /// Writing the amended index block.
    UpdatingIndex,
}

/// The direct-to-SD-card logger state machine.
///
/// `LOGGER_BUFFER_SIZE` is the overflow buffer capacity, a compile-time
/// constant analogous to `embedded_sdmmc::VolumeManager`'s `MAX_DIRS` /
/// `MAX_FILES` const generics.
#[derive(Debug)]
pub struct SdLogger<const LOGGER_BUFFER_SIZE: usize = DEFAULT_LOGGER_BUFFER_SIZE> {
    status: LoggerStatus,
    next_available_address: u32,
    last_completed: u8,
    log_len: u32,
    /// Cursor into the card driver's `output_buf`, in `[STREAM_ENVELOPE, CARD_BUF_END]`. Byte 0 is
    /// the driver's start-of-block flag.
    sdcard_buf_idx: usize,
    /// Overflow bytes accumulated while the card's block is full and a
    /// flush is in flight.
    buffer: [u8; LOGGER_BUFFER_SIZE],
    /// Cursor into `buffer`, in `[0, LOGGER_BUFFER_SIZE]`.
    idx: usize,
}

impl<const LOGGER_BUFFER_SIZE: usize> Default for SdLogger<LOGGER_BUFFER_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const LOGGER_BUFFER_SIZE: usize> SdLogger<LOGGER_BUFFER_SIZE> {
    /// Create a fresh logger. Starts in [`LoggerStatus::Initializing`];
    /// nothing is issued to the driver until the first `tick`.
    pub fn new() -> Self {
        SdLogger {
            status: LoggerStatus::Initializing,
            next_available_address: index::LOG_PAYLOAD_START,
            last_completed: 0,
            log_len: 0,
            sdcard_buf_idx: STREAM_ENVELOPE,
            buffer: [0; LOGGER_BUFFER_SIZE],
            idx: 0,
        }
    }

    /// Current state.
    pub fn status(&self) -> LoggerStatus {
        self.status
    }

    /// Address the next log will start at, once one is opened.
    pub fn next_available_address(&self) -> u32 {
        self.next_available_address
    }

    /// Ordinal of the most recently finalised log (0 = none yet).
    pub fn last_completed(&self) -> u8 {
        self.last_completed
    }

    /// Number of blocks written so far in the log currently (or most
    /// recently) being written.
    pub fn log_len(&self) -> u32 {
        self.log_len
    }

    fn transition(&mut self, to: LoggerStatus) {
        debug!("SdLogger: {:?} -> {:?}", self.status, to);
        self.status = to;
    }

    /// Advance the state machine by one tick.
    ///
    /// `switch_on` is the debounced RC "log enable" reading (see
    /// [`crate::control_input`]). `led`, if present, is driven ON at the
    /// `Ready -> Logging` edge and OFF at `UpdatingIndex -> Ready`, per the
    /// specification.
    pub fn tick<D: SdCardDriver>(
        &mut self,
        driver: &mut D,
        switch_on: bool,
        led: Option<&mut dyn LedIndicator>,
    ) {
        let event = driver.take_event();
        match self.status {
            LoggerStatus::Initializing => {
                if driver.status() == SdCardStatus::Idle {
                    driver.read_block(index::INDEX_BLOCK_ADDR);
                    self.transition(LoggerStatus::RetrievingIndex);
                }
            }
            LoggerStatus::RetrievingIndex => {
                if event == Some(DriverEvent::IndexReceived) {
                    let decoded = index::decode_input(driver.input_buf());
                    self.next_available_address =
                        decoded.next_available_address.max(index::LOG_PAYLOAD_START);
                    self.last_completed = decoded.last_completed;
                    self.transition(LoggerStatus::Ready);
                }
            }
            LoggerStatus::Ready => {
                if switch_on && driver.status() == SdCardStatus::Idle {
                    driver.multiwrite_start(self.next_available_address);
                    self.log_len = 0;
                    self.sdcard_buf_idx = STREAM_ENVELOPE;
                    self.idx = 0;
                    self.transition(LoggerStatus::Logging);
                    if let Some(led) = led {
                        led.set(true);
                    }
                }
                // switch OFF, or switch ON with a busy card: stay Ready.
            }
            LoggerStatus::Logging => {
                if event == Some(DriverEvent::Written) {
                    self.on_written(driver);
                }
                if !switch_on {
                    self.transition(LoggerStatus::LoggingFinalBlock);
                } else if self.idx == LOGGER_BUFFER_SIZE && driver.status() == SdCardStatus::MultiWriteIdle {
                    driver.multiwrite_next();
                }
            }
            LoggerStatus::LoggingFinalBlock => {
                if event == Some(DriverEvent::Written) {
                    self.on_written(driver);
                }
                let bytes_pending = self.sdcard_buf_idx > 1 || self.idx > 0;
                if bytes_pending {
                    if driver.status() == SdCardStatus::MultiWriteIdle {
                        for b in &mut driver.output_buf()[self.sdcard_buf_idx..CARD_BUF_END] {
                            *b = 0;
                        }
                        driver.multiwrite_next();
                    }
                } else if driver.status() == SdCardStatus::MultiWriteIdle {
                    driver.multiwrite_stop();
                    self.transition(LoggerStatus::StoppedLogging);
                }
            }
            LoggerStatus::StoppedLogging => {
                if driver.status() == SdCardStatus::Idle {
                    driver.read_block(index::INDEX_BLOCK_ADDR);
                    self.transition(LoggerStatus::GettingIndexForUpdate);
                }
            }
            LoggerStatus::GettingIndexForUpdate => {
                if event == Some(DriverEvent::IndexReceived) {
                    let input = *driver.input_buf();
                    let (new_next, new_last) = index::apply_update(
                        driver.output_buf(),
                        &input,
                        self.next_available_address,
                        self.last_completed,
                        self.log_len,
                    );
                    if new_last > MAX_LOGS {
                        warn!("SdLogger: index slot count {} exceeds MAX_LOGS", new_last);
                    }
                    self.next_available_address = new_next;
                    self.last_completed = new_last;
                    self.log_len = 0;
                    driver.write_block(index::INDEX_BLOCK_ADDR);
                    self.transition(LoggerStatus::UpdatingIndex);
                }
            }
            LoggerStatus::UpdatingIndex => {
                if driver.status() == SdCardStatus::Idle {
                    if let Some(led) = led {
                        led.set(false);
                    }
                    self.log_len = 0;
                    self.transition(LoggerStatus::Ready);
                }
            }
        }
    }

    /// `cb_written`: splice any pending overflow bytes to the front of the
    /// now-empty card block, advance the block cursor, and count the block.
    fn on_written<D: SdCardDriver>(&mut self, driver: &mut D) {
        let n = self.idx;
        if n > 0 {
            driver.output_buf()[STREAM_ENVELOPE..STREAM_ENVELOPE + n].copy_from_slice(&self.buffer[..n]);
        }
        self.idx = 0;
        self.sdcard_buf_idx = STREAM_ENVELOPE + n;
        self.log_len += 1;
    }

    /// Whether at least `n` more bytes can be accepted right now. Always
    /// `false` outside [`LoggerStatus::Logging`] — this is the backpressure
    /// signal that halts the telemetry framer.
    pub fn check_free_space(&self, n: usize) -> bool {
        if self.status != LoggerStatus::Logging {
            return false;
        }
        let card_room = CARD_BUF_END - self.sdcard_buf_idx;
        let overflow_room = LOGGER_BUFFER_SIZE - self.idx;
        let have = card_room + overflow_room >= n;
        trace!("SdLogger: check_free_space({}) -> {}", n, have);
        have
    }

    /// Append one byte: to the card's output block while it has room, then
    /// to the overflow buffer. Drops the byte if both are full — callers
    /// that respect [`check_free_space`](Self::check_free_space) never hit
    /// this.
    pub fn put_byte<D: SdCardDriver>(&mut self, driver: &mut D, byte: u8) {
        if self.sdcard_buf_idx < CARD_BUF_END {
            driver.output_buf()[self.sdcard_buf_idx] = byte;
            self.sdcard_buf_idx += 1;
            if self.sdcard_buf_idx == CARD_BUF_END && driver.status() == SdCardStatus::MultiWriteIdle {
                driver.multiwrite_next();
            }
        } else if self.idx < LOGGER_BUFFER_SIZE {
            self.buffer[self.idx] = byte;
            self.idx += 1;
        } else {
            warn!("SdLogger: overflow buffer saturated, dropping byte");
        }
    }

    /// No-op: message framing lives entirely inside the payload bytes
    /// already accepted via `put_byte`.
    pub fn send_message(&mut self) {}

    /// Always `false`: the logger is a write-only sink from the transport's
    /// point of view.
    pub fn char_available(&self) -> bool {
        false
    }

    /// Always `0`, for interface symmetry with a bidirectional transport.
    pub fn get_byte(&self) -> u8 {
        0
    }
}

const _: () = assert!(Block::LEN == 512);
