//! The external collaborator interface: an SD card driver.
//!
//! This crate does not implement an SPI SD card protocol driver. Real
//! systems pair [`SdLogger`](super::SdLogger) with one, such as
//! `embedded-sdmmc`'s own [`crate::sdcard::SdCard`] or a vendor HAL. The
//! driver owns the physical `output_buf`/`input_buf` 512-byte regions and
//! runs its own state machine (reset, idle, card-busy) on its own `periodic`
//! call, which is out of scope here — [`SdLogger`] only observes `status()`
//! and drains completion events.

use crate::blockdevice::Block;

/// Number of bytes of command header the driver reserves ahead of a
/// streaming multi-write block, out of the same buffer `output_buf` hands
/// back. Distinct from (and smaller than) the 5-byte envelope a single
/// `write_block` command uses — the two SD commands this driver issues have
/// different header sizes, which is why `output_buf` is sized to fit the
/// larger of the two.
pub const STREAM_ENVELOPE: usize = 1;

/// `output_buf`'s capacity: big enough to hold the largest header this
/// driver ever prepends (the 5-byte `write_block` command envelope, see
/// [`crate::sdlogger::index::OUTPUT_ENVELOPE`]) plus one full block of
/// payload.
pub const DRIVER_BUF_LEN: usize = Block::LEN + 5;

/// Status of the underlying SD card driver, as observed by [`SdLogger`](super::SdLogger).
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdCardStatus {
    /// The driver reported a fault. The reference design has no recovery
    /// path for this: the state machine simply waits for the card to
    /// return to `Idle`.
    Error,
    /// A single-block operation is in flight.
    Busy,
    /// The card is idle and ready for a new command.
    Idle,
    /// A multi-block write session is open and ready for the next block.
    MultiWriteIdle,
    /// A multi-block write session has a block transaction in flight.
    MultiWriteBusy,
}

/// A single asynchronous completion posted by the driver, consumed at most
/// once per [`SdLogger::tick`](super::SdLogger::tick) call.
///
/// This models the reference design's function-pointer callbacks
/// (`cb_index_received`, `cb_written`) as a one-slot event queue the driver
/// posts into and the logger drains on its own schedule, per the redesign
/// note in the specification: either representation is behaviourally
/// equivalent for a single-threaded cooperative system.
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEvent {
    /// `read_block` completed; `input_buf` holds the requested block.
    IndexReceived,
    /// `multiwrite_next` completed; `output_buf` has been handed off to the
    /// SPI transaction (the card itself may still be physically busy).
    Written,
}

/// Abstract SD card driver, as consumed by [`SdLogger`](super::SdLogger).
///
/// All operations are asynchronous: issuing a command does not block, and
/// completion is observed either through [`status`](SdCardDriver::status)
/// transitions or through [`take_event`](SdCardDriver::take_event).
pub trait SdCardDriver {
    /// Current card/driver status.
    fn status(&self) -> SdCardStatus;

    /// Mutable access to the buffer the driver will write on the next
    /// `write_block` or `multiwrite_next`, sized [`DRIVER_BUF_LEN`] to fit
    /// either command's header. During a multi-write session byte 0 is
    /// reserved for the driver's start-of-block flag and the logger's
    /// payload runs `1..=Block::LEN`; [`crate::sdlogger::index`] addresses
    /// the same buffer with its own, wider envelope for plain
    /// `write_block` calls.
    fn output_buf(&mut self) -> &mut [u8; DRIVER_BUF_LEN];

    /// Read-only access to the 512-byte block most recently filled by
    /// `read_block`.
    fn input_buf(&self) -> &[u8; Block::LEN];

    /// Issue an asynchronous single-block read. Completion is posted as
    /// [`DriverEvent::IndexReceived`].
    fn read_block(&mut self, addr: u32);

    /// Issue an asynchronous single-block write of `output_buf`. Completion
    /// is observed by polling [`status`](SdCardDriver::status) back to
    /// `Idle` — the reference design does not post an event for this.
    fn write_block(&mut self, addr: u32);

    /// Open a multi-block write session at `addr`.
    fn multiwrite_start(&mut self, addr: u32);

    /// Commit the current `output_buf` as the next block in the open
    /// multi-block write session. Completion is posted as
    /// [`DriverEvent::Written`].
    fn multiwrite_next(&mut self);

    /// Close the open multi-block write session.
    fn multiwrite_stop(&mut self);

    /// Drain the single pending completion event, if any. Each event is
    /// returned at most once.
    fn take_event(&mut self) -> Option<DriverEvent>;
}
