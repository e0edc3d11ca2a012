//! A fake [`SdCardDriver`] backed by a `Vec`, for exercising [`SdLogger`]
//! without real SD card hardware.

use heli_sdlogger::sdlogger::driver::{DRIVER_BUF_LEN, STREAM_ENVELOPE};
use heli_sdlogger::sdlogger::index::OUTPUT_ENVELOPE;
use heli_sdlogger::sdlogger::{DriverEvent, SdCardDriver, SdCardStatus};
use heli_sdlogger::Block;

/// A `Vec`-backed card, addressable in byte offsets like the real hardware.
///
/// Every call is instantaneous: `status()` settles to `Idle`/`MultiWriteIdle`
/// on the tick right after the operation that triggered it, and the queued
/// event is posted then too. This is a deliberately simple fake; use
/// [`RamCard::step`] to mimic a slower card if a test needs to exercise the
/// `Busy`/`MultiWriteBusy` states.
pub struct RamCard {
    storage: Vec<u8>,
    status: SdCardStatus,
    output_buf: [u8; DRIVER_BUF_LEN],
    input_buf: [u8; Block::LEN],
    event: Option<DriverEvent>,
    multiwrite_addr: Option<u32>,
    /// Number of `tick`-observable calls to `status()` to hold at `Busy`
    /// before settling, so tests can exercise the polling loop.
    pub busy_ticks: u32,
}

impl RamCard {
    /// A blank card of `size_bytes`, starting `Idle`.
    pub fn new(size_bytes: usize) -> Self {
        RamCard {
            storage: vec![0u8; size_bytes],
            status: SdCardStatus::Idle,
            output_buf: [0u8; DRIVER_BUF_LEN],
            input_buf: [0u8; Block::LEN],
            event: None,
            multiwrite_addr: None,
            busy_ticks: 0,
        }
    }

    /// Directly inspect the backing store, e.g. to assert on a written
    /// index block.
    pub fn storage(&self) -> &[u8] {
        &self.storage
    }

    /// Force the next `status()` reading, simulating the driver's own
    /// asynchronous progress outside of `SdLogger`'s control.
    pub fn set_status(&mut self, status: SdCardStatus) {
        self.status = status;
    }

    fn settle(&mut self) {
        if self.busy_ticks > 0 {
            self.busy_ticks -= 1;
        } else if self.multiwrite_addr.is_some() {
            self.status = SdCardStatus::MultiWriteIdle;
        } else {
            self.status = SdCardStatus::Idle;
        }
    }
}

impl SdCardDriver for RamCard {
    fn status(&self) -> SdCardStatus {
        self.status
    }

    fn output_buf(&mut self) -> &mut [u8; DRIVER_BUF_LEN] {
        &mut self.output_buf
    }

    fn input_buf(&self) -> &[u8; Block::LEN] {
        &self.input_buf
    }

    fn read_block(&mut self, addr: u32) {
        let start = addr as usize;
        self.input_buf
            .copy_from_slice(&self.storage[start..start + Block::LEN]);
        self.status = SdCardStatus::Busy;
        self.settle();
        self.event = Some(DriverEvent::IndexReceived);
    }

    fn write_block(&mut self, addr: u32) {
        let start = addr as usize;
        self.storage[start..start + Block::LEN]
            .copy_from_slice(&self.output_buf[OUTPUT_ENVELOPE..OUTPUT_ENVELOPE + Block::LEN]);
        self.status = SdCardStatus::Busy;
        self.settle();
    }

    fn multiwrite_start(&mut self, addr: u32) {
        self.multiwrite_addr = Some(addr);
        self.status = SdCardStatus::MultiWriteBusy;
        self.settle();
    }

    fn multiwrite_next(&mut self) {
        let addr = self.multiwrite_addr.expect("multiwrite_next without start");
        let start = addr as usize;
        self.storage[start..start + Block::LEN]
            .copy_from_slice(&self.output_buf[STREAM_ENVELOPE..STREAM_ENVELOPE + Block::LEN]);
        self.multiwrite_addr = Some(addr + Block::LEN_U32);
        self.status = SdCardStatus::MultiWriteBusy;
        self.settle();
        self.event = Some(DriverEvent::Written);
    }

    fn multiwrite_stop(&mut self) {
        self.multiwrite_addr = None;
        self.status = SdCardStatus::Busy;
        self.settle();
    }

    fn take_event(&mut self) -> Option<DriverEvent> {
        self.event.take()
    }
}
