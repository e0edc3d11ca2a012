//! Encode/decode for the one-block index record kept at byte address
//! `0x2000`.
//!
//! Layout (big-endian, offsets relative to the *payload* — i.e. relative to
//! `input_buf[0]` on the read side, and to `output_buf[5]` on the write
//! side; see the `+5` write-side envelope discussion on
//! [`OUTPUT_ENVELOPE`]):
//!
//! | payload offset | size | meaning |
//! |---|---|---|
//! | 0..4 | u32 | `next_available_address` |
//! | 4 | u8 | `last_completed` |
//! | 5..9 | reserved | zero |
//! | `9 + 8*(N-1)` .. `+8`, N = 1.. | 8 | slot N: `start_addr` (u32) ‖ `length_bytes` (u32) |

use byteorder::{BigEndian, ByteOrder};

use crate::blockdevice::Block;
use super::driver::DRIVER_BUF_LEN;

/// Byte address of the index block.
pub const INDEX_BLOCK_ADDR: u32 = 0x2000;

/// Byte address at which log payload begins on a blank card.
pub const LOG_PAYLOAD_START: u32 = 0x4000;

/// Header size in the logical payload: 4-byte address + 1-byte ordinal + 4
/// reserved bytes, before the first log slot.
const HEADER_LEN: usize = 9;

/// Size of one log slot: 4-byte start address + 4-byte length.
const SLOT_LEN: usize = 8;

/// Number of bytes the (out-of-scope) driver prepends to `output_buf` as a
/// command envelope on the write path. `input_buf`, populated by a read,
/// carries the payload starting at offset 0 with no such envelope — an
/// asymmetry the specification calls out explicitly and this module mirrors
/// with two distinct offset constants rather than hiding it behind one.
pub const OUTPUT_ENVELOPE: usize = 5;

/// The fields decoded from a freshly read index block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedIndex {
    /// Raw `next_available_address` as stored on the card (not yet clamped
    /// to [`LOG_PAYLOAD_START`] for a blank card).
    pub next_available_address: u32,
    /// Ordinal of the most recently finalised log.
    pub last_completed: u8,
}

/// Decode an index block read via `read_block` (no write-side envelope).
pub fn decode_input(input_buf: &[u8; Block::LEN]) -> DecodedIndex {
    DecodedIndex {
        next_available_address: BigEndian::read_u32(&input_buf[0..4]),
        last_completed: input_buf[4],
    }
}

/// Payload offset of the 8-byte slot for log ordinal `n` (`n >= 1`).
pub fn slot_offset(n: u8) -> usize {
    HEADER_LEN + SLOT_LEN * (n as usize - 1)
}

/// Perform the `GettingIndexForUpdate -> UpdatingIndex` mutation described
/// in the specification:
///
/// 1. Copy the whole received block into `output_buf`, shifted by
///    [`OUTPUT_ENVELOPE`].
/// 2. Compute `new_next = prior_next + log_len_blocks * 512`.
/// 3. Write `new_next` and the incremented completion ordinal into the
///    header.
/// 4. Write the newly finished log's slot: `start_addr = prior_next`,
///    `length_bytes = log_len_blocks * 512`.
///
/// Returns `(new_next_available_address, new_last_completed)`.
pub fn apply_update(
    output_buf: &mut [u8; DRIVER_BUF_LEN],
    input_buf: &[u8; Block::LEN],
    prior_next: u32,
    prior_last_completed: u8,
    log_len_blocks: u32,
) -> (u32, u8) {
    let copy_len = Block::LEN;
    output_buf[OUTPUT_ENVELOPE..OUTPUT_ENVELOPE + copy_len].copy_from_slice(&input_buf[..copy_len]);

    let log_len_bytes = log_len_blocks * Block::LEN_U32;
    let new_next = prior_next.wrapping_add(log_len_bytes);
    let new_last_completed = prior_last_completed.wrapping_add(1);

    BigEndian::write_u32(&mut output_buf[OUTPUT_ENVELOPE..OUTPUT_ENVELOPE + 4], new_next);
    output_buf[OUTPUT_ENVELOPE + 4] = new_last_completed;

    let slot = OUTPUT_ENVELOPE + slot_offset(new_last_completed);
    BigEndian::write_u32(&mut output_buf[slot..slot + 4], prior_next);
    BigEndian::write_u32(&mut output_buf[slot + 4..slot + 8], log_len_bytes);

    (new_next, new_last_completed)
}
