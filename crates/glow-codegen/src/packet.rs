//! USB packet framing.

use crate::bits::BitPacker;

/// Pad `bits` with ones up to the next multiple of `packet_bits`.
pub fn pad_to_packet(mut bits: BitPacker, packet_bits: u64) -> BitPacker {
    if packet_bits == 0 {
        return bits;
    }
    let rem = bits.width() % packet_bits;
    if rem != 0 {
        bits.append(&BitPacker::ones("packet pad", packet_bits - rem));
    }
    bits
}

/// Context region followed by the instruction region, padded to whole
/// packets.
pub fn packetize(context: &BitPacker, instructions: &BitPacker, packet_bits: u64) -> BitPacker {
    pad_to_packet(context.concat(instructions), packet_bits)
}
