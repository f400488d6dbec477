/// RFC 1071 internet checksum: the one's complement of the one's complement sum of the
/// big-endian 16-bit words in `data`. An odd trailing byte is padded with zero.
///
/// The checksum field itself must be zeroed (or skipped) before calling this when
/// computing a fresh checksum.
pub fn internet_checksum(data: &[u8]) -> u16 {
    !fold_carries(ones_complement_sum(data))
}

/// Returns true if `data`, checksum field included, sums to all ones.
pub fn verify_checksum(data: &[u8]) -> bool {
    fold_carries(ones_complement_sum(data)) == 0xFFFF
}

fn ones_complement_sum(data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(2);
    let mut sum = chunks
        .by_ref()
        .fold(0u32, |acc, x| acc + u32::from(u16::from_be_bytes([x[0], x[1]])));
    if let [last] = chunks.remainder() {
        sum += u32::from(*last) << 8;
    }
    sum
}

fn fold_carries(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }
    sum as u16
}
