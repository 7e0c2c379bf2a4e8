use std::ops::Add;

use rand::Rng;

/// A 32-bit sequence number, relative to an arbitrary zero point.
///
/// RFC 793 Section 3.3: the actual sequence number space is finite, ranging
/// from 0 to 2^32 - 1, and all arithmetic dealing with sequence numbers is
/// performed modulo 2^32. A `Wrap32` is the on-the-wire form of an unbounded
/// 64-bit stream index: `wrap` maps an absolute index down into the 32-bit
/// space, and `unwrap` recovers the absolute index nearest a caller-supplied
/// checkpoint.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Wrap32(u32);

impl Wrap32 {
    pub const fn new(raw: u32) -> Self {
        Wrap32(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// A random sequence number, used as the default ISN of a connection.
    pub fn random() -> Self {
        Wrap32(rand::thread_rng().gen())
    }

    /// Wrap an absolute 64-bit index down to the 32-bit space.
    pub fn wrap(n: u64, zero_point: Wrap32) -> Wrap32 {
        Wrap32(zero_point.0.wrapping_add(n as u32))
    }

    /// Recover the absolute 64-bit index this sequence number represents.
    ///
    /// Of all indices congruent to `self - zero_point` mod 2^32, returns the
    /// one closest to `checkpoint`; an exact tie keeps the smaller index.
    pub fn unwrap(self, zero_point: Wrap32, checkpoint: u64) -> u64 {
        const EPOCH: u64 = 1 << 32;
        let offset = self.0.wrapping_sub(zero_point.0) as u64;
        let mid = (checkpoint & !(EPOCH - 1)) | offset;

        let mut best = mid;
        for candidate in [mid.checked_sub(EPOCH), mid.checked_add(EPOCH)] {
            if let Some(candidate) = candidate {
                let closer = candidate.abs_diff(checkpoint) < best.abs_diff(checkpoint);
                let tie_low =
                    candidate.abs_diff(checkpoint) == best.abs_diff(checkpoint) && candidate < best;
                if closer || tie_low {
                    best = candidate;
                }
            }
        }
        best
    }
}

impl Add<u64> for Wrap32 {
    type Output = Wrap32;

    fn add(self, rhs: u64) -> Wrap32 {
        Wrap32(self.0.wrapping_add(rhs as u32))
    }
}
