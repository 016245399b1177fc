/*++

Licensed under the Apache-2.0 license.

File Name:

   flash.rs

Abstract:

    Read-only view of memory mapped flash addressed by absolute address.

--*/

use core::ops::Range;

/// Read-only view of `data.len()` bytes of flash mapped at `base`
#[derive(Debug, Clone, Copy)]
pub struct FlashRegion<'a> {
    base: u32,
    data: &'a [u8],
}

impl<'a> FlashRegion<'a> {
    pub const fn new(base: u32, data: &'a [u8]) -> Self {
        Self { base, data }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Byte offset of `[addr, addr + len)` inside the region, if fully contained
    fn offset_range(&self, addr: u32, len: usize) -> Option<Range<usize>> {
        let start = usize::try_from(addr.checked_sub(self.base)?).ok()?;
        let end = start.checked_add(len)?;
        if end > self.data.len() {
            return None;
        }
        Some(start..end)
    }

    /// Bytes of `[addr, addr + len)`
    pub fn read(&self, addr: u32, len: usize) -> Option<&'a [u8]> {
        self.offset_range(addr, len).map(|range| &self.data[range])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_range() {
        let data = [0u8; 16];
        let flash = FlashRegion::new(0x1000, &data);
        assert_eq!(flash.offset_range(0x1000, 16), Some(0..16));
        assert_eq!(flash.offset_range(0x1004, 4), Some(4..8));
        assert_eq!(flash.offset_range(0x1010, 0), Some(16..16));
        assert_eq!(flash.offset_range(0x0fff, 1), None);
        assert_eq!(flash.offset_range(0x100d, 4), None);
    }

    #[test]
    fn test_read_does_not_wrap() {
        let data = [0u8; 16];
        let flash = FlashRegion::new(0xffff_fff0, &data);
        assert!(flash.read(0xffff_fff8, 8).is_some());
        assert!(flash.read(0xffff_fff8, usize::MAX).is_none());
        assert!(flash.read(0x0000_0000, 1).is_none());
    }
}
