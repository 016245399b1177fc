/*++

Licensed under the Apache-2.0 license.

File Name:

    print.rs

Abstract:

    File contains support routines and macros to print to the boot console

--*/
use core::convert::Infallible;
use ufmt::{uDisplay, uWrite};

#[derive(Default)]
pub struct RomPrinter;

impl uWrite for RomPrinter {
    type Error = Infallible;

    /// Writes a string slice into this writer, returning whether the write succeeded.
    #[cfg(not(feature = "std"))]
    #[inline(never)]
    fn write_str(&mut self, _str: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Writes a string slice into this writer, returning whether the write succeeded.
    #[cfg(feature = "std")]
    fn write_str(&mut self, str: &str) -> Result<(), Self::Error> {
        print!("{str}");
        Ok(())
    }
}

#[macro_export]
macro_rules! cprint {
    ($($tt:tt)*) => {{
        let _ = ufmt::uwrite!(&mut $crate::print::RomPrinter::default(), $($tt)*);
    }}
}

#[macro_export]
macro_rules! cprintln {
    ($($tt:tt)*) => {{
        let _ = ufmt::uwriteln!(&mut $crate::print::RomPrinter::default(), $($tt)*);
    }}
}

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

fn write_hex_byte<W>(f: &mut ufmt::Formatter<'_, W>, byte: u8) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    let digits = [
        HEX_DIGITS[usize::from(byte >> 4)],
        HEX_DIGITS[usize::from(byte & 0xf)],
    ];
    f.write_str(core::str::from_utf8(&digits).unwrap_or("??"))
}

pub struct HexBytes<'a>(pub &'a [u8]);
impl uDisplay for HexBytes<'_> {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        for byte in self.0.iter() {
            write_hex_byte(f, *byte)?;
        }
        Ok(())
    }
}

/// Flash address, printed as `0x` followed by eight hex digits
pub struct HexU32(pub u32);
impl uDisplay for HexU32 {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str("0x")?;
        for byte in self.0.to_be_bytes() {
            write_hex_byte(f, byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Buf(String);

    impl uWrite for Buf {
        type Error = Infallible;

        fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
            self.0.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn test_hex_formatting() {
        let mut buf = Buf(String::new());
        ufmt::uwrite!(&mut buf, "{} {}", HexU32(0x0001_a2f0), HexBytes(&[0x00, 0xff, 0x5c])).unwrap();
        assert_eq!(buf.0, "0x0001A2F0 00FF5C");
    }
}
