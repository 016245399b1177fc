/*++

Licensed under the Apache-2.0 license.

File Name:

   lib.rs

Abstract:

    Crypto backends used to generate and verify images.

--*/

#[cfg(feature = "openssl")]
mod openssl;
#[cfg(feature = "rustcrypto")]
mod rustcrypto;

#[cfg(feature = "openssl")]
pub use self::openssl::OsslCrypto;
#[cfg(feature = "rustcrypto")]
pub use rustcrypto::RustCrypto;

#[cfg(feature = "rustcrypto")]
pub type Crypto = RustCrypto;
#[cfg(all(feature = "openssl", not(feature = "rustcrypto")))]
pub type Crypto = OsslCrypto;
