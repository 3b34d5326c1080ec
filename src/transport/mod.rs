//! Concrete Telegram transports
//!
//! The real MTProto transport is compiled only with the `mtproto` feature.

#[cfg(feature = "mtproto")]
pub mod mtproto;

#[cfg(feature = "mtproto")]
pub use mtproto::{MtprotoSession, MtprotoSessionFactory};
