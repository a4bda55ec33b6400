//! Shared types for tamperline.
//!
//! This crate defines the two primitives every other crate builds on:
//!
//! - [`Digest`]: the fixed-format dual digest (SHA-256 + BLAKE3 prefixes)
//!   used for ledger leaves and internal tree nodes.
//! - [`Event`]: the immutable record carried by the ledger, with its
//!   [`EventKind`] tag, [`FieldValue`] details and canonical serialization.

mod digest;
mod error;
mod event;


pub use digest::{DIGEST_LEN, DIGEST_TEXT_LEN, Digest, HALF_LEN};
pub use error::EventError;
pub use event::{Event, EventKind, FieldValue, wall_clock};
