/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # EmberFix Tag-Value
//!
//! Zero-copy FIX tag=value parsing and message writing for the EmberFix engine.
//!
//! ## Features
//!
//! - **Zero-copy parsing**: [`Message`] indexes field offsets into the frame
//!   and hands out borrowed [`Field`](emberfix_core::Field) views
//! - **Reusable writer**: [`MessageWriter`] frames messages in one buffer that
//!   is reused for every outbound message
//! - **SIMD-accelerated**: Uses `memchr` for fast delimiter search

pub mod checksum;
pub mod decoder;
pub mod message;
pub mod writer;

pub use checksum::{calculate_checksum, format_checksum, parse_checksum};
pub use decoder::{Decoder, SOH, Token};
pub use message::{Message, Printable};
pub use writer::{FieldFormat, MessageWriter};
