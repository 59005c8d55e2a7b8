/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # EmberFix Core
//!
//! Core types, field views, and error definitions for the EmberFix FIX session engine.
//!
//! This crate provides the fundamental building blocks used across all EmberFix crates:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Field views**: [`Field`] and the [`FieldEq`] comparison trait
//! - **Message types**: [`MsgType`] for the session-level administrative messages
//! - **Core types**: [`SeqNum`], [`Timestamp`], [`CompId`]
//! - **Tags**: numeric constants for the header, trailer and session tags
//!
//! ## Zero-Copy Design
//!
//! A [`Field`] never owns bytes. It borrows the value range from the buffer of the
//! message it was looked up in, so the borrow checker rejects any use of a field
//! after that message has been cleared or reparsed.

pub mod error;
pub mod field;
pub mod message;
pub mod tags;
pub mod types;

pub use error::{DecodeError, FixError, Result, SessionError};
pub use field::{Field, FieldEq};
pub use message::MsgType;
pub use types::{CompId, SeqNum, Timestamp};
