/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # EmberFix Engine
//!
//! Drives one FIX session end to end.
//!
//! This crate provides:
//! - **Application trait**: Callbacks for logon, business messages and termination
//! - **Builder API**: Fluent configuration for engine setup
//! - **Engine**: Connects over TCP, or runs over any transport and clock

pub mod application;
pub mod builder;
pub mod engine;

pub use application::{Application, NoOpApplication};
pub use builder::EngineBuilder;
pub use engine::Engine;
