#![deny(unsafe_code)]

//! Library side of the `hapi` binary, kept separate so commands can be
//! exercised from tests.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
