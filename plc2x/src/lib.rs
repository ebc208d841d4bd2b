//! Command line front end for the IronIL parser.

// Allow large errors because this is a compiler - we expect large errors.
#![allow(clippy::result_large_err)]

extern crate ironil_dsl;
extern crate ironil_parser;

pub mod cli;
pub mod logger;
