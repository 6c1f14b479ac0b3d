#![deny(unreachable_pub)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![allow(clippy::module_name_repetitions)]

//! Synthesizes kuttl test cases for Crossplane managed resources and runs
//! them against a live cluster.

#[macro_use]
extern crate tracing;

pub mod cli;
pub mod config;
pub mod e2e;
pub mod extract;
pub mod manifest;
pub mod plan;
pub mod prepare;
pub mod render;
pub mod resource;
pub mod trace;
