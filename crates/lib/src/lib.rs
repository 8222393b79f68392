//! crystal-lib: Core types and logic for Crystal
//!
//! This crate builds Minecraft modpack variants through packwiz:
//! - `Pack`: the pack manifest and its variants, persisted as JSON
//! - `resolve`: flattens variant inheritance into one resource list
//! - `packwiz`: turns a resolved variant into packwiz invocations
//! - `exec`: runs processes in order or concurrently
//! - `pipeline`: compiles and exports every `(target, variant)` pair

pub mod consts;
pub mod exec;
pub mod init;
pub mod pack;
pub mod packwiz;
pub mod pipeline;
pub mod resolve;
pub mod util;
