//! # isamap - Source to GCN ISA Line Mapping
//!
//! isamap reads the per-target assembly dumps a HIP/CUDA compiler leaves in
//! a build tree (`*-amdgcn-amd-amdhsa-*.s`) and answers two questions from
//! the DWARF line directives embedded in them: which instructions came from
//! this source line, and which source line produced this instruction.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                 Build directories (priority order)             │
//! │        build/  build-debug/  ...   *-amdgcn-amd-amdhsa-*.s     │
//! └──────────────────────────┬─────────────────────────────────────┘
//!                            │ AsmBuffer per file
//!                            ▼
//! ┌────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐   ┌──────────────┐   ┌───────────────┐           │
//! │  │ scanner  │──▶│    parser    │──▶│   resolver    │           │
//! │  │ (walk)   │   │ .file/.loc/  │   │ query ──▶     │           │
//! │  └──────────┘   │ kernel spans │   │ MatchRecords  │           │
//! │                 └──────────────┘   └───────┬───────┘           │
//! │                                            │ select            │
//! │                 ┌──────────────┐   ┌───────▼───────┐           │
//! │                 │   analysis   │◀──│    session    │           │
//! │                 │ staleness,   │   │ record +      │           │
//! │                 │ comparison   │   │ LineMapping   │           │
//! │                 └──────┬───────┘   └───────┬───────┘           │
//! │                        └─────────┬─────────┘                   │
//! │                                  ▼                             │
//! │                     ┌────────────────────────┐                 │
//! │                     │ export (text / JSON)   │                 │
//! │                     └────────────────────────┘                 │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`scanner`]: walk build roots and load ISA dumps into memory
//! - [`parser`]: directive grammar, file tables, kernel region detection
//! - [`mapping`]: bidirectional source line ↔ instruction line index
//! - [`resolver`]: find kernels referencing a source query, rank, pin
//! - [`analysis`]: staleness across builds, positional version comparison
//! - [`session`]: the active selection and request generations
//! - [`symbolization`]: kernel name demangling
//! - [`export`]: presentation sinks consuming finished reports
//! - [`config`], [`cli`]: settings file and command line
//! - [`diagnostics`]: non-fatal scan conditions
//! - [`domain`]: newtypes and error taxonomy
//!
//! ## Key Concepts
//!
//! - **Build tag**: the build directory name a dump was found under
//! - **Kernel region**: the lines between two function section directives,
//!   named by the `.globl` symbol found near its start
//! - **Staleness**: a selected kernel is outdated when another build holds a
//!   newer dump of the same symbol

pub mod analysis;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod export;
pub mod mapping;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod symbolization;
