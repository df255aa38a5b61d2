//! # Kernel name demangling
//!
//! Kernel symbols in GCN assembly are mangled names such as `_Z6kernelPi`.
//! For display they are demangled to `kernel(int*)`; the core never depends
//! on it. Matching, staleness and comparison all work on the mangled name.
//!
//! ## Strategy
//!
//! - **Rust** (`_R...`, legacy `_ZN...17h<hash>E`): demangled in-process
//!   with `rustc-demangle`.
//! - **Itanium C++** (`_Z...`): handed to an external demangler
//!   (`llvm-cxxfilt` by default, any `c++filt`-compatible command works).
//! - **Anything else**: returned unchanged.
//!
//! A missing or failing external tool is reported once and the mangled name
//! is used from then on.

pub mod demangler;

pub use demangler::{is_itanium_mangled, is_rust_mangled, Demangler};
