//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "isamap",
    version,
    about = "Map HIP/CUDA source lines to GCN ISA in compiler dump files",
    after_help = "\
EXAMPLES:
    isamap kernels src/saxpy.hip --line 42          Kernels with code for line 42
    isamap map src/saxpy.hip --line 42              Show the newest kernel, hits marked
    isamap reverse build/saxpy-hip-amdgcn-amd-amdhsa-gfx90a.s --line 120
    isamap compare src/saxpy.hip --kernel _Z5saxpyfPfS_"
)]
pub struct Args {
    /// Workspace root the build directories are relative to
    #[arg(short, long, global = true, default_value = ".", value_name = "DIR")]
    pub workspace: PathBuf,

    /// Build directory to scan, in priority order (repeatable; overrides the config file)
    #[arg(short, long = "build-dir", global = true, value_name = "NAME")]
    pub build_dirs: Vec<String>,

    /// Settings file (defaults to <workspace>/.isamap.json when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log scan details (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List kernels carrying code for a source file, newest first
    Kernels {
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Report the instruction lines for this 1-based line
        #[arg(short, long)]
        line: Option<u32>,
    },

    /// Show one kernel with the instructions for a source line marked
    Map {
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// 1-based source line
        #[arg(short, long)]
        line: u32,

        /// Pin the kernel by mangled symbol
        #[arg(short, long, value_name = "SYMBOL")]
        kernel: Option<String>,

        /// Pin the build directory the kernel comes from
        #[arg(long, value_name = "TAG")]
        build_tag: Option<String>,
    },

    /// Find the source location of one assembly line
    Reverse {
        #[arg(value_name = "ASM_FILE")]
        asm_file: PathBuf,

        /// 1-based assembly line
        #[arg(short, long)]
        line: usize,
    },

    /// Compare two builds of the same kernel line by line
    Compare {
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Mangled kernel symbol
        #[arg(short, long, value_name = "SYMBOL")]
        kernel: String,

        /// Build tag for the left side (default: second newest)
        #[arg(long, value_name = "TAG")]
        left: Option<String>,

        /// Build tag for the right side (default: newest)
        #[arg(long, value_name = "TAG")]
        right: Option<String>,
    },
}
