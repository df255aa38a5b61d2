//! # isamap - Main Entry Point
//!
//! Thin host around the library: parse arguments, load settings, run one
//! query through the core and hand the result to a presentation sink.
//!
//! - **kernels**: candidates for a source file, newest first
//! - **map**: one selected kernel with the queried line's instructions marked
//! - **reverse**: source location of an assembly line
//! - **compare**: two builds of one kernel side by side

use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use isamap::analysis::{compare_records, detect_staleness};
use isamap::cli::{Args, Command};
use isamap::config::ScanSettings;
use isamap::diagnostics::LogSink;
use isamap::domain::{BuildTag, ConfigError, SourceLine};
use isamap::export::{
    DiffReport, DiffSide, JsonSink, LocationReport, MappingReport, MatchListReport, MatchReport,
    PresentationSink, ReverseReport, TextSink,
};
use isamap::mapping::LineMapping;
use isamap::parser::parse_buffer;
use isamap::resolver::{
    rank_most_recent_first, select, MatchRecord, MatchResolver, SelectionPin, SourceQuery,
};
use isamap::scanner::AsmBuffer;
use isamap::session::{ActiveSelection, RequestContext, Session};
use isamap::symbolization::Demangler;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    let args = Args::parse();
    init_logging(&args);

    std::process::exit(match run(&args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn init_logging(args: &Args) {
    let default_filter = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ConfigError>() {
        Some(ConfigError::NoBuildDirectories) => EXIT_USAGE,
        _ => EXIT_ERROR,
    }
}

/// Everything a subcommand needs from the environment
struct Host {
    workspace: PathBuf,
    settings: ScanSettings,
    demangler: Demangler,
    sink: LogSink,
    output: Box<dyn PresentationSink>,
}

impl Host {
    fn new(args: &Args) -> Result<Self> {
        let mut settings = ScanSettings::discover(&args.workspace, args.config.as_deref())
            .context("Failed to load settings")?;
        if !args.build_dirs.is_empty() {
            settings = settings.with_build_directories(args.build_dirs.clone())?;
        }
        debug!("Scanning {:?} under {}", settings.build_directories, args.workspace.display());

        let output: Box<dyn PresentationSink> = if args.json {
            Box::new(JsonSink::new(io::stdout().lock()))
        } else {
            Box::new(TextSink::new(io::stdout().lock()))
        };

        Ok(Self {
            workspace: args.workspace.clone(),
            demangler: Demangler::new(settings.demangler.clone()),
            settings,
            sink: LogSink::new(),
            output,
        })
    }

    /// Resolve a query and rank the result newest first
    fn resolve(&mut self, query: &SourceQuery) -> Vec<MatchRecord> {
        let resolver = MatchResolver::new(&self.workspace, &self.settings);
        let mut records = resolver.resolve(query, &mut self.sink);
        rank_most_recent_first(&mut records);
        records
    }

    fn match_report(&mut self, record: &MatchRecord, candidates: &[MatchRecord]) -> MatchReport {
        let staleness = detect_staleness(record, candidates);
        MatchReport::new(record, &staleness, &self.demangler, &mut self.sink)
    }
}

fn run(args: &Args) -> Result<()> {
    let mut host = Host::new(args)?;

    match &args.command {
        Command::Kernels { source, line } => list_kernels(&mut host, source, line.unwrap_or(0)),
        Command::Map { source, line, kernel, build_tag } => {
            let pin = SelectionPin { symbol: kernel.clone(), build_tag: build_tag.clone() };
            map_line(&mut host, source, *line, &pin)
        }
        Command::Reverse { asm_file, line } => reverse_line(&mut host, asm_file, *line),
        Command::Compare { source, kernel, left, right } => {
            compare_versions(&mut host, source, kernel, left.as_deref(), right.as_deref())
        }
    }?;

    info!("{} scan diagnostics reported", host.sink.reported());
    Ok(())
}

fn list_kernels(host: &mut Host, source: &Path, line: u32) -> Result<()> {
    let query = SourceQuery::new(source, line);
    let records = host.resolve(&query);

    let matches = records.iter().map(|r| host.match_report(r, &records)).collect();
    host.output.matches(&MatchListReport::new(&query, matches))?;
    Ok(())
}

fn map_line(host: &mut Host, source: &Path, line: u32, pin: &SelectionPin) -> Result<()> {
    let Some(source_line) = SourceLine::from_one_based(line) else {
        bail!("line numbers start at 1");
    };
    let query = SourceQuery::new(source, line);
    let records = host.resolve(&query);

    let Some(record) = select(&records, pin) else {
        bail!("no kernel for {}:{line} matches the selection", source.display());
    };

    let mut session = Session::new();
    let ticket = session.begin_request();
    session.commit(ticket, ActiveSelection::new(record.clone(), &records));
    let Some(active) = session.active() else {
        bail!("selection for {} was superseded", source.display());
    };

    let highlight = session
        .highlight_for_source(RequestContext::user(), &active.record.matched_path, source_line)
        .unwrap_or_default();
    let kernel = host.match_report(&active.record, &records);

    let mut report = MappingReport::new(kernel, &active.record, &active.mapping);
    for mapped in &mut report.lines {
        mapped.highlighted = highlight.contains(&(mapped.asm_line - 1));
    }
    host.output.mapping(&report)?;
    Ok(())
}

fn reverse_line(host: &mut Host, asm_file: &Path, line: usize) -> Result<()> {
    if line == 0 {
        bail!("line numbers start at 1");
    }
    let tag = build_tag_for(asm_file, &host.workspace, &host.settings);
    let buffer = AsmBuffer::read(asm_file, tag)
        .with_context(|| format!("Failed to read {}", asm_file.display()))?;
    if line > buffer.lines.len() {
        bail!("{} has only {} lines", asm_file.display(), buffer.lines.len());
    }

    let parsed = parse_buffer(Arc::new(buffer), host.settings.symbol_search_window, &mut host.sink);
    let idx = line - 1;
    let region = parsed.kernel_at(idx);
    let source = region.and_then(|kernel| {
        let mapping = LineMapping::for_region(&parsed.buffer, kernel, None);
        mapping.reverse(idx).map(LocationReport::from)
    });

    host.output.location(&ReverseReport {
        asm_file: asm_file.to_path_buf(),
        asm_line: line,
        symbol: region.map(|k| host.demangler.demangle(&k.symbol, &mut host.sink)),
        source,
    })?;
    Ok(())
}

fn compare_versions(
    host: &mut Host,
    source: &Path,
    symbol: &str,
    left: Option<&str>,
    right: Option<&str>,
) -> Result<()> {
    let records: Vec<MatchRecord> = host
        .resolve(&SourceQuery::file_only(source))
        .into_iter()
        .filter(|r| r.kernel.symbol == symbol)
        .collect();

    let left = pick_version(&records, symbol, left, 1)?;
    let right = pick_version(&records, symbol, right, 0)?;

    let alignment = compare_records(left, right);
    let report = DiffReport::new(
        symbol,
        host.demangler.demangle(symbol, &mut host.sink),
        DiffSide::new(left, &detect_staleness(left, &records)),
        DiffSide::new(right, &detect_staleness(right, &records)),
        &alignment,
    );
    host.output.diff(&report)?;
    Ok(())
}

/// Record for an explicit build tag, else the `rank`-th newest
fn pick_version<'r>(
    records: &'r [MatchRecord],
    symbol: &str,
    tag: Option<&str>,
    rank: usize,
) -> Result<&'r MatchRecord> {
    match tag {
        Some(tag) => records
            .iter()
            .find(|r| r.kernel.build_tag.as_str() == tag)
            .with_context(|| format!("{symbol} was not found under build tag {tag}")),
        None => records.get(rank).with_context(|| {
            format!("{symbol} has {} version(s), need two to compare", records.len())
        }),
    }
}

/// Build tag for a file given on the command line
///
/// The configured build directory containing the file, else its parent
/// directory's name.
fn build_tag_for(path: &Path, workspace: &Path, settings: &ScanSettings) -> BuildTag {
    for dir in &settings.build_directories {
        if path.starts_with(workspace.join(dir)) || path.starts_with(dir) {
            return BuildTag::new(dir.as_str());
        }
    }
    let parent = path.parent().and_then(Path::file_name).and_then(|n| n.to_str());
    BuildTag::new(parent.unwrap_or_default())
}
