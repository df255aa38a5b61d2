//! Active selection lifecycle
//!
//! A host keeps exactly one "active" selection: the chosen kernel version,
//! its line mapping and its staleness. Every request (open, refresh,
//! reselect) rebuilds that tuple from scratch and swaps it in whole; nothing
//! is patched in place.
//!
//! Requests are not mutually excluded. Each one takes a [`RequestTicket`]
//! before doing its work, and a commit carrying a ticket older than the most
//! recently issued one is discarded, so a slow superseded scan can never
//! overwrite a newer result.

use std::path::Path;
use std::sync::Arc;

use crate::analysis::{detect_staleness, StalenessReport};
use crate::domain::SourceLine;
use crate::mapping::{LineMapping, SourceLocation};
use crate::resolver::MatchRecord;

/// Who triggered a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestOrigin {
    /// The user moved the cursor or picked something
    #[default]
    User,
    /// The host itself moved the cursor, e.g. revealing the source line of a
    /// clicked instruction
    Programmatic,
}

/// Request-scoped state passed alongside every selection event
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    pub origin: RequestOrigin,
}

impl RequestContext {
    #[must_use]
    pub fn user() -> Self {
        Self { origin: RequestOrigin::User }
    }

    #[must_use]
    pub fn programmatic() -> Self {
        Self { origin: RequestOrigin::Programmatic }
    }

    /// A programmatic reveal must not echo back as a new source→asm highlight
    #[must_use]
    pub fn suppresses_highlight(self) -> bool {
        self.origin == RequestOrigin::Programmatic
    }
}

/// The selected kernel version with everything derived from it
#[derive(Debug)]
pub struct ActiveSelection {
    pub record: MatchRecord,
    pub mapping: LineMapping,
    pub staleness: StalenessReport,
}

impl ActiveSelection {
    /// Build the selection for `record`, mapping its whole region
    #[must_use]
    pub fn new(record: MatchRecord, candidates: &[MatchRecord]) -> Self {
        let mapping = LineMapping::for_region(&record.buffer, &record.kernel, None);
        let staleness = detect_staleness(&record, candidates);
        log::debug!(
            "Selected {} from {} ({} located lines)",
            record.kernel.symbol,
            record.kernel.build_tag,
            mapping.located_lines()
        );
        Self { record, mapping, staleness }
    }
}

/// Proof that a request was started; see the module docs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

/// Single-holder store for the active selection
#[derive(Debug, Default)]
pub struct Session {
    issued: u64,
    active: Option<Arc<ActiveSelection>>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request; any earlier outstanding ticket becomes stale
    pub fn begin_request(&mut self) -> RequestTicket {
        self.issued += 1;
        RequestTicket(self.issued)
    }

    /// Install a selection built for `ticket`
    ///
    /// Returns `false` (and drops `selection`) if a newer request began after
    /// `ticket` was issued.
    pub fn commit(&mut self, ticket: RequestTicket, selection: ActiveSelection) -> bool {
        if ticket.0 != self.issued {
            log::debug!("Discarding result of superseded request #{}", ticket.0);
            return false;
        }
        self.active = Some(Arc::new(selection));
        true
    }

    /// Drop the active selection, e.g. when a rescan found nothing
    pub fn clear(&mut self, ticket: RequestTicket) -> bool {
        if ticket.0 != self.issued {
            return false;
        }
        self.active = None;
        true
    }

    #[must_use]
    pub fn active(&self) -> Option<Arc<ActiveSelection>> {
        self.active.clone()
    }

    /// Instruction lines to highlight for a source cursor position
    ///
    /// `None` when there is no active selection or the context suppresses
    /// highlighting.
    #[must_use]
    pub fn highlight_for_source(
        &self,
        ctx: RequestContext,
        path: &Path,
        line: SourceLine,
    ) -> Option<Vec<usize>> {
        if ctx.suppresses_highlight() {
            return None;
        }
        let active = self.active.as_ref()?;
        Some(active.mapping.forward(path, line).to_vec())
    }

    /// Source location of an instruction line in the active kernel
    #[must_use]
    pub fn source_for_asm(&self, asm_line: usize) -> Option<SourceLocation> {
        self.active.as_ref()?.mapping.reverse(asm_line).cloned()
    }
}
