//! Session state store
//!
//! `TakeoffSession` is the single owned state object of the application. It
//! holds the loaded document, the symbol palette, the placed annotations and
//! the view state. Presentation code reads through `&TakeoffSession` and
//! mutates through the methods below, which keep the invariants:
//!
//! - every annotation references a live symbol (validated insertion, cascading
//!   delete)
//! - the active page stays within the document and the scale within bounds
//! - late completions of superseded loads are discarded

use crate::annotation::{
    Annotation, AnnotationCollection, AnnotationId, PageCoordinate, PageSymbolCount,
};
use crate::config::TakeoffConfig;
use crate::coords::{self, MarkerRect, PageDimensions, ViewPoint};
use crate::error::{TakeoffError, TakeoffResult};
use crate::input::ViewCommand;
use crate::loader::{self, DocumentUpload, LoadedDocument};
use crate::page_switch::{PageLoadTracker, PageSwitchResult, RenderToken};
use crate::symbol::{Symbol, SymbolDraft, SymbolEdit, SymbolId};
use crate::view::ViewState;

/// Removal awaiting user confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingRemoval {
    Annotation(AnnotationId),
    Symbol(SymbolId),
}

/// An annotation resolved against its symbol, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker<'a> {
    pub annotation: &'a Annotation,
    pub symbol: &'a Symbol,
    pub rect: MarkerRect,
}

/// In-memory state of one annotation session
#[derive(Debug, Clone)]
pub struct TakeoffSession {
    config: TakeoffConfig,
    document: Option<LoadedDocument>,
    symbols: Vec<Symbol>,
    annotations: AnnotationCollection,
    view: ViewState,
    document_loads: PageLoadTracker,
    page_renders: PageLoadTracker,
    page_dimensions: Option<PageDimensions>,
    pending_removal: Option<PendingRemoval>,
}

impl TakeoffSession {
    pub fn new(config: TakeoffConfig) -> Self {
        let view = ViewState::new(&config);
        Self {
            config,
            document: None,
            symbols: Vec::new(),
            annotations: AnnotationCollection::new(),
            view,
            document_loads: PageLoadTracker::new(),
            page_renders: PageLoadTracker::new(),
            page_dimensions: None,
            pending_removal: None,
        }
    }

    pub fn config(&self) -> &TakeoffConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    // ---- document lifecycle ----

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// Replace the current document with an upload
    ///
    /// Rejected uploads leave the session untouched. On success the previous
    /// document's annotations are dropped, the view returns to page 1 and the
    /// returned token must accompany the renderer's page count report.
    pub fn load_document(&mut self, upload: DocumentUpload) -> TakeoffResult<RenderToken> {
        let document = loader::validate_upload(upload, &self.config)?;
        log::debug!(
            "loading document {:?} ({} bytes)",
            document.file_name(),
            document.byte_len()
        );

        self.document = Some(document);
        self.annotations.clear();
        self.pending_removal = None;
        self.page_dimensions = None;
        self.view.reset_pages();
        self.page_renders.invalidate();
        Ok(self.document_loads.begin(0))
    }

    /// Renderer finished parsing the document
    ///
    /// # Errors
    /// `EmptyDocument` if the current load reports no pages; the document is
    /// closed since no page could ever hold a marker.
    pub fn on_document_loaded(&mut self, token: RenderToken, total_pages: u32) -> TakeoffResult<PageSwitchResult> {
        let result = self.document_loads.complete(token);
        if !result.is_current() {
            return Ok(result);
        }
        if total_pages == 0 {
            log::warn!("document reported no pages, closing it");
            self.close_document();
            return Err(TakeoffError::EmptyDocument);
        }

        log::debug!("document loaded with {} pages", total_pages);
        self.view.set_total_pages(total_pages);
        self.page_renders.begin(self.view.active_page());
        Ok(result)
    }

    /// Drop the document and everything placed on it
    pub fn close_document(&mut self) {
        log::debug!("closing document");
        self.document = None;
        self.annotations.clear();
        self.pending_removal = None;
        self.page_dimensions = None;
        self.view.reset_pages();
        self.document_loads.invalidate();
        self.page_renders.invalidate();
    }

    /// Page render the front end should be waiting on, if any
    pub fn pending_render(&self) -> Option<RenderToken> {
        self.page_renders.pending()
    }

    /// Start (or restart) rendering the active page
    pub fn begin_page_render(&mut self) -> Option<RenderToken> {
        if !self.has_document() {
            return None;
        }
        Some(self.page_renders.begin(self.view.active_page()))
    }

    /// Renderer finished the page started with `token`
    ///
    /// Completions for a page the user has navigated away from are dropped.
    pub fn on_page_rendered(&mut self, token: RenderToken, dimensions: PageDimensions) -> PageSwitchResult {
        let result = self.page_renders.complete(token);
        if result.is_current() && token.page() == self.view.active_page() {
            self.page_dimensions = Some(dimensions);
            PageSwitchResult::Current
        } else {
            PageSwitchResult::Stale
        }
    }

    /// Original size of the rendered page, once known
    pub fn page_dimensions(&self) -> Option<PageDimensions> {
        self.page_dimensions
    }

    // ---- navigation & zoom ----

    pub fn next_page(&mut self) -> bool {
        let changed = self.has_document() && self.view.next_page();
        self.after_page_change(changed)
    }

    pub fn previous_page(&mut self) -> bool {
        let changed = self.has_document() && self.view.previous_page();
        self.after_page_change(changed)
    }

    pub fn go_to_page(&mut self, page: u32) -> bool {
        let changed = self.has_document() && self.view.set_active_page(page);
        self.after_page_change(changed)
    }

    fn after_page_change(&mut self, changed: bool) -> bool {
        if changed {
            log::debug!("page {} of {}", self.view.active_page(), self.view.total_pages());
            self.page_dimensions = None;
            self.page_renders.begin(self.view.active_page());
        }
        changed
    }

    pub fn set_scale(&mut self, scale: f32) -> bool {
        self.view.set_scale(scale)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.view.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.view.zoom_out()
    }

    /// Apply a keyboard shortcut
    ///
    /// Shortcuts are ignored while no document is loaded. Returns the command
    /// if it changed the view.
    pub fn handle_key(&mut self, key: &str) -> Option<ViewCommand> {
        if !self.has_document() {
            return None;
        }
        let command = ViewCommand::from_key(key)?;
        let changed = match command {
            ViewCommand::PreviousPage => self.previous_page(),
            ViewCommand::NextPage => self.next_page(),
            ViewCommand::ZoomIn => self.zoom_in(),
            ViewCommand::ZoomOut => self.zoom_out(),
        };
        changed.then_some(command)
    }

    // ---- symbol registry ----

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Create a symbol and select it as the placement tool
    pub fn add_symbol(&mut self, draft: SymbolDraft) -> TakeoffResult<SymbolId> {
        let symbol = draft.build(&self.config).inspect_err(|err| {
            log::warn!("symbol not created: {}", err);
        })?;
        let id = symbol.id();
        log::debug!("added symbol {:?} ({})", symbol.name(), id);

        self.symbols.push(symbol);
        self.view.set_active_symbol(Some(id));
        Ok(id)
    }

    /// Edit a symbol's name, color, shape or size. Placed markers are untouched.
    pub fn update_symbol(&mut self, id: SymbolId, edit: SymbolEdit) -> TakeoffResult<()> {
        let symbol = self
            .symbols
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or(TakeoffError::UnknownSymbol(id))?;
        edit.apply(symbol, &self.config)?;
        log::debug!("updated symbol {}", id);
        Ok(())
    }

    /// Delete a symbol and every annotation that uses it
    ///
    /// Clears the placement tool if it was this symbol. Unknown IDs are ignored.
    pub fn remove_symbol(&mut self, id: SymbolId) -> Option<Symbol> {
        let index = self.symbols.iter().position(|s| s.id() == id)?;
        let symbol = self.symbols.remove(index);
        let removed = self.annotations.remove_for_symbol(id);
        log::debug!(
            "removed symbol {:?} and {} annotations",
            symbol.name(),
            removed
        );

        if self.view.active_symbol() == Some(id) {
            self.view.set_active_symbol(None);
        }
        if self.pending_removal == Some(PendingRemoval::Symbol(id)) {
            self.pending_removal = None;
        }
        Some(symbol)
    }

    /// Select the placement tool. No validation; an unknown ID places nothing.
    pub fn set_active_symbol(&mut self, id: Option<SymbolId>) {
        self.view.set_active_symbol(id);
    }

    pub fn active_symbol(&self) -> Option<&Symbol> {
        self.view.active_symbol().and_then(|id| self.symbol_by_id(id))
    }

    /// `None` means there is nothing to render for this ID
    pub fn symbol_by_id(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.id() == id)
    }

    // ---- annotation engine ----

    pub fn annotations(&self) -> &AnnotationCollection {
        &self.annotations
    }

    /// Place a marker of `symbol_id` at a document-space point
    ///
    /// # Errors
    /// - `UnknownSymbol` if the symbol does not exist
    /// - `PageOutOfRange` for page 0, or a page past the end once the page
    ///   count is known
    pub fn add_annotation(
        &mut self,
        symbol_id: SymbolId,
        page_number: u32,
        position: PageCoordinate,
    ) -> TakeoffResult<AnnotationId> {
        if self.symbol_by_id(symbol_id).is_none() {
            log::warn!("refusing annotation for unknown symbol {}", symbol_id);
            return Err(TakeoffError::UnknownSymbol(symbol_id));
        }
        let total = self.view.total_pages();
        if page_number == 0 || (total > 0 && page_number > total) {
            return Err(TakeoffError::PageOutOfRange {
                page: page_number,
                total,
            });
        }

        let id = self
            .annotations
            .add(Annotation::new(symbol_id, page_number, position));
        log::debug!(
            "placed {} on page {} at ({:.1}, {:.1})",
            symbol_id,
            page_number,
            position.x,
            position.y
        );
        Ok(id)
    }

    /// Place the active symbol where the user clicked on the active page
    ///
    /// `click` is in rendered pixels relative to the page origin. Returns
    /// `Ok(None)` when there is no document, its page count is not known yet,
    /// or no placement tool is selected.
    pub fn place_marker(&mut self, click: ViewPoint) -> TakeoffResult<Option<AnnotationId>> {
        if !self.has_document() || self.view.total_pages() == 0 {
            return Ok(None);
        }
        let Some(symbol_id) = self.view.active_symbol() else {
            return Ok(None);
        };
        let position = coords::to_document(click, self.view.scale());
        self.add_annotation(symbol_id, self.view.active_page(), position)
            .map(Some)
    }

    /// Remove one annotation. Unknown IDs are ignored.
    pub fn remove_annotation(&mut self, id: AnnotationId) -> Option<Annotation> {
        let removed = self.annotations.remove(id);
        if removed.is_some() {
            log::debug!("removed annotation {}", id);
            if self.pending_removal == Some(PendingRemoval::Annotation(id)) {
                self.pending_removal = None;
            }
        }
        removed
    }

    pub fn annotations_for_page(&self, page_number: u32) -> Vec<&Annotation> {
        self.annotations.for_page(page_number)
    }

    /// Total markers of a symbol; 0 for unknown symbols
    pub fn symbol_count(&self, symbol_id: SymbolId) -> usize {
        self.annotations.symbol_count(symbol_id)
    }

    pub fn symbol_count_by_page(&self, symbol_id: SymbolId, page_number: u32) -> usize {
        self.annotations.symbol_count_by_page(symbol_id, page_number)
    }

    /// Sparse per-page counts over the document's pages, ascending
    pub fn symbol_page_counts(&self, symbol_id: SymbolId) -> Vec<PageSymbolCount> {
        self.annotations
            .symbol_page_counts(symbol_id, self.view.total_pages())
    }

    pub fn pages_with_symbols(&self) -> Vec<u32> {
        self.annotations.pages_with_symbols()
    }

    /// Markers on a page, resolved and positioned for the current scale
    ///
    /// Annotations whose symbol cannot be found are skipped.
    pub fn markers_for_page(&self, page_number: u32) -> Vec<PlacedMarker<'_>> {
        let scale = self.view.scale();
        self.annotations
            .for_page(page_number)
            .into_iter()
            .filter_map(|annotation| {
                let symbol = self.symbol_by_id(annotation.symbol_id())?;
                Some(PlacedMarker {
                    annotation,
                    symbol,
                    rect: coords::marker_rect(annotation.position(), scale, symbol.size()),
                })
            })
            .collect()
    }

    /// Topmost marker under a rendered point on the active page
    pub fn marker_at(&self, point: ViewPoint) -> Option<AnnotationId> {
        self.markers_for_page(self.view.active_page())
            .iter()
            .rev()
            .find(|marker| marker.rect.contains(point))
            .map(|marker| marker.annotation.id())
    }

    // ---- confirmed removals ----

    pub fn pending_removal(&self) -> Option<PendingRemoval> {
        self.pending_removal
    }

    /// Ask for confirmation before removing an annotation
    pub fn request_annotation_removal(&mut self, id: AnnotationId) -> TakeoffResult<()> {
        if self.annotations.get(id).is_none() {
            return Err(TakeoffError::UnknownAnnotation(id));
        }
        self.pending_removal = Some(PendingRemoval::Annotation(id));
        Ok(())
    }

    /// Ask for confirmation before deleting a symbol
    pub fn request_symbol_removal(&mut self, id: SymbolId) -> TakeoffResult<()> {
        if self.symbol_by_id(id).is_none() {
            return Err(TakeoffError::UnknownSymbol(id));
        }
        self.pending_removal = Some(PendingRemoval::Symbol(id));
        Ok(())
    }

    /// Carry out the pending removal. Returns false if nothing was pending.
    pub fn confirm_removal(&mut self) -> bool {
        match self.pending_removal.take() {
            Some(PendingRemoval::Annotation(id)) => self.remove_annotation(id).is_some(),
            Some(PendingRemoval::Symbol(id)) => self.remove_symbol(id).is_some(),
            None => false,
        }
    }

    pub fn cancel_removal(&mut self) {
        self.pending_removal = None;
    }
}

impl Default for TakeoffSession {
    fn default() -> Self {
        Self::new(TakeoffConfig::default())
    }
}
