//! Annotation engine data model
//!
//! An annotation is one placed instance of a symbol on a page. Coordinates are
//! stored in document space (independent of zoom) and never change after
//! creation. To move a marker, remove it and place a new one.

use crate::symbol::SymbolId;
use std::collections::BTreeMap;

/// Unique identifier for an annotation
///
/// Generated using UUID v4. Unique for the lifetime of a session only.
pub type AnnotationId = uuid::Uuid;

/// Point in document space
///
/// - Origin (0, 0) at the top-left of the page's rendering origin
/// - X increases to the right
/// - Y increases downward
/// - Units are page pixels at 100% zoom
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageCoordinate {
    pub x: f32,
    pub y: f32,
}

impl PageCoordinate {
    /// Create a new page coordinate
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Placed marker
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Annotation {
    id: AnnotationId,
    symbol_id: SymbolId,
    /// 1-based page number
    page_number: u32,
    /// Marker center in document space
    position: PageCoordinate,
}

impl Annotation {
    /// Create a new annotation with generated ID
    pub fn new(symbol_id: SymbolId, page_number: u32, position: PageCoordinate) -> Self {
        Self {
            id: AnnotationId::new_v4(),
            symbol_id,
            page_number,
            position,
        }
    }

    /// Get the annotation ID
    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn symbol_id(&self) -> SymbolId {
        self.symbol_id
    }

    /// Get the 1-based page number
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Marker center in document space
    pub fn position(&self) -> PageCoordinate {
        self.position
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }
}

/// Number of markers of one symbol on one page
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PageSymbolCount {
    pub page: u32,
    pub count: usize,
}

/// All annotations of a document, in insertion order
///
/// Aggregate queries are linear scans. Annotation volume is expected to stay
/// in the tens to low hundreds.
#[derive(Debug, Clone, Default)]
pub struct AnnotationCollection {
    annotations: Vec<Annotation>,
}

impl AnnotationCollection {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an annotation to the collection
    pub fn add(&mut self, annotation: Annotation) -> AnnotationId {
        let id = annotation.id();
        self.annotations.push(annotation);
        id
    }

    /// Remove an annotation by ID
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let index = self.annotations.iter().position(|a| a.id() == id)?;
        Some(self.annotations.remove(index))
    }

    /// Remove every annotation of a symbol, returning how many were dropped
    pub fn remove_for_symbol(&mut self, symbol_id: SymbolId) -> usize {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.symbol_id() != symbol_id);
        before - self.annotations.len()
    }

    /// Get an annotation by ID
    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    /// Get all annotations for a page, in insertion order
    pub fn for_page(&self, page_number: u32) -> Vec<&Annotation> {
        self.annotations
            .iter()
            .filter(|a| a.page_number() == page_number)
            .collect()
    }

    /// Total markers of a symbol across all pages
    pub fn symbol_count(&self, symbol_id: SymbolId) -> usize {
        self.annotations
            .iter()
            .filter(|a| a.symbol_id() == symbol_id)
            .count()
    }

    /// Markers of a symbol on a single page
    pub fn symbol_count_by_page(&self, symbol_id: SymbolId, page_number: u32) -> usize {
        self.annotations
            .iter()
            .filter(|a| a.symbol_id() == symbol_id && a.page_number() == page_number)
            .count()
    }

    /// Per-page counts of a symbol over pages `1..=total_pages`
    ///
    /// Sparse: pages without markers of this symbol are omitted. Entries are in
    /// ascending page order.
    pub fn symbol_page_counts(&self, symbol_id: SymbolId, total_pages: u32) -> Vec<PageSymbolCount> {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for annotation in &self.annotations {
            let page = annotation.page_number();
            if annotation.symbol_id() == symbol_id && (1..=total_pages).contains(&page) {
                *counts.entry(page).or_default() += 1;
            }
        }

        counts
            .into_iter()
            .map(|(page, count)| PageSymbolCount { page, count })
            .collect()
    }

    /// Distinct page numbers holding any marker, ascending
    pub fn pages_with_symbols(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self.annotations.iter().map(|a| a.page_number()).collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }

    /// Get all annotations in insertion order
    pub fn all(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Get count of annotations
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Check if collection is empty
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Clear all annotations
    pub fn clear(&mut self) {
        self.annotations.clear();
    }
}
