//! Count and coordinate invariants over generated edit sequences

use proptest::prelude::*;
use takeoff_core::{
    AnnotationId, DocumentUpload, PageCoordinate, SymbolDraft, SymbolId, SymbolShape, TakeoffSession,
    ViewPoint,
};

const PAGES: u32 = 6;

#[derive(Debug, Clone)]
enum Edit {
    Place { symbol: usize, page: u32, x: f32, y: f32 },
    RemoveAnnotation(usize),
    RemoveSymbol(usize),
    AddSymbol,
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        6 => (0usize..8, 1u32..=PAGES, 0f32..1000.0, 0f32..1000.0)
            .prop_map(|(symbol, page, x, y)| Edit::Place { symbol, page, x, y }),
        3 => (0usize..64).prop_map(Edit::RemoveAnnotation),
        1 => (0usize..8).prop_map(Edit::RemoveSymbol),
        1 => Just(Edit::AddSymbol),
    ]
}

fn open(pages: u32) -> TakeoffSession {
    let mut session = TakeoffSession::default();
    let token = session
        .load_document(DocumentUpload::new("plan.pdf", "application/pdf", Vec::new()))
        .expect("pdf upload accepted");
    session
        .on_document_loaded(token, pages)
        .expect("document has pages");
    session
}

fn new_symbol(session: &mut TakeoffSession, n: usize) -> SymbolId {
    session
        .add_symbol(SymbolDraft::new(format!("Symbol {}", n), "#FF5252", SymbolShape::Circle))
        .expect("valid symbol")
}

fn annotation_ids(session: &TakeoffSession) -> Vec<AnnotationId> {
    session.annotations().all().iter().map(|a| a.id()).collect()
}

/// Apply one edit, checking cascade deletes as they happen
fn apply(session: &mut TakeoffSession, symbols: &mut Vec<SymbolId>, created: &mut usize, edit: Edit) {
    match edit {
        Edit::Place { symbol, page, x, y } => {
            if symbols.is_empty() {
                *created += 1;
                symbols.push(new_symbol(session, *created));
            }
            let symbol_id = symbols[symbol % symbols.len()];
            session
                .add_annotation(symbol_id, page, PageCoordinate::new(x, y))
                .expect("page within document");
        }
        Edit::RemoveAnnotation(index) => {
            let ids = annotation_ids(session);
            if !ids.is_empty() {
                let id = ids[index % ids.len()];
                assert!(session.remove_annotation(id).is_some());
            }
        }
        Edit::RemoveSymbol(index) => {
            if symbols.is_empty() {
                return;
            }
            let symbol_id = symbols.remove(index % symbols.len());
            let expected: Vec<AnnotationId> = session
                .annotations()
                .all()
                .iter()
                .filter(|a| a.symbol_id() != symbol_id)
                .map(|a| a.id())
                .collect();

            assert!(session.remove_symbol(symbol_id).is_some());
            assert_eq!(annotation_ids(session), expected);
            assert_eq!(session.symbol_count(symbol_id), 0);
        }
        Edit::AddSymbol => {
            *created += 1;
            symbols.push(new_symbol(session, *created));
        }
    }
}

proptest! {
    #[test]
    fn counts_agree_with_annotation_list(edits in prop::collection::vec(edit(), 0..80)) {
        let mut session = open(PAGES);
        let mut symbols = Vec::new();
        let mut created = 0;
        for edit in edits {
            apply(&mut session, &mut symbols, &mut created, edit);
        }

        for &symbol in &symbols {
            let filtered = session
                .annotations()
                .all()
                .iter()
                .filter(|a| a.symbol_id() == symbol)
                .count();
            prop_assert_eq!(session.symbol_count(symbol), filtered);

            let page_counts = session.symbol_page_counts(symbol);
            prop_assert!(page_counts.iter().all(|c| c.count > 0));
            prop_assert!(page_counts.windows(2).all(|w| w[0].page < w[1].page));
            prop_assert_eq!(page_counts.iter().map(|c| c.count).sum::<usize>(), filtered);
            for count in &page_counts {
                prop_assert_eq!(count.count, session.symbol_count_by_page(symbol, count.page));
            }
        }

        let pages = session.pages_with_symbols();
        prop_assert!(pages.windows(2).all(|w| w[0] < w[1]));
        for page in 1..=PAGES {
            let on_page = !session.annotations_for_page(page).is_empty();
            prop_assert_eq!(pages.contains(&page), on_page);
        }

        // Every annotation still points at a live symbol
        for annotation in session.annotations().all() {
            prop_assert!(session.symbol_by_id(annotation.symbol_id()).is_some());
        }
    }

    #[test]
    fn placed_markers_track_zoom(
        place_scale in 0.5f32..=2.5,
        view_scale in 0.5f32..=2.5,
        x in 0f32..2000.0,
        y in 0f32..2000.0,
    ) {
        let mut session = open(1);
        new_symbol(&mut session, 1);

        session.set_scale(place_scale);
        let placed_at = session.view().scale();
        prop_assert!((0.5..=2.5).contains(&placed_at));

        let click = ViewPoint::new(x, y);
        let id = session.place_marker(click).unwrap().expect("marker placed");

        let position = session.annotations().get(id).unwrap().position();
        prop_assert!((position.x * placed_at - x).abs() < 1e-2);
        prop_assert!((position.y * placed_at - y).abs() < 1e-2);
        prop_assert_eq!(session.marker_at(click), Some(id));

        session.set_scale(view_scale);
        let viewed_at = session.view().scale();
        let marker = &session.markers_for_page(1)[0];
        let center = marker.rect.center();
        prop_assert!((center.x - x * viewed_at / placed_at).abs() < 1e-2);
        prop_assert!((center.y - y * viewed_at / placed_at).abs() < 1e-2);
        prop_assert!((marker.rect.left - (center.x - 12.0)).abs() < 1e-2);
    }
}
