// Tests for document content validation
//
//  Copyright (C) 2014-2022 Ryan Specialty Group, LLC.
//
//  This file is part of cmodel.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

use super::*;
use crate::{diagnose::Diagnostic, model::GrammarNode as G, span::dummy::*};

use Event::{End, Start, Text};

struct Types {
    doc: ElementType,
    title: ElementType,
    para: ElementType,
    br: ElementType,
    any: ElementType,
    undeclared: ElementType,
}

/// Declarations for a small document type:
///
/// ```text
///   <!ELEMENT DOC   - - (TITLE, PARA+)>
///   <!ELEMENT TITLE - - RCDATA>
///   <!ELEMENT PARA  - - (#PCDATA | BR)*>
///   <!ELEMENT BR    - O EMPTY>
///   <!ELEMENT ANY   - - ANY>
/// ```
fn decls() -> (ElementDecls, Types) {
    let mut types = ElementTypes::new();

    let t = Types {
        doc: types.intern("DOC"),
        title: types.intern("TITLE"),
        para: types.intern("PARA"),
        br: types.intern("BR"),
        any: types.intern("ANY"),
        undeclared: types.intern("UNDECLARED"),
    };

    let mut decls = ElementDecls::new(types);

    let warnings = decls.declare_model(
        t.doc,
        &G::seq([G::element(t.title), G::element(t.para).plus()]),
    );
    assert!(warnings.is_empty());

    let warnings = decls.declare_model(
        t.para,
        &G::or([G::text(), G::element(t.br)]).rep(),
    );
    assert!(warnings.is_empty());

    decls.declare(t.title, DeclaredContent::RcData);
    decls.declare(t.br, DeclaredContent::Empty);
    decls.declare(t.any, DeclaredContent::Any);

    (decls, t)
}

fn feed_all(
    sut: &mut Validator,
    evs: &[Event],
) -> Vec<Result<(), ValidateError>> {
    evs.iter().map(|ev| sut.feed(*ev)).collect()
}

#[test]
fn valid_document() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.doc);

    let evs = [
        Start(t.doc, S1),
        Start(t.title, S2),
        Text(S3),
        End(S4),
        Start(t.para, S5),
        Text(S6),
        Start(t.br, S7),
        End(S7),
        Text(S8),
        End(S9),
        End(S10),
    ];

    assert!(feed_all(&mut sut, &evs).iter().all(Result::is_ok));
    assert_eq!(0, sut.depth());
    assert_eq!(Ok(()), sut.finalize());
}

#[test]
fn tracks_open_elements() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.doc);

    assert_eq!(None, sut.current_element());

    sut.feed(Start(t.doc, S1)).unwrap();
    sut.feed(Start(t.title, S2)).unwrap();

    assert_eq!(Some(t.title), sut.current_element());
    assert_eq!(2, sut.depth());

    // RCDATA has no content model.
    assert!(sut.current_match_state().is_none());

    sut.feed(End(S3)).unwrap();

    assert_eq!(Some(t.doc), sut.current_element());
    assert_eq!(
        Some(t.para),
        sut.current_match_state().and_then(MatchState::implied_start_tag),
    );
}

#[test]
fn undeclared_element() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.doc);

    sut.feed(Start(t.doc, S1)).unwrap();

    assert_eq!(
        Err(ValidateError::UndeclaredElement {
            name: "UNDECLARED".into(),
            span: S2,
        }),
        sut.feed(Start(t.undeclared, S2)),
    );
}

#[test]
fn document_element_mismatch() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.doc);

    assert_eq!(
        Err(ValidateError::DocumentElementMismatch {
            name: "PARA".into(),
            expected: "DOC".into(),
            span: S1,
        }),
        sut.feed(Start(t.para, S1)),
    );

    // Still awaiting the document element.
    assert_eq!(Ok(()), sut.feed(Start(t.doc, S2)));
}

#[test]
fn element_not_allowed_reports_expected() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.doc);

    sut.feed(Start(t.doc, S1)).unwrap();

    let result = sut.feed(Start(t.para, S2));

    assert_eq!(
        Err(ValidateError::ElementNotAllowed {
            name: "PARA".into(),
            parent: "DOC".into(),
            expected: ["TITLE".to_string()].into_iter().collect(),
            span: S2,
            parent_span: S1,
        }),
        result,
    );

    let err = result.unwrap_err();
    assert_eq!(
        "element `PARA` is not allowed here in `DOC`",
        err.to_string()
    );

    let desc = err.describe();
    assert_eq!(3, desc.len());
    assert_eq!(S1, desc[0].span());
    assert_eq!(S2, desc[1].span());
}

#[test]
fn rejected_event_leaves_state_unchanged() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.doc);

    sut.feed(Start(t.doc, S1)).unwrap();
    sut.feed(Start(t.title, S2)).unwrap();
    sut.feed(End(S3)).unwrap();

    let before = format!("{sut:?}");

    assert!(sut.feed(Start(t.title, S4)).is_err());
    assert!(sut.feed(Start(t.undeclared, S5)).is_err());
    assert!(sut.feed(Text(S6)).is_err());
    assert!(sut.feed(End(S7)).is_err());

    assert_eq!(before, format!("{sut:?}"));

    // And processing may continue as if nothing happened.
    assert_eq!(Ok(()), sut.feed(Start(t.para, S8)));
}

#[test]
fn text_not_allowed() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.doc);

    sut.feed(Start(t.doc, S1)).unwrap();

    assert_eq!(
        Err(ValidateError::TextNotAllowed {
            parent: "DOC".into(),
            expected: ["TITLE".to_string()].into_iter().collect(),
            span: S2,
            parent_span: S1,
        }),
        sut.feed(Text(S2)),
    );
}

#[test]
fn text_only_content_rejects_elements() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.doc);

    sut.feed(Start(t.doc, S1)).unwrap();
    sut.feed(Start(t.title, S2)).unwrap();

    assert_eq!(Ok(()), sut.feed(Text(S3)));

    assert_eq!(
        Err(ValidateError::ElementNotAllowed {
            name: "BR".into(),
            parent: "TITLE".into(),
            expected: ["#PCDATA".to_string()].into_iter().collect(),
            span: S4,
            parent_span: S2,
        }),
        sut.feed(Start(t.br, S4)),
    );
}

#[test]
fn consecutive_text_is_a_single_run() {
    let mut types = ElementTypes::new();
    let (doc, a) = (types.intern("DOC"), types.intern("A"));

    let mut decls = ElementDecls::new(types);
    decls.declare_model(doc, &G::seq([G::text(), G::element(a)]));
    decls.declare(a, DeclaredContent::Empty);

    let mut sut = Validator::new(&decls, doc);

    let evs = [
        Start(doc, S1),
        Text(S2),
        Text(S3),
        Text(S4),
        Start(a, S5),
        End(S5),
        End(S6),
    ];

    assert!(feed_all(&mut sut, &evs).iter().all(Result::is_ok));
    assert_eq!(Ok(()), sut.finalize());
}

#[test]
fn text_after_element_is_a_new_run() {
    let mut types = ElementTypes::new();
    let (doc, a) = (types.intern("DOC"), types.intern("A"));

    let mut decls = ElementDecls::new(types);
    decls.declare_model(doc, &G::seq([G::text(), G::element(a)]));
    decls.declare(a, DeclaredContent::Empty);

    let mut sut = Validator::new(&decls, doc);

    sut.feed(Start(doc, S1)).unwrap();
    sut.feed(Text(S2)).unwrap();
    sut.feed(Start(a, S3)).unwrap();
    sut.feed(End(S3)).unwrap();

    assert!(matches!(
        sut.feed(Text(S4)),
        Err(ValidateError::TextNotAllowed { .. })
    ));
}

#[test]
fn text_content_may_be_empty() {
    let mut types = ElementTypes::new();
    let (doc, p, a) =
        (types.intern("DOC"), types.intern("P"), types.intern("A"));

    let mut decls = ElementDecls::new(types);

    // <!ELEMENT DOC - - (P+)>
    // <!ELEMENT P   - - (#PCDATA)>
    // <!ELEMENT A   - - (#PCDATA, P)>
    decls.declare_model(doc, &G::element(p).plus());
    assert!(decls.declare_model(p, &G::seq([G::text()])).is_empty());
    decls.declare_model(a, &G::seq([G::text(), G::element(p)]));

    let mut sut = Validator::new(&decls, doc);

    let evs = [
        Start(doc, S1),
        Start(p, S2),
        End(S3),
        Start(p, S4),
        Text(S5),
        End(S6),
        End(S7),
    ];

    assert!(feed_all(&mut sut, &evs).iter().all(Result::is_ok));
    assert_eq!(Ok(()), sut.finalize());

    // A may omit its leading text.
    let mut sut = Validator::new(&decls, a);

    let evs = [Start(a, S1), Start(p, S2), End(S3), End(S4)];

    assert!(feed_all(&mut sut, &evs).iter().all(Result::is_ok));
    assert_eq!(Ok(()), sut.finalize());
}

#[test]
fn content_in_empty() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.doc);

    sut.feed(Start(t.doc, S1)).unwrap();
    sut.feed(Start(t.title, S2)).unwrap();
    sut.feed(End(S3)).unwrap();
    sut.feed(Start(t.para, S4)).unwrap();
    sut.feed(Start(t.br, S5)).unwrap();

    assert_eq!(
        Err(ValidateError::ContentInEmpty {
            parent: "BR".into(),
            span: S6,
            parent_span: S5,
        }),
        sut.feed(Text(S6)),
    );

    assert_eq!(
        Err(ValidateError::ContentInEmpty {
            parent: "BR".into(),
            span: S7,
            parent_span: S5,
        }),
        sut.feed(Start(t.br, S7)),
    );

    // The end of the EMPTY element is always accepted.
    assert_eq!(Ok(()), sut.feed(End(S8)));
}

#[test]
fn incomplete_content_suggests_required_element() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.doc);

    sut.feed(Start(t.doc, S1)).unwrap();

    let result = sut.feed(End(S2));

    assert_eq!(
        Err(ValidateError::IncompleteContent {
            name: "DOC".into(),
            expected: ["TITLE".to_string()].into_iter().collect(),
            required: Some("TITLE".into()),
            span: S2,
            start_span: S1,
        }),
        result,
    );

    // Error, note, help, and a second help for the missing start tag.
    assert_eq!(4, result.unwrap_err().describe().len());
}

#[test]
fn incomplete_content_without_single_requirement() {
    let mut types = ElementTypes::new();
    let (doc, a, b) =
        (types.intern("DOC"), types.intern("A"), types.intern("B"));

    let mut decls = ElementDecls::new(types);
    decls.declare_model(doc, &G::or([G::element(a), G::element(b)]));

    let mut sut = Validator::new(&decls, doc);
    sut.feed(Start(doc, S1)).unwrap();

    assert_eq!(
        Err(ValidateError::IncompleteContent {
            name: "DOC".into(),
            expected: ["A".to_string(), "B".to_string()].into_iter().collect(),
            required: None,
            span: S2,
            start_span: S1,
        }),
        sut.feed(End(S2)),
    );
}

#[test]
fn unbalanced_end_tag() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.doc);

    assert_eq!(
        Err(ValidateError::UnbalancedEndTag { span: S1 }),
        sut.feed(End(S1)),
    );
}

#[test]
fn content_after_document_element() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.doc);

    let evs = [
        Start(t.doc, S1),
        Start(t.title, S2),
        End(S3),
        Start(t.para, S4),
        End(S5),
        End(S6),
    ];

    assert!(feed_all(&mut sut, &evs).iter().all(Result::is_ok));

    assert_eq!(
        Err(ValidateError::ContentAfterDocumentElement { span: S7 }),
        sut.feed(Start(t.doc, S7)),
    );

    assert_eq!(
        Err(ValidateError::TextOutsideDocumentElement { span: S8 }),
        sut.feed(Text(S8)),
    );

    assert_eq!(Ok(()), sut.finalize());
}

#[test]
fn premature_end_of_document() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.doc);

    sut.feed(Start(t.doc, S1)).unwrap();
    sut.feed(Start(t.title, S2)).unwrap();

    assert_eq!(
        Err(ValidateError::PrematureEnd {
            name: "TITLE".into(),
            start_span: S2,
        }),
        sut.finalize(),
    );
}

#[test]
fn missing_document_element() {
    let (decls, t) = decls();
    let sut = Validator::new(&decls, t.doc);

    let err = sut.finalize().unwrap_err();

    assert_eq!(
        ValidateError::MissingDocumentElement {
            expected: "DOC".into()
        },
        err,
    );

    assert!(err.describe().is_empty());
}

#[test]
fn any_content_accepts_declared_elements_and_text() {
    let (decls, t) = decls();

    let mut sut = Validator::new(&decls, t.any);

    let evs = [
        Start(t.any, S1),
        Text(S2),
        Start(t.br, S3),
        End(S3),
        Start(t.title, S4),
        End(S5),
        Text(S6),
        End(S7),
    ];

    assert!(feed_all(&mut sut, &evs).iter().all(Result::is_ok));
    assert_eq!(Ok(()), sut.finalize());
}

#[test]
fn any_content_still_requires_declarations() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.any);

    sut.feed(Start(t.any, S1)).unwrap();

    assert!(matches!(
        sut.feed(Start(t.undeclared, S2)),
        Err(ValidateError::UndeclaredElement { .. })
    ));
}

#[test]
fn declare_model_reports_warnings() {
    let mut types = ElementTypes::new();
    let (doc, a, b, c) = (
        types.intern("DOC"),
        types.intern("A"),
        types.intern("B"),
        types.intern("C"),
    );

    let mut decls = ElementDecls::new(types);

    // ((A, B) | (A, C))
    let warnings = decls.declare_model(
        doc,
        &G::or([
            G::seq([G::element(a), G::element(b)]),
            G::seq([G::element(a), G::element(c)]),
        ]),
    );

    assert_eq!(1, warnings.ambiguities.len());
    assert_eq!(None, warnings.text_unreachable);

    // (#PCDATA, A)
    let warnings =
        decls.declare_model(a, &G::seq([G::text(), G::element(b)]));

    assert!(warnings.ambiguities.is_empty());
    assert!(warnings.text_unreachable.is_some());

    assert!(matches!(decls.get(doc), Some(DeclaredContent::Model(_))));
}

#[test]
fn redeclaration_replaces() {
    let (mut decls, t) = decls();

    assert_eq!(
        Some(DeclaredContent::RcData),
        decls.declare(t.title, DeclaredContent::CData),
    );
    assert_eq!(Some(&DeclaredContent::CData), decls.get(t.title));
}

#[test]
fn models_are_shared_across_validators() {
    let (decls, t) = decls();

    let mut a = Validator::new(&decls, t.doc);
    let mut b = Validator::new(&decls, t.doc);

    a.feed(Start(t.doc, S1)).unwrap();
    b.feed(Start(t.doc, S1)).unwrap();
    a.feed(Start(t.title, S2)).unwrap();

    // Each validator has its own match state.
    assert!(b.feed(Start(t.para, S3)).is_err());
    assert_eq!(Ok(()), b.feed(Start(t.title, S3)));
}

#[test]
fn display_summarizes_state() {
    let (decls, t) = decls();
    let mut sut = Validator::new(&decls, t.doc);

    assert_eq!("awaiting document element DOC", sut.to_string());

    sut.feed(Start(t.doc, S1)).unwrap();
    sut.feed(Start(t.title, S2)).unwrap();

    assert_eq!("within TITLE at depth 2 (text only)", sut.to_string());

    sut.feed(End(S3)).unwrap();
    sut.feed(Start(t.para, S4)).unwrap();
    sut.feed(End(S5)).unwrap();
    sut.feed(End(S6)).unwrap();

    assert_eq!("after document element", sut.to_string());
}

#[test]
fn event_span_and_display() {
    let ty = ElementType::from_index(0);

    assert_eq!(S3, Start(ty, S3).span());
    assert_eq!(S4, End(S4).span());
    assert_eq!(S5, Text(S5).span());
    assert!(Text(S5).to_string().starts_with("text at "));
}
