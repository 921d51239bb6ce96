//! Integration tests for header pair generation.
//!
//! Tests validate:
//! - Exact text of both units for a small list
//! - Manifest order is the emission order
//! - Deterministic output (same input → same bytes)
//! - Writing into the generated include directory

use gecko_codegen::{
    render_declarations, render_dispatch, CodegenError, GeneratedHeaders, DECLARATIONS_FILE,
    DISPATCH_FILE, MIT_LICENSE,
};
use gecko_types::{Code, CodeList};
use pretty_assertions::assert_eq;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn demo() -> CodeList {
    let mut list = CodeList::new("demo", "Demo Codes", "alice", "Melee", "GALE01")
        .with_code(
            Code::new("intro", "Intro Skip", "alice")
                .with_description("Skips the intro.\nHold B to disable."),
        )
        .with_code(Code::new("outro", "Fast Credits", "bob"));
    list.validate().unwrap();
    list
}

fn single() -> CodeList {
    let mut list = CodeList::new("demo", "Demo", "alice", "Melee", "GALE01")
        .with_code(Code::new("intro", "Intro", "alice").with_description("one\ntwo"));
    list.validate().unwrap();
    list
}

/// Index of every occurrence of `needle` in order.
fn positions(haystack: &str, needle: &str) -> Vec<usize> {
    haystack.match_indices(needle).map(|(i, _)| i).collect()
}

// ══════════════════════════════════════════════════════════════════════════════
// Exact text
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn declarations_unit_text() {
    let expected = format!(
        "{MIT_LICENSE}\n\n{}",
        r#"// Generated code output file from gecko-compile, do not modify.

#ifndef __GEN_STANDARD_DEFS_H__
#define __GEN_STANDARD_DEFS_H__
#include <stdio.h>
#include <stdint.h>
#include <gecko.h>

void intro(void);
void outro(void);
#endif
"#
    );
    assert_eq!(render_declarations(&demo()), expected);
}

#[test]
fn dispatch_unit_text() {
    let expected = format!(
        "{MIT_LICENSE}\n\n{}",
        r#"// Generated code output file from gecko-compile, do not modify.

#ifndef __GEN_STANDARD_H__
#define __GEN_STANDARD_H__
#include <__gen__/standard_defs.h>
#include <stdext/cmacros.h>

#define __STANDARD_USAGE_INTRO__ \
    "Demo by alice\n" \
    "USAGE: demo"

typedef enum __CLFFmt {
    CLF_DOLPHIN,
    CLF_GCT,
    CLF_OCARINA,
    CLF_RAW,
    CLF_RAWTEXT,
    CLF_NONE = 0xFF
} CLFFmt;

INLINE void printclf(CLFFmt lfmt) {
    if (lfmt == CLF_DOLPHIN) {
        fprintf(G_OutputHandle, "; Demo by alice\n[Gecko]\n");
    } else if (lfmt == CLF_GCT) {
        G_BeginGCT();
    } else if (lfmt == CLF_OCARINA) {
        fprintf(G_OutputHandle,
            "GALE01\nMelee\n\n"
            "Demo by alice\n\n"
        );
    }

    if (lfmt == CLF_DOLPHIN)
        fprintf(G_OutputHandle, "$Intro [alice]\n");
    else if (lfmt == CLF_OCARINA)
        fprintf(G_OutputHandle, "Intro [alice]\n");
    if (lfmt == CLF_DOLPHIN) {
        fprintf(G_OutputHandle, (
            "*one\n"
            "*two\n"
        ));
    } else if (lfmt == CLF_OCARINA) {
        fprintf(G_OutputHandle, (
            "one\n"
            "two\n"
            "\n"
        ));
    }
    intro();

    if (lfmt == CLF_GCT)
        G_EndGCT();
}
#endif
"#
    );
    assert_eq!(render_dispatch(&single()), expected);
}

#[test]
fn code_without_description_only_calls() {
    let dispatch = render_dispatch(&demo());
    let outro_header = dispatch.find("$Fast Credits [bob]").unwrap();
    let outro_call = dispatch.find("    outro();\n").unwrap();
    let between = &dispatch[outro_header..outro_call];
    assert!(!between.contains('*'), "{between}");
}

// ══════════════════════════════════════════════════════════════════════════════
// Order and determinism
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn dolphin_headers_follow_manifest_order() {
    let dispatch = render_dispatch(&demo());
    let intro = positions(&dispatch, "$Intro Skip [alice]");
    let outro = positions(&dispatch, "$Fast Credits [bob]");
    assert_eq!(intro.len(), 1);
    assert_eq!(outro.len(), 1);
    assert!(intro[0] < outro[0]);
}

#[test]
fn reordered_manifest_reorders_emission() {
    let mut reversed = demo();
    reversed.codes.reverse();

    let dispatch = render_dispatch(&reversed);
    assert!(dispatch.find("    outro();").unwrap() < dispatch.find("    intro();").unwrap());

    let declarations = render_declarations(&reversed);
    assert!(declarations.find("void outro(void);").unwrap() < declarations.find("void intro(void);").unwrap());
}

#[test]
fn duplicate_files_are_not_deduplicated() {
    let mut list = demo();
    list.codes.push(Code::new("intro", "Intro Again", "carol"));
    assert_eq!(positions(&render_declarations(&list), "void intro(void);").len(), 2);
    assert_eq!(positions(&render_dispatch(&list), "    intro();\n").len(), 2);
}

#[test]
fn generation_is_deterministic() {
    let a = GeneratedHeaders::generate(&demo());
    let b = GeneratedHeaders::generate(&demo());
    assert_eq!(a, b);
}

#[test]
fn ocarina_description_ends_with_blank_line() {
    let dispatch = render_dispatch(&demo());
    assert!(dispatch.contains(
        "            \"Skips the intro.\\n\"\n            \"Hold B to disable.\\n\"\n            \"\\n\"\n"
    ));
}

// ══════════════════════════════════════════════════════════════════════════════
// Writing
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn write_to_creates_both_units() {
    let dir = tempfile::tempdir().unwrap();
    let headers = GeneratedHeaders::generate(&demo());
    let (declarations, dispatch) = headers.write_to(dir.path()).unwrap();

    assert_eq!(declarations, dir.path().join(DECLARATIONS_FILE));
    assert_eq!(dispatch, dir.path().join(DISPATCH_FILE));
    assert_eq!(std::fs::read_to_string(&declarations).unwrap(), headers.declarations);
    assert_eq!(std::fs::read_to_string(&dispatch).unwrap(), headers.dispatch);
}

#[test]
fn write_to_rejects_directory_in_place_of_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(DISPATCH_FILE)).unwrap();
    let err = GeneratedHeaders::generate(&demo())
        .write_to(dir.path())
        .unwrap_err();
    assert!(matches!(err, CodegenError::OccupiedByDirectory(_)), "{err}");
}

#[test]
fn write_to_requires_directory() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain");
    std::fs::write(&file, "").unwrap();

    let headers = GeneratedHeaders::generate(&demo());
    assert!(matches!(
        headers.write_to(&file).unwrap_err(),
        CodegenError::NotADirectory(_)
    ));
    assert!(matches!(
        headers.write_to(&dir.path().join("missing")).unwrap_err(),
        CodegenError::MissingDirectory(_)
    ));
}
