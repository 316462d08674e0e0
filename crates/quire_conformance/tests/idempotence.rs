//! Rebuilding an unchanged site does no work and produces the same output.

use quire_conformance::{key, layout_rules, recompiled, template_rules, TestSite};
use quire_outdated::Reason;

fn blog() -> TestSite {
    let mut site = TestSite::new();
    site.item("/a.md", "A {{include /b.md}}")
        .item("/b.md", "b")
        .layout("/default.html", "<{{yield}}>");
    site
}

// ---------------------------------------------------------------------------
// Unchanged sites
// ---------------------------------------------------------------------------

#[test]
fn first_run_compiles_everything() {
    let site = blog();
    let summary = site.compile(layout_rules()).unwrap();
    assert_eq!(summary.recompiled.len(), 2);
    assert!(summary
        .recompiled
        .values()
        .all(|r| *r == Reason::CodeModified));
    assert!(summary.reused.is_empty());
    assert_eq!(site.output("/a/index.html").as_deref(), Some("<A b>"));
    assert_eq!(site.output("/b/index.html").as_deref(), Some("<b>"));
}

#[test]
fn second_run_recompiles_nothing() {
    let site = blog();
    site.compile(layout_rules()).unwrap();

    let summary = site.compile(layout_rules()).unwrap();
    assert!(summary.recompiled.is_empty(), "{:?}", summary.recompiled);
    assert!(summary.written.is_empty());
    assert_eq!(summary.reused.len(), 2);
    assert_eq!(summary.to_string(), "0 recompiled, 2 reused, 0 written");
    assert_eq!(site.output("/a/index.html").as_deref(), Some("<A b>"));
}

#[test]
fn many_runs_stay_stable() {
    let site = blog();
    for _ in 0..4 {
        site.compile(layout_rules()).unwrap();
    }
    let summary = site.compile(layout_rules()).unwrap();
    assert!(summary.recompiled.is_empty());
    assert_eq!(site.output("/b/index.html").as_deref(), Some("<b>"));
}

#[test]
fn empty_site_compiles() {
    let site = TestSite::new();
    let summary = site.compile(template_rules()).unwrap();
    assert!(summary.recompiled.is_empty());
    assert!(summary.written.is_empty());
}

// ---------------------------------------------------------------------------
// Outputs touched outside the compiler
// ---------------------------------------------------------------------------

#[test]
fn deleted_output_is_written_again() {
    let site = blog();
    site.compile(layout_rules()).unwrap();
    std::fs::remove_file(site.output_file("/a/index.html")).unwrap();

    let summary = site.compile(layout_rules()).unwrap();
    assert_eq!(summary.recompiled.get(&key("/a.md")), Some(&Reason::NotWritten));
    assert!(summary.reused.contains(&key("/b.md")));
    assert_eq!(site.output("/a/index.html").as_deref(), Some("<A b>"));
}

#[test]
fn identical_content_is_not_rewritten() {
    let site = blog();
    site.compile(layout_rules()).unwrap();
    std::fs::remove_file(site.output_file("/b/index.html")).unwrap();

    let summary = site.compile(layout_rules()).unwrap();
    // /a.md includes /b.md, but rewriting a file does not change content.
    assert_eq!(recompiled(&summary), vec!["/b.md"]);
    assert_eq!(summary.written, vec![site.output_file("/b/index.html")]);
}
