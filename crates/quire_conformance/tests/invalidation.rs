//! A change recompiles exactly the reps that can observe it.

use quire_common::Identifier;
use quire_conformance::{
    glob, key, layout_rules, recompiled, route_to_index, template_rules, TestSite,
};
use quire_model::{DocumentRef, Params};
use quire_outdated::Reason;
use quire_rules::RulesCollection;
use serde_json::json;

fn item_ref(identifier: &str) -> DocumentRef {
    DocumentRef::item(Identifier::new(identifier).unwrap())
}

fn through(identifier: &str) -> Reason {
    Reason::DependenciesOutdated {
        dependency: item_ref(identifier),
    }
}

// ---------------------------------------------------------------------------
// Content and attributes
// ---------------------------------------------------------------------------

#[test]
fn content_change_reaches_compiled_content_readers() {
    let mut site = TestSite::new();
    site.item("/a.md", "{{include /b.md}}")
        .item("/b.md", "b")
        .item("/c.md", "c")
        .item("/d.md", "{{raw /c.md}}");
    site.compile(template_rules()).unwrap();

    site.item("/b.md", "b2");
    let summary = site.compile(template_rules()).unwrap();
    assert_eq!(recompiled(&summary), vec!["/a.md", "/b.md"]);
    assert_eq!(summary.recompiled[&key("/b.md")], Reason::ContentModified);
    assert_eq!(summary.recompiled[&key("/a.md")], through("/b.md"));
    assert_eq!(site.output("/a/index.html").as_deref(), Some("b2"));
}

#[test]
fn content_change_reaches_raw_content_readers() {
    let mut site = TestSite::new();
    site.item("/c.md", "c").item("/d.md", "{{raw /c.md}}");
    site.compile(template_rules()).unwrap();

    site.item("/c.md", "c2");
    let summary = site.compile(template_rules()).unwrap();
    assert_eq!(recompiled(&summary), vec!["/c.md", "/d.md"]);
    assert_eq!(site.output("/d/index.html").as_deref(), Some("c2"));
}

#[test]
fn change_propagates_transitively() {
    let mut site = TestSite::new();
    site.item("/a.md", "{{include /b.md}}")
        .item("/b.md", "{{include /c.md}}")
        .item("/c.md", "c");
    site.compile(template_rules()).unwrap();

    site.item("/c.md", "c2");
    let summary = site.compile(template_rules()).unwrap();
    assert_eq!(recompiled(&summary), vec!["/a.md", "/b.md", "/c.md"]);
    assert_eq!(site.output("/a/index.html").as_deref(), Some("c2"));
}

#[test]
fn attribute_change_reaches_attribute_readers() {
    let mut site = TestSite::new();
    site.item("/a.md", "{{attr /b.md title}}")
        .item_with("/b.md", "b", &[("title", json!("One"))]);
    site.compile(template_rules()).unwrap();
    assert_eq!(site.output("/a/index.html").as_deref(), Some("One"));

    site.item_with("/b.md", "b", &[("title", json!("Two"))]);
    let summary = site.compile(template_rules()).unwrap();
    assert_eq!(summary.recompiled[&key("/b.md")], Reason::AttributesModified);
    assert_eq!(summary.recompiled[&key("/a.md")], through("/b.md"));
    assert_eq!(site.output("/a/index.html").as_deref(), Some("Two"));
}

#[test]
fn content_change_does_not_reach_attribute_readers() {
    let mut site = TestSite::new();
    site.item("/a.md", "{{attr /b.md title}}")
        .item_with("/b.md", "b", &[("title", json!("One"))]);
    site.compile(template_rules()).unwrap();

    site.item_with("/b.md", "b2", &[("title", json!("One"))]);
    let summary = site.compile(template_rules()).unwrap();
    assert_eq!(recompiled(&summary), vec!["/b.md"]);
}

#[test]
fn content_change_does_not_reach_path_readers() {
    let mut site = TestSite::new();
    site.item("/a.md", "{{path /b.md}}").item("/b.md", "b");
    site.compile(template_rules()).unwrap();
    assert_eq!(site.output("/a/index.html").as_deref(), Some("/b/index.html"));

    site.item("/b.md", "b2");
    let summary = site.compile(template_rules()).unwrap();
    assert_eq!(recompiled(&summary), vec!["/b.md"]);
    assert!(summary.reused.contains(&key("/a.md")));
}

#[test]
fn own_attribute_change_only_recompiles_the_item() {
    let mut site = TestSite::new();
    site.item_with("/a.md", "{{title}}", &[("title", json!("Hello"))])
        .item("/b.md", "b");
    site.compile(template_rules()).unwrap();

    site.item_with("/a.md", "{{title}}", &[("title", json!("Bye"))]);
    let summary = site.compile(template_rules()).unwrap();
    assert_eq!(recompiled(&summary), vec!["/a.md"]);
    assert_eq!(site.output("/a/index.html").as_deref(), Some("Bye"));
}

// ---------------------------------------------------------------------------
// Added and removed documents
// ---------------------------------------------------------------------------

#[test]
fn added_item_reaches_listings() {
    let mut site = TestSite::new();
    site.item("/index.md", "{{list /blog/*}}")
        .item("/blog/one.md", "1")
        .item("/about.md", "about");
    site.compile(template_rules()).unwrap();
    assert_eq!(site.output("/index/index.html").as_deref(), Some("/blog/one.md"));

    site.item("/blog/two.md", "2");
    let summary = site.compile(template_rules()).unwrap();
    assert_eq!(recompiled(&summary), vec!["/blog/two.md", "/index.md"]);
    assert_eq!(summary.recompiled[&key("/blog/two.md")], Reason::DocumentAdded);
    assert_eq!(
        site.output("/index/index.html").as_deref(),
        Some("/blog/one.md,/blog/two.md")
    );
}

#[test]
fn empty_listing_sees_its_first_match() {
    let mut site = TestSite::new();
    site.item("/index.md", "[{{list /blog/*}}]");
    site.compile(template_rules()).unwrap();
    assert_eq!(site.output("/index/index.html").as_deref(), Some("[]"));

    site.item("/blog/one.md", "1");
    let summary = site.compile(template_rules()).unwrap();
    assert_eq!(recompiled(&summary), vec!["/blog/one.md", "/index.md"]);
    assert_eq!(
        summary.recompiled[&key("/index.md")],
        Reason::DependenciesOutdated {
            dependency: DocumentRef::item_collection()
        }
    );
    assert_eq!(site.output("/index/index.html").as_deref(), Some("[/blog/one.md]"));
}

#[test]
fn removed_item_reaches_its_dependents() {
    let mut site = TestSite::new();
    site.item("/index.md", "{{list /blog/*}}")
        .item("/blog/one.md", "1")
        .item("/blog/two.md", "2");
    site.compile(template_rules()).unwrap();

    site.remove_item("/blog/two.md");
    let summary = site.compile(template_rules()).unwrap();
    assert_eq!(recompiled(&summary), vec!["/index.md"]);
    assert_eq!(site.output("/index/index.html").as_deref(), Some("/blog/one.md"));
}

// ---------------------------------------------------------------------------
// Layouts, rules and configuration
// ---------------------------------------------------------------------------

#[test]
fn layout_change_recompiles_every_user() {
    let mut site = TestSite::new();
    site.item("/a.md", "a")
        .item("/b.md", "b")
        .layout("/default.html", "<{{yield}}>");
    site.compile(layout_rules()).unwrap();

    site.layout("/default.html", "[{{yield}}]");
    let summary = site.compile(layout_rules()).unwrap();
    let layout = DocumentRef::layout(Identifier::new("/default.html").unwrap());
    assert_eq!(
        summary.recompiled[&key("/a.md")],
        Reason::DependenciesOutdated { dependency: layout }
    );
    assert_eq!(summary.recompiled.len(), 2);
    assert_eq!(site.output("/a/index.html").as_deref(), Some("[a]"));
}

#[test]
fn changed_rule_body_recompiles_with_new_memory() {
    let mut site = TestSite::new();
    site.item("/a.md", "a").item("/b.md", "b");
    site.compile(template_rules()).unwrap();

    let mut rules = RulesCollection::new();
    rules.compile(glob("/**/*"), |ctx| {
        ctx.filter("template", Params::new())
            .filter("upcase", Params::new());
        Ok(())
    });
    route_to_index(&mut rules);
    let summary = site.compile(rules).unwrap();
    assert!(summary
        .recompiled
        .values()
        .all(|r| *r == Reason::RulesModified));
    assert_eq!(summary.recompiled.len(), 2);
    assert_eq!(site.output("/b/index.html").as_deref(), Some("B"));
}

#[test]
fn configuration_change_recompiles_everything() {
    let mut site = TestSite::new();
    site.item("/a.md", "a").item("/b.md", "b");
    site.compile(template_rules()).unwrap();

    site.write_config(
        r#"
[site]
output_dir = "output"
tmp_dir = "tmp"

[params]
title = "My Site"
"#,
    );
    let summary = site.compile(template_rules()).unwrap();
    assert_eq!(summary.recompiled.len(), 2);
    assert!(summary
        .recompiled
        .values()
        .all(|r| *r == Reason::ConfigurationModified));
}

#[test]
fn always_outdated_filter_recompiles_every_run() {
    let mut site = TestSite::new();
    site.item("/clock.md", "now").item("/a.md", "a");
    let rules = || {
        let mut rules = template_rules();
        rules.compile(glob("/clock.md"), |ctx| {
            ctx.filter("clock", Params::new());
            Ok(())
        });
        rules
    };
    site.compile(rules()).unwrap();

    let summary = site.compile(rules()).unwrap();
    assert_eq!(recompiled(&summary), vec!["/clock.md"]);
    assert_eq!(
        summary.recompiled[&key("/clock.md")],
        Reason::UsesAlwaysOutdatedFilter {
            filter: "clock".to_string()
        }
    );
    assert_eq!(summary.written, vec![site.output_file("/clock/index.html")]);
}
