//! End-to-end test harness for the quire incremental compiler.
//!
//! A [`TestSite`] owns a temporary site directory with a `quire.toml` and an
//! in-memory set of items and layouts. Suites edit the documents between
//! runs and compile the same directory again, which is exactly what a user
//! rebuilding a site does.

#![warn(missing_docs)]

pub mod filters;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quire_common::Identifier;
use quire_compiler::{CompileError, CompileSummary, Compiler};
use quire_config::{load_config, store_path, SiteConfig, CONFIG_FILE};
use quire_model::{Content, Document, Item, Layout, Params, Pattern, RepKey, DEFAULT_REP};
use quire_rules::RulesCollection;
use tempfile::TempDir;

pub use filters::standard_filters;

/// Configuration written by [`TestSite::new`].
pub const DEFAULT_CONFIG: &str = r#"
[site]
output_dir = "output"
tmp_dir = "tmp"
"#;

/// A site on disk whose documents the test controls.
pub struct TestSite {
    dir: TempDir,
    items: BTreeMap<String, Item>,
    layouts: BTreeMap<String, Layout>,
}

impl Default for TestSite {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSite {
    /// Creates an empty site with [`DEFAULT_CONFIG`].
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CONFIG)
    }

    /// Creates an empty site with the given `quire.toml` content.
    pub fn with_config(toml: &str) -> Self {
        let site = Self {
            dir: tempfile::tempdir().unwrap(),
            items: BTreeMap::new(),
            layouts: BTreeMap::new(),
        };
        site.write_config(toml);
        site
    }

    /// Replaces `quire.toml`.
    pub fn write_config(&self, toml: &str) {
        std::fs::write(self.path().join(CONFIG_FILE), toml).unwrap();
    }

    /// The site root directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The configuration as the compiler sees it.
    pub fn config(&self) -> SiteConfig {
        load_config(self.path()).unwrap()
    }

    /// Adds or replaces an item.
    pub fn item(&mut self, identifier: &str, content: impl Into<Content>) -> &mut Self {
        self.put_item(document(identifier, content))
    }

    /// Adds or replaces an item that carries attributes.
    pub fn item_with(
        &mut self,
        identifier: &str,
        content: impl Into<Content>,
        attributes: &[(&str, serde_json::Value)],
    ) -> &mut Self {
        let mut item = document(identifier, content);
        for (key, value) in attributes {
            item = item.with_attribute(*key, value.clone());
        }
        self.put_item(item)
    }

    /// Removes an item.
    pub fn remove_item(&mut self, identifier: &str) -> &mut Self {
        self.items.remove(identifier);
        self
    }

    /// Adds or replaces a layout.
    pub fn layout(&mut self, identifier: &str, content: impl Into<Content>) -> &mut Self {
        self.layouts
            .insert(identifier.to_string(), document(identifier, content));
        self
    }

    /// Compiles the current documents with `rules` and the standard filters.
    pub fn compile(&self, rules: RulesCollection) -> Result<CompileSummary, CompileError> {
        let compiler = Compiler::new(self.config(), rules, standard_filters());
        compiler.compile_documents(
            self.items.values().cloned().collect(),
            self.layouts.values().cloned().collect(),
        )
    }

    /// Text of an output file, by output path.
    pub fn output(&self, path: &str) -> Option<String> {
        std::fs::read_to_string(self.output_file(path)).ok()
    }

    /// Bytes of an output file, by output path.
    pub fn output_bytes(&self, path: &str) -> Option<Vec<u8>> {
        std::fs::read(self.output_file(path)).ok()
    }

    /// Absolute location of an output path.
    pub fn output_file(&self, path: &str) -> PathBuf {
        self.config()
            .output_root()
            .join(path.trim_start_matches('/'))
    }

    /// Base path of the store called `name`, as the compiler derives it.
    pub fn store_base(&self, name: &str) -> PathBuf {
        store_path(&self.config(), name)
    }

    fn put_item(&mut self, item: Item) -> &mut Self {
        self.items.insert(item.identifier.to_string(), item);
        self
    }
}

fn document(identifier: &str, content: impl Into<Content>) -> Document {
    Document::new(Identifier::new(identifier).unwrap(), content)
}

/// Shorthand for a glob pattern.
pub fn glob(pattern: &str) -> Pattern {
    Pattern::glob(pattern).unwrap()
}

/// Key of the default rep of an item.
pub fn key(identifier: &str) -> RepKey {
    RepKey::new(Identifier::new(identifier).unwrap(), DEFAULT_REP)
}

/// Identifiers of the items whose default rep was recompiled, sorted.
pub fn recompiled(summary: &CompileSummary) -> Vec<String> {
    summary
        .recompiled
        .keys()
        .map(|k| k.item.to_string())
        .collect()
}

/// Routes every item to `<identifier without extension>/index.html`.
pub fn route_to_index(rules: &mut RulesCollection) -> &mut RulesCollection {
    rules.route(glob("/**/*"), |ctx| {
        Some(format!(
            "{}/index.html",
            ctx.item.identifier.without_extension()
        ))
    })
}

/// Every item runs through `template` and is routed to an `index.html`.
pub fn template_rules() -> RulesCollection {
    let mut rules = RulesCollection::new();
    rules.compile(glob("/**/*"), |ctx| {
        ctx.filter("template", Params::new());
        Ok(())
    });
    route_to_index(&mut rules);
    rules
}

/// Like [`template_rules`], then laid out with `/default.*`, which is
/// itself rendered with `template`.
pub fn layout_rules() -> RulesCollection {
    let mut rules = RulesCollection::new();
    rules.compile(glob("/**/*"), |ctx| {
        ctx.filter("template", Params::new())
            .layout("/default.*", Params::new());
        Ok(())
    });
    route_to_index(&mut rules);
    rules.layout(glob("/**/*"), "template", Params::new());
    rules
}
