//! The filters the end-to-end suites compile with.
//!
//! `template` is a tiny directive language over `{{ ... }}` blocks. Each
//! directive reads the site through [`Assigns`], so the dependencies a real
//! templating filter would create are created here too:
//!
//! | directive              | expands to                                   |
//! |------------------------|----------------------------------------------|
//! | `{{yield}}`            | content wrapped by the current layout        |
//! | `{{param key}}`        | a filter or layout param                     |
//! | `{{title}}`            | the `title` attribute of the current item    |
//! | `{{include /a.md}}`    | compiled `pre` content of `/a.md`            |
//! | `{{include /a.md@s}}`  | compiled content of `/a.md` at snapshot `s`  |
//! | `{{raw /a.md}}`        | raw content of `/a.md`                       |
//! | `{{attr /a.md key}}`   | attribute `key` of `/a.md`                   |
//! | `{{path /a.md}}`       | output path of `/a.md`                       |
//! | `{{list /blog/*}}`     | identifiers matching a glob, comma separated |

use std::sync::atomic::{AtomicU64, Ordering};

use quire_compiler::{Assigns, FilterError, FilterRegistry, FnFilter};
use quire_model::{Content, Params, Pattern, DEFAULT_REP};

static CLOCK: AtomicU64 = AtomicU64::new(0);

/// Returns `upcase`, `template`, `clock` and `deprecated`.
pub fn standard_filters() -> FilterRegistry {
    let mut filters = FilterRegistry::new();
    filters
        .register("upcase", FnFilter::new(upcase))
        .register("template", FnFilter::new(template))
        .register("clock", FnFilter::new(clock).always_outdated())
        .register("deprecated", FnFilter::new(deprecated));
    filters
}

fn upcase(input: &Content, _: &Params, _: &mut Assigns<'_>) -> Result<Content, FilterError> {
    Ok(Content::from(text_of(input, "upcase")?.to_uppercase()))
}

/// Appends a tick that differs on every call.
fn clock(input: &Content, _: &Params, _: &mut Assigns<'_>) -> Result<Content, FilterError> {
    let tick = CLOCK.fetch_add(1, Ordering::Relaxed);
    Ok(Content::from(format!("{} @{tick}", text_of(input, "clock")?)))
}

fn deprecated(
    input: &Content,
    _: &Params,
    assigns: &mut Assigns<'_>,
) -> Result<Content, FilterError> {
    assigns.warn("the 'deprecated' filter will be removed");
    Ok(input.clone())
}

fn template(
    input: &Content,
    params: &Params,
    assigns: &mut Assigns<'_>,
) -> Result<Content, FilterError> {
    let source = text_of(input, "template")?;
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| failed("unterminated '{{'"))?;
        out.push_str(&expand(after[..end].trim(), params, assigns)?);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(Content::from(out))
}

fn expand(
    directive: &str,
    params: &Params,
    assigns: &mut Assigns<'_>,
) -> Result<String, FilterError> {
    let (name, arg) = match directive.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (directive, ""),
    };
    match name {
        "yield" => match assigns.yielded() {
            Some(content) => Ok(text_of(content, "template")?.to_string()),
            None => Err(failed("'yield' outside of a layout")),
        },
        "param" => Ok(params.get(arg).map(json_text).unwrap_or_default()),
        "title" => Ok(assigns
            .item()
            .attribute("title")
            .map(json_text)
            .unwrap_or_default()),
        "include" => {
            let (identifier, snapshot) = match arg.split_once('@') {
                Some((identifier, snapshot)) => (identifier, Some(snapshot)),
                None => (arg, None),
            };
            let content = assigns.compiled_content_of(identifier, DEFAULT_REP, snapshot)?;
            Ok(text_of(content, "template")?.to_string())
        }
        "raw" => {
            let content = assigns.raw_content_of(arg)?;
            Ok(text_of(content, "template")?.to_string())
        }
        "attr" => {
            let (identifier, key) = arg
                .split_once(' ')
                .ok_or_else(|| failed("'attr' needs an identifier and a key"))?;
            Ok(assigns
                .attribute_of(identifier, key.trim())?
                .map(json_text)
                .unwrap_or_default())
        }
        "path" => Ok(assigns
            .path_of(arg, DEFAULT_REP)?
            .unwrap_or_default()
            .to_string()),
        "list" => {
            let pattern = Pattern::glob(arg).map_err(|e| failed(&e.to_string()))?;
            let found: Vec<&str> = assigns
                .identifiers_matching(&pattern)
                .into_iter()
                .map(|id| id.as_str())
                .collect();
            Ok(found.join(","))
        }
        other => Err(failed(&format!("unknown directive '{other}'"))),
    }
}

fn text_of<'c>(content: &'c Content, filter: &str) -> Result<&'c str, FilterError> {
    content.as_text().ok_or_else(|| FilterError::WrongContentKind {
        filter: filter.to_string(),
        found: "binary",
    })
}

fn json_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn failed(message: &str) -> FilterError {
    FilterError::Failed {
        filter: "template".to_string(),
        message: message.to_string(),
    }
}
