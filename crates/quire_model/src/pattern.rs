//! Identifier patterns used by compile rules, routing rules and layout lookup.
//!
//! Globs follow the usual conventions:
//!
//! - `*` matches any run of characters except `/`
//! - `**/` matches zero or more whole directories
//! - `?` matches one character except `/`
//! - `[abc]` / `[!abc]` match a character class
//! - `{md,html}` matches one of the alternatives

use regex::Regex;
use std::fmt;

use crate::error::ModelError;

/// A compiled identifier pattern.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles a glob pattern.
    pub fn glob(glob: &str) -> Result<Self, ModelError> {
        let translated = glob_to_regex(glob).map_err(|reason| ModelError::InvalidPattern {
            pattern: glob.to_string(),
            reason,
        })?;
        Self::compile(glob, &translated)
    }

    /// Compiles a raw regular expression. It is matched unanchored, like a
    /// regex search.
    pub fn regex(re: &str) -> Result<Self, ModelError> {
        Self::compile(re, re)
    }

    fn compile(source: &str, re: &str) -> Result<Self, ModelError> {
        let regex = Regex::new(re).map_err(|e| ModelError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Returns `true` if the identifier matches.
    pub fn matches(&self, identifier: &str) -> bool {
        self.regex.is_match(identifier)
    }

    /// Returns the pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({})", self.source)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn glob_to_regex(glob: &str) -> Result<String, String> {
    let mut out = String::from("^");
    let chars: Vec<char> = glob.chars().collect();
    let mut i = 0;
    let mut in_braces = false;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    out.push_str("(?:[^/]*/)*");
                    i += 3;
                } else {
                    out.push_str(".*");
                    i += 2;
                }
                continue;
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|p| p + i + 1)
                    .ok_or_else(|| "unterminated character class".to_string())?;
                out.push('[');
                let mut body = &chars[i + 1..close];
                if body.first() == Some(&'!') {
                    out.push('^');
                    body = &body[1..];
                }
                for &b in body {
                    if b == '\\' || b == '[' || b == '^' {
                        out.push('\\');
                    }
                    out.push(b);
                }
                out.push(']');
                i = close + 1;
                continue;
            }
            '{' if !in_braces => {
                in_braces = true;
                out.push_str("(?:");
            }
            '{' => return Err("nested braces are not supported".to_string()),
            ',' if in_braces => out.push('|'),
            '}' if in_braces => {
                in_braces = false;
                out.push(')');
            }
            _ => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    if in_braces {
        return Err("unterminated alternation".to_string());
    }
    out.push('$');
    Ok(out)
}
