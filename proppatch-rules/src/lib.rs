//! Substitution rule catalog for proppatch.
//!
//! This crate owns *what* gets rewritten: the ordered injection rules and the
//! cleanup rule that collapses duplicate injections. It does not own file I/O
//! or reporting; that's the `proppatch-edit` crate.

use anyhow::Context;
use regex::Regex;

mod catalog;

/// Default prop injected when the caller does not override it.
pub const DEFAULT_PROP: &str = "darkMode";

/// A single pattern/replacement pair, applied globally over a buffer.
#[derive(Debug, Clone)]
pub struct Rule {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    pattern: Regex,
    replacement: String,
}

impl Rule {
    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Apply the rule to the whole buffer.
    ///
    /// Returns the rewritten buffer and the number of non-overlapping matches
    /// that were replaced. Zero matches returns the input unchanged.
    pub fn apply(&self, buffer: &str) -> (String, u64) {
        let matches = self.pattern.find_iter(buffer).count() as u64;
        if matches == 0 {
            return (buffer.to_string(), 0);
        }
        let rewritten = self
            .pattern
            .replace_all(buffer, self.replacement.as_str())
            .into_owned();
        (rewritten, matches)
    }
}

/// The ordered rule pipeline for one prop name.
///
/// Injection rules run first, in catalog order; the cleanup rule runs last and
/// collapses any whitespace-separated run of the injected assignment down to a
/// single occurrence.
#[derive(Debug, Clone)]
pub struct RuleSet {
    prop: String,
    assignment: String,
    rules: Vec<Rule>,
    cleanup: Rule,
}

impl RuleSet {
    /// Build the rule set for a prop name.
    ///
    /// The prop must be a plain identifier; anything else would be spliced
    /// into replacement text (and, escaped, into the cleanup pattern) and is
    /// rejected up front.
    pub fn for_prop(prop: &str) -> anyhow::Result<Self> {
        if !is_identifier(prop) {
            anyhow::bail!("invalid prop name '{}': expected an identifier", prop);
        }

        let assignment = format!("{prop}={{{prop}}}");
        let rules = catalog::injection_rules(&assignment)
            .with_context(|| format!("compile injection rules for prop '{}'", prop))?;
        let cleanup = catalog::cleanup_rule(&assignment)
            .with_context(|| format!("compile cleanup rule for prop '{}'", prop))?;

        Ok(Self {
            prop: prop.to_string(),
            assignment,
            rules,
            cleanup,
        })
    }

    pub fn prop(&self) -> &str {
        &self.prop
    }

    /// The injected attribute text, e.g. `darkMode={darkMode}`.
    pub fn assignment(&self) -> &str {
        &self.assignment
    }

    /// Injection rules in application order; the cleanup rule is not included.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn cleanup(&self) -> &Rule {
        &self.cleanup
    }

    /// Find a rule (including the cleanup rule) by id.
    ///
    /// Lookup is case-insensitive and treats `-` and `_` as equivalent, so
    /// `card-header.title` finds `card_header.title`.
    pub fn lookup(&self, key: &str) -> Option<&Rule> {
        let normalized = normalize_key(key);
        self.rules
            .iter()
            .chain(std::iter::once(&self.cleanup))
            .find(|r| normalize_key(r.id) == normalized)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('-', "_")
}
