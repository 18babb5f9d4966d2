//! The builtin rule catalog.
//!
//! Rule order matters: broader element rules run before the cleanup pass so a
//! tag matched by more than one rule is collapsed back to a single injection.

use crate::Rule;
use anyhow::Context;
use regex::Regex;

struct RuleSpec {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    pattern: &'static str,
    /// Replacement template; `{a}` is substituted with the prop assignment.
    replacement: &'static str,
}

const INJECTION_SPECS: &[RuleSpec] = &[
    RuleSpec {
        id: "card.with_class",
        title: "Inject prop into <Card className=...>",
        description: "Targets Card opening tags that lead with a className \
                      attribute and inserts the prop between the tag name and \
                      className.",
        pattern: r"<Card className=",
        replacement: "<Card {a} className=",
    },
    RuleSpec {
        id: "card.bare",
        title: "Inject prop into bare <Card>",
        description: "Targets Card opening tags with no attributes at all \
                      (only whitespace before the closing '>') and inserts \
                      the prop before the '>'.",
        pattern: r"<Card\s*>",
        replacement: "<Card {a}>",
    },
    RuleSpec {
        id: "card_header.title",
        title: "Inject prop into <CardHeader title=...>",
        description: "Targets CardHeader opening tags followed by a title \
                      attribute and inserts the prop before title.",
        pattern: r"<CardHeader\s+(title=)",
        replacement: "<CardHeader {a} ${1}",
    },
    RuleSpec {
        id: "input.labelled",
        title: "Inject prop into <Input label|value|placeholder=...>",
        description: "Targets direct Input usages, recognized by leading with \
                      one of the label, value or placeholder attributes, and \
                      inserts the prop before the matched attribute.",
        pattern: r"<Input\s+(label|value|placeholder)=",
        replacement: "<Input {a} ${1}=",
    },
    RuleSpec {
        id: "tab_button.active",
        title: "Inject prop into <TabButton active=...>",
        description: "Targets TabButton opening tags followed by an active \
                      attribute and inserts the prop before active.",
        pattern: r"<TabButton\s+(active=)",
        replacement: "<TabButton {a} ${1}",
    },
    RuleSpec {
        id: "dynamic_table.newline",
        title: "Inject prop into multi-line <DynamicTable",
        description: "Targets DynamicTable opening tags that break to a new \
                      line before their first attribute; the prop lands on \
                      the tag-name line and the line break is preserved.",
        pattern: "<DynamicTable\\s*\n",
        replacement: "<DynamicTable {a}\n",
    },
    RuleSpec {
        id: "dynamic_table.columns",
        title: "Inject prop into <DynamicTable columns=...>",
        description: "Targets DynamicTable opening tags followed directly by \
                      a columns attribute and inserts the prop before \
                      columns.",
        pattern: r"<DynamicTable\s+(columns=)",
        replacement: "<DynamicTable {a} ${1}",
    },
    RuleSpec {
        id: "button.add_product",
        title: "Inject prop into the add-product <Button>",
        description: "Targets the one Button bound to the addProduct handler, \
                      identified by its literal onClick text, and inserts the \
                      prop after the tag name.",
        pattern: r"<Button onClick=\{addProduct\}",
        replacement: "<Button {a} onClick={addProduct}",
    },
    RuleSpec {
        id: "button.handle_submit",
        title: "Inject prop into the submit <Button>",
        description: "Targets the one Button bound to the handleSubmit \
                      handler, identified by its literal onClick text, and \
                      inserts the prop after the tag name.",
        pattern: r"<Button onClick=\{handleSubmit\}",
        replacement: "<Button {a} onClick={handleSubmit}",
    },
];

pub(crate) fn injection_rules(assignment: &str) -> anyhow::Result<Vec<Rule>> {
    INJECTION_SPECS
        .iter()
        .map(|spec| {
            let pattern = Regex::new(spec.pattern)
                .with_context(|| format!("compile pattern for rule {}", spec.id))?;
            Ok(Rule {
                id: spec.id,
                title: spec.title,
                description: spec.description,
                pattern,
                replacement: spec.replacement.replace("{a}", assignment),
            })
        })
        .collect()
}

/// Collapse whitespace-separated runs of the assignment to one occurrence.
///
/// Matching whole runs rather than adjacent pairs keeps the pass idempotent:
/// three or more copies still collapse in a single application.
pub(crate) fn cleanup_rule(assignment: &str) -> anyhow::Result<Rule> {
    let escaped = regex::escape(assignment);
    let pattern = Regex::new(&format!(r"(?:{escaped}\s+)+{escaped}"))
        .context("compile cleanup pattern")?;
    Ok(Rule {
        id: "cleanup.duplicate_prop",
        title: "Collapse duplicate prop injections",
        description: "Collapses any run of two or more consecutive copies of \
                      the injected assignment, which can occur when an \
                      element's opening tag matches more than one injection \
                      rule, into a single occurrence.",
        pattern,
        replacement: assignment.to_string(),
    })
}
