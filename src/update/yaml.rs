//! Targeted edits of YAML files that leave untouched lines byte-identical.
//!
//! Only block sequences of mappings under a top-level key are addressed by
//! the line editor. Anything else falls back to a full `serde_yaml` rewrite,
//! which loses comments and formatting.
use log::*;
use regex::Regex;
use serde_yaml::Value;
use std::{ops::Range, path::Path, sync::LazyLock};

use crate::{
    error::{FreshenError, Result},
    scanner::util::scalar_string,
};

static FIELD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_][A-Za-z0-9_.-]*)(\s*:)(\s*)(.*)$").unwrap()
});

/// Sets `field` to `value` on every item of the top-level sequence
/// `sequence` whose `key` equals `key_value`.
#[derive(Debug, Clone, Copy)]
pub struct RecordEdit<'a> {
    pub sequence: &'a str,
    pub key: &'a str,
    pub key_value: &'a str,
    pub field: &'a str,
    pub value: &'a str,
}

/// A scalar as written on a line: where it sits and how it was quoted.
struct Scalar<'a> {
    span: Range<usize>,
    quote: Option<char>,
    text: &'a str,
}

struct Item {
    lines: Range<usize>,
    field_indent: usize,
}

fn body(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

fn indent(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Offset of the content after a `- ` sequence marker at `at`, if any.
fn item_content(line: &str, at: usize) -> Option<usize> {
    let rest = &line[at..];
    if rest == "-" {
        return Some(line.len());
    }
    let after = rest.strip_prefix('-')?;
    if !after.starts_with(' ') {
        return None;
    }
    Some(line.len() - after.trim_start_matches(' ').len())
}

/// Parses the scalar at the start of `text`, leaving any trailing comment.
fn parse_scalar(text: &str) -> Scalar<'_> {
    if let Some(q) = text.chars().next().filter(|c| *c == '"' || *c == '\'')
        && let Some(close) = text[1..].find(q)
    {
        return Scalar {
            span: 0..close + 2,
            quote: Some(q),
            text: &text[1..close + 1],
        };
    }

    let end = text.find(" #").unwrap_or(text.len());
    let value = text[..end].trim_end();

    Scalar {
        span: 0..value.len(),
        quote: None,
        text: value,
    }
}

/// Renders `value` for a slot that was written with `quote`. Bare values
/// that YAML would not read back as the same string are single-quoted.
pub fn format_scalar(value: &str, quote: Option<char>) -> String {
    match quote {
        Some(q) => format!("{q}{value}{q}"),
        None if needs_quotes(value) => format!("'{value}'"),
        None => value.to_string(),
    }
}

fn needs_quotes(value: &str) -> bool {
    !matches!(
        serde_yaml::from_str::<Value>(value),
        Ok(Value::String(s)) if s == value
    )
}

fn is_sequence_key(line: &str, key: &str) -> bool {
    let Some(rest) = line.strip_prefix(key) else {
        return false;
    };
    let Some(rest) = rest.trim_start().strip_prefix(':') else {
        return false;
    };
    is_blank_or_comment(rest)
}

/// Groups the lines following a sequence key into items.
fn collect_items(lines: &[String], start: usize) -> Vec<Item> {
    let mut items: Vec<Item> = vec![];
    let mut item_indent = None;

    for (idx, line) in lines.iter().enumerate().skip(start) {
        let text = body(line);
        if is_blank_or_comment(text) {
            continue;
        }

        let ind = indent(text);
        let content = item_content(text, ind);

        match item_indent {
            None if content.is_some() => item_indent = Some(ind),
            None => break,
            Some(ii) if ind < ii || (ind == ii && content.is_none()) => break,
            Some(_) => {}
        }

        if Some(ind) == item_indent
            && let Some(offset) = content
        {
            let field_indent = if offset < text.len() { offset } else { 0 };
            items.push(Item {
                lines: idx..idx + 1,
                field_indent,
            });
            continue;
        }

        if let Some(item) = items.last_mut() {
            if item.field_indent == 0 {
                item.field_indent = ind;
            }
            item.lines.end = idx + 1;
        }
    }

    items
}

/// The `key: value` pair at the item's own mapping level on line `idx`.
fn field_at<'a>(
    lines: &'a [String],
    item: &Item,
    idx: usize,
) -> Option<(&'a str, usize, Scalar<'a>)> {
    let text = body(&lines[idx]);

    if is_blank_or_comment(text) || text.len() <= item.field_indent {
        return None;
    }

    let at_item_start = idx == item.lines.start;
    if !at_item_start && indent(text) != item.field_indent {
        return None;
    }
    if at_item_start && text[..item.field_indent].trim() != "-" {
        return None;
    }

    let rest = &text[item.field_indent..];
    let caps = FIELD_REGEX.captures(rest)?;
    let key = caps.get(1)?.as_str();
    let value = caps.get(4)?;
    let offset = item.field_indent + value.start();

    Some((key, offset, parse_scalar(value.as_str())))
}

/// Applies `edit` line by line. `None` when no item matched or the layout
/// is not a block sequence the editor understands.
pub fn edit_record(content: &str, edit: &RecordEdit) -> Option<String> {
    let mut lines: Vec<String> =
        content.split_inclusive('\n').map(String::from).collect();

    let start = lines
        .iter()
        .position(|l| is_sequence_key(body(l), edit.sequence))?;

    let mut replacements = vec![];

    for item in collect_items(&lines, start + 1) {
        let mut matched = false;
        let mut target = None;

        for idx in item.lines.clone() {
            let Some((key, offset, scalar)) = field_at(&lines, &item, idx)
            else {
                continue;
            };

            if key == edit.key && scalar.text == edit.key_value {
                matched = true;
            }
            if key == edit.field {
                let span = offset + scalar.span.start..offset + scalar.span.end;
                target = Some((idx, span, scalar.quote));
            }
        }

        if matched && let Some(target) = target {
            replacements.push(target);
        }
    }

    if replacements.is_empty() {
        return None;
    }

    for (idx, span, quote) in replacements {
        let rendered = format_scalar(edit.value, quote);
        lines[idx].replace_range(span, &rendered);
    }

    Some(lines.concat())
}

/// Applies `edit` by parsing and re-serializing the whole document.
pub fn rewrite_record(content: &str, edit: &RecordEdit) -> Result<Option<String>> {
    let mut doc: Value = serde_yaml::from_str(content)?;

    let Some(items) = doc
        .get_mut(edit.sequence)
        .and_then(|s| s.as_sequence_mut())
    else {
        return Ok(None);
    };

    let mut found = false;

    for item in items.iter_mut() {
        if let Some(map) = item.as_mapping_mut()
            && scalar_string(map.get(edit.key)).as_deref() == Some(edit.key_value)
        {
            map.insert(Value::from(edit.field), Value::from(edit.value));
            found = true;
        }
    }

    if !found {
        return Ok(None);
    }

    Ok(Some(serde_yaml::to_string(&doc)?))
}

/// Edits the file at `path` in place, failing with `DependencyNotFound`
/// when no record matches.
pub async fn update_record(path: &Path, edit: &RecordEdit<'_>) -> Result<()> {
    let content = tokio::fs::read_to_string(path).await?;

    let updated = match edit_record(&content, edit) {
        Some(updated) => updated,
        None => match rewrite_record(&content, edit)? {
            Some(updated) => {
                warn!(
                    "rewriting {} without preserving formatting",
                    path.display()
                );
                updated
            }
            None => {
                return Err(FreshenError::dependency_not_found(
                    edit.key_value,
                    path,
                ));
            }
        },
    };

    tokio::fs::write(path, updated).await?;

    Ok(())
}

/// Replaces the sequence item under `sequence` whose scalar equals `old`.
/// Quoting and trailing comments are kept.
pub fn replace_item(
    content: &str,
    sequence: &str,
    old: &str,
    new: &str,
) -> Option<String> {
    let mut lines: Vec<String> =
        content.split_inclusive('\n').map(String::from).collect();

    let start = lines
        .iter()
        .position(|l| is_sequence_key(body(l), sequence))?;

    let (idx, span, quote) = collect_items(&lines, start + 1)
        .into_iter()
        .find_map(|item| {
            let idx = item.lines.start;
            let text = body(&lines[idx]);
            let offset = item_content(text, indent(text))?;
            let scalar = parse_scalar(&text[offset..]);
            (scalar.text == old).then(|| {
                (
                    idx,
                    offset + scalar.span.start..offset + scalar.span.end,
                    scalar.quote,
                )
            })
        })?;

    lines[idx].replace_range(span, &format_scalar(new, quote));

    Some(lines.concat())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &str = r#"apiVersion: v2
name: gafaelfawr
# Dependencies are pinned.
dependencies:
  - name: redis
    version: 1.3.1   # keep in sync
    repository: https://charts.example.com/
  - name: "nublado"
    repository: https://charts.example.com/
    version: '2.0.0'
  - name: redis
    version: 1.3.1
    repository: https://other.example.com/
appVersion: 1.0.0
"#;

    fn helm_edit<'a>(name: &'a str, value: &'a str) -> RecordEdit<'a> {
        RecordEdit {
            sequence: "dependencies",
            key: "name",
            key_value: name,
            field: "version",
            value,
        }
    }

    #[test]
    fn edits_every_matching_item_and_nothing_else() {
        let updated = edit_record(CHART, &helm_edit("redis", "v1.4.0")).unwrap();

        let expected = CHART
            .replace(
                "version: 1.3.1   # keep",
                "version: v1.4.0   # keep",
            )
            .replace("    version: 1.3.1\n", "    version: v1.4.0\n");
        assert_eq!(updated, expected);
    }

    #[test]
    fn keeps_quote_style() {
        let updated =
            edit_record(CHART, &helm_edit("nublado", "2.1.0")).unwrap();
        assert!(updated.contains("    version: '2.1.0'\n"));
        assert!(updated.contains("  - name: redis\n    version: 1.3.1   #"));
    }

    #[test]
    fn quotes_values_yaml_would_retype() {
        let updated = edit_record(CHART, &helm_edit("redis", "1.10")).unwrap();
        assert!(updated.contains("version: '1.10'   # keep in sync"));
    }

    #[test]
    fn missing_record_is_none() {
        assert!(edit_record(CHART, &helm_edit("postgres", "1.0.0")).is_none());
    }

    #[test]
    fn compact_sequence_and_nested_lists() {
        let config = r#"repos:
- repo: https://github.com/pre-commit/pre-commit-hooks
  rev: v3.1.0
  hooks:
  - id: check-yaml
    rev: not-a-field
- repo: https://github.com/psf/black
  rev: 19.10b0
"#;
        let edit = RecordEdit {
            sequence: "repos",
            key: "repo",
            key_value: "https://github.com/psf/black",
            field: "rev",
            value: "20.8b1",
        };

        let updated = edit_record(config, &edit).unwrap();

        assert_eq!(updated, config.replace("rev: 19.10b0", "rev: 20.8b1"));
    }

    #[test]
    fn nested_fields_are_not_item_fields() {
        let config = r#"repos:
  - repo: https://github.com/a/b
    hooks:
      - id: x
        rev: 1.0.0
"#;
        let edit = RecordEdit {
            sequence: "repos",
            key: "repo",
            key_value: "https://github.com/a/b",
            field: "rev",
            value: "2.0.0",
        };

        assert!(edit_record(config, &edit).is_none());
    }

    #[test]
    fn dash_on_its_own_line() {
        let chart = "dependencies:\n  -\n    name: redis\n    version: 1.0.0\n";
        let updated =
            edit_record(chart, &helm_edit("redis", "1.1.0")).unwrap();
        assert_eq!(updated, chart.replace("1.0.0", "1.1.0"));
    }

    #[test]
    fn flow_sequences_fall_back_to_rewrite() {
        let chart = "dependencies: [{name: redis, version: 1.0.0}]\n";
        let edit = helm_edit("redis", "1.1.0");

        assert!(edit_record(chart, &edit).is_none());

        let rewritten = rewrite_record(chart, &edit).unwrap().unwrap();
        let doc: Value = serde_yaml::from_str(&rewritten).unwrap();
        assert_eq!(doc["dependencies"][0]["version"].as_str(), Some("1.1.0"));
    }

    #[test]
    fn rewrite_without_match_is_none() {
        let chart = "dependencies: []\n";
        assert!(
            rewrite_record(chart, &helm_edit("redis", "1.0.0"))
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn update_record_reports_missing_dependency() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("Chart.yaml");
        tokio::fs::write(&path, CHART).await.unwrap();

        let err = update_record(&path, &helm_edit("postgres", "1.0.0"))
            .await
            .unwrap_err();

        assert!(matches!(err, FreshenError::DependencyNotFound { .. }));
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), CHART);
    }

    #[test]
    fn replace_item_keeps_neighbours() {
        let kustomization = r#"resources:
  - github.com/lsst-sqre/sqrbot//manifests?ref=0.6.0
  - "github.com/lsst-sqre/sqrbot-jr//manifests?ref=0.6.0"  # pinned
  - deployment.yaml
"#;

        let updated = replace_item(
            kustomization,
            "resources",
            "github.com/lsst-sqre/sqrbot-jr//manifests?ref=0.6.0",
            "github.com/lsst-sqre/sqrbot-jr//manifests?ref=0.7.0",
        )
        .unwrap();

        assert_eq!(
            updated,
            kustomization.replace(
                "sqrbot-jr//manifests?ref=0.6.0",
                "sqrbot-jr//manifests?ref=0.7.0"
            )
        );
        assert!(
            replace_item(kustomization, "resources", "missing.yaml", "x")
                .is_none()
        );
    }

    #[test]
    fn format_scalar_rules() {
        assert_eq!(format_scalar("1.2.3", None), "1.2.3");
        assert_eq!(format_scalar("1.10", None), "'1.10'");
        assert_eq!(format_scalar("true", None), "'true'");
        assert_eq!(format_scalar("1.2.3", Some('"')), "\"1.2.3\"");
    }
}
