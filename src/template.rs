//! Formatting templates: the 14 punctuation/whitespace fragments that
//! shape the rendered output, loadable from a `|`-delimited string.

use regex::Regex;

use crate::{Error, Result};

const FIELD_COUNT: usize = 14;

/// The formatting fragments for every syntactic position. Only `<span>`
/// tags survive loading; the plain variant used for the unescaped render
/// strips those as well.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    pub before_at_rule: String,
    pub bracket_after_at_rule: String,
    pub before_selector: String,
    pub selector_opening_bracket: String,
    pub before_property: String,
    pub before_value: String,
    pub after_value_with_semicolon: String,
    pub selector_closing_bracket: String,
    pub space_between_blocks: String,
    pub at_rule_closing_bracket: String,
    pub indent_in_at_rule: String,
    pub before_comment: String,
    pub after_comment: String,
    pub last_line_in_at_rule: String,
}

impl Default for Template {
    /// The readable default: one declaration per line, markup spans for
    /// syntax highlighting.
    fn default() -> Self {
        Self {
            before_at_rule: "<span class=\"at\">".to_string(),
            bracket_after_at_rule: "</span> <span class=\"format\">{</span>\n".to_string(),
            before_selector: "<span class=\"selector\">".to_string(),
            selector_opening_bracket: "</span> <span class=\"format\">{</span>\n".to_string(),
            before_property: "<span class=\"property\">".to_string(),
            before_value: "</span><span class=\"value\">".to_string(),
            after_value_with_semicolon: "</span><span class=\"format\">;</span>\n".to_string(),
            selector_closing_bracket: "<span class=\"format\">}</span>".to_string(),
            space_between_blocks: "\n\n".to_string(),
            at_rule_closing_bracket: "\n<span class=\"format\">}</span>\n\n".to_string(),
            indent_in_at_rule: "\t".to_string(),
            before_comment: "<span class=\"comment\">".to_string(),
            after_comment: "</span>\n".to_string(),
            last_line_in_at_rule: "\n".to_string(),
        }
    }
}

impl Template {
    /// The highest-compression preset: no whitespace at all.
    pub fn compact() -> Self {
        Self {
            before_at_rule: String::new(),
            bracket_after_at_rule: "{".to_string(),
            before_selector: String::new(),
            selector_opening_bracket: "{".to_string(),
            before_property: String::new(),
            before_value: String::new(),
            after_value_with_semicolon: ";".to_string(),
            selector_closing_bracket: "}".to_string(),
            space_between_blocks: String::new(),
            at_rule_closing_bracket: "}".to_string(),
            indent_in_at_rule: String::new(),
            before_comment: String::new(),
            after_comment: String::new(),
            last_line_in_at_rule: String::new(),
        }
    }

    /// Loads a template from a single `|`-delimited string with exactly
    /// 14 fields, in this order: before-at-rule, after-at-rule-name,
    /// before-selector, selector-open, before-property, before-value,
    /// after-value-with-semicolon, selector-close, inter-block spacing,
    /// at-rule-close, at-rule-indent, before-comment, after-comment,
    /// last-line-in-at-rule. All markup except `<span>` is stripped and
    /// `\r\n` is normalized to `\n` (the renderer only emits `\n`).
    pub fn load_from_string(content: &str) -> Result<Self> {
        let content = strip_tags(content, true)?;
        let content = content.replace("\r\n", "\n");
        let parts: Vec<&str> = content.split('|').collect();

        if parts.len() != FIELD_COUNT {
            return Err(Error::Template(format!(
                "template must contain {} parts, got {}",
                FIELD_COUNT,
                parts.len()
            )));
        }

        Ok(Self {
            before_at_rule: parts[0].to_string(),
            bracket_after_at_rule: parts[1].to_string(),
            before_selector: parts[2].to_string(),
            selector_opening_bracket: parts[3].to_string(),
            before_property: parts[4].to_string(),
            before_value: parts[5].to_string(),
            after_value_with_semicolon: parts[6].to_string(),
            selector_closing_bracket: parts[7].to_string(),
            space_between_blocks: parts[8].to_string(),
            at_rule_closing_bracket: parts[9].to_string(),
            indent_in_at_rule: parts[10].to_string(),
            before_comment: parts[11].to_string(),
            after_comment: parts[12].to_string(),
            last_line_in_at_rule: parts[13].to_string(),
        })
    }

    /// The plain twin of this template: every fragment with all markup
    /// (including `<span>`) removed.
    pub fn without_markup(&self) -> Result<Self> {
        Ok(Self {
            before_at_rule: strip_tags(&self.before_at_rule, false)?,
            bracket_after_at_rule: strip_tags(&self.bracket_after_at_rule, false)?,
            before_selector: strip_tags(&self.before_selector, false)?,
            selector_opening_bracket: strip_tags(&self.selector_opening_bracket, false)?,
            before_property: strip_tags(&self.before_property, false)?,
            before_value: strip_tags(&self.before_value, false)?,
            after_value_with_semicolon: strip_tags(&self.after_value_with_semicolon, false)?,
            selector_closing_bracket: strip_tags(&self.selector_closing_bracket, false)?,
            space_between_blocks: strip_tags(&self.space_between_blocks, false)?,
            at_rule_closing_bracket: strip_tags(&self.at_rule_closing_bracket, false)?,
            indent_in_at_rule: strip_tags(&self.indent_in_at_rule, false)?,
            before_comment: strip_tags(&self.before_comment, false)?,
            after_comment: strip_tags(&self.after_comment, false)?,
            last_line_in_at_rule: strip_tags(&self.last_line_in_at_rule, false)?,
        })
    }
}

/// Removes HTML tags; with `keep_span` set, `<span ...>`/`</span>` are
/// preserved verbatim.
fn strip_tags(input: &str, keep_span: bool) -> Result<String> {
    let tag = Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)[^>]*>")?;
    Ok(tag
        .replace_all(input, |caps: &regex::Captures| {
            if keep_span && caps[1].eq_ignore_ascii_case("span") {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned())
}
