//! Serialization: flattens the document tree into a token sequence, then
//! renders it against a template in two synchronized modes (HTML-escaped
//! and plain). Both results and the derived size metrics are cached.

use std::cmp::Ordering;
use std::io::Write as _;

use chrono::Local;
use flate2::write::GzEncoder;
use flate2::Compression;
use regex::Regex;

use crate::config::{CaseProperties, Configuration};
use crate::node::{AtBlock, Declaration, Document, Node};
use crate::template::Template;
use crate::Result;

/// `url\(["']?([^)'" ]*)["']?[ ]?\)` -> `"$1"`, applied to `@import` and
/// `@namespace` values while flattening.
const URL_PATTERN: &str = r#"url\(["']?([^)'" ]*)["']?[ ]?\)"#;

/// A fixed placeholder some markup templates use for visible spacing;
/// stripped from the plain render as a final cleanup.
const NBSP_ENTITY: &str = "&#160;";

/// A transient (kind, payload) pair produced by flattening the tree and
/// consumed only by the renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    AtStart(String),
    AtEnd,
    RuleStart(String),
    RuleEnd,
    Property(String),
    Value(String),
    Comment(String),
    RawLine(String),
}

/// Which side of the transformation a size metric refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Input,
    Output,
}

#[derive(Debug)]
pub struct Output {
    configuration: Configuration,
    input_css: String,
    document: Document,
    tokens: Vec<Token>,
    /// Import values with their `url(...)` wrappers already rewritten.
    imports: Vec<String>,
    namespace: Option<String>,
    formatted: Option<String>,
    plain: Option<String>,
}

impl Output {
    pub fn new(
        configuration: Configuration,
        input_css: impl Into<String>,
        document: Document,
    ) -> Self {
        Self {
            configuration,
            input_css: input_css.into(),
            document,
            tokens: Vec::new(),
            imports: Vec::new(),
            namespace: None,
            formatted: None,
            plain: None,
        }
    }

    /// The formatted (markup-bearing, HTML-escaped) render.
    pub fn formatted(&mut self) -> Result<&str> {
        self.generate()?;
        Ok(self.formatted.as_deref().unwrap_or(""))
    }

    /// The plain-text render.
    pub fn plain(&mut self) -> Result<&str> {
        self.generate()?;
        Ok(self.plain.as_deref().unwrap_or(""))
    }

    /// The size of the input or the plain output, in kilobytes.
    pub fn size(&mut self, target: Target) -> Result<f64> {
        Ok(self.text(target)?.len() as f64 / 1000.0)
    }

    /// Like `size`, but after gzip compression.
    pub fn gzipped_size(&mut self, target: Target) -> Result<f64> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(self.text(target)?.as_bytes())?;
        Ok(encoder.finish()?.len() as f64 / 1000.0)
    }

    /// Compression ratio as a percentage, rounded to three decimals of
    /// the underlying fraction: 1000 bytes in, 800 bytes out -> 20.0.
    pub fn ratio(&mut self) -> Result<f64> {
        let input = self.size(Target::Input)?;
        let output = self.size(Target::Output)?;
        Ok(((input - output) / input * 1000.0).round() / 1000.0 * 100.0)
    }

    /// Signed byte delta between the plain output and the input:
    /// `+N` when larger, `+-0` when equal, `-N` when smaller.
    pub fn diff(&mut self) -> Result<String> {
        self.generate()?;
        let output = self.plain.as_deref().unwrap_or("").len() as i64;
        let diff = output - self.input_css.len() as i64;

        Ok(if diff > 0 {
            format!("+{diff}")
        } else if diff == 0 {
            format!("+-{diff}")
        } else {
            diff.to_string()
        })
    }

    fn text(&mut self, target: Target) -> Result<&str> {
        if target == Target::Output {
            self.generate()?;
        }
        Ok(match target {
            Target::Input => &self.input_css,
            Target::Output => self.plain.as_deref().unwrap_or(""),
        })
    }

    /// Fills both render caches. Flattening (and its logging) happens
    /// exactly once; repeated calls are no-ops.
    fn generate(&mut self) -> Result<()> {
        if self.formatted.is_some() && self.plain.is_some() {
            return Ok(());
        }

        self.flatten()?;

        if self.configuration.add_timestamp {
            self.tokens.insert(
                0,
                Token::Comment(format!(
                    " tidycss {}: {} ",
                    env!("CARGO_PKG_VERSION"),
                    Local::now().to_rfc2822()
                )),
            );
        }

        self.formatted = Some(self.render(&self.configuration.template, false));

        let plain_template = self.configuration.template.without_markup()?;
        // Visible-spacing placeholders from the markup template must not
        // survive into the plain output.
        self.plain = Some(self.render(&plain_template, true).replace(NBSP_ENTITY, ""));

        Ok(())
    }

    /// Tree -> token sequence, plus the `url(...)` rewrite of the
    /// `@import`/`@namespace` prelude values (logged per rewrite).
    fn flatten(&mut self) -> Result<()> {
        let url = Regex::new(URL_PATTERN)?;
        self.imports = self
            .document
            .imports
            .iter()
            .map(|value| rewrite_url(&url, value, "@import"))
            .collect();
        self.namespace = self
            .document
            .namespace
            .as_deref()
            .map(|value| rewrite_url(&url, value, "@namespace"));

        let mut tokens = Vec::new();
        flatten_block(&mut tokens, &self.document.root, &self.configuration, true);
        self.tokens = tokens;
        Ok(())
    }

    fn render(&self, template: &Template, plain: bool) -> String {
        let mut current = String::new();

        if let Some(charset) = &self.document.charset {
            // After `@charset` there must be a single space.
            current.push_str(&template.before_at_rule);
            current.push_str("@charset ");
            current.push_str(&template.before_value);
            current.push_str(charset);
            current.push_str(&template.after_value_with_semicolon);
        }
        for import in &self.imports {
            current.push_str(&template.before_at_rule);
            current.push_str("@import");
            current.push_str(&template.before_value);
            current.push_str(import);
            current.push_str(&template.after_value_with_semicolon);
        }
        if let Some(namespace) = &self.namespace {
            current.push_str(&template.before_at_rule);
            current.push_str("@namespace");
            current.push_str(&template.before_value);
            current.push_str(namespace);
            current.push_str(&template.after_value_with_semicolon);
        }
        current.push_str(&template.last_line_in_at_rule);

        // Sink stack for at-rule bodies: each AtStart opens a scratch
        // buffer; the matching AtEnd folds it back, line-indented, into
        // the buffer below (LIFO, so nesting indents cumulatively).
        let mut outer: Vec<String> = Vec::new();

        for (key, token) in self.tokens.iter().enumerate() {
            match token {
                Token::Property(name) => {
                    let name = match self.configuration.case_properties {
                        CaseProperties::Unchanged => name.clone(),
                        CaseProperties::Lowercase => name.to_lowercase(),
                        CaseProperties::Uppercase => name.to_uppercase(),
                    };
                    current.push_str(&template.before_property);
                    current.push_str(&escaped(&name, plain));
                    current.push(':');
                    current.push_str(&template.before_value);
                }
                Token::Value(value) => {
                    current.push_str(&escaped(value, plain));
                    let closes_block = matches!(
                        seek_no_comment(&self.tokens, key),
                        Some(Token::RuleEnd | Token::AtEnd)
                    );
                    if closes_block && self.configuration.remove_last_semicolon {
                        current
                            .push_str(&template.after_value_with_semicolon.replace(';', ""));
                    } else {
                        current.push_str(&template.after_value_with_semicolon);
                    }
                }
                Token::RuleStart(name) => {
                    let name = if self.configuration.lowercase_selectors {
                        name.to_lowercase()
                    } else {
                        name.clone()
                    };
                    current.push_str(&template.before_selector);
                    current.push_str(&escaped(&name, plain));
                    current.push_str(&template.selector_opening_bracket);
                }
                Token::RuleEnd => {
                    current.push_str(&template.selector_closing_bracket);
                    // No inter-block spacing right before a closing at-rule.
                    if !matches!(seek_no_comment(&self.tokens, key), Some(Token::AtEnd)) {
                        current.push_str(&template.space_between_blocks);
                    }
                }
                Token::AtStart(name) => {
                    current.push_str(&template.before_at_rule);
                    current.push_str(&escaped(name, plain));
                    current.push_str(&template.bracket_after_at_rule);
                    outer.push(std::mem::take(&mut current));
                }
                Token::AtEnd => {
                    let inner =
                        std::mem::replace(&mut current, outer.pop().unwrap_or_default());
                    current.push_str(&template.indent_in_at_rule);
                    current.push_str(
                        &inner.replace('\n', &format!("\n{}", template.indent_in_at_rule)),
                    );
                    current.push_str(&template.at_rule_closing_bracket);
                }
                Token::Comment(text) => {
                    current.push_str(&template.before_comment);
                    current.push_str("/*");
                    current.push_str(&escaped(text, plain));
                    current.push_str("*/");
                    current.push_str(&template.after_comment);
                }
                Token::RawLine(text) => current.push_str(text),
            }
        }

        // Tokens are strictly nested by the caller contract; any sink
        // still open is folded back unindented rather than lost.
        while let Some(mut previous) = outer.pop() {
            previous.push_str(&current);
            current = previous;
        }

        current.trim().to_string()
    }
}

/// The next token kind after `key`, skipping comments.
fn seek_no_comment(tokens: &[Token], key: usize) -> Option<&Token> {
    tokens[key + 1..]
        .iter()
        .find(|token| !matches!(token, Token::Comment(_)))
}

fn flatten_block(
    tokens: &mut Vec<Token>,
    block: &AtBlock,
    configuration: &Configuration,
    is_root: bool,
) {
    if !is_root {
        tokens.push(Token::AtStart(block.name.trim().to_string()));
    }

    let mut order: Vec<&Node> = block.children.iter().collect();
    if configuration.sort_selectors {
        sort_rule_blocks(&mut order);
    }

    for child in order {
        match child {
            Node::RuleBlock(rule) => {
                tokens.push(Token::RuleStart(rule.name.trim().to_string()));
                let mut declarations: Vec<&Declaration> = rule.declarations.iter().collect();
                if configuration.sort_properties {
                    declarations.sort_by(|a, b| compare_properties(&a.name, &b.name));
                }
                for declaration in declarations {
                    tokens.push(Token::Property(declaration.name.trim().to_string()));
                    tokens.push(Token::Value(declaration.value.trim().to_string()));
                }
                tokens.push(Token::RuleEnd);
            }
            Node::AtBlock(at) => flatten_block(tokens, at, configuration, false),
            Node::Comment(text) => {
                if configuration.preserve_comments {
                    tokens.push(Token::Comment(text.clone()));
                }
            }
            Node::RawAtStatement(text) => tokens.push(Token::RawLine(text.trim().to_string())),
        }
    }

    if !is_root {
        tokens.push(Token::AtEnd);
    }
}

/// Case-insensitively sorts the rule-block children among themselves,
/// leaving every other child (at-blocks included) in its slot.
fn sort_rule_blocks(order: &mut [&Node]) {
    let slots: Vec<usize> = order
        .iter()
        .enumerate()
        .filter_map(|(i, node)| matches!(node, Node::RuleBlock(_)).then_some(i))
        .collect();

    let mut rules: Vec<&Node> = slots.iter().map(|&i| order[i]).collect();
    rules.sort_by(|a, b| match (a, b) {
        (Node::RuleBlock(a), Node::RuleBlock(b)) => {
            a.name.to_lowercase().cmp(&b.name.to_lowercase())
        }
        _ => Ordering::Equal,
    });

    for (&slot, rule) in slots.iter().zip(rules) {
        order[slot] = rule;
    }
}

/// Property ordering with the legacy browser-hack prefixes grouped last:
/// plain names, then `*` (IE7), then `_`/`/`/`-` (IE6), each group
/// case-insensitively alphabetical after the prefix. Keys starting with
/// `!` are internal markers and never reorder relative to anything
/// (stable sort keeps their positions).
fn compare_properties(a: &str, b: &str) -> Ordering {
    if a.starts_with('!') || b.starts_with('!') {
        return Ordering::Equal;
    }

    let (group_a, group_b) = (hack_group(a), hack_group(b));
    if group_a == 0 && group_b == 0 {
        a.to_lowercase().cmp(&b.to_lowercase())
    } else if group_a == group_b {
        a[1..].to_lowercase().cmp(&b[1..].to_lowercase())
    } else {
        group_a.cmp(&group_b)
    }
}

fn hack_group(name: &str) -> u8 {
    match name.chars().next() {
        Some('*') => 1,
        Some('_' | '/' | '-') => 2,
        _ => 0,
    }
}

fn rewrite_url(url: &Regex, value: &str, context: &str) -> String {
    let replaced = url.replace_all(value, "\"$1\"");
    if replaced != value {
        log::info!("optimised {context}: removed \"url(\" ({replaced})");
    }
    replaced.into_owned()
}

/// HTML entity escaping for the markup-bearing render; the plain render
/// passes text through untouched.
fn escaped(text: &str, plain: bool) -> String {
    if plain {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::RuleBlock;

    fn rule(name: &str, declarations: &[(&str, &str)]) -> Node {
        let mut rule = RuleBlock::new(name);
        for (property, value) in declarations {
            rule.set_declaration(property, value);
        }
        Node::RuleBlock(rule)
    }

    fn compact() -> Configuration {
        Configuration {
            template: Template::compact(),
            ..Configuration::new()
        }
    }

    #[test]
    fn renders_a_simple_document() {
        let mut document = Document::new();
        document.root.children.push(rule("a", &[("color", "red")]));

        let mut output = Output::new(compact(), "", document);
        assert_eq!(output.plain().unwrap(), "a{color:red;}");
    }

    #[test]
    fn removes_the_last_semicolon_when_asked() {
        let mut document = Document::new();
        document
            .root
            .children
            .push(rule("a", &[("color", "red"), ("width", "10px")]));

        let configuration = Configuration {
            remove_last_semicolon: true,
            ..compact()
        };
        let mut output = Output::new(configuration, "", document);
        assert_eq!(output.plain().unwrap(), "a{color:red;width:10px}");
    }

    #[test]
    fn renders_the_prelude_and_rewrites_url() {
        let mut document = Document::new();
        document.charset = Some("\"utf-8\"".to_string());
        document.imports.push("url(\"print.css\")".to_string());
        document.namespace = Some("url(http://www.w3.org/1999/xhtml)".to_string());

        let mut output = Output::new(compact(), "", document);
        assert_eq!(
            output.plain().unwrap(),
            "@charset \"utf-8\";@import \"print.css\";@namespace \"http://www.w3.org/1999/xhtml\";"
        );
    }

    #[test]
    fn indents_nested_at_rules() {
        let mut template = Template::compact();
        template.bracket_after_at_rule = "{\n".to_string();
        template.after_value_with_semicolon = ";\n".to_string();
        template.at_rule_closing_bracket = "\n}".to_string();
        template.indent_in_at_rule = "\t".to_string();
        template.selector_opening_bracket = "{\n".to_string();
        template.selector_closing_bracket = "}".to_string();

        let mut supports = AtBlock::new("@supports (display:flex)");
        supports.children.push(rule("a", &[("color", "red")]));
        let mut media = AtBlock::new("@media screen");
        media.children.push(Node::AtBlock(supports));
        let mut document = Document::new();
        document.root.children.push(Node::AtBlock(media));

        let configuration = Configuration {
            template,
            ..Configuration::new()
        };
        let mut output = Output::new(configuration, "", document);
        assert_eq!(
            output.plain().unwrap(),
            "@media screen{\n\t@supports (display:flex){\n\t\ta{\n\t\tcolor:red;\n\t\t}\n\t}\n}"
        );
    }

    #[test]
    fn no_block_separator_before_at_end() {
        let mut template = Template::compact();
        template.space_between_blocks = "\n".to_string();

        let mut media = AtBlock::new("@media screen");
        media.children.push(rule("a", &[("color", "red")]));
        let mut document = Document::new();
        document.root.children.push(Node::AtBlock(media));
        document.root.children.push(rule("b", &[("color", "blue")]));

        let configuration = Configuration {
            template,
            ..Configuration::new()
        };
        let mut output = Output::new(configuration, "", document);
        // The rule inside the media block gets no separator before `}`;
        // the trailing separator after the last rule is trimmed away.
        assert_eq!(
            output.plain().unwrap(),
            "@media screen{a{color:red;}}b{color:blue;}"
        );
    }

    #[test]
    fn sorts_properties_with_hack_prefixes_last() {
        let mut rule = RuleBlock::new("a");
        rule.set_declaration("_height", "1px");
        rule.set_declaration("*zoom", "1");
        rule.set_declaration("color", "red");
        let mut document = Document::new();
        document.root.children.push(Node::RuleBlock(rule));

        let configuration = Configuration {
            sort_properties: true,
            ..compact()
        };
        let mut output = Output::new(configuration, "", document);
        assert_eq!(output.plain().unwrap(), "a{color:red;*zoom:1;_height:1px;}");
    }

    #[test]
    fn sorts_selectors_without_moving_at_blocks() {
        let mut document = Document::new();
        document.root.children.push(rule("b", &[("color", "red")]));
        document
            .root
            .children
            .push(Node::AtBlock(AtBlock::new("@media screen")));
        document.root.children.push(rule("A", &[("color", "blue")]));

        let configuration = Configuration {
            sort_selectors: true,
            ..compact()
        };
        let mut output = Output::new(configuration, "", document);
        assert_eq!(
            output.plain().unwrap(),
            "A{color:blue;}@media screen{}b{color:red;}"
        );
    }

    #[test]
    fn escapes_only_the_formatted_render() {
        let mut document = Document::new();
        document
            .root
            .children
            .push(rule("a > b", &[("font-family", "\"x\"")]));

        let mut output = Output::new(compact(), "", document);
        assert_eq!(
            output.formatted().unwrap(),
            "a &gt; b{font-family:&quot;x&quot;;}"
        );
        assert_eq!(output.plain().unwrap(), "a > b{font-family:\"x\";}");
    }

    #[test]
    fn plain_render_strips_template_markup() {
        let mut document = Document::new();
        document.root.children.push(rule("a", &[("color", "red")]));

        let mut output = Output::new(Configuration::new(), "", document);
        assert_eq!(
            output.formatted().unwrap(),
            "<span class=\"selector\">a</span> <span class=\"format\">{</span>\n\
             <span class=\"property\">color:</span><span class=\"value\">red\
             </span><span class=\"format\">;</span>\n<span class=\"format\">}</span>"
        );
        assert_eq!(output.plain().unwrap(), "a {\ncolor:red;\n}");
    }

    #[test]
    fn comments_follow_the_preserve_option() {
        let mut document = Document::new();
        document.root.children.push(Node::Comment(" kept ".to_string()));
        document.root.children.push(rule("a", &[("color", "red")]));

        let mut output = Output::new(compact(), "", document.clone());
        assert_eq!(output.plain().unwrap(), "/* kept */a{color:red;}");

        let configuration = Configuration {
            preserve_comments: false,
            ..compact()
        };
        let mut output = Output::new(configuration, "", document);
        assert_eq!(output.plain().unwrap(), "a{color:red;}");
    }

    #[test]
    fn raw_at_statements_render_verbatim() {
        let mut document = Document::new();
        document
            .root
            .children
            .push(Node::RawAtStatement("@import \"a.css\";".to_string()));

        let mut output = Output::new(compact(), "", document);
        assert_eq!(output.plain().unwrap(), "@import \"a.css\";");
    }

    #[test]
    fn case_options_apply() {
        let mut document = Document::new();
        document.root.children.push(rule("A", &[("Color", "red")]));

        let configuration = Configuration {
            case_properties: CaseProperties::Lowercase,
            lowercase_selectors: true,
            ..compact()
        };
        let mut output = Output::new(configuration, "", document.clone());
        assert_eq!(output.plain().unwrap(), "a{color:red;}");

        let configuration = Configuration {
            case_properties: CaseProperties::Uppercase,
            ..compact()
        };
        let mut output = Output::new(configuration, "", document);
        assert_eq!(output.plain().unwrap(), "A{COLOR:red;}");
    }

    #[test]
    fn padded_names_are_trimmed_at_flatten() {
        let mut document = Document::new();
        document.root.children.push(rule("a ", &[("color ", "red")]));

        let mut output = Output::new(compact(), "", document);
        assert_eq!(output.plain().unwrap(), "a{color:red;}");
    }

    #[test]
    fn renders_are_cached_and_idempotent() {
        let mut document = Document::new();
        document.root.children.push(rule("a", &[("color", "red")]));

        let mut output = Output::new(compact(), "", document);
        let first = output.plain().unwrap().to_string();
        assert_eq!(output.plain().unwrap(), first);
        assert_eq!(output.formatted().unwrap(), first); // no markup, no escapes
    }

    #[test]
    fn url_rewrite_is_notified_once_across_renders() {
        use log::{Level, LevelFilter, Log, Metadata, Record};
        use std::sync::atomic::{AtomicUsize, Ordering};

        // Counts only this test's rewrite record; other tests may log
        // concurrently once the global logger is installed.
        static REWRITES: AtomicUsize = AtomicUsize::new(0);

        struct CountingLogger;
        impl Log for CountingLogger {
            fn enabled(&self, _: &Metadata) -> bool {
                true
            }
            fn log(&self, record: &Record) {
                if record.level() == Level::Info
                    && record.args().to_string().contains("logged-once.css")
                {
                    REWRITES.fetch_add(1, Ordering::SeqCst);
                }
            }
            fn flush(&self) {}
        }

        static LOGGER: CountingLogger = CountingLogger;
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Info);

        let mut document = Document::new();
        document.imports.push("url(logged-once.css)".to_string());
        document.root.children.push(rule("a", &[("color", "red")]));

        let mut output = Output::new(compact(), "", document);
        assert_eq!(output.plain().unwrap(), "@import \"logged-once.css\";a{color:red;}");
        output.plain().unwrap();
        output.formatted().unwrap();

        assert_eq!(REWRITES.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn timestamp_comment_leads_the_output() {
        let mut document = Document::new();
        document.root.children.push(rule("a", &[("color", "red")]));

        let configuration = Configuration {
            add_timestamp: true,
            ..compact()
        };
        let mut output = Output::new(configuration, "", document);
        let plain = output.plain().unwrap();
        assert!(plain.starts_with("/* tidycss "));
        assert!(plain.ends_with("a{color:red;}"));
    }

    #[test]
    fn empty_document_renders_empty() {
        let mut output = Output::new(compact(), "", Document::new());
        assert_eq!(output.plain().unwrap(), "");
        assert_eq!(output.formatted().unwrap(), "");
    }

    #[test]
    fn size_ratio_and_diff() {
        // Plain output is exactly "a{color:red}" (12 bytes).
        let mut document = Document::new();
        document.root.children.push(rule("a", &[("color", "red")]));
        let configuration = Configuration {
            remove_last_semicolon: true,
            ..compact()
        };

        let input = "x".repeat(1000);
        let mut output = Output::new(configuration.clone(), input, document.clone());
        assert_eq!(output.size(Target::Input).unwrap(), 1.0);
        assert_eq!(output.size(Target::Output).unwrap(), 0.012);
        assert!((output.ratio().unwrap() - 98.8).abs() < 1e-9);
        assert_eq!(output.diff().unwrap(), "-988");

        let mut output = Output::new(configuration.clone(), "a", document.clone());
        assert_eq!(output.diff().unwrap(), "+11");

        let mut output = Output::new(configuration, "a{color:red}", document);
        assert_eq!(output.diff().unwrap(), "+-0");
    }

    #[test]
    fn end_to_end_minification() {
        // What a lexer feeding the builder would do for:
        //   a { color: red }  b { color: red }  a>>c { color: blue }
        let input = "a { color: red }\nb { color: red }\na>>c { color: blue }";
        let mut builder = crate::builder::DocumentBuilder::new(&Configuration::default());
        for (selector, value) in [("a", "red"), ("b", "red"), ("a>>c", "blue")] {
            let selector = builder.new_selector("", selector);
            let property = builder.new_property("", &selector, "color");
            builder.add_property("", &selector, &property, value);
        }

        let mut document = builder.into_document();
        crate::transform::optimize(&mut document).unwrap();

        let configuration = Configuration {
            remove_last_semicolon: true,
            ..compact()
        };
        let mut output = Output::new(configuration, input, document);
        // The invalid selector is discarded, a and b merge by properties
        // and are then separated back into single-selector blocks.
        assert_eq!(output.plain().unwrap(), "a{color:red}b{color:red}");
        assert_eq!(output.diff().unwrap(), "-30");
    }

    #[test]
    fn gzipped_size_is_positive_and_smaller_for_repetitive_input() {
        let mut document = Document::new();
        for i in 0..50 {
            document
                .root
                .children
                .push(rule(&format!("selector-{i}"), &[("color", "red")]));
        }

        let mut output = Output::new(compact(), "", document);
        let raw = output.size(Target::Output).unwrap();
        let gzipped = output.gzipped_size(Target::Output).unwrap();
        assert!(gzipped > 0.0);
        assert!(gzipped < raw);
    }
}
