//! The document model: a tagged tree of rule blocks, at-blocks, comments
//! and raw at-statements, with declarations as leaves of rule blocks.

/// Returns true if the value carries the `!important` priority marker.
/// Case and whitespace between `!` and `important` are ignored.
pub fn is_important(value: &str) -> bool {
    let lower = value.trim_end().to_ascii_lowercase();
    match lower.strip_suffix("important") {
        Some(rest) => rest.trim_end().ends_with('!'),
        None => false,
    }
}

/// A property/value pair inside a rule block.
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
}

impl Declaration {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_important(&self) -> bool {
        is_important(&self.value)
    }
}

/// A child of an at-block. Declarations never appear here; they live
/// inside `RuleBlock::declarations`.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    RuleBlock(RuleBlock),
    AtBlock(AtBlock),
    Comment(String),
    RawAtStatement(String),
}

/// A selector (possibly a comma-joined list) and its declarations.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleBlock {
    pub name: String,
    pub declarations: Vec<Declaration>,
}

impl RuleBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declarations: Vec::new(),
        }
    }

    /// `@font-face` blocks are exempt from every identity-based merge.
    /// Prefix test: padded duplicates (`@font-face `) count too.
    pub fn is_font_face(&self) -> bool {
        self.name.starts_with("@font-face")
    }

    /// The comma-separated simple selectors making up `name`.
    pub fn sub_selectors(&self) -> Vec<&str> {
        self.name.split(',').map(str::trim).collect()
    }

    pub fn get_value(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }

    /// Stores a declaration under the `!important` priority rule: an
    /// existing `!important` value survives a non-important overwrite;
    /// every other collision is last-write-wins. The stored value is
    /// trimmed.
    pub fn set_declaration(&mut self, name: &str, value: &str) {
        match self.declarations.iter_mut().find(|d| d.name == name) {
            Some(existing) => {
                if existing.is_important() && !is_important(value) {
                    return;
                }
                existing.value = value.trim().to_string();
            }
            None => self
                .declarations
                .push(Declaration::new(name, value.trim())),
        }
    }
}

/// A braced at-rule (`@media`, `@supports`, ...) or, with an empty name,
/// the document root.
#[derive(Clone, Debug, PartialEq)]
pub struct AtBlock {
    pub name: String,
    pub children: Vec<Node>,
}

impl Default for AtBlock {
    fn default() -> Self {
        Self::new("")
    }
}

impl AtBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn find_rule_block_mut(&mut self, name: &str) -> Option<&mut RuleBlock> {
        self.children.iter_mut().find_map(|child| match child {
            Node::RuleBlock(rule) if rule.name == name => Some(rule),
            _ => None,
        })
    }

    pub fn find_at_block_mut(&mut self, name: &str) -> Option<&mut AtBlock> {
        self.children.iter_mut().find_map(|child| match child {
            Node::AtBlock(at) if at.name == name => Some(at),
            _ => None,
        })
    }

    /// Recursive structural merge: children of `other` that have a
    /// same-kind, same-name counterpart in `self` are merged into it
    /// (declaration-wise for rule blocks, recursively for at-blocks);
    /// everything else is appended. `@font-face` blocks always append.
    pub fn merge(&mut self, other: AtBlock) {
        for child in other.children {
            match child {
                Node::RuleBlock(rule) => {
                    let target = if rule.is_font_face() {
                        None
                    } else {
                        self.find_rule_block_mut(&rule.name)
                    };
                    match target {
                        Some(mine) => {
                            for declaration in rule.declarations {
                                mine.set_declaration(&declaration.name, &declaration.value);
                            }
                        }
                        None => self.children.push(Node::RuleBlock(rule)),
                    }
                }
                Node::AtBlock(at) => match self.find_at_block_mut(&at.name) {
                    Some(mine) => mine.merge(at),
                    None => self.children.push(Node::AtBlock(at)),
                },
                other => self.children.push(other),
            }
        }
    }
}

/// The root of the model: an unnamed at-block plus the stylesheet-level
/// metadata that renders ahead of it.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Document {
    pub root: AtBlock,
    pub charset: Option<String>,
    pub imports: Vec<String>,
    pub namespace: Option<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }
}
