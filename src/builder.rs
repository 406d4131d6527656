//! Incremental, collision-avoiding construction of a `Document`.
//!
//! The builder keeps two structures in parallel: the rendered node tree,
//! and a media → selector → declaration history used for the collision
//! checks. The `new_*` probes return keys padded (or incremented, for
//! numeric media) until unique, so repeated non-adjacent sections,
//! selectors and properties stay distinct instead of silently merging;
//! the serializer trims names, so padding never reaches the output.

use crate::config::{Configuration, MergeSelectors};
use crate::node::{AtBlock, Declaration, Document, Node, RuleBlock};

/// One media section of the insertion history. The empty name is the
/// top level of the stylesheet.
#[derive(Debug)]
struct Section {
    name: String,
    selectors: Vec<RuleBlock>,
}

#[derive(Debug)]
pub struct DocumentBuilder {
    document: Document,
    history: Vec<Section>,
    merge_selectors: MergeSelectors,
}

impl DocumentBuilder {
    pub fn new(configuration: &Configuration) -> Self {
        Self {
            document: Document::new(),
            history: Vec::new(),
            merge_selectors: configuration.merge_selectors,
        }
    }

    /// Hands the finished tree over; the build phase ends here.
    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn set_charset(&mut self, charset: impl Into<String>) {
        self.document.charset = Some(charset.into());
    }

    pub fn add_import(&mut self, import: impl Into<String>) {
        self.document.imports.push(import.into());
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.document.namespace = Some(namespace.into());
    }

    /// Stores a property under the `!important` priority rule (see
    /// `RuleBlock::set_declaration`). Whitespace-only values are ignored.
    pub fn add_property(&mut self, media: &str, selector: &str, property: &str, value: &str) {
        if value.trim().is_empty() {
            return;
        }

        self.history_selector_mut(media, selector)
            .set_declaration(property, value);

        let block = self.section_block_mut(media);
        let rule = match block
            .children
            .iter()
            .position(|child| matches!(child, Node::RuleBlock(rule) if rule.name == selector))
        {
            Some(pos) => pos,
            None => {
                block.children.push(Node::RuleBlock(RuleBlock::new(selector)));
                block.children.len() - 1
            }
        };
        match &mut block.children[rule] {
            Node::RuleBlock(rule) => rule.set_declaration(property, value),
            _ => unreachable!(),
        }
    }

    /// Applies `add_property` once per declaration, in order.
    pub fn merge_css_blocks(&mut self, media: &str, selector: &str, css: &[Declaration]) {
        for declaration in css {
            self.add_property(media, selector, &declaration.name, &declaration.value);
        }
    }

    /// Starts a media section. The most recently opened section keeps its
    /// key (adjacent blocks under the same section stay together); a key
    /// that collides with an older section is renamed until unused, by
    /// incrementing if numeric and by appending a space otherwise.
    pub fn new_media_section(&self, media: &str) -> String {
        if self.history.is_empty() {
            return media.to_string();
        }
        if let Some(last) = self.history.last() {
            if last.name == media {
                return media.to_string();
            }
        }

        let mut media = media.to_string();
        while self.history.iter().any(|section| section.name == media) {
            match media.trim().parse::<i64>() {
                Ok(n) => media = (n + 1).to_string(),
                Err(_) => media.push(' '),
            }
        }
        media
    }

    /// Starts a selector in a media section. Repeats of the last-added
    /// selector keep their key (sibling merge); other repeats are padded
    /// until unique. `@font-face` never takes the merge shortcuts: every
    /// repeated occurrence becomes its own padded key.
    pub fn new_selector(&self, media: &str, selector: &str) -> String {
        let mut selector = selector.trim().to_string();

        if !selector.starts_with("@font-face") {
            if self.merge_selectors != MergeSelectors::DoNotChange {
                return selector;
            }

            let Some(section) = self.history.iter().find(|s| s.name == media) else {
                return selector;
            };
            match section.selectors.last() {
                Some(last) if last.name == selector => return selector,
                Some(_) => {}
                None => return selector,
            }
        }

        if let Some(section) = self.history.iter().find(|s| s.name == media) {
            while section.selectors.iter().any(|s| s.name == selector) {
                selector.push(' ');
            }
        }
        selector
    }

    /// Starts a property in a selector: padded until unique, so repeated
    /// same-name declarations survive as distinct ordered entries.
    pub fn new_property(&self, media: &str, selector: &str, property: &str) -> String {
        let Some(section) = self.history.iter().find(|s| s.name == media) else {
            return property.to_string();
        };
        let Some(rule) = section.selectors.iter().find(|s| s.name == selector) else {
            return property.to_string();
        };
        if rule.declarations.is_empty() {
            return property.to_string();
        }

        let mut property = property.to_string();
        while rule.declarations.iter().any(|d| d.name == property) {
            property.push(' ');
        }
        property
    }

    /// Direct tree insertion for a comment.
    pub fn add_comment(&mut self, media: &str, text: impl Into<String>) {
        self.section_block_mut(media)
            .children
            .push(Node::Comment(text.into()));
    }

    /// Direct tree insertion for an unbracketed at-rule.
    pub fn add_raw_at_statement(&mut self, media: &str, text: impl Into<String>) {
        self.section_block_mut(media)
            .children
            .push(Node::RawAtStatement(text.into()));
    }

    /// Direct tree insertion for a nested at-block. Its contents are
    /// opaque to the collision checks.
    pub fn add_at_block(&mut self, media: &str, block: AtBlock) {
        self.section_block_mut(media)
            .children
            .push(Node::AtBlock(block));
    }

    /// The history entry for (media, selector), created on first use.
    fn history_selector_mut(&mut self, media: &str, selector: &str) -> &mut RuleBlock {
        let section = match self.history.iter().position(|s| s.name == media) {
            Some(pos) => pos,
            None => {
                self.history.push(Section {
                    name: media.to_string(),
                    selectors: Vec::new(),
                });
                self.history.len() - 1
            }
        };
        let section = &mut self.history[section];
        let pos = match section.selectors.iter().position(|s| s.name == selector) {
            Some(pos) => pos,
            None => {
                section.selectors.push(RuleBlock::new(selector));
                section.selectors.len() - 1
            }
        };
        &mut section.selectors[pos]
    }

    /// The tree block holding a media section's children: the root for
    /// the empty key, a root-level at-block (created on first use) for
    /// anything else.
    fn section_block_mut(&mut self, media: &str) -> &mut AtBlock {
        let root = &mut self.document.root;
        if media.is_empty() {
            return root;
        }

        let pos = match root
            .children
            .iter()
            .position(|child| matches!(child, Node::AtBlock(block) if block.name == media))
        {
            Some(pos) => pos,
            None => {
                root.children.push(Node::AtBlock(AtBlock::new(media)));
                root.children.len() - 1
            }
        };
        match &mut root.children[pos] {
            Node::AtBlock(block) => block,
            _ => unreachable!(),
        }
    }
}
