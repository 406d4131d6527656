//! Structural rewrite passes over the node tree. Each pass mutates in
//! place, recurses through nested at-blocks and preserves the rendered
//! meaning of the stylesheet.

use std::collections::BTreeMap;

use regex::Regex;

use crate::node::{AtBlock, Document, Node, RuleBlock};
use crate::Result;

/// Merges same-kind, same-name sibling blocks.
/// Example: `a {color:red} a {font-weight:bold}` -> `a {color:red;font-weight:bold}`.
/// Name equality is exact, so padded duplicate keys from the builder stay
/// apart. `@font-face` blocks never merge.
pub fn merge_by_name(block: &mut AtBlock) {
    let mut i = 0;
    while i < block.children.len() {
        // Pull in every later sibling with the same kind and name; a
        // merge can expose further duplicates, so rescan until none.
        loop {
            let same = match &block.children[i] {
                Node::RuleBlock(rule) if !rule.is_font_face() => {
                    find_sibling(block, i, |child| {
                        matches!(child, Node::RuleBlock(other) if other.name == rule.name)
                    })
                }
                Node::AtBlock(at) => find_sibling(block, i, |child| {
                    matches!(child, Node::AtBlock(other) if other.name == at.name)
                }),
                _ => None,
            };
            let Some(j) = same else { break };

            let removed = block.children.remove(j);
            match (&mut block.children[i], removed) {
                (Node::RuleBlock(rule), Node::RuleBlock(other)) => {
                    for declaration in other.declarations {
                        rule.set_declaration(&declaration.name, &declaration.value);
                    }
                }
                (Node::AtBlock(at), Node::AtBlock(other)) => at.merge(other),
                _ => unreachable!(),
            }
        }

        if let Node::AtBlock(at) = &mut block.children[i] {
            merge_by_name(at);
        }
        i += 1;
    }
}

fn find_sibling<F>(block: &AtBlock, after: usize, matches: F) -> Option<usize>
where
    F: Fn(&Node) -> bool,
{
    block
        .children
        .iter()
        .enumerate()
        .skip(after + 1)
        .find_map(|(j, child)| matches(child).then_some(j))
}

/// Merges rule blocks whose declaration sets are equal, joining their
/// selector names. Example: `a {color:red} b {color:red}` -> `a,b {color:red}`.
/// `@font-face` blocks are exempt on both sides of the comparison:
/// duplicate font faces with identical declarations stay separate.
pub fn merge_by_properties(block: &mut AtBlock) {
    let mut i = 0;
    while i < block.children.len() {
        let base = match &mut block.children[i] {
            Node::AtBlock(at) => {
                merge_by_properties(at);
                None
            }
            Node::RuleBlock(rule) if !rule.is_font_face() => Some(declaration_set(rule)),
            _ => None,
        };

        if let Some(base) = base {
            let mut joined = Vec::new();
            let mut j = i + 1;
            while j < block.children.len() {
                let same = match &block.children[j] {
                    Node::RuleBlock(other)
                        if !other.is_font_face() && declaration_set(other) == base =>
                    {
                        Some(other.name.clone())
                    }
                    _ => None,
                };
                match same {
                    Some(name) => {
                        joined.push(name);
                        block.children.remove(j);
                    }
                    None => j += 1,
                }
            }
            if !joined.is_empty() {
                if let Node::RuleBlock(rule) = &mut block.children[i] {
                    for name in joined {
                        rule.name.push(',');
                        rule.name.push_str(&name);
                    }
                }
            }
        }
        i += 1;
    }
}

/// The unordered name -> value view used for content-equality merging.
fn declaration_set(rule: &RuleBlock) -> BTreeMap<String, String> {
    rule.declarations
        .iter()
        .map(|d| (d.name.clone(), d.value.clone()))
        .collect()
}

/// Removes blocks whose selector fails a shallow syntactic check (empty
/// simple selector from a stray comma or a doubled/leading/trailing
/// combinator), per REC-CSS2 4.1.7. Not a grammar validator.
pub fn discard_invalid(block: &mut AtBlock) -> Result<()> {
    let combinator = Regex::new(r"\s*[+>~\s]\s*")?;
    discard_invalid_in(block, &combinator);
    Ok(())
}

fn discard_invalid_in(block: &mut AtBlock, combinator: &Regex) {
    block.children.retain(|child| match child {
        Node::RuleBlock(rule) => selector_is_valid(&rule.name, combinator),
        Node::AtBlock(at) => selector_is_valid(&at.name, combinator),
        Node::Comment(_) | Node::RawAtStatement(_) => true,
    });
    for child in &mut block.children {
        if let Node::AtBlock(at) = child {
            discard_invalid_in(at, combinator);
        }
    }
}

fn selector_is_valid(name: &str, combinator: &Regex) -> bool {
    name.split(',').all(|part| {
        combinator
            .split(part.trim())
            .all(|simple| !simple.is_empty())
    })
}

/// Splits comma-joined selectors into one rule block per simple selector,
/// each with a copy of the declarations.
/// Example: `a,b {color:red}` -> `a {color:red} b {color:red}`.
pub fn separate(block: &mut AtBlock) {
    let mut i = 0;
    while i < block.children.len() {
        let split = match &mut block.children[i] {
            Node::AtBlock(at) => {
                separate(at);
                None
            }
            Node::RuleBlock(rule) => {
                let subs: Vec<String> =
                    rule.sub_selectors().iter().map(|s| s.to_string()).collect();
                if subs.len() > 1 {
                    Some((subs, rule.declarations.clone()))
                } else {
                    None
                }
            }
            _ => None,
        };

        if let Some((subs, declarations)) = split {
            let replacements: Vec<Node> = subs
                .into_iter()
                .map(|name| {
                    Node::RuleBlock(RuleBlock {
                        name,
                        declarations: declarations.clone(),
                    })
                })
                .collect();
            let added = replacements.len();
            block.children.splice(i..=i, replacements);
            i += added;
        } else {
            i += 1;
        }
    }
}

/// The recommended pass order. Splitting runs last so that
/// `merge_by_properties` can still recognize identical multi-selector
/// blocks; every pass is individually skippable.
pub fn optimize(document: &mut Document) -> Result<()> {
    discard_invalid(&mut document.root)?;
    merge_by_name(&mut document.root);
    merge_by_properties(&mut document.root);
    separate(&mut document.root);
    Ok(())
}
