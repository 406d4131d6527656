//! Output/optimization options recognized by the builder and the
//! serializer. Option-string parsing is the caller's business; this is
//! just the typed record.

use crate::template::Template;

/// Case rewriting applied to property names at render time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CaseProperties {
    #[default]
    Unchanged,
    Lowercase,
    Uppercase,
}

/// Whether the builder keeps repeated selectors apart or lets the merge
/// passes coalesce them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MergeSelectors {
    /// Keep every non-adjacent repeated selector as its own block.
    DoNotChange,
    /// Leave repeated selectors under one key; merging is handled by the
    /// structural passes.
    #[default]
    Merge,
}

#[derive(Clone, Debug)]
pub struct Configuration {
    pub template: Template,
    pub case_properties: CaseProperties,
    pub lowercase_selectors: bool,
    pub sort_selectors: bool,
    pub sort_properties: bool,
    pub merge_selectors: MergeSelectors,
    pub preserve_comments: bool,
    pub remove_last_semicolon: bool,
    pub add_timestamp: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            template: Template::default(),
            case_properties: CaseProperties::Unchanged,
            lowercase_selectors: false,
            sort_selectors: false,
            sort_properties: false,
            merge_selectors: MergeSelectors::Merge,
            preserve_comments: true,
            remove_last_semicolon: false,
            add_timestamp: false,
        }
    }
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }
}
