//! Documentation metadata shared by every Blueprint entity.

use serde::Serialize;

use blueprint_spec_parser::{Annotation, EnumValueDoc, Operation, SchemaNode};

/// Description and deprecated/undocumented/draft status of an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocMeta {
    pub description: String,
    pub is_deprecated: bool,
    pub deprecation_message: String,
    pub is_undocumented: bool,
    pub undocumented_message: String,
    pub is_draft: bool,
    pub draft_message: String,
}

impl DocMeta {
    pub fn from_schema(node: &SchemaNode) -> Self {
        Self::build(
            node.description.as_deref(),
            node.deprecated.unwrap_or(false),
            node.deprecation.as_ref(),
            node.undocumented.as_ref(),
            node.draft.as_ref(),
        )
    }

    pub fn from_operation(operation: &Operation) -> Self {
        Self::build(
            operation.description.as_deref(),
            operation.deprecated,
            operation.deprecation.as_ref(),
            operation.undocumented.as_ref(),
            operation.draft.as_ref(),
        )
    }

    pub fn from_enum_doc(doc: &EnumValueDoc) -> Self {
        Self::build(
            doc.description.as_deref(),
            false,
            doc.deprecated.as_ref(),
            doc.undocumented.as_ref(),
            doc.draft.as_ref(),
        )
    }

    fn build(
        description: Option<&str>,
        deprecated: bool,
        deprecation: Option<&Annotation>,
        undocumented: Option<&Annotation>,
        draft: Option<&Annotation>,
    ) -> Self {
        Self {
            description: description.map(normalize_description).unwrap_or_default(),
            is_deprecated: deprecated || deprecation.is_some_and(Annotation::is_set),
            deprecation_message: message(deprecation),
            is_undocumented: undocumented.is_some_and(Annotation::is_set),
            undocumented_message: message(undocumented),
            is_draft: draft.is_some_and(Annotation::is_set),
            draft_message: message(draft),
        }
    }
}

fn message(annotation: Option<&Annotation>) -> String {
    annotation
        .map(|a| normalize_description(a.message()))
        .unwrap_or_default()
}

/// Normalize a free-form description: strip trailing whitespace on each line,
/// remove the common indentation, and trim surrounding blank lines.
pub fn normalize_description(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    let indent = lines
        .iter()
        .filter(|line| !line.is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Aggregate flags for a parent entity: set only when every child has it.
///
/// An empty child set yields `false`; a parent with nothing beneath it is not
/// reported as deprecated, undocumented, or draft.
pub(crate) fn all_children<T>(children: &[T], flag: impl Fn(&T) -> bool) -> bool {
    !children.is_empty() && children.iter().all(flag)
}
