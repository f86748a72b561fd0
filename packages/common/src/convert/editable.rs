use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Structured, editor-friendly form of a document.
///
/// The shape follows the section/block/inline nesting used by browser document editors:
/// a block is a paragraph and its text is the concatenation of its inlines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EditableDocument {
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Section {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Block {
    #[serde(default)]
    pub inlines: Vec<Inline>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Inline {
    #[serde(default)]
    pub text: String,
}

impl EditableDocument {
    /// Build a single-section document with one block per paragraph.
    pub fn from_paragraphs<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let blocks = paragraphs
            .into_iter()
            .map(|text| Block {
                inlines: vec![Inline { text: text.into() }],
            })
            .collect();
        Self {
            sections: vec![Section { blocks }],
        }
    }

    /// Paragraph texts across all sections, in document order.
    pub fn paragraphs(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|section| section.blocks.iter())
            .map(|block| block.inlines.iter().map(|i| i.text.as_str()).collect())
            .collect()
    }
}
