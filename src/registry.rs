//! Maps document type tags to their factories.

use std::fmt;
use std::str::FromStr;

use crate::documents::{Document, Letter, Protocol, Resume};
use crate::error::{DocumentError, Result};
use crate::fields::FieldValues;

/// The supported document types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Resume,
    Letter,
    Protocol,
}

impl DocumentKind {
    /// Every kind, in the order the tags are listed.
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::Resume,
        DocumentKind::Letter,
        DocumentKind::Protocol,
    ];

    /// The canonical registry tag.
    pub fn tag(self) -> &'static str {
        match self {
            DocumentKind::Resume => "cv",
            DocumentKind::Letter => "letter",
            DocumentKind::Protocol => "protocol",
        }
    }

    /// Human readable name of the type.
    pub fn title(self) -> &'static str {
        match self {
            DocumentKind::Resume => "Резюме",
            DocumentKind::Letter => "Діловий лист",
            DocumentKind::Protocol => "Протокол",
        }
    }

    /// Looks up a tag. `resume` is accepted as an alias of `cv`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "cv" | "resume" => Some(DocumentKind::Resume),
            "letter" => Some(DocumentKind::Letter),
            "protocol" => Some(DocumentKind::Protocol),
            _ => None,
        }
    }

    /// Builds a document of this kind from `fields`.
    pub fn create(self, fields: FieldValues) -> Document {
        match self {
            DocumentKind::Resume => Resume::new(fields).into(),
            DocumentKind::Letter => Letter::new(fields).into(),
            DocumentKind::Protocol => Protocol::new(fields).into(),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DocumentKind {
    type Err = DocumentError;

    fn from_str(tag: &str) -> Result<Self> {
        Self::from_tag(tag).ok_or_else(|| DocumentError::UnknownDocumentType(tag.to_owned()))
    }
}

/// Builds the document registered under `tag` with a snapshot of `fields`.
pub fn create_document(tag: &str, fields: FieldValues) -> Result<Document> {
    let kind: DocumentKind = tag.parse()?;
    log::debug!("Creating {} document from {} field(s)", kind, fields.len());
    Ok(kind.create(fields))
}

/// The canonical tags the registry accepts.
pub fn available_types() -> Vec<&'static str> {
    DocumentKind::ALL.iter().map(|kind| kind.tag()).collect()
}
