//! Mapping from remote document metadata to display decoration

use docharvest_domain::{Decoration, DocumentMetadata};

/// Build the decoration shown for a document
///
/// Total: a missing or unreachable document (`None`) yields
/// [`Decoration::broken`]. Otherwise the title is the document title and
/// the details are the first author's name, falling back to the publisher.
///
/// # Examples
///
/// ```
/// use docharvest_domain::{Author, DocumentMetadata};
/// use docharvest_source::document_to_decoration;
///
/// let doc = DocumentMetadata {
///     title: Some("T".to_string()),
///     authors: vec![Author { name: "A".to_string() }],
///     publisher: Some("P".to_string()),
///     ..Default::default()
/// };
/// let decoration = document_to_decoration(Some(&doc));
/// assert_eq!(decoration.title, "T");
/// assert_eq!(decoration.details, "A");
/// ```
pub fn document_to_decoration(document: Option<&DocumentMetadata>) -> Decoration {
    let Some(doc) = document else {
        return Decoration::broken();
    };

    let details = doc
        .first_author_name()
        .or(doc.publisher.as_deref())
        .unwrap_or_default();

    Decoration::new(doc.title.clone().unwrap_or_default(), details)
}
