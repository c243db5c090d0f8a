//! Response descriptors returned by destination dispatch.
//!
//! The render pipeline has no HTTP layer; these descriptors carry the bytes
//! plus the delivery metadata an embedding web framework needs to build its
//! own response.

/// How a response body should be presented by the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Display in place (e.g. `Content-Disposition: inline`).
    Inline,
    /// Force a download (e.g. `Content-Disposition: attachment`).
    Attachment,
}

/// A deliverable document: body bytes plus presentation metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentResponse {
    /// Response body.
    pub body: Vec<u8>,
    /// File name presented to the consumer.
    pub file_name: String,
    /// MIME content type.
    pub content_type: &'static str,
    /// Presentation disposition.
    pub disposition: Disposition,
}

/// Result of a destination dispatch.
#[derive(Debug)]
pub enum RenderOutput {
    /// A deliverable response (inline/download/plain-text modes).
    Response(DocumentResponse),
    /// The artifact was persisted to the store; nothing to deliver.
    Stored,
}

impl RenderOutput {
    /// The response descriptor, if this output carries one.
    #[must_use]
    pub fn response(&self) -> Option<&DocumentResponse> {
        match self {
            Self::Response(response) => Some(response),
            Self::Stored => None,
        }
    }

    /// True when the output is a persisted-to-store acknowledgement.
    #[must_use]
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored)
    }
}
