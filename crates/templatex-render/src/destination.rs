//! Destination modes for rendered documents.

use std::str::FromStr;

use crate::error::RenderError;

/// How a rendered document's artifact is delivered.
///
/// Parsed from the mode strings callers pass at render time; parsing is
/// ASCII-case-insensitive and anything unrecognized fails with
/// [`RenderError::InvalidDestination`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Return the PDF as an inline-displayable response.
    Inline,
    /// Return the PDF as a force-download response.
    Download,
    /// Persist the PDF to the artifact store.
    Storage,
    /// Persist the PDF and return it inline.
    StorageInline,
    /// Persist the PDF and return it as a download.
    StorageDownload,
    /// Return the staged LaTeX source as a download.
    Tex,
    /// Return the rendered LaTeX text as a plain-text response.
    TexString,
    /// Persist the staged LaTeX source to the artifact store.
    StorageTex,
}

impl Destination {
    /// True when this mode persists the PDF artifact to the store.
    #[must_use]
    pub fn stores_pdf(self) -> bool {
        matches!(self, Self::Storage | Self::StorageInline | Self::StorageDownload)
    }
}

impl FromStr for Destination {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "download" => Ok(Self::Download),
            "storage" => Ok(Self::Storage),
            "storage-inline" => Ok(Self::StorageInline),
            "storage-download" => Ok(Self::StorageDownload),
            "tex" => Ok(Self::Tex),
            "tex-string" => Ok(Self::TexString),
            "storage-tex" => Ok(Self::StorageTex),
            _ => Err(RenderError::InvalidDestination(s.to_owned())),
        }
    }
}
