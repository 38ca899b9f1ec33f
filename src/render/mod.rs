//! # Card Face Rendering
//!
//! Synthesis of printable front/back card faces for vendor dispatch. The
//! workflow depends only on [`CardRenderer`]; the raster implementation
//! composites the employee photo onto a fixed-size card canvas at the
//! configured scale and PNG-encodes the result. Textual card layout belongs
//! to the presentation layer and is out of scope here.

pub mod raster;

pub use raster::RasterRenderer;

use std::fmt;

/// Which face of the card to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSide {
    Front,
    Back,
}

impl fmt::Display for CardSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => f.write_str("front"),
            Self::Back => f.write_str("back"),
        }
    }
}

/// The card-face inputs a renderer needs
#[derive(Debug, Clone, Default)]
pub struct CardFace<'a> {
    pub full_name: &'a str,
    pub employee_code: &'a str,
    pub branch: &'a str,
    /// Raw photo bytes, when the employee has one
    pub photo: Option<&'a [u8]>,
}

/// A rendered, encoded card face
#[derive(Debug, Clone)]
pub struct RenderedImage {
    /// PNG-encoded image data
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Errors surfaced while rendering a card face
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Renders card faces for dispatch
pub trait CardRenderer: Send + Sync {
    fn render(&self, face: &CardFace<'_>, side: CardSide) -> Result<RenderedImage, RenderError>;
}
