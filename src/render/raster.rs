use super::{CardFace, CardRenderer, CardSide, RenderError, RenderedImage};
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use std::io::Cursor;

/// Base card dimensions before scaling (portrait CR80 proportions)
const BASE_WIDTH: u32 = 320;
const BASE_HEIGHT: u32 = 508;

/// Header band height as a fraction of card height, in percent
const BAND_PERCENT: u32 = 18;

const CARD_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const FRONT_BAND: Rgba<u8> = Rgba([21, 71, 140, 255]);
const BACK_BAND: Rgba<u8> = Rgba([40, 40, 48, 255]);

/// Rasterizes card faces at a fixed high scale.
pub struct RasterRenderer {
    scale: u32,
}

impl RasterRenderer {
    pub fn new(scale: u32) -> Self {
        // A zero scale would produce an empty canvas
        Self { scale: scale.max(1) }
    }

    fn fill_band(canvas: &mut RgbaImage, from_y: u32, to_y: u32, color: Rgba<u8>) {
        for y in from_y..to_y.min(canvas.height()) {
            for x in 0..canvas.width() {
                canvas.put_pixel(x, y, color);
            }
        }
    }

    fn place_photo(canvas: &mut RgbaImage, photo_bytes: &[u8], band_height: u32) {
        // Undecodable photo bytes degrade to a photo-less face
        let Ok(photo) = image::load_from_memory(photo_bytes) else {
            return;
        };

        let slot = canvas.width() / 2;
        let thumb = photo.thumbnail(slot, slot).to_rgba8();
        let x = (canvas.width().saturating_sub(thumb.width()) / 2) as i64;
        let y = (band_height + band_height / 2) as i64;
        imageops::overlay(canvas, &thumb, x, y);
    }
}

impl CardRenderer for RasterRenderer {
    fn render(&self, face: &CardFace<'_>, side: CardSide) -> Result<RenderedImage, RenderError> {
        let width = BASE_WIDTH * self.scale;
        let height = BASE_HEIGHT * self.scale;
        let band_height = height * BAND_PERCENT / 100;

        let mut canvas = RgbaImage::from_pixel(width, height, CARD_BACKGROUND);

        match side {
            CardSide::Front => {
                Self::fill_band(&mut canvas, 0, band_height, FRONT_BAND);
                if let Some(photo_bytes) = face.photo {
                    Self::place_photo(&mut canvas, photo_bytes, band_height);
                }
            }
            CardSide::Back => {
                Self::fill_band(&mut canvas, height - band_height, height, BACK_BAND);
            }
        }

        let mut encoded = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(canvas).write_to(&mut encoded, image::ImageFormat::Png)?;

        Ok(RenderedImage {
            bytes: encoded.into_inner(),
            width,
            height,
        })
    }
}
