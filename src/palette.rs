use crate::browser;
use anyhow::{anyhow, ensure, Result};
use web_sys::{HtmlCanvasElement, HtmlImageElement};

/// Colour every transparent pixel of the tile image resolves to
/// - the scratch canvas is shared, so without this fill transparent pixels
/// would pick up whatever was drawn there before
pub const BACKGROUND: Rgb = Rgb {
    r: 0x60,
    g: 0x80,
    b: 0x50,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// `#rrggbb`, the form canvas fillStyle accepts
    pub fn to_css(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opaque(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xff]
    }
}

/// Raw RGBA pixels of the tile image, row major, 4 bytes per pixel
///
/// Built once at startup and then moved into the engine; nothing mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        ensure!(
            data.len() == expected,
            "PixelBuffer {}x{} needs {} bytes, got {}",
            width,
            height,
            expected,
            data.len()
        );
        Ok(PixelBuffer {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.data[offset..offset + 4]);
        Some(rgba)
    }
}

/// Renders `image` onto `surface` over the BACKGROUND colour and reads the
/// pixels back
///
/// ┌──────────── scratch canvas ────────────┐
/// │ 1. resize to natural image size        │
/// │ 2. fillRect BACKGROUND                 │
/// │ 3. drawImage at (0, 0)                 │
/// │ 4. getImageData over the whole image   │
/// └────────────────────────────────────────┘
pub fn extract(image: &HtmlImageElement, surface: &HtmlCanvasElement) -> Result<PixelBuffer> {
    let width = image.natural_width();
    let height = image.natural_height();
    ensure!(
        width > 0 && height > 0,
        "Image '{}' has no pixels ({}x{})",
        image.src(),
        width,
        height
    );

    surface.set_width(width);
    surface.set_height(height);
    let context = browser::context_of(surface)?;

    context.set_fill_style_str(&BACKGROUND.to_css());
    context.fill_rect(0.0, 0.0, width.into(), height.into());
    context
        .draw_image_with_html_image_element(image, 0.0, 0.0)
        .map_err(|err| anyhow!("Could not draw image onto palette canvas : {:#?}", err))?;

    let image_data = context
        .get_image_data(0.0, 0.0, width.into(), height.into())
        .map_err(|err| anyhow!("Could not read palette pixels : {:#?}", err))?;

    PixelBuffer::new(image_data.width(), image_data.height(), image_data.data().0)
}
