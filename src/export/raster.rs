use std::path::PathBuf;
use std::sync::Arc;

use image::codecs::png::PngEncoder;
use image::ImageEncoder;
use resvg::tiny_skia;

use crate::error::TernaryError;

/// Avoid pathological allocations from a bad scale setting.
const MAX_DIM: u32 = 16_384;

/// System fonts plus any configured font directories.
pub fn build_fontdb(font_dirs: &[PathBuf]) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    for dir in font_dirs {
        db.load_fonts_dir(dir);
    }
    log::debug!("font database holds {} faces", db.len());
    Arc::new(db)
}

/// Rasterize an SVG document to PNG bytes at `scale` pixels per SVG unit.
pub fn svg_to_png(
    svg: &[u8],
    scale: f32,
    fontdb: Arc<usvg::fontdb::Database>,
) -> Result<Vec<u8>, TernaryError> {
    let opts = usvg::Options {
        fontdb,
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(svg, &opts)
        .map_err(|e| TernaryError::Render(format!("parse svg tree: {e}")))?;

    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;
    if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
        return Err(TernaryError::Render(format!(
            "raster size {width}x{height} is out of range (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| TernaryError::Render("failed to allocate pixmap".to_string()))?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    // Opaque background, so premultiplied and straight RGBA coincide.
    encode_rgba_to_png(pixmap.data(), width, height)
}

/// Encode a raw RGBA pixel buffer to PNG.
fn encode_rgba_to_png(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, TernaryError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(rgba, width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| TernaryError::Render(format!("PNG encode: {e}")))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="10" height="10" fill="red"/></svg>"#;

    fn no_fonts() -> Arc<usvg::fontdb::Database> {
        Arc::new(usvg::fontdb::Database::new())
    }

    #[test]
    fn png_has_signature_and_scaled_size() {
        let png = svg_to_png(SQUARE.as_bytes(), 2.0, no_fonts()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 20));
    }

    #[test]
    fn invalid_svg_is_a_render_error() {
        let err = svg_to_png(b"not svg", 1.0, no_fonts()).unwrap_err();
        assert!(matches!(err, TernaryError::Render(_)));
    }

    #[test]
    fn oversized_scale_is_rejected() {
        let err = svg_to_png(SQUARE.as_bytes(), 10_000.0, no_fonts()).unwrap_err();
        assert!(matches!(err, TernaryError::Render(_)));
    }
}
