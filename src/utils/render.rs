use crate::core::{RenderFrame, Result, SimError};

/// Encode a RenderFrame::Pixels to a PNG byte vector.
/// - When the `image` feature is enabled, this encodes using the `image` crate.
/// - Without the feature, returns SimError::NotSupported.
pub fn encode_png(frame: &RenderFrame) -> Result<Vec<u8>> {
    match frame {
        RenderFrame::Pixels { width, height, data } => encode_pixels_png(*width, *height, data),
        RenderFrame::Text(_) => Err(SimError::NotSupported("Text frames cannot be encoded to PNG".into())),
    }
}

#[cfg(feature = "image")]
fn encode_pixels_png(width: u32, height: u32, data: &Vec<u8>) -> Result<Vec<u8>> {
    use image::codecs::png::PngEncoder;
    use image::{ColorType, ImageEncoder};
    use std::io::Cursor;

    let pixels = data.as_slice();
    let count = (width as usize) * (height as usize);
    let channels = if pixels.len() == count * 3 {
        3
    } else if pixels.len() == count * 4 {
        4
    } else {
        return Err(SimError::Other(format!(
            "Pixel data length {} does not match width*height*3 or *4 ({}x{})",
            pixels.len(), width, height
        )));
    };

    let color = if channels == 3 { ColorType::Rgb8 } else { ColorType::Rgba8 };

    let mut buf = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buf);
        let encoder = PngEncoder::new(&mut cursor);
        encoder
            .write_image(pixels, width, height, color.into())
            .map_err(|e| SimError::Other(format!("PNG encode error: {}", e)))?;
    }
    Ok(buf)
}

#[cfg(not(feature = "image"))]
fn encode_pixels_png(_width: u32, _height: u32, _data: &Vec<u8>) -> Result<Vec<u8>> {
    Err(SimError::NotSupported(
        "PNG encoding requires the `image` feature".into(),
    ))
}

/// Save a RenderFrame::Pixels as a PNG file at the given path.
/// Requires the `image` feature; otherwise returns NotSupported.
pub fn save_png<P: AsRef<std::path::Path>>(path: P, frame: &RenderFrame) -> Result<()> {
    let bytes = encode_png(frame)?;
    std::fs::write(path, bytes).map_err(|e| SimError::Other(format!("Failed to write PNG: {}", e)))
}

/// Save a rollout as a numbered PNG sequence `<stem>_0000.png`, ... under
/// `dir` (created if missing). Refuses an empty frame list: frames only exist
/// if rendering was enabled during the rollout.
pub fn save_frames<P: AsRef<std::path::Path>>(
    dir: P,
    stem: &str,
    frames: &[RenderFrame],
) -> Result<()> {
    if frames.is_empty() {
        return Err(SimError::NotReady(
            "no frames to save; render the rollout first".into(),
        ));
    }
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .map_err(|e| SimError::Other(format!("Failed to create {}: {}", dir.display(), e)))?;
    for (i, frame) in frames.iter().enumerate() {
        save_png(dir.join(format!("{stem}_{i:04}.png")), frame)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba_2x2() -> RenderFrame {
        RenderFrame::Pixels {
            width: 2,
            height: 2,
            data: vec![
                255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 255, 255, 255, 255,
            ],
        }
    }

    #[cfg(not(feature = "image"))]
    #[test]
    fn encode_png_without_feature_not_supported() {
        let err = encode_png(&rgba_2x2()).unwrap_err();
        match err {
            SimError::NotSupported(_) => {}
            other => panic!("Expected NotSupported, got {:?}", other),
        }
    }

    #[cfg(feature = "image")]
    #[test]
    fn encode_png_with_feature_produces_png_signature() {
        let bytes = encode_png(&rgba_2x2()).expect("PNG encoding should succeed");
        let sig = &bytes[..8];
        assert_eq!(sig, &[137, 80, 78, 71, 13, 10, 26, 10]);
    }

    #[test]
    fn save_frames_rejects_empty_rollout() {
        let err = save_frames(std::env::temp_dir(), "rollout", &[]).unwrap_err();
        assert!(matches!(err, SimError::NotReady(_)));
    }
}
