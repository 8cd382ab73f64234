//! 截图解码为 PDF 图片对象

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{Dictionary, Object, Stream};

use crate::error::{AppError, AppResult, ImageError, RenderError};
use crate::models::ScreenshotRef;

/// 解码后的 RGB 图片
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    rgb: Vec<u8>,
}

impl DecodedImage {
    /// 高 / 宽
    pub fn aspect_ratio(&self) -> f32 {
        self.height as f32 / self.width as f32
    }
}

/// 解码截图；透明像素合成到白底上
pub fn decode_screenshot(shot: &ScreenshotRef) -> AppResult<DecodedImage> {
    let img = image::load_from_memory(&shot.data)
        .map_err(|e| AppError::image_decode_failed(&shot.filename, e))?;

    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidDimensions {
            filename: shot.filename.clone(),
            width,
            height,
        }
        .into());
    }

    let rgba = img.to_rgba8();
    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u16;
        for channel in [r, g, b] {
            let blended = (channel as u16 * alpha + 255 * (255 - alpha)) / 255;
            rgb.push(blended as u8);
        }
    }

    Ok(DecodedImage { width, height, rgb })
}

/// 构建 FlateDecode 压缩的 Image XObject
pub fn image_stream(image: &DecodedImage) -> AppResult<Stream> {
    let compress_failed = |e: std::io::Error| RenderError::CompressFailed {
        source: Box::new(e),
    };

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&image.rgb).map_err(compress_failed)?;
    let compressed = encoder.finish().map_err(compress_failed)?;

    let dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(image.width as i64)),
        ("Height", Object::Integer(image.height as i64)),
        ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
        ("Filter", Object::Name(b"FlateDecode".to_vec())),
    ]);
    Ok(Stream::new(dict, compressed))
}
