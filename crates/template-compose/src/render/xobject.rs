//! Raster to image XObject encoding

use crate::types::{ComposeError, Result};
use image::RgbaImage;
use lopdf::{Dictionary, Object, Stream};

/// Encode a raster as a Flate-compressed 8-bit DeviceRGB image XObject.
///
/// Alpha is flattened onto white, so partially transparent assets print
/// the way they look on screen.
pub fn encode_raster(img: &RgbaImage) -> Result<Stream> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(ComposeError::Encoding(format!(
            "raster has no pixels ({}x{})",
            width, height
        )));
    }

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in img.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u32;
        for channel in [r, g, b] {
            let blended = (channel as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
            rgb.push(blended as u8);
        }
    }

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));

    let mut stream = Stream::new(dict, rgb);
    stream
        .compress()
        .map_err(|e| ComposeError::Encoding(format!("compression failed: {}", e)))?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn pixel_bytes(stream: &Stream) -> Vec<u8> {
        if stream.dict.has(b"Filter") {
            stream.decompressed_content().unwrap()
        } else {
            stream.content.clone()
        }
    }

    #[test]
    fn test_zero_sized_raster_fails() {
        let img = RgbaImage::new(0, 10);
        assert!(matches!(encode_raster(&img), Err(ComposeError::Encoding(_))));
    }

    #[test]
    fn test_image_dictionary() {
        let img = RgbaImage::from_pixel(64, 48, Rgba([10, 20, 30, 255]));
        let stream = encode_raster(&img).unwrap();

        assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 64);
        assert_eq!(stream.dict.get(b"Height").unwrap().as_i64().unwrap(), 48);
        assert_eq!(
            stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceRGB"
        );
        assert_eq!(
            stream.dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"FlateDecode"
        );
    }

    #[test]
    fn test_alpha_flattened_onto_white() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        let stream = encode_raster(&img).unwrap();
        assert_eq!(pixel_bytes(&stream), vec![255, 255, 255]);

        let img = RgbaImage::from_pixel(1, 1, Rgba([0, 100, 200, 255]));
        let stream = encode_raster(&img).unwrap();
        assert_eq!(pixel_bytes(&stream), vec![0, 100, 200]);
    }
}
