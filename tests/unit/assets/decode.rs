use std::io::Cursor;

use super::*;

fn png_bytes(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(width, height, rgba.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_premultiplies_semi_transparent_pixels() {
    let bytes = png_bytes(1, 1, &[200, 100, 50, 128]);
    let img = decode_image(&bytes).unwrap();
    assert_eq!(img.width, 1);
    assert_eq!(img.height, 1);
    assert_eq!(img.rgba8_premul.as_slice(), &[100, 50, 25, 128]);
}

#[test]
fn decode_zero_alpha_clears_color_channels() {
    let bytes = png_bytes(1, 1, &[200, 100, 50, 0]);
    let img = decode_image(&bytes).unwrap();
    assert_eq!(img.rgba8_premul.as_slice(), &[0, 0, 0, 0]);
}

#[test]
fn decode_opaque_pixels_pass_through() {
    let bytes = png_bytes(2, 1, &[10, 20, 30, 255, 40, 50, 60, 255]);
    let img = decode_image(&bytes).unwrap();
    assert_eq!(
        img.rgba8_premul.as_slice(),
        &[10, 20, 30, 255, 40, 50, 60, 255]
    );
}

#[test]
fn decode_garbage_is_an_error() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn transparent_placeholder_is_all_zero() {
    let img = PreparedImage::transparent(3, 2);
    assert_eq!(img.width, 3);
    assert_eq!(img.height, 2);
    assert!(img.rgba8_premul.iter().all(|&b| b == 0));
}

#[test]
fn from_premul_rejects_bad_lengths() {
    assert!(PreparedImage::from_premul_rgba8(2, 2, vec![0u8; 15]).is_err());
    assert!(PreparedImage::from_premul_rgba8(2, 2, vec![0u8; 16]).is_ok());
}
