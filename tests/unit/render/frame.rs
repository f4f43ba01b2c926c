use std::io::Cursor;

use super::*;
use crate::caption::model::{CaptionStyle, mock_captions};

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_dimensions_and_premul() {
    let img = SourceImage::decode(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!((img.width, img.height), (1, 1));
    assert_eq!(
        img.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_rejects_garbage() {
    assert!(SourceImage::decode(b"definitely not an image").is_err());
}

#[test]
fn decode_refuses_edges_over_the_limit() {
    let wide = png_bytes(65, 4, [1, 2, 3, 255]);
    let err = SourceImage::decode_within(&wide, 64).unwrap_err();
    assert!(matches!(err, MemeError::Validation(_)));
    assert_eq!(
        err.to_string(),
        "validation error: Image dimensions exceed 64px"
    );

    let tall = png_bytes(4, 65, [1, 2, 3, 255]);
    assert!(matches!(
        SourceImage::decode_within(&tall, 64),
        Err(MemeError::Validation(_))
    ));

    let fits = SourceImage::decode_within(&png_bytes(64, 64, [1, 2, 3, 255]), 64).unwrap();
    assert_eq!((fits.width, fits.height), (64, 64));
}

#[test]
fn render_budget_counts_every_frame() {
    let image = SourceImage::from_rgba8(10, 5, vec![0; 200]).unwrap();
    let caption = CaptionRecord::new(CaptionStyle::TopBottom, "a", "b", "c");
    let req = AnimationRequest::new(image, caption).with_timing(3, 100);
    assert_eq!(req.frame_bytes(), 10 * 5 * 4 * 3);

    req.check_budget(600).unwrap();
    assert!(matches!(
        req.check_budget(599),
        Err(MemeError::Validation(_))
    ));
}

#[test]
fn request_defaults_and_validation() {
    let image = SourceImage::decode(&png_bytes(4, 3, [0, 0, 0, 255])).unwrap();
    let req = AnimationRequest::new(image.clone(), mock_captions().remove(0));
    assert_eq!(req.frame_count, 8);
    assert_eq!(req.frame_delay_ms, 200);
    assert_eq!(req.validate().unwrap(), Canvas::new(4, 3).unwrap());

    let caption = CaptionRecord::new(CaptionStyle::TopBottom, "a", "b", "c");
    let zero_frames = AnimationRequest::new(image.clone(), caption.clone()).with_timing(0, 200);
    assert!(matches!(
        zero_frames.validate(),
        Err(MemeError::InvalidInput(_))
    ));

    let zero_delay = AnimationRequest::new(image, caption).with_timing(8, 0);
    assert!(matches!(
        zero_delay.validate(),
        Err(MemeError::InvalidInput(_))
    ));
}

#[test]
fn zero_sized_image_is_invalid_input() {
    let empty = SourceImage::from_rgba8(0, 5, Vec::new()).unwrap();
    let req = AnimationRequest::new(
        empty,
        CaptionRecord::new(CaptionStyle::TopBottom, "a", "b", "c"),
    );
    assert!(matches!(req.validate(), Err(MemeError::InvalidInput(_))));
}

#[test]
fn from_rgba8_checks_length() {
    assert!(SourceImage::from_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(SourceImage::from_rgba8(2, 2, vec![0; 16]).is_ok());
}
