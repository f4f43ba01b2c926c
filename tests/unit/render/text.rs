use super::*;

#[test]
fn garbage_font_bytes_are_rejected() {
    let err = CaptionFont::from_bytes(b"not a font".to_vec()).unwrap_err();
    assert!(err.to_string().contains("no font faces"));
}

#[test]
fn missing_font_file_is_an_error() {
    assert!(CaptionFont::resolve(Some(Path::new("/definitely/not/here.ttf"))).is_err());
}

#[test]
fn shaper_rejects_bad_sizes() {
    let Some(font) = CaptionFont::system_default() else {
        return;
    };
    assert!(CaptionShaper::new(&font, 0.0).is_err());
    assert!(CaptionShaper::new(&font, f32::NAN).is_err());
}

#[test]
fn shaping_is_cached_and_grows_with_text() {
    // Hosts without any system font cannot shape; the compositor skips captions there.
    let Some(font) = CaptionFont::system_default() else {
        return;
    };
    assert!(!font.family().is_empty());

    let mut shaper = CaptionShaper::new(&font, 36.0).unwrap();
    let empty = shaper.shape("");
    assert!(empty.glyphs.is_empty());

    let hel = shaper.shape("HEL");
    let hello = shaper.shape("HELLO");
    assert_eq!(hello.glyphs.len(), 5);
    assert!(hello.width > hel.width);
    assert!(hello.baseline > 0.0);
    assert_eq!(hello.font_size, 36.0);

    let again = shaper.shape("HELLO");
    assert!(Arc::ptr_eq(&hello, &again));
}
