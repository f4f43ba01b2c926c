use super::*;

#[test]
fn canvas_rejects_zero_and_oversized_edges() {
    assert!(matches!(
        Canvas::new(0, 10),
        Err(MemeError::InvalidInput(_))
    ));
    assert!(matches!(
        Canvas::new(10, 0),
        Err(MemeError::InvalidInput(_))
    ));
    assert!(Canvas::new(MAX_CANVAS_EDGE + 1, 1).is_err());
    assert!(Canvas::new(MAX_CANVAS_EDGE, 1).is_ok());
}

#[test]
fn canvas_buffer_len_and_center() {
    let c = Canvas::new(100, 20).unwrap();
    assert_eq!(c.rgba8_len(), 100 * 20 * 4);
    assert_eq!(c.center_x(), 50.0);
}
