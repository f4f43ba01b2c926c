use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MemeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        MemeError::invalid_input("x")
            .to_string()
            .contains("invalid input:")
    );
    assert!(
        MemeError::upstream("x")
            .to_string()
            .contains("upstream failure:")
    );
    assert!(MemeError::encode("x").to_string().contains("encode error:"));
}

#[test]
fn rate_limited_reports_whole_seconds() {
    let err = MemeError::rate_limited(Duration::from_millis(2_500));
    assert_eq!(err.to_string(), "rate limit exceeded (resets in 2s)");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MemeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
