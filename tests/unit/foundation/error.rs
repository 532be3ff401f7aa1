use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MotionError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(MotionError::parse("x").to_string().contains("parse error:"));
    assert!(MotionError::dom("x").to_string().contains("dom error:"));
    assert!(
        MotionError::from(LoadError::Cancelled)
            .to_string()
            .contains("load error:")
    );
}

#[test]
fn fetch_error_names_url() {
    let err = LoadError::Fetch {
        url: "https://cdn.test/gsap.min.js".to_owned(),
        reason: "timeout".to_owned(),
    };
    let msg = err.to_string();
    assert!(msg.contains("gsap.min.js"));
    assert!(msg.contains("timeout"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MotionError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
