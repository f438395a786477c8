use super::*;

#[test]
fn formats_map_to_mime_and_extension() {
    assert_eq!(ImageFormat::Png.mime(), "image/png");
    assert_eq!(ImageFormat::Jpeg.mime(), "image/jpeg");
    assert_eq!(ImageFormat::Webp.mime(), "image/webp");
    assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
    assert_eq!(ImageFormat::default(), ImageFormat::Png);
}

#[test]
fn formats_parse_from_lowercase_names() {
    let f: ImageFormat = serde_json::from_str("\"webp\"").unwrap();
    assert_eq!(f, ImageFormat::Webp);
    assert!(serde_json::from_str::<ImageFormat>("\"gif\"").is_err());
}

#[test]
fn only_plain_modifier_names_count() {
    assert!(is_modifier("Shift"));
    assert!(is_modifier("Meta"));
    assert!(!is_modifier("Delete"));
    assert!(!is_modifier("shift"));
}

#[test]
fn canvas_sizes_round_to_whole_pixels() {
    assert_eq!(px(799.6), 800);
    assert_eq!(px(-3.0), 0);
}
