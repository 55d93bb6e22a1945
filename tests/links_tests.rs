use tubetldr::utils::links::{extract_id, normalize, video_ref};

const ID: &str = "abc123XYZ9";
const CANONICAL: &str = "https://www.youtube.com/watch?v=abc123XYZ9";

#[test]
fn test_all_url_forms_share_canonical_form() {
    let forms = [
        "https://youtu.be/abc123XYZ9",
        "youtu.be/abc123XYZ9?t=42",
        "https://www.youtube.com/watch?v=abc123XYZ9",
        "https://youtube.com/watch?v=abc123XYZ9&list=PL1&index=2",
        "https://m.youtube.com/watch?feature=share&v=abc123XYZ9",
        "https://www.youtube.com/live/abc123XYZ9?si=x",
        "https://youtube.com/shorts/abc123XYZ9",
        "https://www.youtube.com/embed/abc123XYZ9",
        "HTTPS://WWW.YOUTUBE.COM/watch?v=abc123XYZ9",
    ];

    for form in forms {
        let canonical = normalize(form);
        assert_eq!(canonical.as_deref(), Some(CANONICAL), "form: {form}");
        assert_eq!(extract_id(CANONICAL), Some(ID));
    }
}

#[test]
fn test_link_inside_chat_text() {
    assert_eq!(
        normalize("이거 봐봐 https://youtu.be/abc123XYZ9 진짜 웃김").as_deref(),
        Some(CANONICAL)
    );
    assert_eq!(
        normalize("check https://youtu.be/abc123XYZ9 out").as_deref(),
        Some(CANONICAL)
    );
}

#[test]
fn test_first_link_wins() {
    assert_eq!(
        normalize("https://youtu.be/first_1 and https://youtu.be/second-2").as_deref(),
        Some("https://www.youtube.com/watch?v=first_1")
    );
}

#[test]
fn test_text_without_link_is_none() {
    for text in [
        "",
        "hello",
        "https://www.youtube.com/channel/UC123",
        "https://vimeo.com/12345",
        "youtube.com/watch?list=PL1",
    ] {
        assert_eq!(normalize(text), None, "text: {text}");
    }
}

#[test]
fn test_extract_id_inverts_normalize() {
    for id in ["a", "Q_w-1", "abc_DEF-12", "00000000000"] {
        let canonical = normalize(&format!("https://youtu.be/{id}")).unwrap();
        assert_eq!(extract_id(&canonical), Some(id));
    }
}

#[test]
fn test_video_ref() {
    let video = video_ref("https://youtube.com/shorts/Q_w-1").unwrap();
    assert_eq!(video.video_id, "Q_w-1");
    assert_eq!(video.canonical_url, "https://www.youtube.com/watch?v=Q_w-1");
    assert!(video_ref("no link").is_none());
}
