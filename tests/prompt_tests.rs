use tubetldr::prompt::build_summary_prompt;

#[test]
fn test_prompt_embeds_title_and_transcript_verbatim() {
    let transcript = "첫 줄\n  둘째 줄 with {braces} and 'quotes'";
    let prompt = build_summary_prompt("My Video", transcript);

    assert!(prompt.contains("'My Video'라는 제목의 영상"));
    assert!(prompt.contains(transcript));
    assert!(prompt.contains("--- 자막 내용 ---\n"));
    assert!(prompt.trim_end().ends_with("요약:"));
}

#[test]
fn test_prompt_asks_for_bullets_in_korean() {
    let prompt = build_summary_prompt("t", "x");

    assert!(prompt.contains("3~5개의 주요 항목"));
    assert!(prompt.contains("글머리 기호(•)"));
    assert!(prompt.contains("한국어로 요약"));
}

#[test]
fn test_prompt_lines_are_not_indented() {
    let prompt = build_summary_prompt("t", "x");
    for line in prompt.lines() {
        assert!(!line.starts_with(' '), "indented line: {line:?}");
    }
}
