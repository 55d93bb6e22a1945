/// Builds the summary prompt sent to the generation service.
///
/// Title and transcript are embedded verbatim; the model is asked for three to
/// five bullet points in Korean.
pub fn build_summary_prompt(title: &str, transcript: &str) -> String {
    format!(
        "당신은 YouTube 영상 요약 전문가입니다. 다음은 '{title}'라는 제목의 영상에서 추출한 자막입니다.\n\
         이 자막 내용을 바탕으로, 영상의 핵심 내용을 3~5개의 주요 항목으로 정리하여 한국어로 요약해주세요.\n\
         각 항목은 글머리 기호(•)로 시작하고, 간결하고 명확하게 설명해야 합니다.\n\
         전체적으로는 친근하고 이해하기 쉬운 어조를 사용해주세요.\n\
         \n\
         --- 자막 내용 ---\n\
         {transcript}\n\
         --- 자막 끝 ---\n\
         \n\
         요약:"
    )
}
