//! Gemini streaming over server-sent events
//!
//! `streamGenerateContent?alt=sse` emits one `GenerateContentResponse` per
//! SSE `data:` line. Only the first chunk with usable content is consumed by
//! the nodes; the rest of the stream is dropped.

use std::pin::Pin;

use eventsource_stream::{Event, Eventsource};
use futures_util::{Stream, StreamExt};

use crate::error::{NodeError, Result};

use super::types::{GenerateContentResponse, Part};

/// Stream of parsed response chunks
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<GenerateContentResponse>> + Send>>;

/// Convert one SSE event into a response chunk; empty events are skipped
pub fn convert_event(event: &Event) -> Option<Result<GenerateContentResponse>> {
    let data = event.data.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    Some(
        serde_json::from_str::<GenerateContentResponse>(data)
            .map_err(|e| NodeError::Parse(format!("Failed to parse Gemini SSE JSON: {e}"))),
    )
}

/// Wrap a successful streaming HTTP response
pub fn into_response_stream(response: reqwest::Response) -> ResponseStream {
    let stream = response
        .bytes_stream()
        .eventsource()
        .filter_map(|event| async move {
            match event {
                Ok(event) => convert_event(&event),
                Err(e) => Some(Err(NodeError::Http(format!("SSE stream error: {e}")))),
            }
        });
    Box::pin(stream)
}

/// Whether a chunk carries inline media or non-empty, non-thought text
pub fn has_usable_content(response: &GenerateContentResponse) -> bool {
    response.candidates.iter().any(|candidate| {
        candidate.parts().iter().any(|part| {
            part.inline_data.is_some()
                || (!part.is_thought() && part.text.as_deref().is_some_and(|t| !t.is_empty()))
        })
    })
}

/// Which streamed chunk a caller is after
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkSelection {
    /// First chunk with inline media or text
    #[default]
    FirstUsable,
    /// First chunk with inline media; text-only chunks are a fallback once
    /// the stream ends without media
    PreferMedia,
}

fn has_inline_media(response: &GenerateContentResponse) -> bool {
    response
        .candidates
        .iter()
        .any(|candidate| candidate.parts().iter().any(|part| part.inline_data.is_some()))
}

/// Put the text parts of an earlier chunk in front of the media chunk's parts
fn prepend_text(
    mut media: GenerateContentResponse,
    earlier: &GenerateContentResponse,
) -> GenerateContentResponse {
    let mut parts: Vec<Part> = earlier
        .candidates
        .first()
        .map(|candidate| {
            candidate
                .parts()
                .iter()
                .filter(|part| part.inline_data.is_none() && !part.is_thought())
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    if let Some(content) = media
        .candidates
        .first_mut()
        .and_then(|candidate| candidate.content.as_mut())
    {
        parts.append(&mut content.parts);
        content.parts = parts;
    }
    media
}

/// Drain the stream until a chunk matching `selection` arrives
pub async fn select_chunk(
    mut stream: ResponseStream,
    selection: ChunkSelection,
) -> Result<GenerateContentResponse> {
    let mut chunks = 0usize;
    let mut first_text: Option<GenerateContentResponse> = None;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        chunks += 1;
        if !has_usable_content(&chunk) {
            continue;
        }
        if selection == ChunkSelection::FirstUsable {
            tracing::debug!(chunks, "found usable stream chunk");
            return Ok(chunk);
        }
        if has_inline_media(&chunk) {
            tracing::debug!(chunks, "found stream chunk with inline media");
            return Ok(match &first_text {
                Some(earlier) => prepend_text(chunk, earlier),
                None => chunk,
            });
        }
        if first_text.is_none() {
            first_text = Some(chunk);
        }
    }

    match first_text {
        Some(chunk) => {
            tracing::debug!(chunks, "stream ended without inline media");
            Ok(chunk)
        }
        None => Err(NodeError::EmptyResponse(format!(
            "stream ended after {chunks} chunks without text or inline media"
        ))),
    }
}

/// Drain the stream until the first usable chunk
pub async fn first_usable(stream: ResponseStream) -> Result<GenerateContentResponse> {
    select_chunk(stream, ChunkSelection::FirstUsable).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn event(data: &str) -> Event {
        Event {
            event: "".to_string(),
            data: data.to_string(),
            id: "".to_string(),
            retry: None,
        }
    }

    fn chunk(json: &str) -> Result<GenerateContentResponse> {
        convert_event(&event(json)).unwrap()
    }

    #[test]
    fn test_convert_event() {
        assert!(convert_event(&event("  ")).is_none());

        let parsed = chunk(r#"{"candidates":[{"content":{"parts":[{"text":"Hello"}]}}]}"#).unwrap();
        assert_eq!(parsed.candidates[0].parts()[0].text.as_deref(), Some("Hello"));

        assert!(matches!(chunk("{not json"), Err(NodeError::Parse(_))));
    }

    #[test]
    fn test_usable_content() {
        let empty = chunk(r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#).unwrap();
        assert!(!has_usable_content(&empty));

        let thought =
            chunk(r#"{"candidates":[{"content":{"parts":[{"text":"hmm","thought":true}]}}]}"#)
                .unwrap();
        assert!(!has_usable_content(&thought));

        let media = chunk(
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"AA=="}}]}}]}"#,
        )
        .unwrap();
        assert!(has_usable_content(&media));
    }

    #[tokio::test]
    async fn test_first_usable_skips_empty_chunks() {
        let chunks = vec![
            chunk(r#"{"candidates":[{"finishReason":null}]}"#),
            chunk(r#"{"candidates":[{"content":{"parts":[{"text":"Hi"}]}}]}"#),
            chunk(r#"{"candidates":[{"content":{"parts":[{"text":"there"}]}}]}"#),
        ];
        let found = first_usable(Box::pin(stream::iter(chunks))).await.unwrap();
        assert_eq!(found.candidates[0].parts()[0].text.as_deref(), Some("Hi"));
    }

    #[tokio::test]
    async fn test_first_usable_empty_stream() {
        let chunks: Vec<Result<GenerateContentResponse>> =
            vec![chunk(r#"{"candidates":[]}"#)];
        let err = first_usable(Box::pin(stream::iter(chunks))).await.unwrap_err();
        assert!(matches!(err, NodeError::EmptyResponse(_)));
    }

    #[tokio::test]
    async fn test_prefer_media_waits_for_image() {
        let chunks = vec![
            chunk(r#"{"candidates":[{"content":{"parts":[{"text":"Here you go:"}]}}]}"#),
            chunk(
                r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"AA=="}}]}}]}"#,
            ),
        ];
        let found = select_chunk(Box::pin(stream::iter(chunks)), ChunkSelection::PreferMedia)
            .await
            .unwrap();
        let parts = found.candidates[0].parts();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].text.as_deref(), Some("Here you go:"));
        assert!(parts[1].inline_data.is_some());
    }

    #[tokio::test]
    async fn test_prefer_media_falls_back_to_text() {
        let chunks = vec![
            chunk(r#"{"candidates":[{"content":{"parts":[{"text":"first"}]}}]}"#),
            chunk(r#"{"candidates":[{"content":{"parts":[{"text":"second"}]}}]}"#),
        ];
        let found = select_chunk(Box::pin(stream::iter(chunks)), ChunkSelection::PreferMedia)
            .await
            .unwrap();
        assert_eq!(found.candidates[0].parts()[0].text.as_deref(), Some("first"));
    }
}
