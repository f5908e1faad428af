//! 터미널 출력.

use replyhub_core::models::suggestion::Suggestion;
use replyhub_suggestion::recorder::FeedbackOutcome;
use replyhub_suggestion::view::{LiveView, SuggestionState, ViewStatus};

/// 미리보기 최대 글자 수
const PREVIEW_CHARS: usize = 60;

fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    let mut out: String = line.chars().take(PREVIEW_CHARS).collect();
    if line.chars().count() > PREVIEW_CHARS || text.lines().count() > 1 {
        out.push('…');
    }
    out
}

pub fn suggestion_line(s: &Suggestion) -> String {
    format!(
        "{}  [{}]  {}  ({})",
        s.id,
        s.metadata.model.as_deref().unwrap_or("-"),
        preview(&s.suggested_response),
        s.created_at.format("%Y-%m-%d %H:%M:%S")
    )
}

fn state_line(state: &SuggestionState) -> String {
    let marker = match state.status {
        ViewStatus::Loading => "…",
        ViewStatus::Success => "•",
        ViewStatus::Error => "✗",
    };
    let mut line = format!(
        "{marker} {}  {}  ({})",
        state.suggestion.id,
        preview(&state.suggestion.suggested_response),
        state.age_text()
    );
    if let Some(error) = &state.error {
        line.push_str(&format!("\n    에러: {error}"));
    }
    line
}

pub fn live_view(ticket_id: &str, view: &LiveView) -> String {
    let mut out = match view.status {
        ViewStatus::Loading => format!("티켓 {ticket_id}: 불러오는 중"),
        ViewStatus::Success => format!("티켓 {ticket_id}: 대기 중인 제안 {}건", view.suggestions.len()),
        ViewStatus::Error => format!("티켓 {ticket_id}: 조회 실패"),
    };
    if let Some(error) = &view.error {
        out.push_str(&format!(" ({error})"));
    }
    for state in &view.suggestions {
        out.push('\n');
        out.push_str(&state_line(state));
    }
    out
}

pub fn outcome(outcome: &FeedbackOutcome) -> String {
    let mut out = format!(
        "{} → {} (이벤트 {}, {}ms)",
        outcome.event.suggestion_id(),
        outcome.status,
        outcome.event.id(),
        outcome.metrics.processing_time_ms
    );
    if let Some(distance) = outcome.metrics.edit_distance {
        out.push_str(&format!(", 편집 거리 {distance}"));
    }
    if !outcome.trace_flushed {
        out.push_str(" (트레이스 전송 실패)");
    }
    out
}
