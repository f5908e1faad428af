//! 피드백 모델.
//!
//! 에이전트의 처분(승인/거절/수정)을 기록하는 불변 감사 이벤트.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CoreError;
use crate::models::suggestion::SuggestionStatus;

/// 피드백 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    /// 제안 승인
    Approval,
    /// 제안 거절
    Rejection,
    /// 에이전트가 수정해서 사용
    Revision,
}

impl FeedbackType {
    /// 이 피드백이 만드는 제안 상태. approval만 accepted, 나머지는 rejected.
    pub fn resulting_status(self) -> SuggestionStatus {
        match self {
            Self::Approval => SuggestionStatus::Accepted,
            Self::Rejection | Self::Revision => SuggestionStatus::Rejected,
        }
    }

    /// 사유가 필수인지 (approval 외 전부)
    pub fn requires_reason(self) -> bool {
        !matches!(self, Self::Approval)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approval => "approval",
            Self::Rejection => "rejection",
            Self::Revision => "revision",
        }
    }
}

/// 표준 피드백 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackReason {
    /// 티켓과 관련 없음
    Irrelevant,
    /// 사실과 다른 정보
    IncorrectInformation,
    /// 어조가 맞지 않음
    WrongTone,
    /// 답변이 불완전함
    Incomplete,
    /// 너무 일반적임
    TooGeneric,
    /// 정책 위반
    PolicyViolation,
    /// 기타
    Other,
}

impl FeedbackReason {
    pub const ALL: [FeedbackReason; 7] = [
        Self::Irrelevant,
        Self::IncorrectInformation,
        Self::WrongTone,
        Self::Incomplete,
        Self::TooGeneric,
        Self::PolicyViolation,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Irrelevant => "irrelevant",
            Self::IncorrectInformation => "incorrect_information",
            Self::WrongTone => "wrong_tone",
            Self::Incomplete => "incomplete",
            Self::TooGeneric => "too_generic",
            Self::PolicyViolation => "policy_violation",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for FeedbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackReason {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| CoreError::Validation {
                field: "feedback_reason".to_string(),
                message: format!("알 수 없는 사유: {s}"),
            })
    }
}

/// 피드백 감사 이벤트 (`ai_feedback_events` 행).
///
/// 생성 후 변경 불가. 필드는 읽기 전용 접근자로만 노출한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    id: String,
    suggestion_id: String,
    ticket_id: String,
    feedback_type: FeedbackType,
    feedback_reason: Option<FeedbackReason>,
    agent_response: Option<String>,
    #[serde(with = "interval")]
    time_to_feedback: Duration,
    #[serde(default)]
    metadata: serde_json::Map<String, serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl FeedbackEvent {
    /// 새 이벤트 생성. created_at = updated_at = `now`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        suggestion_id: &str,
        ticket_id: &str,
        feedback_type: FeedbackType,
        feedback_reason: Option<FeedbackReason>,
        agent_response: Option<String>,
        time_to_feedback: Duration,
        metadata: serde_json::Map<String, serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            suggestion_id: suggestion_id.to_string(),
            ticket_id: ticket_id.to_string(),
            feedback_type,
            feedback_reason,
            agent_response,
            time_to_feedback,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn suggestion_id(&self) -> &str {
        &self.suggestion_id
    }

    pub fn ticket_id(&self) -> &str {
        &self.ticket_id
    }

    pub fn feedback_type(&self) -> FeedbackType {
        self.feedback_type
    }

    pub fn feedback_reason(&self) -> Option<FeedbackReason> {
        self.feedback_reason
    }

    pub fn agent_response(&self) -> Option<&str> {
        self.agent_response.as_deref()
    }

    pub fn time_to_feedback(&self) -> Duration {
        self.time_to_feedback
    }

    pub fn metadata(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.metadata
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// 기간 문자열 ↔ `chrono::Duration`.
///
/// 쓰기는 항상 `PT12.345S`. 읽기는 ISO-8601 `PnDTnHnMnS`와
/// Postgres 기본 출력(`1 day 02:03:04.5`, `-00:01:30`)을 받는다.
/// 년/월 단위는 길이가 고정되지 않아 거부한다.
pub mod interval {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    const MS_PER_DAY: i64 = 86_400_000;

    pub fn format(duration: &Duration) -> String {
        let millis = duration.num_milliseconds();
        let sign = if millis < 0 { "-" } else { "" };
        let abs = millis.unsigned_abs();
        format!("{sign}PT{}.{:03}S", abs / 1000, abs % 1000)
    }

    pub fn parse(value: &str) -> Option<Duration> {
        let value = value.trim();
        let millis = if value.starts_with('P') || value.starts_with("-P") {
            parse_iso(value)?
        } else {
            parse_postgres(value)?
        };
        Some(Duration::milliseconds(millis))
    }

    fn split_sign(value: &str) -> (bool, &str) {
        match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value.strip_prefix('+').unwrap_or(value)),
        }
    }

    /// 음수가 아닌 유한 소수를 밀리초로
    fn scaled(number: &str, unit_ms: f64) -> Option<i64> {
        let n: f64 = number.parse().ok()?;
        if !n.is_finite() || n < 0.0 || number.starts_with(['+', '-']) {
            return None;
        }
        Some((n * unit_ms).round() as i64)
    }

    fn parse_iso(value: &str) -> Option<i64> {
        let (negative, rest) = split_sign(value);
        let rest = rest.strip_prefix('P')?;
        let (date, time) = match rest.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (rest, None),
        };

        let mut millis: i64 = 0;
        let mut components = 0;
        if !date.is_empty() {
            let days: i64 = date.strip_suffix('D')?.parse().ok()?;
            if days < 0 {
                return None;
            }
            millis = days.checked_mul(MS_PER_DAY)?;
            components += 1;
        }
        if let Some(mut time) = time {
            for (unit, unit_ms) in [('H', 3_600_000.0), ('M', 60_000.0), ('S', 1_000.0)] {
                if let Some((number, tail)) = time.split_once(unit) {
                    millis = millis.checked_add(scaled(number, unit_ms)?)?;
                    time = tail;
                    components += 1;
                }
            }
            // `PT`만 있거나 순서가 어긋나면 남는 문자가 생긴다
            if !time.is_empty() || components == 0 {
                return None;
            }
        }
        if components == 0 {
            return None;
        }
        Some(if negative { -millis } else { millis })
    }

    fn parse_postgres(value: &str) -> Option<i64> {
        let mut millis: i64 = 0;
        let mut components = 0;
        let mut parts = value.split_whitespace();
        while let Some(part) = parts.next() {
            if part.contains(':') {
                millis = millis.checked_add(parse_clock(part)?)?;
            } else {
                let days: i64 = part.parse().ok()?;
                match parts.next()? {
                    "day" | "days" => millis = millis.checked_add(days.checked_mul(MS_PER_DAY)?)?,
                    _ => return None,
                }
            }
            components += 1;
        }
        (components > 0).then_some(millis)
    }

    /// `[-+]HH:MM[:SS[.fff]]`
    fn parse_clock(part: &str) -> Option<i64> {
        let (negative, rest) = split_sign(part);
        let mut fields = rest.split(':');
        let hours: i64 = fields.next()?.parse().ok()?;
        let minutes: i64 = fields.next()?.parse().ok()?;
        let seconds = match fields.next() {
            Some(s) => scaled(s, 1_000.0)?,
            None => 0,
        };
        if fields.next().is_some() || hours < 0 || !(0..60).contains(&minutes) || seconds >= 60_000
        {
            return None;
        }
        let millis = hours
            .checked_mul(3_600_000)?
            .checked_add(minutes * 60_000 + seconds)?;
        Some(if negative { -millis } else { millis })
    }

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("잘못된 기간 형식: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resulting_status_by_type() {
        assert_eq!(
            FeedbackType::Approval.resulting_status(),
            SuggestionStatus::Accepted
        );
        assert_eq!(
            FeedbackType::Rejection.resulting_status(),
            SuggestionStatus::Rejected
        );
        assert_eq!(
            FeedbackType::Revision.resulting_status(),
            SuggestionStatus::Rejected
        );
    }

    #[test]
    fn reason_required_except_approval() {
        assert!(!FeedbackType::Approval.requires_reason());
        assert!(FeedbackType::Rejection.requires_reason());
        assert!(FeedbackType::Revision.requires_reason());
    }

    #[test]
    fn parse_reason() {
        assert_eq!(
            "wrong-tone".parse::<FeedbackReason>().unwrap(),
            FeedbackReason::WrongTone
        );
        assert_eq!(
            " Incorrect_Information ".parse::<FeedbackReason>().unwrap(),
            FeedbackReason::IncorrectInformation
        );
        assert!(matches!(
            "nonsense".parse::<FeedbackReason>(),
            Err(CoreError::Validation { .. })
        ));
    }

    #[test]
    fn event_wire_shape() {
        let now = Utc::now();
        let mut metadata = serde_json::Map::new();
        metadata.insert("trace_id".to_string(), serde_json::json!("trace_42"));

        let event = FeedbackEvent::new(
            "sug_1",
            "tkt_1",
            FeedbackType::Rejection,
            Some(FeedbackReason::TooGeneric),
            None,
            Duration::milliseconds(12_345),
            metadata,
            now,
        );

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["feedback_type"], "rejection");
        assert_eq!(value["feedback_reason"], "too_generic");
        assert_eq!(value["agent_response"], serde_json::Value::Null);
        assert_eq!(value["time_to_feedback"], "PT12.345S");
        assert_eq!(value["metadata"]["trace_id"], "trace_42");
        assert_eq!(value["created_at"], value["updated_at"]);
    }

    #[test]
    fn interval_format_and_parse() {
        let d = Duration::milliseconds(3_600_007);
        assert_eq!(interval::format(&d), "PT3600.007S");
        assert_eq!(interval::parse("PT3600.007S"), Some(d));
        assert_eq!(interval::parse("-PT1.500S"), Some(Duration::milliseconds(-1500)));
        assert_eq!(interval::parse("PT0S"), Some(Duration::zero()));
        assert_eq!(interval::parse("12 seconds"), None);
    }

    #[test]
    fn interval_parses_full_iso_form() {
        assert_eq!(
            interval::parse("P1DT2H3M4.5S"),
            Some(Duration::milliseconds(93_784_500))
        );
        assert_eq!(interval::parse("PT1M30S"), Some(Duration::seconds(90)));
        assert_eq!(interval::parse("PT2H"), Some(Duration::hours(2)));
        assert_eq!(interval::parse("P3D"), Some(Duration::days(3)));
        assert_eq!(interval::parse("-PT1H0.25S"), Some(Duration::milliseconds(-3_600_250)));

        assert_eq!(interval::parse("P"), None);
        assert_eq!(interval::parse("PT"), None);
        assert_eq!(interval::parse("PT30S1H"), None);
        assert_eq!(interval::parse("PT-5S"), None);
        assert_eq!(interval::parse("P1M"), None);
        assert_eq!(interval::parse("P1Y2D"), None);
    }

    #[test]
    fn interval_parses_postgres_output() {
        assert_eq!(interval::parse("00:01:30"), Some(Duration::seconds(90)));
        assert_eq!(
            interval::parse("01:00:00.007"),
            Some(Duration::milliseconds(3_600_007))
        );
        assert_eq!(interval::parse("-00:00:01.5"), Some(Duration::milliseconds(-1500)));
        assert_eq!(
            interval::parse("1 day 02:00:00"),
            Some(Duration::hours(26))
        );
        assert_eq!(interval::parse("2 days"), Some(Duration::days(2)));
        assert_eq!(
            interval::parse("-1 days +23:59:00"),
            Some(Duration::minutes(-1))
        );
        // 24시간을 넘는 시 필드도 허용
        assert_eq!(interval::parse("36:00:00"), Some(Duration::hours(36)));

        assert_eq!(interval::parse("00:61:00"), None);
        assert_eq!(interval::parse("00:00:60"), None);
        assert_eq!(interval::parse("3 mons"), None);
        assert_eq!(interval::parse(""), None);
    }

    #[test]
    fn interval_deserializes_postgres_clock() {
        #[derive(serde::Deserialize)]
        struct Row {
            #[serde(with = "interval")]
            time_to_feedback: Duration,
        }
        let row: Row = serde_json::from_str(r#"{"time_to_feedback": "00:02:05.250"}"#).unwrap();
        assert_eq!(row.time_to_feedback, Duration::milliseconds(125_250));
    }
}
