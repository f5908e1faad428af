//! replyhub 도메인 모델.
//!
//! 원격 저장소와 주고받는 핵심 데이터 구조체를 정의한다.
//! 저장/전송되는 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod agent;
pub mod change;
pub mod feedback;
pub mod suggestion;
pub mod ticket;
pub mod trace;
