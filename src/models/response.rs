//! 통일 API 응답 모델
//!
//! 모든 엔드포인트가 같은 봉투 형식으로 응답한다

use chrono::Utc;
use chrono_tz::Asia::Seoul;
use serde::{Deserialize, Serialize};

/// 한국 시간 문자열 (ISO 8601, +09:00)
fn get_seoul_time() -> String {
    Utc::now().with_timezone(&Seoul).to_rfc3339()
}

/// 통일 API 응답 구조
///
/// - success: 요청 성공 여부
/// - data: 응답 데이터 (성공 시에만)
/// - message: 응답 메시지
/// - timestamp: 응답 시각 (한국 시간)
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 요청 성공 여부
    pub success: bool,
    /// 응답 데이터
    pub data: Option<T>,
    /// 응답 메시지
    pub message: String,
    /// 응답 시각 (ISO 8601)
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// 성공 응답 생성
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
            timestamp: get_seoul_time(),
        }
    }

    /// 메시지를 지정한 성공 응답 생성
    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            message,
            timestamp: get_seoul_time(),
        }
    }

    /// 오류 응답 생성
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
            timestamp: get_seoul_time(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seoul_timestamp_offset() {
        let response = ApiResponse::success("ok");
        assert!(response.success);
        assert!(response.timestamp.contains("+09:00"));
    }

    #[test]
    fn test_error_response_has_no_data() {
        let response = ApiResponse::<()>::error("실패".to_string());
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.message, "실패");
    }
}
