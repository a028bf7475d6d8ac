//! 주식 추적 데이터 모델
//!
//! 관심 종목, 일봉 데이터, 검색 결과 등의 데이터 구조 정의

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 시장 구분
///
/// 종목 코드의 접미사로부터 판별하며, 통화 기호와 표시명을 결정한다
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketType {
    /// 한국거래소 (.KS)
    #[serde(rename = "KRX")]
    Krx,
    /// 도쿄증권거래소 (.T)
    #[serde(rename = "TSE")]
    Tse,
    /// 미국 시장 (접미사 없는 알파벳 티커)
    #[serde(rename = "US")]
    Us,
    /// 기타 시장
    #[serde(rename = "OTHER")]
    Other,
}

impl MarketType {
    /// 시장별 통화 기호
    pub fn currency_symbol(&self) -> &'static str {
        match self {
            MarketType::Krx => "₩",
            MarketType::Tse => "¥",
            MarketType::Us => "$",
            MarketType::Other => "$",
        }
    }

    /// 시장 표시명 (한글)
    pub fn display_name(&self) -> &'static str {
        match self {
            MarketType::Krx => "한국",
            MarketType::Tse => "일본",
            MarketType::Us => "미국",
            MarketType::Other => "기타",
        }
    }
}

/// 일봉 데이터 (OHLCV)
///
/// 공급자 응답에서 변환된 하루치 시세, 저장하지 않고 계산에만 사용
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    /// 날짜 (YYYY-MM-DD)
    pub date: String,
    /// 시가
    pub open: f64,
    /// 고가
    pub high: f64,
    /// 저가
    pub low: f64,
    /// 종가
    pub close: f64,
    /// 거래량
    pub volume: u64,
}

/// 고점 대비 하락률 계산 결과
///
/// 네 값은 항상 함께 산출되며, 하나라도 구할 수 없으면 결과 전체가 없다
#[derive(Debug, Clone, PartialEq)]
pub struct DrawdownSummary {
    /// 현재가 (최신 종가)
    pub current_price: f64,
    /// 조회 구간 내 최고가
    pub recent_high: f64,
    /// 최고가 달성일 (YYYY-MM-DD)
    pub recent_high_date: String,
    /// 고점 대비 하락률 (%)
    pub decline_rate: f64,
}

/// 추적 중인 관심 종목
///
/// `code`가 관심 종목 문서의 유일 키이며, 지표 필드는
/// [`DrawdownSummary`] 단위로만 갱신한다 (필드 단위 갱신 금지)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedStock {
    /// 정규화된 종목 코드 (예: 005930.KS)
    pub code: String,
    /// 종목명 (사용자 입력)
    pub name: String,
    /// 사용자가 입력한 원본 코드
    pub original_code: String,
    /// 시장 구분
    pub market_type: MarketType,
    /// 추가 시각
    pub added_date: DateTime<Utc>,
    /// 마지막 갱신 시각 (갱신 시도 자체가 없었으면 None)
    pub last_updated: Option<DateTime<Utc>>,
    /// 현재가
    pub current_price: Option<f64>,
    /// 최근 고점
    pub recent_high: Option<f64>,
    /// 최근 고점 달성일 (YYYY-MM-DD)
    pub recent_high_date: Option<String>,
    /// 고점 대비 하락률 (%)
    pub decline_rate: Option<f64>,
    /// 마지막 갱신 실패 사유 (성공 시 None)
    pub error_message: Option<String>,
}

impl TrackedStock {
    /// 지표가 비어 있는 신규 종목 생성
    pub fn new(code: String, name: String, original_code: String, market_type: MarketType) -> Self {
        Self {
            code,
            name,
            original_code,
            market_type,
            added_date: Utc::now(),
            last_updated: None,
            current_price: None,
            recent_high: None,
            recent_high_date: None,
            decline_rate: None,
            error_message: None,
        }
    }

    /// 계산 성공: 지표 네 개를 한꺼번에 덮어쓰고 오류를 지운다
    pub fn apply_metrics(&mut self, summary: &DrawdownSummary, now: DateTime<Utc>) {
        self.current_price = Some(summary.current_price);
        self.recent_high = Some(summary.recent_high);
        self.recent_high_date = Some(summary.recent_high_date.clone());
        self.decline_rate = Some(summary.decline_rate);
        self.last_updated = Some(now);
        self.error_message = None;
    }

    /// 계산 실패: 기존 지표는 그대로 두고 실패 사유만 기록한다
    pub fn mark_error(&mut self, message: String, now: DateTime<Utc>) {
        self.error_message = Some(message);
        self.last_updated = Some(now);
    }
}

/// 관심 종목 표시용 레코드
///
/// 시장별 통화 포맷과 하락률 구간 분류까지 적용된, 화면에 바로 쓰는 형태
#[derive(Debug, Clone, Serialize)]
pub struct TrackedStockView {
    /// 정규화된 종목 코드
    pub code: String,
    /// 종목명
    pub name: String,
    /// 사용자가 입력한 원본 코드
    pub original_code: String,
    /// 시장 구분
    pub market_type: MarketType,
    /// 시장 표시명 (한글)
    pub market_display: String,
    /// 현재가
    pub current_price: Option<f64>,
    /// 통화 기호가 붙은 현재가 문자열
    pub current_price_formatted: Option<String>,
    /// 최근 고점
    pub recent_high: Option<f64>,
    /// 통화 기호가 붙은 최근 고점 문자열
    pub recent_high_formatted: Option<String>,
    /// 최근 고점 달성일
    pub recent_high_date: Option<String>,
    /// 고점 대비 하락률 (%)
    pub decline_rate: Option<f64>,
    /// 하락률 문자열 (소수 둘째 자리)
    pub decline_rate_formatted: Option<String>,
    /// 하락률 구간: low / medium / high
    pub decline_status: Option<String>,
    /// 마지막 갱신 시각
    pub last_updated: Option<DateTime<Utc>>,
    /// 마지막 갱신 시각 문자열 (KST, YYYY-MM-DD HH:MM)
    pub last_updated_formatted: Option<String>,
    /// 마지막 갱신 실패 사유
    pub error_message: Option<String>,
    /// error / success
    pub status: String,
}

/// 종목 검색 결과
///
/// 유사도 점수는 정렬에만 쓰이고 응답에는 포함하지 않는다
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// 종목명
    pub name: String,
    /// 종목 코드 (접미사 제외)
    pub code: String,
    /// 공급자 심볼 (접미사 포함, 예: 005930.KS)
    pub full_code: String,
    /// 시장 라벨
    pub market: String,
}

/// 종목 추가 요청 본문
#[derive(Debug, Deserialize)]
pub struct AddStockRequest {
    /// 종목 코드 (원본 그대로, 서버에서 정규화)
    pub code: String,
    /// 종목명
    pub name: String,
}

/// 종목 검색 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// 검색어 (2글자 이상)
    pub q: Option<String>,
}

/// 관심 종목 목록 응답 데이터
#[derive(Debug, Serialize)]
pub struct StockListData {
    /// 표시용 레코드 (하락률 내림차순)
    pub stocks: Vec<TrackedStockView>,
    /// 종목 수
    pub count: usize,
}

/// 검색 응답 데이터
#[derive(Debug, Serialize)]
pub struct SearchData {
    /// 검색 결과 (유사도 내림차순, 최대 10건)
    pub results: Vec<SearchResult>,
    /// 결과 수
    pub count: usize,
}

/// 새로고침 응답 데이터
#[derive(Debug, Serialize)]
pub struct RefreshData {
    /// 갱신을 시도한 종목 수
    pub updated_count: usize,
}
