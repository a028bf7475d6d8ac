//! 종목 코드 정규화 및 시장 판별
//!
//! 사용자가 입력한 코드를 시세 공급자가 인식하는 심볼로 변환한다

use regex::Regex;

use crate::models::MarketType;

/// 한국거래소 접미사
pub const KRX_SUFFIX: &str = ".KS";

/// 6자리 숫자 종목 코드인지 확인
pub fn is_krx_numeric_code(code: &str) -> bool {
    let re = Regex::new(r"^[0-9]{6}$").unwrap();
    re.is_match(code)
}

/// 종목 코드를 공급자 심볼 형식으로 정규화
///
/// - 이미 접미사가 있거나 (`.` 포함) 4글자 이하면 그대로 사용
/// - 6자리 숫자면 한국 주식으로 간주하여 `.KS`를 붙인다
/// - 그 외에는 그대로 사용 (미국 티커 등)
pub fn normalize_code(raw: &str) -> String {
    if raw.contains('.') || raw.chars().count() <= 4 {
        return raw.to_string();
    }

    if is_krx_numeric_code(raw) {
        return format!("{}{}", raw, KRX_SUFFIX);
    }

    raw.to_string()
}

/// 공급자 심볼로부터 시장 구분 판별
pub fn classify_market(symbol: &str) -> MarketType {
    if symbol.ends_with(KRX_SUFFIX) {
        MarketType::Krx
    } else if symbol.ends_with(".T") {
        MarketType::Tse
    } else if !symbol.contains('.') && symbol.chars().any(|c| c.is_ascii_alphabetic()) {
        MarketType::Us
    } else {
        MarketType::Other
    }
}
