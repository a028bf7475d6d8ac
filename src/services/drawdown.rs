//! 고점 대비 하락률 계산
//!
//! 일봉 시계열에서 현재가, 구간 최고가, 최고가 달성일, 하락률을 구한다.
//! 네 값은 전부 구해지거나 전부 없거나 둘 중 하나다.

use crate::models::{DrawdownSummary, PricePoint};

/// 일봉 시계열로부터 하락률 요약 계산
///
/// - 빈 시계열이면 None (정상적인 결과이며 오류가 아니다)
/// - 공급자 정렬을 신뢰하지 않고 날짜 기준으로 다시 정렬한다
/// - 현재가 = 가장 최근 일봉의 종가
/// - 최고가 = 구간 내 고가의 최대값, 동률이면 가장 이른 날짜
/// - 최고가가 0 이하면 None (0으로 나누지 않는다)
pub fn summarize(history: &[PricePoint]) -> Option<DrawdownSummary> {
    if history.is_empty() {
        return None;
    }

    // ISO 날짜 문자열은 사전순 정렬이 곧 시간순 정렬
    let mut bars: Vec<&PricePoint> = history.iter().collect();
    bars.sort_by(|a, b| a.date.cmp(&b.date));

    let current_price = bars.last()?.close;

    let mut high_bar = bars[0];
    for bar in &bars[1..] {
        if bar.high > high_bar.high {
            high_bar = bar;
        }
    }

    if high_bar.high <= 0.0 {
        return None;
    }

    let recent_high = high_bar.high;
    let decline_rate = (recent_high - current_price) / recent_high * 100.0;

    Some(DrawdownSummary {
        current_price,
        recent_high,
        recent_high_date: high_bar.date.clone(),
        decline_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, high: f64, close: f64) -> PricePoint {
        PricePoint {
            date: date.to_string(),
            open: close,
            high,
            low: close.min(high) * 0.95,
            close,
            volume: 1_000,
        }
    }

    /// 빈 시계열은 None
    #[test]
    fn test_empty_history_is_none() {
        assert!(summarize(&[]).is_none());
    }

    /// 기본 계산: 고점 80000, 현재가 60000 → 25% 하락
    #[test]
    fn test_basic_decline() {
        let history = vec![
            bar("2024-01-02", 80_000.0, 79_000.0),
            bar("2024-01-03", 75_000.0, 74_000.0),
            bar("2024-01-04", 62_000.0, 60_000.0),
        ];

        let summary = summarize(&history).unwrap();
        assert_eq!(summary.current_price, 60_000.0);
        assert_eq!(summary.recent_high, 80_000.0);
        assert_eq!(summary.recent_high_date, "2024-01-02");
        assert!((summary.decline_rate - 25.0).abs() < 1e-9);
    }

    /// 고점이 현재가보다 작을 수 없고, 하락률은 [0, 100] 범위
    #[test]
    fn test_invariants() {
        let history = vec![
            bar("2024-01-02", 100.0, 98.0),
            bar("2024-01-03", 105.0, 104.0),
            bar("2024-01-04", 104.5, 101.0),
        ];

        let summary = summarize(&history).unwrap();
        assert!(summary.recent_high >= summary.current_price);
        assert!(summary.decline_rate >= 0.0 && summary.decline_rate <= 100.0);
    }

    /// 고가 동률이면 가장 이른 날짜가 고점일
    #[test]
    fn test_tie_break_earliest_date() {
        let history = vec![
            bar("2024-01-02", 50.0, 49.0),
            bar("2024-01-03", 50.0, 48.0),
            bar("2024-01-04", 40.0, 39.0),
        ];

        let summary = summarize(&history).unwrap();
        assert_eq!(summary.recent_high_date, "2024-01-02");
    }

    /// 정렬되지 않은 입력에서도 최신 날짜의 종가가 현재가
    #[test]
    fn test_unordered_input_picks_latest_close() {
        let history = vec![
            bar("2024-01-04", 62.0, 60.0),
            bar("2024-01-02", 80.0, 79.0),
            bar("2024-01-03", 75.0, 74.0),
        ];

        let summary = summarize(&history).unwrap();
        assert_eq!(summary.current_price, 60.0);
        assert_eq!(summary.recent_high, 80.0);
    }

    /// 최고가가 0이면 None (0 나눗셈 방지)
    #[test]
    fn test_zero_high_is_none() {
        let history = vec![bar("2024-01-02", 0.0, 0.0)];
        assert!(summarize(&history).is_none());
    }

    /// 하루짜리 시계열도 계산된다 (하락률 0)
    #[test]
    fn test_single_bar() {
        let history = vec![bar("2024-01-02", 70.0, 70.0)];
        let summary = summarize(&history).unwrap();
        assert_eq!(summary.decline_rate, 0.0);
        assert_eq!(summary.current_price, 70.0);
    }
}
