//! 주식 추적 엔진
//!
//! 종목 추가/제거, 지표 갱신, 전체 새로고침, 표시용 목록 생성을 담당한다.
//! 공급자 호출이 실패해도 해당 종목의 기존 지표는 지우지 않고
//! 실패 사유만 기록한다 (일시적 장애로 마지막 정상 수치를 잃지 않기 위함).

use anyhow::Result;
use chrono::{Duration, Utc};
use chrono_tz::Asia::Seoul;

use super::provider::MarketDataProvider;
use super::{drawdown, symbol};
use crate::models::{MarketType, TrackedStock, TrackedStockView};
use crate::services::store::WatchlistStore;

/// 종목 추가 시 유효성 검증에 쓰는 짧은 히스토리 구간 (일)
const VALIDATION_WINDOW_DAYS: i64 = 5;
/// 하락률 구간 경계: 이 미만이면 low
const DECLINE_LOW_THRESHOLD: f64 = 5.0;
/// 하락률 구간 경계: 이 미만이면 medium, 이상이면 high
const DECLINE_MEDIUM_THRESHOLD: f64 = 15.0;

/// 하락률 구간 분류
fn decline_status(rate: f64) -> &'static str {
    if rate < DECLINE_LOW_THRESHOLD {
        "low"
    } else if rate < DECLINE_MEDIUM_THRESHOLD {
        "medium"
    } else {
        "high"
    }
}

/// 정수 부분에 천 단위 구분자를 넣는다
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// 시장 관례에 맞춘 가격 문자열
///
/// 한국 주식은 정수 + "원", 그 외는 통화 기호 + 소수 둘째 자리
fn format_price(value: f64, market_type: MarketType) -> String {
    match market_type {
        MarketType::Krx => format!("{}원", group_thousands(&format!("{:.0}", value))),
        _ => {
            let fixed = format!("{:.2}", value);
            let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
            format!(
                "{}{}.{}",
                market_type.currency_symbol(),
                group_thousands(int_part),
                frac_part
            )
        }
    }
}

/// 주식 추적 엔진
///
/// 저장소를 독점 소유하며, 모든 변경 연산은 호출 측에서 직렬화해야 한다
pub struct StockTracker<P: MarketDataProvider> {
    provider: P,
    store: WatchlistStore,
    lookback_days: i64,
}

impl<P: MarketDataProvider> StockTracker<P> {
    pub fn new(provider: P, store: WatchlistStore, lookback_days: i64) -> Self {
        Self {
            provider,
            store,
            lookback_days,
        }
    }

    /// 공급자로 종목 존재 여부 확인
    ///
    /// 현재가 조회가 실패하거나 비어 있으면 짧은 히스토리로 한 번 더 확인한다
    async fn resolve_symbol(&self, code: &str) -> bool {
        match self.provider.quote(code).await {
            Ok(Some(_)) => return true,
            Ok(None) => {
                log::warn!("{}: 현재가 없음, 히스토리로 재확인", code);
            }
            Err(e) => {
                log::warn!("{}: 현재가 조회 실패 ({}), 히스토리로 재확인", code, e);
            }
        }

        let end = Utc::now();
        let start = end - Duration::days(VALIDATION_WINDOW_DAYS);
        match self.provider.history(code, start, end).await {
            Ok(history) => !history.is_empty(),
            Err(e) => {
                log::warn!("{}: 검증용 히스토리 조회 실패: {}", code, e);
                false
            }
        }
    }

    /// 추적 종목 추가
    ///
    /// 이미 추적 중이거나 공급자가 종목을 확인하지 못하면 Ok(false).
    /// 추가 직후 지표 초기 갱신을 시도하며, 갱신 실패는 추가를 막지 않는다.
    pub async fn add(&mut self, raw_code: &str, name: &str) -> Result<bool> {
        let code = symbol::normalize_code(raw_code);

        if self.store.contains(&code) {
            log::info!("{}: 이미 추적 중인 종목", code);
            return Ok(false);
        }

        if !self.resolve_symbol(&code).await {
            log::warn!("{}: 공급자에서 확인할 수 없는 종목", code);
            return Ok(false);
        }

        let market_type = symbol::classify_market(&code);
        let stock = TrackedStock::new(
            code.clone(),
            name.to_string(),
            raw_code.to_string(),
            market_type,
        );
        self.store.upsert(stock);

        self.update_stock(&code).await;
        self.store.persist()?;

        log::info!("{} ({}) 추적 시작", code, name);
        Ok(true)
    }

    /// 추적 종목 제거. 실제로 제거된 경우에만 저장한다
    pub fn remove(&mut self, code: &str) -> Result<bool> {
        if !self.store.remove(code) {
            return Ok(false);
        }
        self.store.persist()?;
        log::info!("{} 추적 해제", code);
        Ok(true)
    }

    /// 단일 종목 지표 갱신
    ///
    /// 성공하면 지표 전체를 덮어쓰고, 실패하거나 데이터가 없으면
    /// 기존 지표를 유지한 채 실패 사유만 남긴다. 저장은 하지 않는다.
    pub async fn update_stock(&mut self, code: &str) {
        let end = Utc::now();
        let start = end - Duration::days(self.lookback_days);

        let outcome = match self.provider.history(code, start, end).await {
            Ok(history) => match drawdown::summarize(&history) {
                Some(summary) => Ok(summary),
                None => Err("조회 구간에 시세 데이터가 없습니다".to_string()),
            },
            Err(e) => Err(e.to_string()),
        };

        let now = Utc::now();
        if let Some(stock) = self.store.get_mut(code) {
            match outcome {
                Ok(summary) => stock.apply_metrics(&summary, now),
                Err(message) => {
                    log::error!("{}: 지표 갱신 실패: {}", code, message);
                    stock.mark_error(message, now);
                }
            }
        }
    }

    /// 전체 종목 새로고침
    ///
    /// 개별 종목의 실패가 나머지 순회를 중단시키지 않으며,
    /// 저장은 전체 순회가 끝난 뒤 한 번만 한다.
    /// 반환값은 갱신을 시도한 종목 수다.
    pub async fn refresh_all(&mut self) -> Result<usize> {
        let codes = self.store.codes();
        for code in &codes {
            self.update_stock(code).await;
        }
        self.store.persist()?;

        log::info!("{}개 종목 새로고침 완료", codes.len());
        Ok(codes.len())
    }

    /// 표시용 관심 종목 목록
    ///
    /// 하락률 내림차순. 지표가 없는 종목은 하락률 0으로 간주하여
    /// "변동 없음" 위치에 정렬한다 (양 끝으로 보내지 않는다).
    pub fn list_formatted(&self) -> Vec<TrackedStockView> {
        let mut views: Vec<TrackedStockView> = self.store.list().map(Self::build_view).collect();
        views.sort_by(|a, b| {
            b.decline_rate
                .unwrap_or(0.0)
                .total_cmp(&a.decline_rate.unwrap_or(0.0))
        });
        views
    }

    fn build_view(stock: &TrackedStock) -> TrackedStockView {
        let market_type = stock.market_type;

        let status = if stock.error_message.is_some() {
            "error".to_string()
        } else {
            "success".to_string()
        };

        TrackedStockView {
            code: stock.code.clone(),
            name: stock.name.clone(),
            original_code: stock.original_code.clone(),
            market_type,
            market_display: market_type.display_name().to_string(),
            current_price: stock.current_price,
            current_price_formatted: stock
                .current_price
                .map(|p| format_price(p, market_type)),
            recent_high: stock.recent_high,
            recent_high_formatted: stock.recent_high.map(|p| format_price(p, market_type)),
            recent_high_date: stock.recent_high_date.clone(),
            decline_rate: stock.decline_rate,
            decline_rate_formatted: stock.decline_rate.map(|r| format!("{:.2}%", r)),
            decline_status: stock.decline_rate.map(|r| decline_status(r).to_string()),
            last_updated: stock.last_updated,
            last_updated_formatted: stock
                .last_updated
                .map(|t| t.with_timezone(&Seoul).format("%Y-%m-%d %H:%M").to_string()),
            error_message: stock.error_message.clone(),
            status,
        }
    }
}

// ==================== 테스트 ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use crate::services::provider::ProviderSearchHit;
    use anyhow::bail;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// 테스트용 공급자 상태 (테스트 중간에 응답을 바꿀 수 있다)
    #[derive(Default)]
    struct MockState {
        quotes: HashMap<String, f64>,
        histories: HashMap<String, Vec<PricePoint>>,
        failing: HashSet<String>,
    }

    #[derive(Clone, Default)]
    struct MockProvider {
        state: Arc<Mutex<MockState>>,
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        async fn quote(&self, symbol: &str) -> Result<Option<f64>> {
            let state = self.state.lock().unwrap();
            if state.failing.contains(symbol) {
                bail!("공급자 연결 실패");
            }
            Ok(state.quotes.get(symbol).copied())
        }

        async fn history(
            &self,
            symbol: &str,
            _start: chrono::DateTime<Utc>,
            _end: chrono::DateTime<Utc>,
        ) -> Result<Vec<PricePoint>> {
            let state = self.state.lock().unwrap();
            if state.failing.contains(symbol) {
                bail!("공급자 연결 실패");
            }
            Ok(state.histories.get(symbol).cloned().unwrap_or_default())
        }

        async fn search_by_name(&self, _query: &str) -> Result<Vec<ProviderSearchHit>> {
            Ok(Vec::new())
        }
    }

    fn bar(date: &str, high: f64, close: f64) -> PricePoint {
        PricePoint {
            date: date.to_string(),
            open: close,
            high,
            low: close * 0.95,
            close,
            volume: 1_000,
        }
    }

    fn new_tracker(provider: MockProvider) -> (StockTracker<MockProvider>, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = WatchlistStore::open(dir.path().join("stocks.json"));
        (StockTracker::new(provider, store, 90), dir)
    }

    /// 추가 성공 후 같은 코드 재추가는 false (저장소는 그대로)
    #[tokio::test]
    async fn test_add_and_duplicate() {
        let provider = MockProvider::default();
        provider.state.lock().unwrap().histories.insert(
            "005930.KS".to_string(),
            vec![bar("2024-01-02", 80_000.0, 79_000.0), bar("2024-01-03", 78_000.0, 60_000.0)],
        );

        let (mut tracker, _dir) = new_tracker(provider);
        assert!(tracker.add("005930", "삼성전자").await.unwrap());
        assert!(!tracker.add("005930", "삼성전자").await.unwrap());
        assert_eq!(tracker.store.len(), 1);

        let stock = tracker.store.list().next().unwrap();
        assert_eq!(stock.code, "005930.KS");
        assert_eq!(stock.original_code, "005930");
        assert_eq!(stock.market_type, MarketType::Krx);
        assert_eq!(stock.current_price, Some(60_000.0));
        assert_eq!(stock.recent_high, Some(80_000.0));
        assert!(stock.error_message.is_none());
    }

    /// 공급자가 확인하지 못하는 종목은 추가되지 않고 상태도 변하지 않는다
    #[tokio::test]
    async fn test_add_unresolvable_symbol() {
        let (mut tracker, _dir) = new_tracker(MockProvider::default());
        assert!(!tracker.add("999999", "없는종목").await.unwrap());
        assert!(tracker.store.is_empty());
    }

    /// 현재가는 없지만 히스토리가 있으면 추가된다 (검증 폴백)
    #[tokio::test]
    async fn test_add_falls_back_to_history() {
        let provider = MockProvider::default();
        provider
            .state
            .lock()
            .unwrap()
            .histories
            .insert("035420.KS".to_string(), vec![bar("2024-01-02", 200_000.0, 190_000.0)]);

        let (mut tracker, _dir) = new_tracker(provider);
        assert!(tracker.add("035420", "NAVER").await.unwrap());
    }

    /// 부분 실패 격리: 한 종목이 실패해도 나머지는 갱신되고,
    /// 실패 종목은 기존 지표를 유지한 채 실패 사유가 남는다
    #[tokio::test]
    async fn test_refresh_all_partial_failure() {
        let provider = MockProvider::default();
        {
            let mut state = provider.state.lock().unwrap();
            state.histories.insert(
                "005930.KS".to_string(),
                vec![bar("2024-01-02", 80_000.0, 76_000.0)],
            );
            state.histories.insert(
                "000660.KS".to_string(),
                vec![bar("2024-01-02", 150_000.0, 140_000.0)],
            );
        }

        let (mut tracker, _dir) = new_tracker(provider.clone());
        tracker.add("005930", "삼성전자").await.unwrap();
        tracker.add("000660", "SK하이닉스").await.unwrap();

        // 이후 삼성전자는 시세가 갱신되고 SK하이닉스는 공급자 장애
        {
            let mut state = provider.state.lock().unwrap();
            state.histories.insert(
                "005930.KS".to_string(),
                vec![bar("2024-01-02", 80_000.0, 76_000.0), bar("2024-01-03", 77_000.0, 70_000.0)],
            );
            state.failing.insert("000660.KS".to_string());
        }

        let count = tracker.refresh_all().await.unwrap();
        assert_eq!(count, 2);

        let stocks: Vec<&TrackedStock> = tracker.store.list().collect();
        // 정상 종목은 새 지표
        assert_eq!(stocks[0].current_price, Some(70_000.0));
        assert!(stocks[0].error_message.is_none());
        // 실패 종목은 이전 지표 유지 + 실패 사유 기록
        assert_eq!(stocks[1].current_price, Some(140_000.0));
        assert_eq!(stocks[1].recent_high, Some(150_000.0));
        assert!(stocks[1].error_message.is_some());
    }

    /// 같은 공급자 응답으로 두 번 갱신해도 지표는 동일하다
    #[tokio::test]
    async fn test_update_idempotent() {
        let provider = MockProvider::default();
        provider.state.lock().unwrap().histories.insert(
            "005930.KS".to_string(),
            vec![bar("2024-01-02", 80_000.0, 72_000.0)],
        );

        let (mut tracker, _dir) = new_tracker(provider);
        tracker.add("005930", "삼성전자").await.unwrap();

        let first = tracker.store.list().next().unwrap().clone();
        tracker.update_stock("005930.KS").await;
        let second = tracker.store.list().next().unwrap();

        assert_eq!(first.current_price, second.current_price);
        assert_eq!(first.recent_high, second.recent_high);
        assert_eq!(first.recent_high_date, second.recent_high_date);
        assert_eq!(first.decline_rate, second.decline_rate);
    }

    /// 표시용 목록은 하락률 내림차순이며, 지표 없는 종목은 0으로 간주
    #[tokio::test]
    async fn test_list_formatted_sort_order() {
        let provider = MockProvider::default();
        {
            let mut state = provider.state.lock().unwrap();
            // 하락률 20%
            state.histories.insert(
                "005930.KS".to_string(),
                vec![bar("2024-01-02", 100_000.0, 80_000.0)],
            );
            // 하락률 2%
            state.histories.insert(
                "000660.KS".to_string(),
                vec![bar("2024-01-02", 100_000.0, 98_000.0)],
            );
            // 추가 직후 장애를 일으켜 지표 없는 종목을 만든다
            state.quotes.insert("035420.KS".to_string(), 190_000.0);
        }

        let (mut tracker, _dir) = new_tracker(provider);
        tracker.add("005930", "삼성전자").await.unwrap();
        tracker.add("000660", "SK하이닉스").await.unwrap();
        tracker.add("035420", "NAVER").await.unwrap();

        let views = tracker.list_formatted();
        assert_eq!(views.len(), 3);
        assert_eq!(views[0].code, "005930.KS"); // 20%
        assert_eq!(views[1].code, "000660.KS"); // 2%
        assert_eq!(views[2].code, "035420.KS"); // 지표 없음 → 0%
        assert_eq!(views[2].status, "error");
        assert!(views[2].decline_status.is_none());
    }

    /// 하락률 구간: 5% 미만 low, 15% 미만 medium, 그 이상 high
    #[test]
    fn test_decline_status_thresholds() {
        assert_eq!(decline_status(0.0), "low");
        assert_eq!(decline_status(4.99), "low");
        assert_eq!(decline_status(5.0), "medium");
        assert_eq!(decline_status(14.99), "medium");
        assert_eq!(decline_status(15.0), "high");
        assert_eq!(decline_status(42.0), "high");
    }

    /// 가격 포맷: 한국은 정수+원, 미국은 $와 소수 둘째 자리
    #[test]
    fn test_format_price() {
        assert_eq!(format_price(71_500.0, MarketType::Krx), "71,500원");
        assert_eq!(format_price(1_234_567.0, MarketType::Krx), "1,234,567원");
        assert_eq!(format_price(123.456, MarketType::Us), "$123.46");
        assert_eq!(format_price(1_234.5, MarketType::Us), "$1,234.50");
        assert_eq!(format_price(38_000.0, MarketType::Tse), "¥38,000.00");
    }
}
