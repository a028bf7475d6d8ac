//! 시세 데이터 공급자 경계
//!
//! 추적 엔진과 검색 통합기는 이 트레이트만 의존하며,
//! 실제 공급자 구현은 교체 가능하다

pub mod yahoo;

pub use yahoo::YahooProvider;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::PricePoint;

/// 공급자 종목명 검색 결과
#[derive(Debug, Clone)]
pub struct ProviderSearchHit {
    /// 종목명
    pub name: String,
    /// 공급자 심볼
    pub symbol: String,
}

/// 시세 데이터 공급자
///
/// 모든 호출은 실패할 수 있으며, 실패는 Result로 보고한다.
/// 내부 재시도는 하지 않는다.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// 현재가 단건 조회. 종목이 없으면 Ok(None)
    async fn quote(&self, symbol: &str) -> Result<Option<f64>>;

    /// 일봉 히스토리 조회. 데이터가 없으면 빈 벡터
    async fn history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>>;

    /// 종목명으로 검색
    async fn search_by_name(&self, query: &str) -> Result<Vec<ProviderSearchHit>>;
}
