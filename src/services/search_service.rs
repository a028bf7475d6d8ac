//! 종목명 검색 통합기
//!
//! 내장 종목명 테이블과 공급자 검색을 합쳐 코드 기준으로 중복을 제거하고
//! 검색어 유사도 순으로 정렬한다. 개별 소스의 실패는 해당 소스의 결과가
//! 없는 것으로 처리할 뿐, 검색 전체를 실패시키지 않는다.

use anyhow::{bail, Result};
use std::collections::HashSet;

use super::provider::MarketDataProvider;
use super::symbol::{self, KRX_SUFFIX};
use crate::models::SearchResult;

/// 반환할 최대 검색 결과 수
const MAX_RESULTS: usize = 10;
/// 내장 테이블 결과가 이 수에 못 미치면 공급자 검색을 추가로 수행
const LOCAL_SUFFICIENT: usize = 5;

/// 내장 종목명 테이블 항목
///
/// 접미사가 기록되지 않은 KOSPI/KOSDAQ 항목은 .KS를 기본값으로 쓴다
struct LocalEntry {
    name: &'static str,
    code: &'static str,
    market: &'static str,
    suffix: Option<&'static str>,
}

/// 내장 종목명 테이블 (국내 주요 종목)
const LOCAL_STOCK_TABLE: &[LocalEntry] = &[
    LocalEntry { name: "삼성전자", code: "005930", market: "KOSPI", suffix: None },
    LocalEntry { name: "SK하이닉스", code: "000660", market: "KOSPI", suffix: None },
    LocalEntry { name: "NAVER", code: "035420", market: "KOSPI", suffix: None },
    LocalEntry { name: "카카오", code: "035720", market: "KOSPI", suffix: None },
    LocalEntry { name: "LG에너지솔루션", code: "373220", market: "KOSPI", suffix: None },
    LocalEntry { name: "삼성바이오로직스", code: "207940", market: "KOSPI", suffix: None },
    LocalEntry { name: "POSCO홀딩스", code: "005490", market: "KOSPI", suffix: None },
    LocalEntry { name: "현대차", code: "005380", market: "KOSPI", suffix: None },
    LocalEntry { name: "LG화학", code: "051910", market: "KOSPI", suffix: None },
    LocalEntry { name: "삼성SDI", code: "006400", market: "KOSPI", suffix: None },
    LocalEntry { name: "기아", code: "000270", market: "KOSPI", suffix: None },
    LocalEntry { name: "셀트리온", code: "068270", market: "KOSPI", suffix: None },
    LocalEntry { name: "KB금융", code: "105560", market: "KOSPI", suffix: None },
    LocalEntry { name: "신한지주", code: "055550", market: "KOSPI", suffix: None },
    LocalEntry { name: "현대모비스", code: "012330", market: "KOSPI", suffix: None },
    LocalEntry { name: "에코프로비엠", code: "247540", market: "KOSDAQ", suffix: Some(".KQ") },
    LocalEntry { name: "에코프로", code: "086520", market: "KOSDAQ", suffix: Some(".KQ") },
    LocalEntry { name: "알테오젠", code: "196170", market: "KOSDAQ", suffix: Some(".KQ") },
];

impl LocalEntry {
    fn to_result(&self) -> SearchResult {
        let suffix = self.suffix.unwrap_or(KRX_SUFFIX);
        SearchResult {
            name: self.name.to_string(),
            code: self.code.to_string(),
            full_code: format!("{}{}", self.code, suffix),
            market: self.market.to_string(),
        }
    }
}

/// 검색어와 종목명의 유사도
///
/// 완전 일치 1.0, 포함 관계 0.8, 첫 글자 일치 0.3, 그 외 0.0
fn similarity(query: &str, target: &str) -> f64 {
    let query = query.to_lowercase();
    let target = target.to_lowercase();

    if query == target {
        return 1.0;
    }
    if target.contains(&query) || query.contains(&target) {
        return 0.8;
    }
    match (query.chars().next(), target.chars().next()) {
        (Some(q), Some(t)) if q == t => 0.3,
        _ => 0.0,
    }
}

/// 내장 테이블에서 검색어와 맞는 항목 추출
fn local_matches(query: &str) -> Vec<SearchResult> {
    let query_lower = query.to_lowercase();
    LOCAL_STOCK_TABLE
        .iter()
        .filter(|entry| {
            let name_lower = entry.name.to_lowercase();
            name_lower == query_lower
                || name_lower.contains(&query_lower)
                || query_lower.contains(&name_lower)
        })
        .map(LocalEntry::to_result)
        .collect()
}

/// 코드 기준 중복 제거 (먼저 들어온 항목 우선)
fn dedup_by_code(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert(r.code.clone()))
        .collect()
}

/// 유사도 내림차순 정렬 (동점은 입력 순서 유지) 후 상위 N건만
fn rank(query: &str, results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut scored: Vec<(f64, SearchResult)> = results
        .into_iter()
        .map(|r| (similarity(query, &r.name), r))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_RESULTS)
        .map(|(_, r)| r)
        .collect()
}

/// 종목명 검색 통합기
pub struct StockSearcher<P: MarketDataProvider> {
    provider: P,
}

impl<P: MarketDataProvider> StockSearcher<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// 종목명으로 검색
    ///
    /// 2글자 미만 검색어는 I/O 없이 거부한다. 내장 테이블을 먼저 보고,
    /// 결과가 부족하면 공급자 검색을 합친다.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query = query.trim();
        if query.chars().count() < 2 {
            bail!("검색어는 2글자 이상 입력해주세요.");
        }

        let mut merged = local_matches(query);

        if merged.len() < LOCAL_SUFFICIENT {
            merged.extend(self.provider_matches(query).await);
        }

        Ok(rank(query, dedup_by_code(merged)))
    }

    /// 공급자 검색 결과 중 6자리 숫자 코드 종목만 수집
    ///
    /// 공급자 장애는 빈 결과로 처리한다
    async fn provider_matches(&self, query: &str) -> Vec<SearchResult> {
        let hits = match self.provider.search_by_name(query).await {
            Ok(hits) => hits,
            Err(e) => {
                log::error!("공급자 종목 검색 실패: {}", e);
                return Vec::new();
            }
        };

        hits.into_iter()
            .filter_map(|hit| {
                let code = hit.symbol.split('.').next().unwrap_or(&hit.symbol);
                if !symbol::is_krx_numeric_code(code) {
                    return None;
                }
                let full_code = if hit.symbol.contains('.') {
                    hit.symbol.clone()
                } else {
                    format!("{}{}", hit.symbol, KRX_SUFFIX)
                };
                Some(SearchResult {
                    name: hit.name,
                    code: code.to_string(),
                    full_code,
                    market: "KOSPI/KOSDAQ".to_string(),
                })
            })
            .collect()
    }

    /// 인기 종목 목록 (검색 UI 시드용 고정 목록)
    pub fn popular_stocks(&self) -> Vec<SearchResult> {
        LOCAL_STOCK_TABLE
            .iter()
            .take(MAX_RESULTS)
            .map(LocalEntry::to_result)
            .collect()
    }
}

// ==================== 테스트 ====================
