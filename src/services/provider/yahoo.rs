//! Yahoo Finance 공급자 구현
//!
//! 시세/히스토리는 https://query1.finance.yahoo.com/v8/finance/chart,
//! 종목명 검색은 https://query2.finance.yahoo.com/v1/finance/search 사용

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{MarketDataProvider, ProviderSearchHit};
use crate::models::PricePoint;

/// Yahoo Finance 차트 API
const YAHOO_CHART_API: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
/// Yahoo Finance 검색 API
const YAHOO_SEARCH_API: &str = "https://query2.finance.yahoo.com/v1/finance/search";
/// 요청 User-Agent
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
/// 검색 결과 최대 요청 건수
const SEARCH_QUOTES_COUNT: &str = "10";

// ==================== 응답 모델 ====================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Option<Chart>,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Option<Vec<QuoteSeries>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

impl QuoteSeries {
    fn value_at(series: &Option<Vec<Option<f64>>>, idx: usize) -> Option<f64> {
        series.as_ref().and_then(|v| v.get(idx)).and_then(|v| *v)
    }

    fn volume_at(&self, idx: usize) -> Option<u64> {
        self.volume.as_ref().and_then(|v| v.get(idx)).and_then(|v| *v)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    quotes: Option<Vec<SearchQuote>>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: Option<String>,
    shortname: Option<String>,
    longname: Option<String>,
}

// ==================== 파싱 ====================

/// 유닉스 타임스탬프를 날짜 문자열로 변환
fn timestamp_to_date(ts: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// 차트 응답에서 현재가 추출
fn parse_chart_price(response: &ChartResponse) -> Option<f64> {
    response
        .chart
        .as_ref()?
        .result
        .as_ref()?
        .first()?
        .meta
        .as_ref()?
        .regular_market_price
}

/// 차트 응답을 일봉 목록으로 변환
///
/// OHLC 중 하나라도 빠진 일봉은 버린다 (휴장일 등)
fn parse_chart_points(response: ChartResponse) -> Vec<PricePoint> {
    let result = match response
        .chart
        .and_then(|c| c.result)
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
    {
        Some(result) => result,
        None => return Vec::new(),
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .and_then(|i| i.quote)
        .and_then(|mut q| if q.is_empty() { None } else { Some(q.remove(0)) })
        .unwrap_or_default();

    let mut points = Vec::with_capacity(timestamps.len());
    for (idx, ts) in timestamps.iter().enumerate() {
        let date = match timestamp_to_date(*ts) {
            Some(date) => date,
            None => continue,
        };
        let open = QuoteSeries::value_at(&quote.open, idx);
        let high = QuoteSeries::value_at(&quote.high, idx);
        let low = QuoteSeries::value_at(&quote.low, idx);
        let close = QuoteSeries::value_at(&quote.close, idx);

        if let (Some(open), Some(high), Some(low), Some(close)) = (open, high, low, close) {
            points.push(PricePoint {
                date,
                open,
                high,
                low,
                close,
                volume: quote.volume_at(idx).unwrap_or(0),
            });
        }
    }

    points
}

/// 검색 응답을 공급자 검색 결과로 변환
fn parse_search_hits(response: SearchResponse) -> Vec<ProviderSearchHit> {
    response
        .quotes
        .unwrap_or_default()
        .into_iter()
        .filter_map(|q| {
            let symbol = q.symbol?;
            let name = q.shortname.or(q.longname)?;
            Some(ProviderSearchHit { name, symbol })
        })
        .collect()
}

// ==================== 공급자 ====================

/// Yahoo Finance 공급자
#[derive(Clone)]
pub struct YahooProvider {
    client: Client,
}

impl YahooProvider {
    /// 호출 타임아웃을 지정하여 공급자 생성
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("HTTP 클라이언트 생성 실패")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn quote(&self, symbol: &str) -> Result<Option<f64>> {
        let url = format!("{}/{}", YAHOO_CHART_API, symbol);
        let response = self
            .client
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("현재가 조회 실패 ({}): {}", symbol, response.status()));
        }

        let parsed: ChartResponse = response.json().await?;
        Ok(parse_chart_price(&parsed))
    }

    async fn history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>> {
        let url = format!("{}/{}", YAHOO_CHART_API, symbol);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", start.timestamp().to_string().as_str()),
                ("period2", end.timestamp().to_string().as_str()),
                ("interval", "1d"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "히스토리 조회 실패 ({}): {}",
                symbol,
                response.status()
            ));
        }

        let parsed: ChartResponse = response.json().await?;
        Ok(parse_chart_points(parsed))
    }

    async fn search_by_name(&self, query: &str) -> Result<Vec<ProviderSearchHit>> {
        let response = self
            .client
            .get(YAHOO_SEARCH_API)
            .query(&[
                ("q", query),
                ("quotesCount", SEARCH_QUOTES_COUNT),
                ("newsCount", "0"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("종목 검색 실패: {}", response.status()));
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parse_search_hits(parsed))
    }
}

// ==================== 테스트 ====================
