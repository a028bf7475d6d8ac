//! 관심 종목 저장소
//!
//! 종목 코드를 키로 하는 단일 JSON 문서. 전체 로드 / 전체 재작성 방식이며,
//! 저장 시 임시 파일에 쓴 뒤 rename 하여 원자적으로 교체한다.
//! 동시 쓰기는 지원하지 않으므로 호출 측에서 직렬화해야 한다.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::TrackedStock;

/// 저장 문서 스키마 버전
pub const SCHEMA_VERSION: u32 = 1;

/// 디스크에 저장되는 문서 형태
#[derive(Debug, Serialize, Deserialize)]
struct WatchlistDocument {
    /// 스키마 버전
    version: u32,
    /// 종목 코드 → 관심 종목 (삽입 순서 유지)
    stocks: IndexMap<String, TrackedStock>,
}

/// 관심 종목 저장소
pub struct WatchlistStore {
    path: PathBuf,
    stocks: IndexMap<String, TrackedStock>,
}

impl WatchlistStore {
    /// 저장소 열기
    ///
    /// 파일이 없으면 빈 저장소로 시작하고, 파일이 깨져 있으면
    /// 오류를 로그로 남기고 빈 저장소로 시작한다
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let stocks = match Self::load(&path) {
            Ok(stocks) => stocks,
            Err(e) => {
                log::error!("관심 종목 파일 로드 실패 ({}): {:#}", path.display(), e);
                IndexMap::new()
            }
        };

        Self { path, stocks }
    }

    fn load(path: &Path) -> Result<IndexMap<String, TrackedStock>> {
        if !path.exists() {
            return Ok(IndexMap::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("파일 읽기 실패: {}", path.display()))?;
        let document: WatchlistDocument =
            serde_json::from_str(&content).context("관심 종목 문서 파싱 실패")?;

        Ok(document.stocks)
    }

    /// 종목 존재 여부
    pub fn contains(&self, code: &str) -> bool {
        self.stocks.contains_key(code)
    }

    /// 종목 가변 참조 (지표 갱신용)
    pub fn get_mut(&mut self, code: &str) -> Option<&mut TrackedStock> {
        self.stocks.get_mut(code)
    }

    /// 추적 중인 종목 코드 목록 (삽입 순서)
    pub fn codes(&self) -> Vec<String> {
        self.stocks.keys().cloned().collect()
    }

    /// 전체 종목 순회 (삽입 순서, 읽기 전용)
    pub fn list(&self) -> impl Iterator<Item = &TrackedStock> {
        self.stocks.values()
    }

    /// 종목 수
    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    /// 삽입 또는 교체 (코드 기준)
    pub fn upsert(&mut self, stock: TrackedStock) {
        self.stocks.insert(stock.code.clone(), stock);
    }

    /// 종목 제거
    ///
    /// 없던 종목이면 false (오류가 아니다). 남은 종목의 순서는 유지된다.
    pub fn remove(&mut self, code: &str) -> bool {
        self.stocks.shift_remove(code).is_some()
    }

    /// 문서 전체를 디스크에 재작성
    ///
    /// 임시 파일에 쓴 뒤 rename 한다. 실패는 호출 측에 보고하고 재시도하지 않는다.
    pub fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("데이터 디렉토리 생성 실패: {}", parent.display()))?;
        }

        let document = WatchlistDocument {
            version: SCHEMA_VERSION,
            stocks: self.stocks.clone(),
        };
        let json = serde_json::to_string_pretty(&document).context("관심 종목 직렬화 실패")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .with_context(|| format!("임시 파일 쓰기 실패: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("파일 교체 실패: {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MarketType;

    fn sample(code: &str, name: &str) -> TrackedStock {
        TrackedStock::new(
            code.to_string(),
            name.to_string(),
            code.trim_end_matches(".KS").to_string(),
            MarketType::Krx,
        )
    }

    /// 저장 후 다시 열면 필드 단위로 동일한 레코드가 복원된다
    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("stocks.json");

        let mut store = WatchlistStore::open(&path);
        let mut samsung = sample("005930.KS", "삼성전자");
        samsung.current_price = Some(71_500.0);
        samsung.recent_high = Some(88_000.0);
        samsung.recent_high_date = Some("2024-01-02".to_string());
        samsung.decline_rate = Some(18.75);
        store.upsert(samsung.clone());
        store.upsert(sample("000660.KS", "SK하이닉스"));
        store.persist().unwrap();

        let reloaded = WatchlistStore::open(&path);
        assert_eq!(reloaded.len(), 2);
        let loaded: Vec<&TrackedStock> = reloaded.list().collect();
        assert_eq!(loaded[0], &samsung);
        assert_eq!(loaded[1].code, "000660.KS");
    }

    /// 없는 종목 제거는 false, 있는 종목 제거는 true
    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = WatchlistStore::open(dir.path().join("stocks.json"));
        store.upsert(sample("005930.KS", "삼성전자"));

        assert!(!store.remove("035420.KS"));
        assert!(store.remove("005930.KS"));
        assert!(store.is_empty());
    }

    /// 같은 코드 upsert는 교체이며 삽입 순서는 유지된다
    #[test]
    fn test_upsert_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = WatchlistStore::open(dir.path().join("stocks.json"));
        store.upsert(sample("005930.KS", "삼성전자"));
        store.upsert(sample("000660.KS", "SK하이닉스"));
        store.upsert(sample("005930.KS", "삼성전자(교체)"));

        assert_eq!(store.len(), 2);
        let codes = store.codes();
        assert_eq!(codes, vec!["005930.KS", "000660.KS"]);
        let first: Vec<&TrackedStock> = store.list().collect();
        assert_eq!(first[0].name, "삼성전자(교체)");
    }

    /// 깨진 파일은 빈 저장소로 열린다
    #[test]
    fn test_corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stocks.json");
        fs::write(&path, "{ not json").unwrap();

        let store = WatchlistStore::open(&path);
        assert!(store.is_empty());
    }
}
