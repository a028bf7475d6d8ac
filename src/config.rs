//! 설정 모듈
//!
//! JSON 파일에서 시스템 설정을 읽는다

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 바인딩 주소
    #[serde(default = "default_host")]
    pub host: String,
    /// 바인딩 포트
    #[serde(default = "default_port")]
    pub port: u16,
    /// 워커 스레드 수 (0이면 CPU 코어 수)
    #[serde(default)]
    pub workers: usize,
}

/// 시세 공급자 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// 공급자 호출 타임아웃 (초)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// 데이터 저장 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// 관심 종목 문서 경로
    #[serde(default = "default_data_file")]
    pub file: String,
}

/// 추적 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// 고점 조회 구간 (일)
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
}

/// 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 시세 공급자 설정
    #[serde(default)]
    pub provider: ProviderConfig,
    /// 데이터 저장 설정
    #[serde(default)]
    pub data: DataConfig,
    /// 추적 엔진 설정
    #[serde(default)]
    pub tracker: TrackerConfig,
}

// 기본값 함수
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout() -> u64 { 10 }
fn default_data_file() -> String { "data/stocks.json".to_string() }
fn default_lookback_days() -> i64 { 90 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            file: default_data_file(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
        }
    }
}

impl AppConfig {
    /// JSON 파일에서 설정 로드
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 설정 로드: 파일 우선, 실패하면 기본값
    pub fn load() -> Self {
        let config_paths = ["config.json", "config/config.json"];

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        log::info!("{} 에서 설정 로드", path);
                        return config;
                    }
                    Err(e) => {
                        log::warn!("설정 파일 {} 로드 실패: {}", path, e);
                    }
                }
            }
        }

        log::info!("기본 설정 사용");
        Self::default()
    }

    /// 서버 바인딩 주소
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
