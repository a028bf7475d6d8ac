//! 주식 하락률 추적 백엔드
//!
//! 관심 종목의 최근 고점 대비 하락률을 추적하는 RESTful API 서비스
//! 시세 출처: Yahoo Finance

mod config;   // 설정
mod handlers; // HTTP 요청 핸들러
mod models;   // 데이터 모델 정의
mod services; // 비즈니스 로직 서비스

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::services::provider::YahooProvider;
use crate::services::search_service::StockSearcher;
use crate::services::store::WatchlistStore;
use crate::services::tracker_service::StockTracker;

/// 공유 애플리케이션 상태
///
/// 추적 엔진은 저장소를 소유하므로 단일 락 뒤에서만 접근한다
/// (읽기-변경-저장 시퀀스가 교차하면 전체 재작성 시 갱신이 유실된다).
/// 검색 통합기는 상태가 없어 락 없이 공유한다.
pub struct AppState {
    pub tracker: Mutex<StockTracker<YahooProvider>>,
    pub searcher: StockSearcher<YahooProvider>,
}

/// 애플리케이션 진입점
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load();

    let provider = YahooProvider::new(config.provider.timeout_secs)?;
    let store = WatchlistStore::open(&config.data.file);
    let tracker = StockTracker::new(provider.clone(), store, config.tracker.lookback_days);
    let searcher = StockSearcher::new(provider);

    let state = web::Data::new(AppState {
        tracker: Mutex::new(tracker),
        searcher,
    });

    log::info!("주식 하락률 추적 백엔드 시작: {}", config.bind_addr());

    let workers = config.server.workers;
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default()) // 요청 로그 미들웨어
            .configure(handlers::config)
    })
    .bind(config.bind_addr())?;

    if workers > 0 {
        server = server.workers(workers);
    }

    server.run().await?;
    Ok(())
}
