//! 종목 검색 HTTP 핸들러

use actix_web::{web, HttpResponse, Result};

use crate::models::{ApiResponse, SearchData, SearchQuery};
use crate::AppState;

/// 종목명으로 종목 검색
///
/// 검색어 유효성 실패는 200 + success:false로 돌려준다 (서버 오류가 아니다)
pub async fn search_stocks(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let q = query.q.as_deref().unwrap_or("").trim().to_string();
    if q.is_empty() {
        return Ok(HttpResponse::Ok()
            .json(ApiResponse::<()>::error("검색어를 입력해주세요.".to_string())));
    }

    match state.searcher.search(&q).await {
        Ok(results) => {
            let data = SearchData {
                count: results.len(),
                results,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
        }
        Err(e) => Ok(HttpResponse::Ok().json(ApiResponse::<()>::error(e.to_string()))),
    }
}

/// 인기 종목 목록
pub async fn popular_stocks(state: web::Data<AppState>) -> Result<HttpResponse> {
    let results = state.searcher.popular_stocks();
    let data = SearchData {
        count: results.len(),
        results,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/search")
            .route("", web::get().to(search_stocks))
            .route("/popular", web::get().to(popular_stocks)),
    );
}
