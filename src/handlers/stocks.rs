//! 관심 종목 HTTP 핸들러
//!
//! 추적 엔진을 호출해 JSON으로 응답하는 얇은 계층.
//! 모든 변경 연산은 AppState의 락을 거쳐 직렬화된다.

use actix_web::{web, HttpResponse, Result};

use crate::models::{AddStockRequest, ApiResponse, RefreshData, StockListData};
use crate::AppState;

/// 추적 중인 종목 목록 (하락률 내림차순)
///
/// 실패하지 않는다. 내부 문제가 있어도 빈 목록을 돌려준다.
pub async fn list_stocks(state: web::Data<AppState>) -> Result<HttpResponse> {
    let tracker = state.tracker.lock().await;
    let stocks = tracker.list_formatted();
    let data = StockListData {
        count: stocks.len(),
        stocks,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(data)))
}

/// 추적 종목 추가
pub async fn add_stock(
    state: web::Data<AppState>,
    body: web::Json<AddStockRequest>,
) -> Result<HttpResponse> {
    let code = body.code.trim();
    let name = body.name.trim();

    if code.is_empty() {
        return Ok(HttpResponse::Ok()
            .json(ApiResponse::<()>::error("종목 코드를 입력해주세요.".to_string())));
    }
    if name.is_empty() {
        return Ok(HttpResponse::Ok()
            .json(ApiResponse::<()>::error("종목명을 입력해주세요.".to_string())));
    }

    let mut tracker = state.tracker.lock().await;
    match tracker.add(code, name).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            (),
            format!("{} 종목이 추가되었습니다.", name),
        ))),
        Ok(false) => Ok(HttpResponse::Ok().json(ApiResponse::<()>::error(
            "이미 추가된 종목이거나 유효하지 않은 종목입니다.".to_string(),
        ))),
        Err(e) => {
            log::error!("종목 추가 실패 ({}): {:#}", code, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error(format!("종목 추가에 실패했습니다: {}", e))))
        }
    }
}

/// 추적 종목 제거
pub async fn remove_stock(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let code = path.into_inner();

    let mut tracker = state.tracker.lock().await;
    match tracker.remove(&code) {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            (),
            "종목이 제거되었습니다.".to_string(),
        ))),
        Ok(false) => Ok(HttpResponse::Ok()
            .json(ApiResponse::<()>::error("추적 중이 아닌 종목입니다.".to_string()))),
        Err(e) => {
            log::error!("종목 제거 실패 ({}): {:#}", code, e);
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error(format!("종목 제거에 실패했습니다: {}", e))))
        }
    }
}

/// 전체 종목 데이터 새로고침
pub async fn refresh_stocks(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut tracker = state.tracker.lock().await;
    match tracker.refresh_all().await {
        Ok(updated_count) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            RefreshData { updated_count },
            format!("{}개 종목의 데이터가 업데이트되었습니다.", updated_count),
        ))),
        Err(e) => {
            log::error!("전체 새로고침 실패: {:#}", e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::<()>::error(format!(
                "데이터 새로고침에 실패했습니다: {}",
                e
            ))))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stocks")
            .route("", web::get().to(list_stocks))
            .route("", web::post().to(add_stock))
            .route("/refresh", web::post().to(refresh_stocks))
            .route("/{code}", web::delete().to(remove_stock)),
    );
}
