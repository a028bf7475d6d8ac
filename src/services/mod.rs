//! 비즈니스 로직 서비스 모듈
//!
//! 추적 엔진, 검색 통합기와 그 하위 구성 요소를 담는다

pub mod drawdown;        // 고점 대비 하락률 계산
pub mod provider;        // 시세 데이터 공급자 경계
pub mod search_service;  // 종목명 검색 통합기
pub mod store;           // 관심 종목 저장소
pub mod symbol;          // 종목 코드 정규화
pub mod tracker_service; // 주식 추적 엔진
