//! intg-build: 제품 빌드, 통합 테스트 실행, 산출물 보관
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 타입 (`BuildError`)
//! - [`maven`]: 빌드 도구 호출 (`BuildRunner`)
//! - [`integration`]: 프로파일 기반 모듈 빌드 및 통합 테스트 (`TestOrchestrator`)
//! - [`resources`]: DEBUG 모드 테스트 디스크립터 교체
//! - [`collector`]: 로그, 실행 요약, 실행 보고서 보관 (`ArtifactCollector`)

pub mod collector;
pub mod error;
pub mod integration;
pub mod maven;
pub mod resources;

pub use collector::{ArtifactCollector, CollectedLogs};
pub use error::BuildError;
pub use integration::TestOrchestrator;
pub use maven::{BUILD_ARGS, BuildRunner};
pub use resources::substitute_debug_resources;
