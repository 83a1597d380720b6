//! intg-source: 제품 소스 확보 및 배포 식별 정보 해석
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 타입 (`SourceError`)
//! - [`repository`]: 저장소 클론 및 태그 고정 (`RepositoryManager`)
//! - [`descriptor`]: 빌드 디스크립터 해석 (`ArtifactResolver`)
//!
//! # Architecture
//!
//! ```text
//! RunConfiguration --> RepositoryManager --(git via ProcessRunner)--> <workspace>/<product>
//!                                                                        |
//!                                          ArtifactResolver <-- distribution pom.xml
//!                                                 |
//!                                        DistributionIdentity
//! ```

pub mod descriptor;
pub mod error;
pub mod repository;

pub use descriptor::{ArtifactResolver, POM_NAMESPACE, parse_descriptor};
pub use error::SourceError;
pub use repository::RepositoryManager;
