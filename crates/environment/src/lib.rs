//! intg-environment: 테스트 대상 환경 구성
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 타입 (`EnvironmentError`)
//! - [`hosts`]: 정적 호스트명 매핑 (`bind_host`)
//! - [`certificate`]: TLS 인증서 트러스트 스토어 등록 (`CertificateImporter`)
//! - [`topology`]: 플랫폼 테스트 토폴로지 템플릿 재작성 (`rewrite_topology`)
//! - [`configurator`]: 프로파일 단계 실행기 (`EnvironmentConfigurator`)
//!
//! # Architecture
//!
//! ```text
//! ProductProfile.environment_steps
//!        |
//!        v
//! EnvironmentConfigurator::apply(step)
//!   +-- BindHost          --> hosts file (append once)
//!   +-- ImportCertificate --> openssl / keytool (ProcessRunner)
//!   +-- RewriteTopology   --> XSLT template (in place)
//! ```

pub mod certificate;
pub mod configurator;
pub mod error;
pub mod hosts;
pub mod topology;

pub use certificate::CertificateImporter;
pub use configurator::EnvironmentConfigurator;
pub use error::EnvironmentError;
pub use hosts::{BindOutcome, bind_host};
pub use topology::{rewrite_document, rewrite_topology, topology_values};
