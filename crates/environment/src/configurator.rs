//! 환경 구성기 -- 제품 프로파일의 환경 구성 단계 실행
//!
//! 프로파일이 선언한 환경 구성 단계를 선언 순서대로, 불변 실행 설정을
//! 기준으로 적용합니다.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use intg_core::config::{EnvironmentSettings, ToolSettings};
use intg_core::process::ProcessRunner;
use intg_core::profile::{EnvironmentStep, ProductProfile};
use intg_core::properties::RunConfiguration;
use intg_core::types::HostBinding;
use intg_core::workspace::Workspace;

use crate::certificate::CertificateImporter;
use crate::error::EnvironmentError;
use crate::hosts::{self, BindOutcome};
use crate::topology;

/// 환경 구성기
pub struct EnvironmentConfigurator<P: ProcessRunner> {
    certificates: CertificateImporter<P>,
    hosts_file: PathBuf,
    workspace: Workspace,
}

impl<P: ProcessRunner> EnvironmentConfigurator<P> {
    /// 새 구성기를 생성합니다.
    ///
    /// 상대 호스트 파일 경로는 작업 디렉토리 기준으로 해석됩니다.
    pub fn new(
        runner: Arc<P>,
        tools: &ToolSettings,
        environment: &EnvironmentSettings,
        workspace: Workspace,
    ) -> Self {
        Self {
            certificates: CertificateImporter::new(
                runner,
                tools.openssl.as_str(),
                tools.keytool.as_str(),
                environment,
            ),
            // 절대 경로는 그대로 유지된다
            hosts_file: workspace.path(&environment.hosts_file),
            workspace,
        }
    }

    /// 대상 호스트 파일 경로
    pub fn hosts_file(&self) -> &Path {
        &self.hosts_file
    }

    /// 호스트 파일에 `<ip> <host>` 매핑을 추가합니다 (이미 있으면 변경 없음).
    pub async fn bind_host(&self, host: &str, ip: std::net::IpAddr) -> Result<BindOutcome, EnvironmentError> {
        let binding = HostBinding {
            hostname: host.to_owned(),
            ip,
        };
        hosts::bind_host(&self.hosts_file, &binding).await
    }

    /// `(host, port)`의 인증서를 `cert_dir`의 트러스트 스토어에 등록합니다.
    pub async fn import_certificate(
        &self,
        host: &str,
        port: u16,
        cert_dir: &Path,
    ) -> Result<(), EnvironmentError> {
        self.certificates.import_certificate(host, port, cert_dir).await
    }

    /// 토폴로지 템플릿을 `host` 기준으로 재작성합니다.
    ///
    /// # Returns
    /// 덮어쓴 템플릿 요소 수
    pub async fn rewrite_topology(&self, template: &Path, host: &str) -> Result<usize, EnvironmentError> {
        topology::rewrite_topology(template, host).await
    }

    /// 프로파일 단계 하나를 실행합니다.
    ///
    /// 프로파일의 경로는 제품 소스 트리 기준입니다.
    pub async fn apply(
        &self,
        step: EnvironmentStep,
        config: &RunConfiguration,
        profile: &ProductProfile,
    ) -> Result<(), EnvironmentError> {
        info!(step = %step, product = %config.product_id(), "applying environment step");
        match step {
            EnvironmentStep::BindHost => {
                self.bind_host(config.host(), config.ip()).await?;
            }
            EnvironmentStep::ImportCertificate => {
                let cert_dir = self
                    .workspace
                    .source_path(config.product_id(), &profile.certificate_dir);
                self.import_certificate(config.host(), config.port(), &cert_dir)
                    .await?;
            }
            EnvironmentStep::RewriteTopology => {
                let template = self
                    .workspace
                    .source_path(config.product_id(), &profile.topology_template);
                self.rewrite_topology(&template, config.host()).await?;
            }
        }
        Ok(())
    }
}
