//! 인증서 등록 -- 대상 호스트의 TLS 인증서를 테스트 클라이언트 트러스트 스토어에 추가
//!
//! # 처리 순서
//! ```text
//! openssl s_client -servername H -connect H:P   (stdin: null)
//!        | stdout (PEM chain)
//!        v
//! openssl x509 -text                            (stdin: s_client stdout)
//!        | stdout
//!        v
//! <cert_dir>/<certificate_text_file>
//!        |
//!        v
//! keytool -import -trustcacerts ... -noprompt
//!        |
//!        v
//! 중간 파일 삭제 (keytool 결과와 무관하게 항상)
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use intg_core::config::EnvironmentSettings;
use intg_core::error::ExternalToolError;
use intg_core::process::{ProcessRunner, ToolInvocation};

use crate::error::EnvironmentError;

const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";

/// 트러스트 스토어 인증서 등록기
pub struct CertificateImporter<P: ProcessRunner> {
    runner: Arc<P>,
    openssl: String,
    keytool: String,
    trust_store_file: String,
    trust_store_password: String,
    trust_store_alias: String,
    certificate_text_file: String,
}

impl<P: ProcessRunner> CertificateImporter<P> {
    /// 새 등록기를 생성합니다.
    pub fn new(
        runner: Arc<P>,
        openssl: impl Into<String>,
        keytool: impl Into<String>,
        settings: &EnvironmentSettings,
    ) -> Self {
        Self {
            runner,
            openssl: openssl.into(),
            keytool: keytool.into(),
            trust_store_file: settings.trust_store_file.clone(),
            trust_store_password: settings.trust_store_password.clone(),
            trust_store_alias: settings.trust_store_alias.clone(),
            certificate_text_file: settings.certificate_text_file.clone(),
        }
    }

    /// `(host, port)`가 제시하는 인증서를 `<cert_dir>`의 트러스트 스토어에 등록합니다.
    ///
    /// 중간 텍스트 파일은 등록 성공 여부와 관계없이 삭제됩니다.
    pub async fn import_certificate(
        &self,
        host: &str,
        port: u16,
        cert_dir: &Path,
    ) -> Result<(), EnvironmentError> {
        if !tokio::fs::try_exists(cert_dir).await? {
            return Err(EnvironmentError::CertificateDirNotFound {
                path: cert_dir.display().to_string(),
            });
        }

        let certificate = self.fetch_certificate_text(host, port).await?;

        let text_file = cert_dir.join(&self.certificate_text_file);
        tokio::fs::write(&text_file, &certificate).await?;
        debug!(path = %text_file.display(), "certificate text written");

        let imported = self.import_into_store(&text_file, cert_dir).await;
        remove_intermediate(&text_file).await;
        imported?;

        info!(
            host = host,
            port = port,
            alias = %self.trust_store_alias,
            "product certificate imported to the test client"
        );
        Ok(())
    }

    /// 핸드셰이크로 받은 인증서를 텍스트 형식으로 변환합니다.
    async fn fetch_certificate_text(&self, host: &str, port: u16) -> Result<Vec<u8>, EnvironmentError> {
        let handshake = ToolInvocation::new(&self.openssl)
            .args(["s_client", "-servername", host, "-connect"])
            .arg(format!("{host}:{port}"))
            .capture_output();
        let presented = self.runner.run(&handshake).await?;

        if !presented.stdout_text().contains(PEM_BEGIN) {
            if !presented.success() {
                return Err(ExternalToolError::Failed {
                    program: self.openssl.clone(),
                    code: presented.code,
                    stderr: String::from_utf8_lossy(&presented.stderr).into_owned(),
                }
                .into());
            }
            return Err(EnvironmentError::NoCertificate {
                program: self.openssl.clone(),
                host: host.to_owned(),
                port,
            });
        }

        let extract = ToolInvocation::new(&self.openssl)
            .args(["x509", "-text"])
            .stdin(presented.stdout)
            .capture_output();
        let text = self.runner.run_checked(&extract).await?;
        Ok(text.stdout)
    }

    async fn import_into_store(&self, text_file: &Path, cert_dir: &Path) -> Result<(), EnvironmentError> {
        let keystore: PathBuf = cert_dir.join(&self.trust_store_file);
        let invocation = ToolInvocation::new(&self.keytool)
            .args(["-import", "-trustcacerts", "-alias", self.trust_store_alias.as_str(), "-file"])
            .arg(text_file.display().to_string())
            .arg("-keystore")
            .arg(keystore.display().to_string())
            .args(["-storepass", self.trust_store_password.as_str(), "-noprompt"]);
        self.runner.run_checked(&invocation).await?;
        Ok(())
    }
}

async fn remove_intermediate(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "certificate text removed"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove certificate text"),
    }
}
