//! 정적 호스트명 매핑
//!
//! 호스트명이 파일 어디에도 없을 때만 `"<ip> <hostname>"`을 호스트 파일에
//! 추가합니다. 단순 부분 문자열 검사이므로 다른 항목 안에 포함된 호스트명도
//! 이미 있는 것으로 봅니다.

use std::io::ErrorKind;
use std::path::Path;

use tokio::io::AsyncWriteExt;
use tracing::info;

use intg_core::types::HostBinding;

use crate::error::EnvironmentError;

/// [`bind_host`] 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// 새 항목 추가됨
    Appended,
    /// 호스트명이 이미 있어 파일을 건드리지 않음
    AlreadyPresent,
}

/// `hosts_file`에 `binding.hostname` → `binding.ip` 매핑을 한 번만 추가합니다.
///
/// 호스트 파일이 없으면 빈 파일로 간주하고 추가 시 생성합니다.
pub async fn bind_host(
    hosts_file: &Path,
    binding: &HostBinding,
) -> Result<BindOutcome, EnvironmentError> {
    let hosts_error = |source: std::io::Error| EnvironmentError::HostsFile {
        path: hosts_file.display().to_string(),
        source,
    };

    let current = match tokio::fs::read_to_string(hosts_file).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(hosts_error(e)),
    };

    if current.contains(&binding.hostname) {
        info!(
            hostname = %binding.hostname,
            hosts_file = %hosts_file.display(),
            "hostname already defined"
        );
        return Ok(BindOutcome::AlreadyPresent);
    }

    let mut entry = String::new();
    if !current.is_empty() && !current.ends_with('\n') {
        entry.push('\n');
    }
    entry.push_str(&binding.entry_line());
    entry.push('\n');

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(hosts_file)
        .await
        .map_err(hosts_error)?;
    file.write_all(entry.as_bytes()).await.map_err(hosts_error)?;
    file.flush().await.map_err(hosts_error)?;

    info!(
        hostname = %binding.hostname,
        ip = %binding.ip,
        hosts_file = %hosts_file.display(),
        "host binding added"
    );
    Ok(BindOutcome::Appended)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding() -> HostBinding {
        HostBinding {
            hostname: "test.local".to_owned(),
            ip: "10.0.0.5".parse().unwrap(),
        }
    }

    #[tokio::test]
    async fn appends_entry_once() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("hosts");
        std::fs::write(&hosts, "127.0.0.1 localhost\n").unwrap();

        assert_eq!(
            bind_host(&hosts, &binding()).await.unwrap(),
            BindOutcome::Appended
        );
        assert_eq!(
            bind_host(&hosts, &binding()).await.unwrap(),
            BindOutcome::AlreadyPresent
        );

        let content = std::fs::read_to_string(&hosts).unwrap();
        assert_eq!(content, "127.0.0.1 localhost\n10.0.0.5 test.local\n");
        assert_eq!(content.matches("test.local").count(), 1);
    }

    #[tokio::test]
    async fn missing_trailing_newline_is_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("hosts");
        std::fs::write(&hosts, "127.0.0.1 localhost").unwrap();

        bind_host(&hosts, &binding()).await.unwrap();

        let content = std::fs::read_to_string(&hosts).unwrap();
        assert_eq!(content, "127.0.0.1 localhost\n10.0.0.5 test.local\n");
    }

    #[tokio::test]
    async fn hostname_as_substring_counts_as_present() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("hosts");
        std::fs::write(&hosts, "10.0.0.9 api.test.local.example\n").unwrap();

        let outcome = bind_host(&hosts, &binding()).await.unwrap();

        assert_eq!(outcome, BindOutcome::AlreadyPresent);
        assert_eq!(
            std::fs::read_to_string(&hosts).unwrap(),
            "10.0.0.9 api.test.local.example\n"
        );
    }

    #[tokio::test]
    async fn missing_hosts_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("hosts");

        bind_host(&hosts, &binding()).await.unwrap();

        assert_eq!(std::fs::read_to_string(&hosts).unwrap(), "10.0.0.5 test.local\n");
    }

    #[tokio::test]
    async fn unwritable_location_reports_hosts_file() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("no-such-dir").join("hosts");

        let err = bind_host(&hosts, &binding()).await.unwrap_err();

        assert!(matches!(err, EnvironmentError::HostsFile { .. }));
    }
}
