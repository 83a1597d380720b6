//! 실행 단계 -- 단계 식별, 치명도 정책, 실행 보고서
//!
//! [`Stage`]는 파이프라인의 각 단계를 식별하고 실패 시 실행을 중단할지
//! ([`Stage::is_fatal`])를 결정합니다. [`RunReport`]는 단계별 결과를
//! 순서대로 기록하며 JSON으로 직렬화되어 로그 보관 디렉토리에 남습니다.
//!
//! # 실행 순서
//! ```text
//! LoadConfiguration → CloneRepository → PinLatestTag
//!   → SubstituteDebugResources → BindHost → ImportCertificate → RewriteTopology
//!   → ResolveDistribution → BuildModule* → RunIntegrationTests
//!   → CollectLogs → WriteSummary
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::EnvironmentStep;

/// 파이프라인 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// 속성 파일 로드 및 검증
    LoadConfiguration,
    /// 저장소 클론
    CloneRepository,
    /// 최신 태그로 고정
    PinLatestTag,
    /// DEBUG 모드 테스트 디스크립터 교체
    SubstituteDebugResources,
    /// 호스트명 매핑
    BindHost,
    /// 인증서 등록
    ImportCertificate,
    /// 토폴로지 템플릿 재작성
    RewriteTopology,
    /// 배포 식별 정보 해석
    ResolveDistribution,
    /// 통합 테스트 전 모듈 빌드
    BuildModule,
    /// 통합 테스트 모듈 실행
    RunIntegrationTests,
    /// 로그 수집
    CollectLogs,
    /// 실행 요약 기록
    WriteSummary,
}

impl Stage {
    /// 실패 시 실행을 중단하는 단계인지 여부
    ///
    /// 배포 식별 정보 해석과 로그 수집만 실패를 기록하고 계속 진행합니다.
    /// 실행기의 단계 실행 헬퍼는 이 값과 호출 방식이 일치하는지 검사합니다.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ResolveDistribution | Self::CollectLogs)
    }

    /// 단계 이름
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadConfiguration => "load-configuration",
            Self::CloneRepository => "clone-repository",
            Self::PinLatestTag => "pin-latest-tag",
            Self::SubstituteDebugResources => "substitute-debug-resources",
            Self::BindHost => "bind-host",
            Self::ImportCertificate => "import-certificate",
            Self::RewriteTopology => "rewrite-topology",
            Self::ResolveDistribution => "resolve-distribution",
            Self::BuildModule => "build-module",
            Self::RunIntegrationTests => "run-integration-tests",
            Self::CollectLogs => "collect-logs",
            Self::WriteSummary => "write-summary",
        }
    }
}

impl From<EnvironmentStep> for Stage {
    fn from(step: EnvironmentStep) -> Self {
        match step {
            EnvironmentStep::BindHost => Self::BindHost,
            EnvironmentStep::ImportCertificate => Self::ImportCertificate,
            EnvironmentStep::RewriteTopology => Self::RewriteTopology,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 단계 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStatus {
    /// 성공
    Succeeded,
    /// 실패했지만 치명적이지 않아 계속 진행
    Degraded,
    /// 실패하여 실행 중단
    Failed,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Degraded => write!(f, "degraded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// 단계 하나의 기록
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    /// 단계
    pub stage: Stage,
    /// 결과
    pub status: StageStatus,
    /// 소요 시간 (밀리초)
    pub duration_ms: u64,
    /// 부가 설명 (모듈 경로, 에러 메시지 등)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// 전체 실행 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunOutcome {
    /// 진행 중
    Running,
    /// 모든 단계 완료
    Completed,
    /// 치명적 단계 실패로 중단
    Aborted,
}

/// 단계별 실행 보고서
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// 실행 ID
    pub run_id: Uuid,
    /// 제품 식별자 (설정 로드 전에는 없음)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// 실행 결과
    pub outcome: RunOutcome,
    /// 단계 기록 (실행 순서)
    pub stages: Vec<StageRecord>,
}

impl RunReport {
    /// 새 실행 ID로 보고서를 시작합니다.
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            product_id: None,
            outcome: RunOutcome::Running,
            stages: Vec::new(),
        }
    }

    /// 단계 결과를 추가합니다.
    pub fn record(
        &mut self,
        stage: Stage,
        status: StageStatus,
        elapsed: Duration,
        detail: Option<String>,
    ) {
        self.stages.push(StageRecord {
            stage,
            status,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            detail,
        });
    }

    /// 기록된 단계 중 실패 단계
    pub fn failed_stage(&self) -> Option<Stage> {
        self.stages
            .iter()
            .find(|r| r.status == StageStatus::Failed)
            .map(|r| r.stage)
    }

    /// 주어진 단계가 기록되었는지 확인합니다.
    pub fn contains(&self, stage: Stage) -> bool {
        self.stages.iter().any(|r| r.stage == stage)
    }

    /// JSON 문자열로 직렬화합니다.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
