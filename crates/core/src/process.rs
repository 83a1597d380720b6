//! 외부 프로세스 추상화 -- 테스트 가능한 도구 실행 경계
//!
//! 실행기가 호출하는 모든 외부 도구(git, 빌드 도구, openssl, keytool)는
//! [`ProcessRunner`] trait을 거칩니다. 운영 코드는 [`SystemProcessRunner`]를,
//! 테스트는 호출을 기록하고 정해진 결과를 돌려주는 `MockProcessRunner`를
//! 사용합니다.
//!
//! # 구조
//!
//! ```text
//! ┌──────────────────┐
//! │   stage crates   │
//! └────────┬─────────┘
//!          │ ToolInvocation (program + explicit argv)
//!          ▼
//!   ┌──────────────┐
//!   │ProcessRunner │ (trait)
//!   └──────────────┘
//!        │      │
//!        ▼      ▼
//!   ┌──────┐ ┌────┐
//!   │System│ │Mock│
//!   └──┬───┘ └────┘
//!      │
//!      ▼
//!   tokio::process
//! ```
//!
//! 인자는 항상 벡터로 전달되며 셸 명령줄로 합쳐지지 않습니다.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::ExternalToolError;

/// 자식 프로세스의 stdout/stderr 처리 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// 실행기 자신의 stdout/stderr로 그대로 출력 (긴 빌드)
    #[default]
    Inherit,
    /// [`ToolOutput`]으로 수집
    Capture,
}

/// 외부 도구 호출 한 건
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    /// 프로그램 이름 또는 경로
    pub program: String,
    /// 그대로 전달되는 인자
    pub args: Vec<String>,
    /// 작업 디렉토리 (실행기와 다를 때)
    pub cwd: Option<PathBuf>,
    /// 자식 프로세스 stdin으로 보낼 바이트
    pub stdin: Option<Vec<u8>>,
    /// 출력 처리 방식
    pub output: OutputMode,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            stdin: None,
            output: OutputMode::Inherit,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn stdin(mut self, input: Vec<u8>) -> Self {
        self.stdin = Some(input);
        self
    }

    pub fn capture_output(mut self) -> Self {
        self.output = OutputMode::Capture;
        self
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// 종료된 프로세스의 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// 종료 코드 (시그널로 종료되면 `None`)
    pub code: Option<i32>,
    /// 수집된 stdout ([`OutputMode::Inherit`]에서는 비어 있음)
    pub stdout: Vec<u8>,
    /// 수집된 stderr ([`OutputMode::Inherit`]에서는 비어 있음)
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// 출력 없는 성공 종료
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    /// 주어진 stdout을 가진 성공 종료
    pub fn with_stdout(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    /// 주어진 코드와 stderr를 가진 실패 종료
    pub fn failed(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// stdout을 문자열로 변환합니다 (잘못된 UTF-8은 대체 문자로).
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// 0이 아닌 종료를 [`ExternalToolError::Failed`]로 변환합니다.
    pub fn check(self, program: &str) -> Result<Self, ExternalToolError> {
        if self.success() {
            Ok(self)
        } else {
            Err(ExternalToolError::Failed {
                program: program.to_owned(),
                code: self.code,
                stderr: String::from_utf8_lossy(&self.stderr).into_owned(),
            })
        }
    }
}

/// 외부 프로세스 실행 추상화
///
/// `run`은 프로세스를 시작하거나 기다릴 수 없을 때만 실패합니다.
/// 0이 아닌 종료는 [`ToolOutput`]으로 반환되어 호출자가 판단합니다.
/// `run_checked`는 종료 상태까지 결과에 반영합니다.
pub trait ProcessRunner: Send + Sync + 'static {
    /// 호출을 끝까지 실행합니다.
    ///
    /// # Errors
    /// 프로그램을 시작할 수 없으면 `ExternalToolError::Spawn`
    fn run(
        &self,
        invocation: &ToolInvocation,
    ) -> impl Future<Output = Result<ToolOutput, ExternalToolError>> + Send;

    /// 호출을 실행하고 0이 아닌 종료를 거부합니다.
    ///
    /// # Errors
    /// `ExternalToolError::Spawn` 또는 `ExternalToolError::Failed`
    fn run_checked(
        &self,
        invocation: &ToolInvocation,
    ) -> impl Future<Output = Result<ToolOutput, ExternalToolError>> + Send {
        async move {
            let output = self.run(invocation).await?;
            output.check(&invocation.program)
        }
    }
}

/// `tokio::process` 기반 운영 실행기
///
/// stdin 입력과 출력 수집을 동시에 진행하므로 입력과 출력이 파이프 버퍼보다
/// 커도 멈추지 않습니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ExternalToolError> {
        let spawn_error = |e: std::io::Error| ExternalToolError::Spawn {
            program: invocation.program.clone(),
            reason: e.to_string(),
        };

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        if let Some(dir) = &invocation.cwd {
            cmd.current_dir(dir);
        }

        cmd.stdin(if invocation.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        match invocation.output {
            OutputMode::Capture => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            OutputMode::Inherit => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
        }

        debug!(command = %invocation, cwd = ?invocation.cwd, "spawning external tool");

        let mut child = cmd.spawn().map_err(spawn_error)?;

        let pipe = child.stdin.take();
        let feed = async move {
            if let (Some(mut pipe), Some(input)) = (pipe, invocation.stdin.as_deref()) {
                pipe.write_all(input).await?;
                // pipe가 drop되면서 자식의 stdin이 닫힌다
            }
            Ok::<(), std::io::Error>(())
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(spawn_error)?;
        match fed {
            Ok(()) => {}
            // 입력을 다 읽지 않고 종료한 도구는 종료 코드로 판단한다
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!(program = %invocation.program, "stdin closed early by child");
            }
            Err(e) => return Err(spawn_error(e)),
        }

        debug!(
            program = %invocation.program,
            code = ?output.status.code(),
            "external tool finished"
        );

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// 호출을 기록하고 정해진 결과를 반환하는 테스트용 실행기
///
/// 응답은 프로그램 이름과 (선택적으로) 첫 번째 인자로 매칭됩니다.
/// 매칭되지 않은 호출은 빈 출력으로 성공합니다.
#[cfg(any(test, feature = "test-util"))]
#[derive(Default)]
pub struct MockProcessRunner {
    calls: std::sync::Mutex<Vec<ToolInvocation>>,
    responses: Vec<MockResponse>,
}

#[cfg(any(test, feature = "test-util"))]
struct MockResponse {
    program: String,
    first_arg: Option<String>,
    result: Option<ToolOutput>,
}

#[cfg(any(test, feature = "test-util"))]
impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// `program` 호출에 `output`을 반환합니다 (`first_arg`가 있으면 첫 인자도 일치해야 함).
    pub fn respond(mut self, program: &str, first_arg: Option<&str>, output: ToolOutput) -> Self {
        self.responses.push(MockResponse {
            program: program.to_owned(),
            first_arg: first_arg.map(str::to_owned),
            result: Some(output),
        });
        self
    }

    /// `program`이 `code`로 종료되게 합니다.
    pub fn fail(self, program: &str, first_arg: Option<&str>, code: i32) -> Self {
        self.respond(program, first_arg, ToolOutput::failed(code, "mock failure"))
    }

    /// `program`을 시작할 수 없게 합니다.
    pub fn unavailable(mut self, program: &str) -> Self {
        self.responses.push(MockResponse {
            program: program.to_owned(),
            first_arg: None,
            result: None,
        });
        self
    }

    /// 지금까지 기록된 호출 (순서대로)
    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// 기록된 호출마다 `program arg...` 문자열
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }
}

#[cfg(any(test, feature = "test-util"))]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ExternalToolError> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(invocation.clone());

        let matched = self.responses.iter().find(|r| {
            r.program == invocation.program
                && r.first_arg
                    .as_deref()
                    .is_none_or(|arg| invocation.args.first().map(String::as_str) == Some(arg))
        });

        match matched {
            Some(MockResponse {
                result: Some(output),
                ..
            }) => Ok(output.clone()),
            Some(MockResponse { result: None, .. }) => Err(ExternalToolError::Spawn {
                program: invocation.program.clone(),
                reason: "mock: program unavailable".to_owned(),
            }),
            None => Ok(ToolOutput::ok()),
        }
    }
}
