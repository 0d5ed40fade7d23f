// ==========================================
// 补贴预算分配引擎 - 外部进程传输
// ==========================================
// 调用约定: <program> <base args...> --budget <v> --alpha <v> --json-out
// 工作目录: 数据目录
// 规则:
// - stdout / stderr 并发读取，避免管道写满导致子进程阻塞
// - 超时或调用方取消时终止子进程（kill_on_drop）
// - 非零退出 → EngineFailed；输出无法解析 → OutputParse
// ==========================================

use crate::domain::allocation::AllocationReport;
use crate::transport::error::{TransportError, TransportResult};
use crate::transport::output::extract_json_document;
use crate::transport::{AllocationTransport, SimulationRequest};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, info, instrument, warn};

/// 外部引擎默认超时
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct ProcessTransport {
    program: String,
    base_args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Duration,
}

impl ProcessTransport {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
            working_dir: None,
            timeout: DEFAULT_PROCESS_TIMEOUT,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 组装命令行参数（base args 在前）
    pub fn build_args(&self, request: &SimulationRequest) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.push("--budget".to_string());
        args.push(request.budget.to_string());
        args.push("--alpha".to_string());
        args.push(request.alpha.to_string());
        args.push("--json-out".to_string());
        args
    }

    fn spawn(&self, request: &SimulationRequest) -> TransportResult<Child> {
        let mut command = Command::new(&self.program);
        command
            .args(self.build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        command.spawn().map_err(|source| TransportError::Spawn {
            program: self.program.clone(),
            source,
        })
    }
}

/// 并发读取两个管道并等待退出
async fn collect_output(mut child: Child) -> std::io::Result<(ExitStatus, String, String)> {
    let mut stdout_pipe = child.stdout.take();
    let mut stderr_pipe = child.stderr.take();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let read_stdout = async {
        if let Some(pipe) = stdout_pipe.as_mut() {
            pipe.read_to_end(&mut stdout).await?;
        }
        Ok::<(), std::io::Error>(())
    };
    let read_stderr = async {
        if let Some(pipe) = stderr_pipe.as_mut() {
            pipe.read_to_end(&mut stderr).await?;
        }
        Ok::<(), std::io::Error>(())
    };

    let (_, _, status) = futures::try_join!(read_stdout, read_stderr, child.wait())?;

    Ok((
        status,
        String::from_utf8_lossy(&stdout).into_owned(),
        String::from_utf8_lossy(&stderr).into_owned(),
    ))
}

#[async_trait]
impl AllocationTransport for ProcessTransport {
    #[instrument(skip(self), fields(program = %self.program))]
    async fn simulate(&self, request: &SimulationRequest) -> TransportResult<AllocationReport> {
        let request = request.normalized();
        let child = self.spawn(&request)?;
        debug!(pid = child.id(), "外部引擎已启动");

        // 超时后 future 被丢弃，子进程随之终止
        let (status, stdout, stderr) = tokio::time::timeout(self.timeout, collect_output(child))
            .await
            .map_err(|_| {
                warn!(timeout_secs = self.timeout.as_secs(), "外部引擎超时，已终止");
                TransportError::Timeout(self.timeout)
            })??;

        if !status.success() {
            warn!(code = ?status.code(), "外部引擎异常退出");
            return Err(TransportError::EngineFailed {
                code: status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        let report = extract_json_document(&stdout)?;
        info!(
            selected = report.total_selected,
            budget_used = report.budget_used,
            "外部引擎返回结果"
        );
        Ok(report)
    }

    fn name(&self) -> &'static str {
        "process"
    }
}
