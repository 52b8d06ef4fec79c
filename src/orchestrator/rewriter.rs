use super::cli_mapper::{LlmArg, LlmProvider};
use crate::config::RewriterConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Text-generation seam used by the fix resolver
#[async_trait]
pub trait Rewriter: Send + Sync {
    /// Send one prompt and return the raw reply
    async fn rewrite(&self, prompt: &str) -> Result<String>;
}

/// Rewriter backed by an external LLM CLI (prompt on stdin, reply on stdout)
#[derive(Debug, Clone)]
pub struct CommandRewriter {
    command: String,
    args: Vec<String>,
}

impl CommandRewriter {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    /// Build from the `[rewriter]` config section
    pub fn from_config(config: &RewriterConfig) -> Result<Self> {
        let command = match (&config.command, config.provider.command()) {
            (Some(command), _) => command.clone(),
            (None, Some(default)) => default.to_string(),
            (None, None) => anyhow::bail!("Custom rewriter provider requires `command` in [rewriter]"),
        };

        let mut common = vec![LlmArg::Print];
        if let Some(model) = &config.model {
            common.push(LlmArg::Model(model.clone()));
        }
        common.push(LlmArg::TextOutput);
        common.extend(config.extra_args.iter().cloned().map(LlmArg::Raw));

        Ok(Self::new(command, config.provider.build_args(&common)))
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    async fn run_command(&self, prompt: &str) -> Result<Output> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| {
                format!(
                    "Command '{}' not found. Please ensure it is installed and in your PATH.",
                    self.command
                )
            })?;

        let mut stdin = child.stdin.take().context("Failed to open rewriter stdin")?;
        let feed = async move {
            stdin.write_all(prompt.as_bytes()).await?;
            stdin.shutdown().await
        };

        // Feed the prompt while the reply is collected so neither pipe fills up
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.context("Failed to collect rewriter output")?;
        if output.status.success() {
            fed.context("Failed to write prompt to stdin")?;
        }
        Ok(output)
    }

    /// Turn the finished process into a reply, surfacing stderr on failure
    fn reply_from(&self, output: Output) -> Result<String> {
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines() {
            tracing::debug!(command = %self.command, "{}", line);
        }

        if !output.status.success() {
            anyhow::bail!(
                "Command '{}' failed with exit code {:?}\nStderr: {}",
                self.command,
                output.status.code(),
                stderr
            );
        }

        String::from_utf8(output.stdout).context("Rewriter reply is not valid UTF-8")
    }
}

#[async_trait]
impl Rewriter for CommandRewriter {
    async fn rewrite(&self, prompt: &str) -> Result<String> {
        tracing::debug!(command = %self.command, prompt_chars = prompt.len(), "Invoking rewriter");
        let output = self.run_command(prompt).await?;
        self.reply_from(output)
    }
}
