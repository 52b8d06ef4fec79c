//! Provider-agnostic CLI argument mapping
//!
//! Maps the rewrite call's common arguments to each tool's CLI syntax.

use serde::{Deserialize, Serialize};

/// Common rewrite CLI arguments
#[derive(Debug, Clone)]
pub enum LlmArg {
    /// Model name/ID
    Model(String),
    /// Non-interactive print mode (Claude -p)
    Print,
    /// Plain text output
    TextOutput,
    /// Passed through verbatim
    Raw(String),
}

/// Rewrite provider type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Claude,
    Gemini,
    Codex,
    /// Any command that reads a prompt on stdin and prints the reply
    Custom,
}

impl LlmProvider {
    /// Default CLI command name (`None` for custom)
    pub fn command(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Claude => Some("claude"),
            LlmProvider::Gemini => Some("gemini"),
            LlmProvider::Codex => Some("codex"),
            LlmProvider::Custom => None,
        }
    }

    /// Build CLI arguments from common LlmArgs
    pub fn build_args(&self, args: &[LlmArg]) -> Vec<String> {
        let mut cli_args = Vec::new();

        // Codex runs one-shot prompts under "exec"
        if *self == LlmProvider::Codex {
            cli_args.push("exec".to_string());
        }

        for arg in args {
            match arg {
                LlmArg::Model(model) => match self {
                    LlmProvider::Gemini => {
                        cli_args.push("-m".to_string());
                        cli_args.push(model.clone());
                    }
                    LlmProvider::Claude | LlmProvider::Codex => {
                        cli_args.push("--model".to_string());
                        cli_args.push(model.clone());
                    }
                    LlmProvider::Custom => {}
                },
                LlmArg::Print => {
                    if *self == LlmProvider::Claude {
                        cli_args.push("-p".to_string());
                    }
                }
                LlmArg::TextOutput => match self {
                    LlmProvider::Claude | LlmProvider::Gemini => {
                        cli_args.push("--output-format".to_string());
                        cli_args.push("text".to_string());
                    }
                    LlmProvider::Codex | LlmProvider::Custom => {}
                },
                LlmArg::Raw(raw) => cli_args.push(raw.clone()),
            }
        }

        cli_args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common(model: &str) -> Vec<LlmArg> {
        vec![
            LlmArg::Print,
            LlmArg::Model(model.to_string()),
            LlmArg::TextOutput,
        ]
    }

    #[test]
    fn test_claude_args() {
        let cli_args = LlmProvider::Claude.build_args(&common("sonnet"));
        assert_eq!(
            cli_args,
            vec!["-p", "--model", "sonnet", "--output-format", "text"]
        );
    }

    #[test]
    fn test_gemini_args() {
        let cli_args = LlmProvider::Gemini.build_args(&common("gemini-2.5-flash"));
        assert_eq!(
            cli_args,
            vec!["-m", "gemini-2.5-flash", "--output-format", "text"]
        );
    }

    #[test]
    fn test_codex_args() {
        let cli_args = LlmProvider::Codex.build_args(&common("gpt-5-codex"));
        assert_eq!(cli_args, vec!["exec", "--model", "gpt-5-codex"]);
    }

    #[test]
    fn test_custom_passes_raw_args_only() {
        let mut args = common("ignored");
        args.push(LlmArg::Raw("--json".to_string()));
        assert_eq!(LlmProvider::Custom.build_args(&args), vec!["--json"]);
        assert_eq!(LlmProvider::Custom.command(), None);
    }

    #[test]
    fn test_provider_serde_is_lowercase() {
        let provider: LlmProvider = serde_json::from_str("\"codex\"").unwrap();
        assert_eq!(provider, LlmProvider::Codex);
        assert_eq!(serde_json::to_string(&LlmProvider::Custom).unwrap(), "\"custom\"");
    }
}
