//! Provisioning script protocol
//!
//! `init.sh` is driven through an interactive prompt on stdin and reports
//! back in semi-structured text on stdout. Everything that depends on the
//! exact shape of that text lives here, one function per operation.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use lightstack_core::domain::stack::{StackSpec, StackSummary};
use regex::Regex;

use crate::config::Config;
use crate::service::process::ProcessRequest;

/// Subcommand that provisions a new stack
pub const ADD: &str = "add";
/// Subcommand that lists existing stacks
pub const LIST: &str = "list";
/// Subcommand that removes a stack
pub const DEL: &str = "del";

/// Message used when `add` exits 0 without naming the new stack
pub const MISSING_STACK_ID: &str = "Failed to extract stack ID";

static STACK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"stack_(\d+)").expect("valid stack id pattern"));

fn yes_no(flag: bool) -> &'static str {
    if flag { "y" } else { "n" }
}

/// Answers for the `add` prompt, in prompt order
///
/// The email prompt only matters for real certificates; otherwise it is
/// answered with an empty line. The two trailing `y` lines confirm the
/// summary and the start of the deployment.
pub fn provision_transcript(spec: &StackSpec) -> String {
    let email = if spec.use_real_certs {
        spec.email.as_deref().unwrap_or("")
    } else {
        ""
    };

    format!(
        "{}\n{}\n{}\n{}\n{}\ny\ny\n",
        spec.phoenixd_domain,
        spec.lnbits_domain,
        yes_no(spec.use_real_certs),
        yes_no(spec.use_postgres),
        email,
    )
}

/// Digits of the first `stack_<digits>` token in the `add` output
pub fn extract_stack_id(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .filter(|line| line.contains("stack_"))
        .find_map(|line| STACK_ID.captures(line))
        .map(|caps| caps[1].to_string())
}

/// Structured records from the `list` output
///
/// Only lines starting with `{` are candidates; anything that then fails to
/// parse is skipped like any other decorative line. The output is trimmed as
/// a whole first, so only the first line loses its indentation.
pub fn parse_stack_list(stdout: &str) -> Vec<StackSummary> {
    stdout
        .trim()
        .lines()
        .filter(|line| line.starts_with('{'))
        .filter_map(|line| serde_json::from_str::<StackSummary>(line).ok())
        .collect()
}

/// Number of active stacks in the human-readable `list` output
///
/// Each stack is printed as a row starting with its numeric index.
pub fn count_active_stacks(stdout: &str) -> usize {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| line.starts_with(|c: char| c.is_ascii_digit()))
        .count()
}

/// Answers for the `del` prompt
///
/// With a single stack the script skips the selection prompt and only asks
/// for confirmation.
pub fn removal_transcript(active_stacks: usize, stack_id: &str) -> String {
    if active_stacks == 1 {
        "y\n".to_string()
    } else {
        format!("{}\ny\n", stack_id)
    }
}

/// Directory the script keeps for each provisioned stack
pub fn stack_dir_name(stack_id: &str) -> String {
    format!("stack_{}", stack_id)
}

/// Where the script lives and where it runs
#[derive(Debug, Clone)]
pub struct ScriptLocation {
    pub script_path: PathBuf,
    pub install_root: PathBuf,
}

impl ScriptLocation {
    pub fn new(script_path: impl Into<PathBuf>, install_root: impl Into<PathBuf>) -> Self {
        Self {
            script_path: script_path.into(),
            install_root: install_root.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.script_path, &config.install_root)
    }

    /// `<script> <subcommand>` running in the installation root
    pub fn request(&self, subcommand: &str) -> ProcessRequest {
        ProcessRequest::new(&self.script_path)
            .arg(subcommand)
            .working_dir(&self.install_root)
    }

    pub fn stack_dir(&self, stack_id: &str) -> PathBuf {
        self.install_root.join(stack_dir_name(stack_id))
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }
}
