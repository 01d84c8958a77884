//! Orchestrator configuration
//!
//! Defines the bind address, the location of the provisioning script,
//! the admin credentials used for token issuance and the reverse-proxy
//! control commands.

use std::path::PathBuf;
use std::time::Duration;

/// Command line split into program and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Splits a command line on whitespace; returns `None` for a blank line
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

/// Reverse-proxy control commands
#[derive(Debug, Clone)]
pub struct ProxyCommands {
    pub reload: CommandSpec,
    pub start: CommandSpec,
    pub stop: CommandSpec,
}

impl Default for ProxyCommands {
    fn default() -> Self {
        Self {
            reload: command("nginx", &["-s", "reload"]),
            start: command("systemctl", &["start", "nginx"]),
            stop: command("systemctl", &["stop", "nginx"]),
        }
    }
}

fn command(program: &str, args: &[&str]) -> CommandSpec {
    CommandSpec {
        program: program.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
    }
}

/// Orchestrator configuration
#[derive(Clone)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Installation root: working directory of every script call and parent
    /// of the per-stack `stack_<id>` directories
    pub install_root: PathBuf,

    /// Provisioning script, normally `<install_root>/init.sh`
    pub script_path: PathBuf,

    /// HMAC secret for bearer tokens
    pub jwt_secret: String,

    pub admin_user: String,
    pub admin_pass: String,

    /// Lifetime of issued access tokens
    pub token_ttl: Duration,

    pub proxy: ProxyCommands,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("install_root", &self.install_root)
            .field("script_path", &self.script_path)
            .field("admin_user", &self.admin_user)
            .field("token_ttl", &self.token_ttl)
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Creates a configuration with defaults for everything but the secrets
    pub fn new(
        install_root: impl Into<PathBuf>,
        jwt_secret: String,
        admin_user: String,
        admin_pass: String,
    ) -> Self {
        let install_root = install_root.into();
        Self {
            bind_addr: "0.0.0.0:8005".to_string(),
            script_path: install_root.join("init.sh"),
            install_root,
            jwt_secret,
            admin_user,
            admin_pass,
            token_ttl: Duration::from_secs(30 * 60),
            proxy: ProxyCommands::default(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET_KEY (required)
    /// - ADMIN_USER, ADMIN_PASS (required)
    /// - LIGHTSTACK_BIND_ADDR (optional, default: 0.0.0.0:8005)
    /// - LIGHTSTACK_INSTALL_ROOT (optional, default: current directory)
    /// - LIGHTSTACK_SCRIPT (optional, default: <install_root>/init.sh)
    /// - ACCESS_TOKEN_EXPIRE_MINUTES (optional, default: 30)
    /// - LIGHTSTACK_PROXY_RELOAD_CMD / _START_CMD / _STOP_CMD (optional)
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET_KEY environment variable not set"))?;

        let admin_user = std::env::var("ADMIN_USER")
            .map_err(|_| anyhow::anyhow!("ADMIN_USER environment variable not set"))?;

        let admin_pass = std::env::var("ADMIN_PASS")
            .map_err(|_| anyhow::anyhow!("ADMIN_PASS environment variable not set"))?;

        let install_root = match std::env::var("LIGHTSTACK_INSTALL_ROOT") {
            Ok(root) => PathBuf::from(root),
            Err(_) => std::env::current_dir()
                .map_err(|e| anyhow::anyhow!("Cannot determine working directory: {}", e))?,
        };

        let mut config = Self::new(install_root, jwt_secret, admin_user, admin_pass);

        if let Ok(addr) = std::env::var("LIGHTSTACK_BIND_ADDR") {
            config.bind_addr = addr;
        }

        if let Ok(script) = std::env::var("LIGHTSTACK_SCRIPT") {
            config.script_path = PathBuf::from(script);
        }

        if let Some(minutes) = std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.token_ttl = Duration::from_secs(minutes * 60);
        }

        let overrides = [
            ("LIGHTSTACK_PROXY_RELOAD_CMD", &mut config.proxy.reload),
            ("LIGHTSTACK_PROXY_START_CMD", &mut config.proxy.start),
            ("LIGHTSTACK_PROXY_STOP_CMD", &mut config.proxy.stop),
        ];
        for (var, slot) in overrides {
            if let Ok(line) = std::env::var(var) {
                *slot = CommandSpec::parse(&line)
                    .ok_or_else(|| anyhow::anyhow!("{} cannot be empty", var))?;
            }
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt_secret.is_empty() {
            anyhow::bail!("jwt_secret cannot be empty");
        }

        if self.admin_user.is_empty() || self.admin_pass.is_empty() {
            anyhow::bail!("admin credentials cannot be empty");
        }

        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.token_ttl.as_secs() == 0 {
            anyhow::bail!("token_ttl must be greater than 0");
        }

        for cmd in [&self.proxy.reload, &self.proxy.start, &self.proxy.stop] {
            if cmd.program.is_empty() {
                anyhow::bail!("proxy commands cannot be empty");
            }
        }

        Ok(())
    }
}
