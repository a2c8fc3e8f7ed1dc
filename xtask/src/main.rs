//! Deployment tasks for superlists
//!
//! Provisions a server over `ssh` the same way every time, so running it again on a
//! provisioned host just upgrades it to the commit checked out locally.
//!
//! ## Commands
//!
//! - `xtask deploy --host USER@HOST` - lay out `~/sites/{site}`, check out the current commit,
//!   write the production config, build, migrate, and (re)start the service behind nginx
//!
//! Pass `--dry-run` to print the commands instead of running them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::prelude::RngExt;
use std::process::Command;

/// Characters a generated secret key is drawn from.
const SECRET_KEY_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*(-_=+)";
const SECRET_KEY_LENGTH: usize = 50;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Deployment tasks for superlists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision or update a server over ssh
    Deploy {
        /// Target as USER@HOST
        #[arg(long)]
        host: String,
        /// Site name, used for directories, nginx and the service (defaults to HOST)
        #[arg(long)]
        site: Option<String>,
        /// Repository to clone on the server (defaults to this checkout's origin)
        #[arg(long)]
        repo: Option<String>,
        /// Print the plan without running anything
        #[arg(long)]
        dry_run: bool,
    },
}

/// Everything the deploy plan depends on, resolved up front.
#[derive(Debug, Clone)]
struct Deployment {
    target: String,
    user: String,
    site: String,
    repo: String,
    commit: String,
}

impl Deployment {
    fn new(target: &str, site: Option<String>, repo: String, commit: String) -> Result<Self> {
        let (user, host) = target
            .split_once('@')
            .filter(|(user, host)| !user.is_empty() && !host.is_empty())
            .with_context(|| format!("--host must look like USER@HOST, got '{target}'"))?;

        Ok(Self {
            target: target.to_string(),
            user: user.to_string(),
            site: site.unwrap_or_else(|| host.to_string()),
            repo,
            commit,
        })
    }

    fn site_folder(&self) -> String {
        format!("/home/{}/sites/{}", self.user, self.site)
    }

    fn source_folder(&self) -> String {
        format!("{}/source", self.site_folder())
    }

    fn service(&self) -> String {
        format!("superlists.{}", self.site)
    }
}

/// One remote action. Steps without a command are only reported.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    description: &'static str,
    command: Option<String>,
}

impl Step {
    fn run(description: &'static str, command: impl Into<String>) -> Self {
        Self {
            description,
            command: Some(command.into()),
        }
    }

    fn note(description: &'static str) -> Self {
        Self {
            description,
            command: None,
        }
    }
}

/// The commands a deploy runs on the server, in order. Each one is safe to repeat.
fn deploy_plan(deployment: &Deployment, secret_key: &str) -> Vec<Step> {
    let site_folder = deployment.site_folder();
    let source = deployment.source_folder();
    let app_folder = format!("{source}/superlists");
    let site = &deployment.site;
    let service = deployment.service();
    let substitute = format!("sed -e s/SITENAME/{site}/g -e s/USERNAME/{}/g", deployment.user);

    let config = format!(
        "host: 127.0.0.1\n\
         port: 8000\n\
         debug: false\n\
         site_url: \"http://{site}\"\n\
         allowed_hosts:\n  - \"{site}\"\n\
         database:\n  url: \"sqlite://{site_folder}/database/db.sqlite3?mode=rwc\"\n"
    );

    vec![
        Step::run(
            "Create directory structure",
            format!("mkdir -p {site_folder}/database {site_folder}/static {site_folder}/source"),
        ),
        Step::run(
            "Fetch latest source",
            format!(
                "if [ -d {source}/.git ]; then cd {source} && git fetch; else git clone {} {source}; fi",
                deployment.repo
            ),
        ),
        Step::run(
            "Check out the local commit",
            format!("cd {source} && git reset --hard {}", deployment.commit),
        ),
        Step::run(
            "Write production config",
            format!("cat > {app_folder}/config.yaml <<'EOF'\n{config}EOF"),
        ),
        Step::run(
            "Create secret key if missing",
            format!(
                "test -f {app_folder}/secret_key.yaml || cat > {app_folder}/secret_key.yaml <<'EOF'\nsecret_key: \"{secret_key}\"\nEOF"
            ),
        ),
        Step::run(
            "Build release binary",
            format!("cd {source} && cargo build --release --package superlists"),
        ),
        Step::note("Static files are embedded in the binary, nothing to collect"),
        Step::run(
            "Migrate database",
            format!("cd {app_folder} && {source}/target/release/superlists -f config.yaml --migrate"),
        ),
        Step::run(
            "Install nginx site",
            format!(
                "{substitute} {source}/deploy_tools/nginx.template.conf | sudo tee /etc/nginx/sites-available/{site} > /dev/null \
                 && sudo ln -sfn /etc/nginx/sites-available/{site} /etc/nginx/sites-enabled/{site}"
            ),
        ),
        Step::run(
            "Install systemd service",
            format!(
                "{substitute} {source}/deploy_tools/systemd.template.service | sudo tee /etc/systemd/system/{service}.service > /dev/null"
            ),
        ),
        Step::run(
            "Restart services",
            format!(
                "sudo systemctl daemon-reload && sudo systemctl reload nginx \
                 && sudo systemctl enable {service} && sudo systemctl restart {service}"
            ),
        ),
    ]
}

fn generate_secret_key() -> String {
    let mut rng = rand::rng();
    (0..SECRET_KEY_LENGTH)
        .map(|_| SECRET_KEY_CHARS[rng.random_range(0..SECRET_KEY_CHARS.len())] as char)
        .collect()
}

/// Run a git command in the local checkout and return its trimmed stdout.
fn local_git(args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .output()
        .with_context(|| format!("Failed to run git {}", args.join(" ")))?;

    if !output.status.success() {
        anyhow::bail!("git {} failed with status: {}", args.join(" "), output.status);
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn run_remote(target: &str, step: &Step) -> Result<()> {
    let Some(command) = &step.command else {
        println!("  {}", step.description);
        return Ok(());
    };

    println!("==> {}", step.description);
    let status = Command::new("ssh")
        .arg(target)
        .arg(command)
        .status()
        .with_context(|| format!("Failed to run ssh for step '{}'", step.description))?;

    if !status.success() {
        anyhow::bail!("Step '{}' failed with status: {}", step.description, status);
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy {
            host,
            site,
            repo,
            dry_run,
        } => {
            let repo = match repo {
                Some(repo) => repo,
                None => local_git(&["config", "--get", "remote.origin.url"]).context("No --repo given and no origin remote")?,
            };
            let commit = local_git(&["log", "-n", "1", "--format=%H"])?;
            let deployment = Deployment::new(&host, site, repo, commit)?;

            // Only written when the server has no key yet
            let plan = deploy_plan(&deployment, &generate_secret_key());

            println!("Deploying {} to {} at {}", deployment.commit, deployment.site, deployment.target);
            if dry_run {
                for step in &plan {
                    println!();
                    println!("# {}", step.description);
                    if let Some(command) = &step.command {
                        println!("{command}");
                    }
                }
                return Ok(());
            }

            for step in &plan {
                run_remote(&deployment.target, step)?;
            }

            println!();
            println!("Done! {} is serving http://{}", deployment.service(), deployment.site);
        }
    }

    Ok(())
}
