use crate::config::Settings;
use crate::error::Result;
use crate::ops::{read_manifest, render_manifest, transplant_replaces, write_manifest};
use crate::paths::ManifestPaths;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    /// go.mod to copy replace directives from
    ///
    /// Defaults to ../../dependencies/<DEPENDENCY>/go.mod next to this executable.
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// go.mod whose replace directives are overwritten
    ///
    /// Defaults to ../../packages/<PACKAGE>/go.mod next to this executable.
    #[arg(long, value_name = "PATH")]
    pub target: Option<PathBuf>,

    /// Directory name of the source module under ../../dependencies
    #[arg(long, value_name = "NAME")]
    pub dependency: Option<String>,

    /// Directory of the target module under ../../packages (e.g. chain/app)
    #[arg(long, value_name = "DIR")]
    pub package: Option<String>,

    /// TOML file providing defaults for the options above
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show what would change without writing the target
    #[arg(long, short = 'n')]
    pub dry_run: bool,
}

impl SyncArgs {
    /// Settings given directly on the command line.
    pub fn settings(&self) -> Settings {
        Settings {
            source: self.source.clone(),
            target: self.target.clone(),
            dependency: self.dependency.clone(),
            package: self.package.clone(),
        }
    }
}

pub fn execute(args: SyncArgs) -> Result<()> {
    let mut settings = Settings::default();
    if let Some(config) = &args.config {
        settings = Settings::from_file(config)?;
    }
    let settings = settings.overlay(args.settings());

    let paths = ManifestPaths::resolve(&settings)?;

    let source = read_manifest(&paths.source)?;
    let mut target = read_manifest(&paths.target)?;

    let report = transplant_replaces(&source, &mut target);

    if args.dry_run {
        println!("{}", "DRY RUN - No changes will be made".yellow().bold());
    }
    if report.is_empty() {
        println!("{}", "No replace directives in either manifest".dimmed());
    }
    for r in &report.dropped {
        println!("{} {}", "-".red().bold(), r);
    }
    for r in &report.added {
        println!("{} {}", "+".green().bold(), r);
    }

    let content = render_manifest(&target, &paths.target)?;
    let display = display_path(&paths.target);
    let n = target.replaces().len();
    let plural = if n == 1 { "" } else { "s" };

    if args.dry_run {
        println!(
            "\n{} would be rewritten with {} replace directive{}. Run without {} to apply.",
            display.cyan(),
            n,
            plural,
            "--dry-run".cyan()
        );
        return Ok(());
    }

    write_manifest(&paths.target, &content)?;
    log::info!("Rewrote {}", paths.target.display());

    println!(
        "{} {} replace directive{} into {}",
        "✓ Synchronized".green().bold(),
        n,
        plural,
        display.green()
    );

    Ok(())
}

/// Shows `path` relative to the current directory when that is shorter.
fn display_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| pathdiff::diff_paths(path, cwd))
        .filter(|rel| rel.as_os_str().len() < path.as_os_str().len())
        .unwrap_or_else(|| path.to_path_buf());
    relative.to_string_lossy().replace('\\', "/")
}
