//! Command execution.
//!
//! Each command resolves the platform first, so unsupported hosts fail
//! before any network or filesystem work.

use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use zig_bsdiff_provision::{
    Component, InstallOutcome, Installer, PlatformTag, ProvisionConfig, binary_path, platform,
    stage,
};
use zig_bsdiff_vendor::{VendorConfig, VendorManager, VendorOutcome};

use crate::cli::{Cli, Commands};
use crate::config::FileConfig;
use crate::error::{CliError, EXIT_FAILURE, EXIT_OK};

/// Run the parsed command line, returning the process exit code.
///
/// # Errors
///
/// Returns the first error of the selected command.
pub async fn run(cli: Cli) -> Result<i32, CliError> {
    let file = FileConfig::load(cli.config.as_deref())?;
    let tag = platform::resolve()?;
    info!(%tag, "Resolved platform");

    match cli.command {
        Commands::Install {
            bin_dir,
            version,
            force,
        } => {
            let mut config = with_bin_dir(file.provision, bin_dir);
            if let Some(version) = version {
                config = config.with_version(version);
            }
            install(config, &tag, force).await
        }
        Commands::Setup {
            root,
            skip_submodules,
            cc,
        } => {
            let mut config = file.vendor;
            if let Some(root) = root {
                config = config.with_root(root);
            }
            if skip_submodules {
                config.init_submodules = false;
            }
            if cc.is_some() {
                config.c_compiler = cc;
            }
            setup(config, tag).await
        }
        Commands::Path { name, bin_dir } => {
            path(&with_bin_dir(file.provision, bin_dir), &tag, &name)
        }
        Commands::Exec {
            name,
            bin_dir,
            args,
        } => exec(with_bin_dir(file.provision, bin_dir), &tag, &name, &args).await,
        Commands::Package {
            build_dir,
            dist_dir,
        } => package(&build_dir, &dist_dir, &tag),
    }
}

fn with_bin_dir(config: ProvisionConfig, bin_dir: Option<PathBuf>) -> ProvisionConfig {
    match bin_dir {
        Some(dir) => config.with_bin_dir(dir),
        None => config,
    }
}

/// `zig-bsdiff install`
///
/// # Errors
///
/// Returns [`CliError::Install`] carrying the remediation list.
#[allow(clippy::print_stdout)]
#[instrument(skip(config), fields(version = %config.bare_version()))]
pub async fn install(
    config: ProvisionConfig,
    tag: &PlatformTag,
    force: bool,
) -> Result<i32, CliError> {
    let installer = Installer::new(config)?;
    let releases_page = installer.locator().releases_page();
    let version = installer.config().bare_version().to_string();

    if force || !installer.is_installed(tag) {
        let url = installer.locator().release_url(&version, tag);
        println!("Downloading zig-bsdiff binaries from {url}...");
    }

    let outcome = installer
        .install_with(tag, force)
        .await
        .map_err(|e| CliError::install(e, &releases_page))?;

    let bin_dir = match outcome {
        InstallOutcome::AlreadyInstalled { bin_dir } => {
            println!("✓ zig-bsdiff binaries already installed");
            bin_dir
        }
        InstallOutcome::Installed { bin_dir, .. } => {
            println!("✓ Binaries downloaded and extracted successfully");
            bin_dir
        }
    };

    println!("\n✓ zig-bsdiff v{version} installed successfully");
    println!("   Platform: {tag}");
    println!("   Binaries: {}/", bin_dir.display());
    Ok(EXIT_OK)
}

/// `zig-bsdiff setup`
///
/// # Errors
///
/// Returns the first failing setup step.
#[allow(clippy::print_stdout)]
pub async fn setup(config: VendorConfig, tag: PlatformTag) -> Result<i32, CliError> {
    let manager = VendorManager::new(config, tag)?;
    let report = manager.setup().await?;

    if report.submodules {
        println!("✓ Submodules initialized");
    }
    for (name, outcome) in [("Zig", &report.zig), ("libsais", &report.libsais)] {
        match outcome {
            VendorOutcome::AlreadyPresent(path) => {
                println!("✓ {name} already vendored ({})", path.display());
            }
            VendorOutcome::Vendored(path) => println!("✓ {name} vendored ({})", path.display()),
        }
    }
    println!("\n✓ Setup complete! You can now run: zig build");
    Ok(EXIT_OK)
}

/// `zig-bsdiff path <name>`
///
/// # Errors
///
/// Returns lookup errors for invalid names and missing binaries.
#[allow(clippy::print_stdout)]
pub fn path(config: &ProvisionConfig, tag: &PlatformTag, name: &str) -> Result<i32, CliError> {
    let releases_page = zig_bsdiff_provision::ArtifactLocator::from_config(config).releases_page();
    let path = binary_path(&config.bin_dir, tag, name, &releases_page)?;
    println!("{}", path.display());
    Ok(EXIT_OK)
}

/// `zig-bsdiff exec <name> [args...]`
///
/// Installs the binaries when missing, then runs the requested one and
/// returns its exit status.
///
/// # Errors
///
/// Returns lookup and install errors, and [`CliError::Exec`] when the
/// binary cannot be started.
pub async fn exec(
    config: ProvisionConfig,
    tag: &PlatformTag,
    name: &str,
    args: &[String],
) -> Result<i32, CliError> {
    let component: Component = name.parse()?;

    let installer = Installer::new(config)?;
    let releases_page = installer.locator().releases_page();
    installer
        .install(tag)
        .await
        .map_err(|e| CliError::install(e, &releases_page))?;

    let binary = binary_path(installer.locator().bin_dir(), tag, component.name(), &releases_page)?;
    info!(?binary, ?args, "Running binary");

    let status = tokio::process::Command::new(&binary)
        .args(args)
        .status()
        .await
        .map_err(|source| CliError::Exec {
            path: binary.clone(),
            source,
        })?;

    Ok(status.code().unwrap_or(EXIT_FAILURE))
}

/// `zig-bsdiff package`
///
/// # Errors
///
/// Returns [`zig_bsdiff_provision::Error::BinaryNotFound`] when a binary has
/// not been built.
#[allow(clippy::print_stdout)]
pub fn package(build_dir: &Path, dist_dir: &Path, tag: &PlatformTag) -> Result<i32, CliError> {
    let staged = stage::stage_binaries(build_dir, dist_dir, tag)?;
    for path in &staged {
        println!("✓ Packaged {}", path.display());
    }
    println!("\nBinaries for {tag} staged in {}/", dist_dir.display());
    Ok(EXIT_OK)
}
