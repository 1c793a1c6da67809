use pyembed_config::constants;
use pyembed_errors::{Error, InstallError};
use pyembed_events::{EventEmitter, InstallMethod, PackageEvent};
use pyembed_platform::CommandOutcome;
use std::path::Path;

use super::{validate_package_name, validate_version, PackageStatus};
use crate::context::ProvisionContext;
use crate::outcome::Outcome;

/// What [`ensure_package_manager`] found or did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManagerStatus {
    Present,
    Bootstrapped,
}

/// Options for [`install_package`]
#[derive(Debug, Clone)]
pub struct PipInstallOptions {
    /// Exact version to pin (`==<version>`)
    pub version: Option<String>,
    /// Reinstall even if the package is present
    pub force: bool,
    /// Re-run the package manager bootstrap even if it is present
    pub refresh_package_manager: bool,
}

options_builder! {
    PipInstallOptions {
        version: Option<String>,
        force: bool,
        refresh_package_manager: bool,
    }
}

/// Whether the package manager executable exists in the runtime
#[must_use]
pub fn is_package_manager_installed(ctx: &ProvisionContext) -> bool {
    ctx.layout()
        .package_manager_executable(&ctx.home())
        .exists()
}

/// Whether `site-packages/<package>/__init__.py` exists
#[must_use]
pub fn is_package_installed(ctx: &ProvisionContext, package: &str) -> bool {
    ctx.layout()
        .package_initializer(&ctx.home(), package)
        .exists()
}

fn quoted(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

fn unavailable(ctx: &ProvisionContext) -> Error {
    InstallError::PackageManagerUnavailable {
        home: ctx.home().display().to_string(),
    }
    .into()
}

/// Make sure the package manager is installed, bootstrapping it if it is
/// absent or `refresh` is set.
///
/// # Errors
///
/// Returns [`InstallError::PackageManagerUnavailable`] if the runtime is
/// missing, the bootstrap script cannot be downloaded, or the package
/// manager is still absent after bootstrapping. Returns
/// [`Error::Cancelled`] if the bootstrap was cancelled.
pub async fn ensure_package_manager(
    ctx: &ProvisionContext,
    refresh: bool,
) -> Result<Outcome<PackageManagerStatus>, Error> {
    let home = ctx.home();
    let pip = ctx.layout().package_manager_executable(&home);

    if !refresh && pip.exists() {
        ctx.emit_package(PackageEvent::PackageManagerPresent {
            executable: pip.display().to_string(),
        });
        return Ok(Outcome::Completed(PackageManagerStatus::Present));
    }

    let executable = ctx.executable();
    if !executable.exists() {
        ctx.emit_error(format!(
            "cannot bootstrap the package manager: {} is missing",
            executable.display()
        ));
        return Err(unavailable(ctx));
    }

    ctx.emit_package(PackageEvent::PackageManagerBootstrapping {
        script_url: ctx.bootstrap_url().to_string(),
    });

    let script = home.join(constants::BOOTSTRAP_SCRIPT_NAME);
    match tokio::fs::remove_file(&script).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => ctx.emit_warning(format!("could not remove old {}: {e}", script.display())),
    }

    if let Err(e) = pyembed_net::download_file(
        ctx.client(),
        ctx.bootstrap_url(),
        &script,
        None,
        ctx.cancellation(),
        ctx.event_sender(),
    )
    .await
    {
        ctx.emit_error_with_details(
            format!("could not download {}", ctx.bootstrap_url()),
            e.to_string(),
        );
        return Err(unavailable(ctx));
    }

    let outcome = ctx
        .run_command(&format!(
            "{} {}",
            quoted(&executable),
            constants::BOOTSTRAP_SCRIPT_NAME
        ))
        .await;

    if let Err(e) = tokio::fs::remove_file(&script).await {
        ctx.emit_debug(format!("could not remove {}: {e}", script.display()));
    }

    if outcome == CommandOutcome::Cancelled {
        return Err(Error::Cancelled);
    }

    if pip.exists() {
        ctx.emit_package(PackageEvent::PackageManagerBootstrapped {
            executable: pip.display().to_string(),
        });
        Ok(Outcome::Completed(PackageManagerStatus::Bootstrapped))
    } else {
        Err(unavailable(ctx))
    }
}

/// The package manager command line for installing `package`
fn install_command(executable: &Path, package: &str, options: &PipInstallOptions) -> String {
    let mut command = format!("{} -m pip install {package}", quoted(executable));
    if let Some(version) = &options.version {
        command.push_str("==");
        command.push_str(version);
    }
    if options.force {
        command.push_str(" --force-reinstall");
    }
    command
}

/// Install `package` with the package manager, bootstrapping it first if
/// needed.
///
/// A failing package manager run is logged and reported as
/// [`Outcome::Aborted`].
///
/// # Errors
///
/// Returns an error if the name or version pin is invalid, or the package
/// manager is unavailable.
pub async fn install_package(
    ctx: &ProvisionContext,
    package: &str,
    options: &PipInstallOptions,
) -> Result<Outcome<PackageStatus>, Error> {
    validate_package_name(package)?;
    if let Some(version) = &options.version {
        validate_version(package, version)?;
    }

    let manager = ensure_package_manager(ctx, options.refresh_package_manager).await?;
    if let Some(status) = manager.value() {
        ctx.emit_debug(format!("package manager {status:?} for {package}"));
    }

    if !options.force && is_package_installed(ctx, package) {
        ctx.emit_package(PackageEvent::AlreadyInstalled {
            package: package.to_string(),
            method: InstallMethod::PackageManager,
        });
        return Ok(Outcome::Completed(PackageStatus::AlreadyInstalled));
    }

    ctx.emit_package(PackageEvent::InstallStarted {
        package: package.to_string(),
        method: InstallMethod::PackageManager,
        version: options.version.clone(),
    });

    let command = install_command(&ctx.executable(), package, options);
    let reason = match ctx.run_command(&command).await {
        outcome if outcome.success() => {
            ctx.emit_package(PackageEvent::InstallCompleted {
                package: package.to_string(),
                method: InstallMethod::PackageManager,
            });
            return Ok(Outcome::Completed(PackageStatus::Installed));
        }
        CommandOutcome::Exited { code: Some(code) } => format!("exited with code {code}"),
        CommandOutcome::Exited { code: None } => "terminated by signal".to_string(),
        CommandOutcome::Cancelled => "cancelled".to_string(),
        CommandOutcome::SpawnFailed { message } => message,
    };

    ctx.emit_package(PackageEvent::InstallFailed {
        package: package.to_string(),
        method: InstallMethod::PackageManager,
        reason: reason.clone(),
    });
    Ok(Outcome::aborted("pip install", reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_command() {
        let exe = Path::new("/opt/py/python.exe");
        assert_eq!(
            install_command(exe, "numpy", &PipInstallOptions::new()),
            "\"/opt/py/python.exe\" -m pip install numpy"
        );
        let pinned = PipInstallOptions::new()
            .with_version(Some("1.16.3".into()))
            .with_force(true);
        assert_eq!(
            install_command(exe, "numpy", &pinned),
            "\"/opt/py/python.exe\" -m pip install numpy==1.16.3 --force-reinstall"
        );
    }
}
