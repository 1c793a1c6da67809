//! Runtime setup: Absent → Acquiring → Extracting → Patched
//!
//! Any stage can end in Failed, which is logged and returned as
//! [`Outcome::Aborted`]. Only configuration mistakes surface as `Err`.

use pyembed_config::RestrictionPolicy;
use pyembed_errors::Error;
use pyembed_events::{AppEvent, EventEmitter, RuntimeEvent, SetupStage};
use std::path::Path;

use crate::context::ProvisionContext;
use crate::extract::extract_zip;
use crate::layout::find_restriction_file;
use crate::outcome::Outcome;

/// What [`ensure_runtime`] found or did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeStatus {
    /// Home and executable were already present; nothing was touched
    AlreadyInstalled,
    /// The archive was acquired and extracted during this call
    Installed,
}

/// Whether the distribution home and its executable both exist
#[must_use]
pub fn is_runtime_installed(ctx: &ProvisionContext) -> bool {
    ctx.home().is_dir() && ctx.executable().exists()
}

fn enter(ctx: &ProvisionContext, stage: SetupStage, home: &Path) {
    ctx.emit_runtime(RuntimeEvent::StageEntered {
        stage,
        home: home.display().to_string(),
    });
}

fn fail<T>(ctx: &ProvisionContext, stage: SetupStage, reason: String) -> Outcome<T> {
    ctx.emit_runtime(RuntimeEvent::StageFailed {
        stage,
        reason: reason.clone(),
    });
    Outcome::aborted(stage.as_str(), reason)
}

/// Make the home directory the first `PATH` entry. Failure is a warning.
fn update_search_path(ctx: &ProvisionContext, home: &Path, warnings: &mut Vec<String>) {
    match pyembed_platform::env::prepend_to_search_path(home) {
        Ok(true) => ctx.emit(AppEvent::Runtime(RuntimeEvent::SearchPathUpdated {
            entry: home.display().to_string(),
        })),
        Ok(false) => {}
        Err(e) => {
            let message = format!("could not add {} to PATH: {e}", home.display());
            ctx.emit_warning(message.clone());
            warnings.push(message);
        }
    }
}

/// Delete the restriction file so the interpreter searches site-packages
async fn remove_restriction_file(ctx: &ProvisionContext, home: &Path, warnings: &mut Vec<String>) {
    let path = match find_restriction_file(home).await {
        Ok(Some(path)) => path,
        Ok(None) => {
            ctx.emit_debug(format!("no restriction file in {}", home.display()));
            return;
        }
        Err(e) => {
            let message = format!("could not scan {} for a restriction file: {e}", home.display());
            ctx.emit_warning(message.clone());
            warnings.push(message);
            return;
        }
    };

    match tokio::fs::remove_file(&path).await {
        Ok(()) => ctx.emit_runtime(RuntimeEvent::RestrictionFileRemoved {
            path: path.display().to_string(),
        }),
        Err(e) => {
            let message = format!("could not remove {}: {e}", path.display());
            ctx.emit_warning(message.clone());
            warnings.push(message);
        }
    }
}

/// Ensure the runtime is installed under the context's home directory.
///
/// Without force, an existing home with its executable short-circuits the
/// whole flow. On success the home directory is prepended to `PATH`.
///
/// # Errors
///
/// Returns an error if the source is misconfigured (missing bundled
/// resource, missing local archive). Download and extraction problems are
/// logged and reported as [`Outcome::Aborted`].
pub async fn ensure_runtime(ctx: &ProvisionContext) -> Result<Outcome<RuntimeStatus>, Error> {
    let home = ctx.home();
    let mut warnings = Vec::new();

    if !ctx.force() && is_runtime_installed(ctx) {
        ctx.emit_runtime(RuntimeEvent::AlreadyInstalled {
            home: home.display().to_string(),
        });
        update_search_path(ctx, &home, &mut warnings);
        return Ok(Outcome::with_warnings(RuntimeStatus::AlreadyInstalled, warnings));
    }

    ctx.emit_operation_started("ensure runtime");
    enter(ctx, SetupStage::Absent, &home);

    enter(ctx, SetupStage::Acquiring, &home);
    let retrieved = ctx
        .source()
        .retrieve(ctx.install_root(), &ctx.retrieve_context(ctx.force()))
        .await;
    let archive = match retrieved {
        Ok(Some(archive)) => archive,
        Ok(None) => {
            ctx.emit_operation_completed("ensure runtime", false);
            return Ok(fail(
                ctx,
                SetupStage::Acquiring,
                format!("could not obtain {}", ctx.source().describe()),
            ));
        }
        Err(e) => {
            ctx.emit_runtime(RuntimeEvent::StageFailed {
                stage: SetupStage::Acquiring,
                reason: e.to_string(),
            });
            ctx.emit_operation_failed("ensure runtime", e.to_string());
            return Err(e);
        }
    };

    enter(ctx, SetupStage::Extracting, &home);
    match extract_zip(&archive, &home, !ctx.force()).await {
        Ok(report) => ctx.emit_runtime(RuntimeEvent::Extracted {
            archive: archive.display().to_string(),
            home: home.display().to_string(),
            skipped: report.skipped,
        }),
        Err(e) => {
            // A truncated or corrupt archive must not be reused by the next call
            match ctx.source().discard(&archive).await {
                Ok(()) => ctx.emit_debug(format!(
                    "discarded unusable archive {}",
                    archive.display()
                )),
                Err(remove) => ctx.emit_warning(format!(
                    "could not remove unusable archive {}: {remove}",
                    archive.display()
                )),
            }
            ctx.emit_operation_completed("ensure runtime", false);
            return Ok(fail(ctx, SetupStage::Extracting, e.to_string()));
        }
    }

    if ctx.restriction_policy() == RestrictionPolicy::Remove {
        remove_restriction_file(ctx, &home, &mut warnings).await;
    }

    enter(ctx, SetupStage::Patched, &home);
    update_search_path(ctx, &home, &mut warnings);
    ctx.emit_runtime(RuntimeEvent::Ready {
        home: home.display().to_string(),
    });
    ctx.emit_operation_completed("ensure runtime", true);

    Ok(Outcome::with_warnings(RuntimeStatus::Installed, warnings))
}
