//! Deployment planning.
//!
//! Decides which single version to deploy next from the schema catalog and the
//! registry's view of what already exists. When an alias is live, versions are
//! rolled out one at a time in ascending order. When no alias exists yet there
//! are no consumers to protect, so the latest schema is deployed directly.

use tracing::{info, warn};

use search_migrator_shared::{
    DeployedIndexState, DeploymentDecision, NoActionReason, SemanticVersion,
};

use crate::catalog::VersionCatalog;

/// Select the next version to deploy.
///
/// # Arguments
///
/// * `catalog` - Schema artifacts available locally
/// * `deployed` - State reported by the registry for this run
/// * `only_version` - Explicit version requested by the operator
pub fn plan(
    catalog: &VersionCatalog,
    deployed: &DeployedIndexState,
    only_version: Option<&SemanticVersion>,
) -> DeploymentDecision {
    if catalog.is_empty() {
        return no_action(NoActionReason::EmptyCatalog);
    }

    match &deployed.current_version {
        Some(current) => plan_incremental(catalog, deployed, current, only_version),
        None => plan_bootstrap(catalog, deployed, only_version),
    }
}

fn plan_incremental(
    catalog: &VersionCatalog,
    deployed: &DeployedIndexState,
    current: &SemanticVersion,
    only_version: Option<&SemanticVersion>,
) -> DeploymentDecision {
    let higher_deployed = deployed.deployed_above(current);
    let higher_not_deployed: Vec<&SemanticVersion> = catalog
        .versions()
        .filter(|v| v.is_greater_than(current) && !deployed.is_deployed(v))
        .collect();

    info!(
        current = %current,
        higher_created = ?display_all(higher_deployed.iter()),
        higher_not_created = ?display_all(higher_not_deployed.iter().copied()),
        "Current active index"
    );

    if let Some(only) = only_version {
        if deployed.is_deployed(only) {
            info!(version = %only, "Skipping explicit deploy since the index already exists");
            return DeploymentDecision::NoAction(NoActionReason::AlreadyCreated {
                version: only.clone(),
            });
        }
        info!(version = %only, "Deploying explicitly requested version");
        return DeploymentDecision::Deploy(only.clone());
    }

    match higher_not_deployed.first() {
        Some(next) => {
            info!(version = %next, "Deploying next version in sequence");
            DeploymentDecision::Deploy((*next).clone())
        }
        None => no_action(NoActionReason::UpToDate {
            current: current.clone(),
        }),
    }
}

fn plan_bootstrap(
    catalog: &VersionCatalog,
    deployed: &DeployedIndexState,
    only_version: Option<&SemanticVersion>,
) -> DeploymentDecision {
    info!("There is no currently active version");
    if let Some(only) = only_version {
        warn!(version = %only, "Explicit version is ignored until the alias exists");
    }

    let baseline = SemanticVersion::zero();
    let all_deployed = deployed.deployed_above(&baseline);
    // The baseline never has a physical index, so it is never a candidate.
    let not_deployed: Vec<&SemanticVersion> = catalog
        .versions()
        .filter(|v| v.is_greater_than(&baseline) && !all_deployed.contains(v))
        .collect();
    info!(
        created = ?display_all(all_deployed.iter()),
        not_created = ?display_all(not_deployed.iter().copied()),
        "Versions available for the first deployment"
    );

    let target = match (not_deployed.last(), catalog.latest()) {
        (Some(latest_missing), _) => (*latest_missing).clone(),
        (None, Some(latest)) => {
            // An earlier run created every index but never set the alias.
            info!(version = %latest, "Every version exists but none is aliased; re-selecting latest");
            latest.clone()
        }
        (None, None) => return no_action(NoActionReason::EmptyCatalog),
    };

    if !target.is_greater_than(&baseline) {
        return no_action(NoActionReason::BaselineIsLatest);
    }

    info!(version = %target, "Deploying latest version");
    DeploymentDecision::Deploy(target)
}

fn no_action(reason: NoActionReason) -> DeploymentDecision {
    info!(reason = %reason, "Nothing to deploy");
    DeploymentDecision::NoAction(reason)
}

fn display_all<'a>(versions: impl Iterator<Item = &'a SemanticVersion>) -> Vec<String> {
    versions.map(|v| v.to_string()).collect()
}
