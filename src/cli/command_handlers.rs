use std::path::Path;

use log::{debug, warn};

use crate::{
    cache::LlmlCache,
    git::GitTransport,
    ignore::ensure_ignored,
    link::{ensure_linked, LinkOutcome},
    model::RepositoryReference,
    update::{update_selected, Selector, UpdateEvent, UpdateOutcome},
};

/// Handler to add a repository to the project
/// 1 - Resolves the repository identifier
/// 2 - Clones it into the cache unless already cached
/// 3 - Links the cache entry into the project link directory
/// 4 - Adds the link directory to the project's .gitignore
pub fn do_add<G: GitTransport>(
    cache: &LlmlCache<G>,
    root: &Path,
    link_directory_name: &str,
    identifier: &str,
) -> anyhow::Result<()> {
    let reference = RepositoryReference::resolve(identifier)?;
    debug!("Resolved {} to {}", identifier, reference);

    if !cache.is_cached(&reference.name) {
        println!("Cloning {}...", reference.canonical_url);
    }
    let entry = cache.ensure_cloned(&reference)?;

    let link_root = root.join(link_directory_name);
    let name = &reference.name;
    match ensure_linked(&entry.path, &link_root, name)? {
        LinkOutcome::Created => {
            println!("Successfully linked {name} to {link_directory_name}/{name}")
        }
        LinkOutcome::AlreadyLinked => {
            println!("Link already exists at {link_directory_name}/{name}")
        }
    }

    if let Err(error) = ensure_ignored(root, link_directory_name) {
        warn!("{}", error);
    }

    Ok(())
}

/// Handler to update cached repositories chosen by `selector`
pub fn do_update<G: GitTransport>(
    cache: &LlmlCache<G>,
    selector: &dyn Selector,
) -> anyhow::Result<UpdateOutcome> {
    let outcome = update_selected(cache, selector, |event| match event {
        UpdateEvent::Started(name) => println!("Updating {name}..."),
        UpdateEvent::Finished(name, Ok(())) => println!("Updated {name}"),
        // Already logged as a warning
        UpdateEvent::Finished(_, Err(_)) => {}
    })?;

    match &outcome {
        UpdateOutcome::NoCache | UpdateOutcome::NoCandidates => {
            println!("No repositories found in {}", cache.location().display())
        }
        UpdateOutcome::NoSelection => println!("No repositories selected"),
        UpdateOutcome::Completed(reports) => println!(
            "Updated {} of {} repositories",
            reports.len() - outcome.failures(),
            reports.len()
        ),
    }

    Ok(outcome)
}
