use log::warn;

use crate::{
    cache::{CacheError, LlmlCache},
    git::GitTransport,
};

/// Chooses which cached repositories to update.
pub trait Selector {
    fn select_subset(&self, candidates: &[String]) -> anyhow::Result<Vec<String>>;
}

/// Selects every candidate without asking.
pub struct AllSelector;

impl Selector for AllSelector {
    fn select_subset(&self, candidates: &[String]) -> anyhow::Result<Vec<String>> {
        Ok(candidates.to_vec())
    }
}

#[derive(Debug)]
pub struct RefreshReport {
    pub name: String,
    pub result: Result<(), CacheError>,
}

#[derive(Debug)]
pub enum UpdateOutcome {
    /// The cache directory does not exist.
    NoCache,
    /// The cache exists but holds no repositories.
    NoCandidates,
    NoSelection,
    Completed(Vec<RefreshReport>),
}

impl UpdateOutcome {
    pub fn failures(&self) -> usize {
        match self {
            UpdateOutcome::Completed(reports) => {
                reports.iter().filter(|report| report.result.is_err()).count()
            }
            _ => 0,
        }
    }
}

pub enum UpdateEvent<'a> {
    Started(&'a str),
    Finished(&'a str, &'a Result<(), CacheError>),
}

/// Lists the cache, lets `selector` pick a subset and pulls each pick in order.
///
/// A failed pull is reported through `on_report` and logged, then the next
/// repository is processed.
pub fn update_selected<G, S, F>(
    cache: &LlmlCache<G>,
    selector: &S,
    mut on_report: F,
) -> anyhow::Result<UpdateOutcome>
where
    G: GitTransport,
    S: Selector + ?Sized,
    F: FnMut(UpdateEvent<'_>),
{
    let candidates = match cache.list_cached()? {
        None => return Ok(UpdateOutcome::NoCache),
        Some(candidates) if candidates.is_empty() => return Ok(UpdateOutcome::NoCandidates),
        Some(candidates) => candidates,
    };

    let selected = selector.select_subset(&candidates)?;
    if selected.is_empty() {
        return Ok(UpdateOutcome::NoSelection);
    }

    let mut reports = Vec::with_capacity(selected.len());
    for name in selected {
        on_report(UpdateEvent::Started(&name));
        let result = cache.refresh(&name);
        if let Err(error) = &result {
            warn!("{}", error);
        }
        on_report(UpdateEvent::Finished(&name, &result));
        reports.push(RefreshReport { name, result });
    }

    Ok(UpdateOutcome::Completed(reports))
}
