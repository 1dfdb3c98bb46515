use dialoguer::MultiSelect;

use crate::update::Selector;

/// Terminal checkbox prompt.
pub struct InteractiveSelector;

impl Selector for InteractiveSelector {
    fn select_subset(&self, candidates: &[String]) -> anyhow::Result<Vec<String>> {
        let chosen = MultiSelect::new()
            .with_prompt("Select repositories to update (space to toggle, enter to confirm)")
            .items(candidates)
            .interact()?;

        Ok(chosen
            .into_iter()
            .filter_map(|index| candidates.get(index).cloned())
            .collect())
    }
}
