#[cfg(test)]
#[path = "persona_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::IdentityBinding;
use crate::domain::models::ParticipantsBySource;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("Please select your name for {}.", format_sources(.0))]
    MissingSelections(Vec<String>),
    #[error("No participants were found for {0}. Process data for this year first.")]
    NoCandidates(i32),
}

pub fn capitalize(source: &str) -> String {
    let mut chars = source.chars();
    match chars.next() {
        Some(first) => return first.to_uppercase().collect::<String>() + chars.as_str(),
        None => return "".to_string(),
    }
}

fn format_sources(sources: &[String]) -> String {
    return sources
        .iter()
        .map(|source| {
            return capitalize(source);
        })
        .collect::<Vec<String>>()
        .join(", ");
}

/// Tentative persona selection for one session and year. Sources without any
/// candidate are optional, every other source needs a pick before `confirm`
/// hands out a binding.
#[derive(Debug, Clone)]
pub struct PersonaBinder {
    year: i32,
    candidates: ParticipantsBySource,
    tentative: IdentityBinding,
    cursor: usize,
}

impl PersonaBinder {
    pub fn new(year: i32, candidates: ParticipantsBySource) -> PersonaBinder {
        return PersonaBinder {
            year,
            candidates,
            tentative: IdentityBinding::new(),
            cursor: 0,
        };
    }

    pub fn year(&self) -> i32 {
        return self.year;
    }

    pub fn candidates(&self) -> &ParticipantsBySource {
        return &self.candidates;
    }

    pub fn tentative(&self) -> &IdentityBinding {
        return &self.tentative;
    }

    pub fn selection(&self, source: &str) -> Option<&str> {
        return self.tentative.get(source).map(|name| return name.as_str());
    }

    pub fn select(&mut self, source: &str, name: &str) -> Result<()> {
        let candidates = match self.candidates.get(source) {
            Some(candidates) => candidates,
            None => bail!(format!("Unknown data source {source}")),
        };

        if !candidates.iter().any(|candidate| return candidate == name) {
            bail!(format!("{name} is not a participant of {source}"));
        }

        self.tentative.insert(source.to_string(), name.to_string());
        return Ok(());
    }

    pub fn clear(&mut self, source: &str) {
        self.tentative.remove(source);
    }

    /// Sources the user still has to pick a name for.
    pub fn missing_sources(&self) -> Vec<String> {
        return self
            .candidates
            .iter()
            .filter(|(source, names)| {
                return !names.is_empty() && !self.tentative.contains_key(source.as_str());
            })
            .map(|(source, _)| return source.to_string())
            .collect();
    }

    /// Hands out the binding once every source with candidates has a pick.
    /// When no source has any candidate, each source is bound to an empty
    /// name so the session can still be used.
    pub fn confirm(&self) -> std::result::Result<IdentityBinding, BindingError> {
        if self.candidates.is_empty() {
            return Err(BindingError::NoCandidates(self.year));
        }

        let missing = self.missing_sources();
        if !missing.is_empty() {
            return Err(BindingError::MissingSelections(missing));
        }

        if self.tentative.is_empty() {
            return Ok(self
                .candidates
                .keys()
                .map(|source| return (source.to_string(), "".to_string()))
                .collect());
        }

        return Ok(self.tentative.clone());
    }

    /// Sources in display order, each with its candidates.
    pub fn sources(&self) -> Vec<(&str, &[String])> {
        return self
            .candidates
            .iter()
            .map(|(source, names)| return (source.as_str(), names.as_slice()))
            .collect();
    }

    pub fn cursor(&self) -> usize {
        return self.cursor;
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.candidates.len() {
            self.cursor += 1;
        }
    }

    /// Moves the pick for the source under the cursor to the next (or
    /// previous) candidate, wrapping around.
    pub fn cycle(&mut self, forward: bool) {
        let (source, names) = match self.candidates.iter().nth(self.cursor) {
            Some((source, names)) => (source.to_string(), names.clone()),
            None => return,
        };
        if names.is_empty() {
            return;
        }

        let current = self
            .selection(&source)
            .and_then(|name| return names.iter().position(|candidate| return candidate == name));

        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => names.len() - 1,
            (Some(idx), true) => (idx + 1) % names.len(),
            (Some(idx), false) => (idx + names.len() - 1) % names.len(),
        };

        self.tentative.insert(source, names[next].to_string());
    }
}
