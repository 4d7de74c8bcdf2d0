//! Validity oracle holding the target value artworks are judged against.

use art_critic_core::{Attribute, ConfigError, Criterion, OracleView};

/// Authoritative target rule shared by every component that judges artworks.
#[derive(Clone, Debug)]
pub(crate) struct ValidityOracle {
    criterion: Criterion,
    master: Vec<Attribute>,
    unlocked: Vec<Attribute>,
    current: Option<Attribute>,
}

impl ValidityOracle {
    /// Creates an oracle with the first `initially_unlocked` master values available.
    pub(crate) fn new(
        criterion: Criterion,
        master: Vec<Attribute>,
        initially_unlocked: usize,
    ) -> Result<Self, ConfigError> {
        if master.is_empty() {
            return Err(ConfigError::EmptyMasterList);
        }
        for (index, value) in master.iter().enumerate() {
            if master[..index].iter().any(|earlier| earlier.matches(value)) {
                return Err(ConfigError::DuplicateMasterValue {
                    value: value.clone(),
                });
            }
        }
        if initially_unlocked > master.len() {
            return Err(ConfigError::TooManyInitialValues {
                requested: initially_unlocked,
                available: master.len(),
            });
        }

        let unlocked: Vec<Attribute> = master[..initially_unlocked].to_vec();
        let current = unlocked.first().cloned();
        Ok(Self {
            criterion,
            master,
            unlocked,
            current,
        })
    }

    pub(crate) fn criterion(&self) -> Criterion {
        self.criterion
    }

    /// Replaces the current target. Values outside the unlocked subset are refused.
    pub(crate) fn set_value(&mut self, value: &Attribute) -> Option<Attribute> {
        let canonical = self
            .unlocked
            .iter()
            .find(|unlocked| unlocked.matches(value))
            .cloned()?;
        self.current = Some(canonical.clone());
        Some(canonical)
    }

    /// Moves a locked master value into the unlocked subset and makes it the target.
    pub(crate) fn unlock(&mut self, value: &Attribute) -> Option<Attribute> {
        if self.unlocked.iter().any(|unlocked| unlocked.matches(value)) {
            return None;
        }
        let canonical = self
            .master
            .iter()
            .find(|candidate| candidate.matches(value))
            .cloned()?;
        self.unlocked.push(canonical.clone());
        self.current = Some(canonical.clone());
        Some(canonical)
    }

    /// Reports whether `value` already is the current target.
    pub(crate) fn is_current(&self, value: &Attribute) -> bool {
        self.current
            .as_ref()
            .map_or(false, |current| current.matches(value))
    }

    pub(crate) fn is_valid(&self, attribute: &Attribute) -> bool {
        self.current
            .as_ref()
            .map_or(false, |target| attribute.matches(target))
    }

    pub(crate) fn label(&self) -> String {
        match &self.current {
            Some(target) => format!("Current {}: {target}", self.criterion.label()),
            None => format!("Current {}: none", self.criterion.label()),
        }
    }

    pub(crate) fn view(&self) -> OracleView {
        OracleView::new(
            self.criterion,
            self.master.clone(),
            self.unlocked.clone(),
            self.current.clone(),
        )
    }
}
