//! The stage catalog — an immutable table of reasoning stages and the
//! baseline prompts used to seed questions for each.
//!
//! The catalog is built once at start-up and shared; nothing reads stage
//! information from ambient state.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The stage every new user starts at.
pub const FIRST_STAGE: u8 = 1;

/// Broad grouping of stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageLevel {
  Preconventional,
  Conventional,
  Postconventional,
}

/// One reasoning stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageInfo {
  pub number:      u8,
  pub level:       StageLevel,
  pub name:        String,
  pub description: String,
  /// Baseline question templates; never empty.
  pub prompts:     Vec<String>,
}

/// An ordered, validated set of stages numbered `1..=n` without gaps.
#[derive(Debug, Clone, Serialize)]
pub struct StageCatalog {
  stages: Vec<StageInfo>,
}

impl StageCatalog {
  /// Build a catalog, checking that stages are numbered `1..=n` in order and
  /// that every prompt pool is non-empty.
  pub fn new(stages: Vec<StageInfo>) -> Result<Self> {
    if stages.is_empty() {
      return Err(Error::UnknownStage(FIRST_STAGE));
    }
    for (expected, stage) in (FIRST_STAGE..=u8::MAX).zip(&stages) {
      if stage.number != expected {
        return Err(Error::UnknownStage(stage.number));
      }
      if stage.prompts.is_empty() {
        return Err(Error::EmptyPromptPool(stage.number));
      }
    }
    Ok(Self { stages })
  }

  /// Kohlberg's six stages of moral development.
  pub fn kohlberg() -> Result<Self> {
    fn stage(
      number: u8,
      level: StageLevel,
      name: &str,
      description: &str,
      prompts: &[&str],
    ) -> StageInfo {
      StageInfo {
        number,
        level,
        name: name.to_owned(),
        description: description.to_owned(),
        prompts: prompts.iter().map(|p| (*p).to_owned()).collect(),
      }
    }

    Self::new(vec![
      stage(
        1,
        StageLevel::Preconventional,
        "Obedience and Punishment Orientation",
        "Focus on avoiding punishment. Moral rules are obeyed to escape \
         negative consequences.",
        &[
          "Imagine someone tells you not to enter a restricted area. Why would you obey?",
          "What if no one was watching, would you still follow the rule?",
        ],
      ),
      stage(
        2,
        StageLevel::Preconventional,
        "Self-Interest Orientation",
        "Focus on personal benefit or gain. 'Right' actions are those that \
         serve one's own needs or interests.",
        &[
          "Why would you cooperate with someone if it benefits you both?",
          "Is breaking a rule ever acceptable if it helps you personally?",
        ],
      ),
      stage(
        3,
        StageLevel::Conventional,
        "Interpersonal Accord and Conformity",
        "Emphasis on social approval and 'being a good person.' Moral \
         actions please or help others and gain approval.",
        &[
          "How do social expectations influence your moral choices?",
          "Would you lie to avoid hurting a friend's feelings?",
        ],
      ),
      stage(
        4,
        StageLevel::Conventional,
        "Authority and Social-Order Maintaining Orientation",
        "Upholding law, order, and societal rules is seen as morally \
         correct. Focus on maintaining a functioning society.",
        &[
          "Should laws always be followed, even if they seem unfair?",
          "What would happen if everyone broke rules they disagreed with?",
        ],
      ),
      stage(
        5,
        StageLevel::Postconventional,
        "Social Contract Orientation",
        "Laws and rules are social contracts. They can be changed if they \
         no longer serve the greatest good.",
        &[
          "Is it acceptable to disobey a law you believe is unjust?",
          "When should society update or change its rules?",
        ],
      ),
      stage(
        6,
        StageLevel::Postconventional,
        "Universal Ethical Principles",
        "Moral reasoning is based on abstract, universal principles like \
         justice, dignity, and equality for all.",
        &[
          "Is there a higher moral law than society's laws?",
          "Do you believe certain rights are inalienable, regardless of law or opinion?",
        ],
      ),
    ])
  }

  pub fn get(&self, number: u8) -> Option<&StageInfo> {
    self.stages.iter().find(|s| s.number == number)
  }

  /// Like [`Self::get`], but unknown stages are an error.
  pub fn require(&self, number: u8) -> Result<&StageInfo> {
    self.get(number).ok_or(Error::UnknownStage(number))
  }

  /// The highest stage number.
  pub fn last(&self) -> u8 {
    self.stages.last().map_or(FIRST_STAGE, |s| s.number)
  }

  /// The stage after `number`, saturating at the last stage.
  pub fn next_after(&self, number: u8) -> u8 {
    number.saturating_add(1).min(self.last())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kohlberg_catalog_is_valid() {
    let catalog = StageCatalog::kohlberg().unwrap();
    assert_eq!(catalog.stages.len(), 6);
    assert_eq!(catalog.last(), 6);
    assert_eq!(catalog.require(2).unwrap().level, StageLevel::Preconventional);
  }

  #[test]
  fn next_after_saturates_at_last_stage() {
    let catalog = StageCatalog::kohlberg().unwrap();
    assert_eq!(catalog.next_after(1), 2);
    assert_eq!(catalog.next_after(5), 6);
    assert_eq!(catalog.next_after(6), 6);
  }

  #[test]
  fn unknown_stage_is_an_error() {
    let catalog = StageCatalog::kohlberg().unwrap();
    assert!(catalog.get(3).is_some());
    assert!(catalog.get(0).is_none());
    assert!(matches!(catalog.require(7), Err(Error::UnknownStage(7))));
  }

  #[test]
  fn gaps_and_empty_pools_are_rejected() {
    let mut stages: Vec<_> = StageCatalog::kohlberg().unwrap().stages;
    stages.remove(2);
    assert!(matches!(StageCatalog::new(stages), Err(Error::UnknownStage(4))));

    let mut stages: Vec<_> = StageCatalog::kohlberg().unwrap().stages;
    stages[0].prompts.clear();
    assert!(matches!(StageCatalog::new(stages), Err(Error::EmptyPromptPool(1))));
  }
}
