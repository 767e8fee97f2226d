//! Contradiction detection.

use dialectic_core::{
  gateway::{Gateway, Sampling},
  response::Response,
  store::SessionStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Engine, Error, Reply, Result, prompt,
  verdict::{ContradictionVerdict, parse_contradiction},
};

/// Prior active answers required before a candidate is compared at all.
pub const MIN_PRIOR_STATEMENTS: usize = 2;

const DETECTION_SAMPLING: Sampling = Sampling::with_temperature(0.2);

/// Outcome of one contradiction check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Detection {
  pub found:   bool,
  pub details: Option<String>,
}

impl Detection {
  pub fn none() -> Self { Self::default() }
}

impl<S, G> Engine<S, G>
where
  S: SessionStore,
  G: Gateway,
{
  /// Check `candidate` against the user's current active answer set.
  pub async fn detect(&self, user_id: Uuid, candidate: &str) -> Result<Detection> {
    let prior = self
      .store
      .active_answers(user_id)
      .await
      .map_err(Error::store)?;
    Ok(self.detect_against(user_id, &prior, candidate).await)
  }

  /// Check `candidate` against `prior`. Fails open: a gateway failure or an
  /// unrecognised reply is reported as no contradiction.
  pub(crate) async fn detect_against(
    &self,
    user_id: Uuid,
    prior: &[Response],
    candidate: &str,
  ) -> Detection {
    if prior.len() < MIN_PRIOR_STATEMENTS {
      tracing::debug!(%user_id, prior = prior.len(), "too few statements to compare");
      return Detection::none();
    }

    let prompt = prompt::detect_contradiction(prior, candidate);
    let Reply::Text(output) = self
      .ask(user_id, "contradiction detection", &prompt, DETECTION_SAMPLING)
      .await
    else {
      return Detection::none();
    };

    match parse_contradiction(&output) {
      ContradictionVerdict::Found(details) => Detection { found: true, details },
      ContradictionVerdict::Clear => Detection::none(),
      ContradictionVerdict::Unrecognised => {
        tracing::warn!(%user_id, %output, "unrecognised detector output, treating as clear");
        Detection::none()
      }
    }
  }
}
