//! Prompt construction.
//!
//! Every prompt presents the user's answers as an enumerated, stage-tagged
//! list in creation order. Verdict prompts end with a fixed output contract
//! that [`crate::verdict`] parses.

use std::fmt::Write as _;

use dialectic_core::{response::Response, stage::StageInfo};

use crate::{
  evaluation::EvaluationScope,
  verdict::{CONTRADICTION_MARKER, NO_CONTRADICTION, RESOLVED, UNRESOLVED},
};

/// Render answers as `[Stage N] <label> i: <answer>` lines, numbered from 1.
pub fn enumerate_statements(responses: &[Response], label: &str) -> String {
  let mut out = String::new();
  for (i, r) in responses.iter().enumerate() {
    if i > 0 {
      out.push('\n');
    }
    let _ = write!(out, "[Stage {}] {label} {}: {}", r.stage, i + 1, r.answer);
  }
  out
}

fn statements_or(responses: &[Response], label: &str, empty: &str) -> String {
  if responses.is_empty() {
    empty.to_owned()
  } else {
    enumerate_statements(responses, label)
  }
}

// ─── Questions ───────────────────────────────────────────────────────────────

/// Adapt a stage's baseline template to the user's history.
pub fn adapt_question(stage: &StageInfo, baseline: &str, history: &[Response]) -> String {
  let history = statements_or(history, "Statement", "(No prior statements yet)");
  format!(
    "SYSTEM:
You are a moral philosophy tutor working with Lawrence Kohlberg's stages of moral development.
The user is currently at Stage {n}: {name}.

STAGE DESCRIPTION:
{description}

BASELINE QUESTION FOR THIS STAGE:
\"{baseline}\"

USER'S PREVIOUS STATEMENTS:
{history}

INSTRUCTION:
Write one open-ended moral question or dilemma suited to Stage {n} reasoning. It should:
1. Be appropriately challenging for the user's current stage
2. Build on themes or principles from their earlier statements where possible
3. Introduce a moral concept that belongs to Stage {n}
4. Stay concrete for early stages (1-2) and explore universal principles for late stages (5-6)

Return ONLY the adapted question, in 1-3 sentences, with no preamble or explanation.",
    n = stage.number,
    name = stage.name,
    description = stage.description,
  )
}

/// Generate a question around a free-text theme, calibrated to the stage.
pub fn custom_question(stage: &StageInfo, theme: &str) -> String {
  format!(
    "SYSTEM:
You write thought-provoking ethical questions.
The user is at Stage {n} ({name}) of Kohlberg's moral development.

THEME REQUESTED:
\"{theme}\"

INSTRUCTION:
Write one engaging, open-ended moral question about this theme. It should:
1. Suit someone reasoning at Stage {n}
2. Invite reflection on values and principles
3. Be one or two sentences long
4. Need no specialised knowledge and avoid partisan current events

Return ONLY the question, with no explanation or commentary.",
    n = stage.number,
    name = stage.name,
  )
}

/// The question used when a themed question cannot be generated.
pub fn theme_fallback(theme: &str) -> String {
  format!("When you think about {theme}, what do you believe is the right thing to do, and why?")
}

// ─── Contradictions ──────────────────────────────────────────────────────────

/// Ask whether `candidate` contradicts the prior statements.
pub fn detect_contradiction(prior: &[Response], candidate: &str) -> String {
  let statements = enumerate_statements(prior, "Statement");
  format!(
    "SYSTEM:
You detect contradictions in a person's moral reasoning.

PRIOR STATEMENTS:
{statements}

NEW STATEMENT:
\"{candidate}\"

INSTRUCTIONS:
1. Identify the moral principle behind each statement and compare principles, not wording or examples.
2. A contradiction exists only when two principles cannot both hold within the same moral framework.
3. Evolution of belief over time is not a contradiction.
4. Statements that apply to different contexts, or stress different aspects of one view, are not contradictions.
5. Minor inconsistencies or shifts in emphasis are not contradictions.

OUTPUT:
If there is a definite contradiction, respond with \"{CONTRADICTION_MARKER} \" followed by one sentence naming the conflicting statements.
Otherwise respond with exactly \"{NO_CONTRADICTION}\".
Add nothing else."
  )
}

/// Ask for one neutral clarifying question about the conflicting statements.
pub fn resolution_question(stage: &StageInfo, statements: &[Response]) -> String {
  let statements = enumerate_statements(statements, "Statement");
  format!(
    "SYSTEM:
You are a moral philosophy facilitator. The user, currently reasoning at Stage {n} ({name}), has made statements that appear to conflict.

USER'S STATEMENTS:
{statements}

INSTRUCTION:
Write a single open-ended, non-judgmental question that helps the user notice the tension between their statements, reflect on what they actually hold, and reconcile or clarify their reasoning.
Use neutral language. Do not push the user toward either side.

Return ONLY the question, with no preamble or explanation.",
    n = stage.number,
    name = stage.name,
  )
}

/// Ask whether `resolution` reconciles the statements.
pub fn check_resolution(statements: &[Response], resolution: &str) -> String {
  let statements = enumerate_statements(statements, "Statement");
  format!(
    "SYSTEM:
You analyse moral reasoning. The user made statements that appeared to contradict each other and has now explained how they fit together.

USER'S STATEMENTS:
{statements}

USER'S RESOLUTION ATTEMPT:
\"{resolution}\"

INSTRUCTIONS:
Judge whether the explanation resolves the contradiction. A successful resolution acknowledges the tension, offers a coherent framework that reconciles the conflicting views, and shows a consistent line of reasoning. Nuanced positions that only look contradictory on the surface count as resolved.

OUTPUT:
Respond with exactly \"{RESOLVED}\" if the contradiction is resolved, or exactly \"{UNRESOLVED}\" if it is not."
  )
}

// ─── Final evaluation ────────────────────────────────────────────────────────

/// Ask for the structured narrative report.
///
/// With [`EvaluationScope::FullHistory`] superseded versions are included and
/// marked as such, so the report can comment on how views changed.
pub fn final_evaluation(
  responses: &[Response],
  completed_stages: &[u8],
  scope: EvaluationScope,
) -> String {
  let statements = match scope {
    EvaluationScope::Active => statements_or(responses, "Response", "(No responses recorded)"),
    EvaluationScope::FullHistory => history_lines(responses),
  };
  let completed = if completed_stages.is_empty() {
    "None".to_owned()
  } else {
    completed_stages
      .iter()
      .map(u8::to_string)
      .collect::<Vec<_>>()
      .join(", ")
  };

  format!(
    "SYSTEM:
You are an expert in moral philosophy and Kohlberg's stages of moral development.
Analyse the user's moral reasoning based on their answers to a series of moral questions.

USER'S RESPONSES:
{statements}

STAGES COMPLETED: {completed}

INSTRUCTIONS:
Write a thoughtful, educational analysis of the user's moral reasoning. Identify patterns, connect answers to Kohlberg's stages where appropriate, note evolution or consistency, and suggest areas for reflection without judgment.

Format the response in these sections:
1. Summary of Moral Reasoning Style (1-2 paragraphs)
2. Connection to Kohlberg's Framework (1-2 paragraphs)
3. Key Themes & Principles (3-4 bullet points)
4. Strengths Observed (3-4 bullet points)
5. Areas for Growth (2-3 bullet points, phrased constructively)
6. Questions for Further Reflection (3 questions)

Keep the analysis respectful and nuanced. Present it as a snapshot of current thinking, not a permanent assessment."
  )
}

fn history_lines(responses: &[Response]) -> String {
  if responses.is_empty() {
    return "(No responses recorded)".to_owned();
  }
  let mut out = String::new();
  for (i, r) in responses.iter().enumerate() {
    if i > 0 {
      out.push_str("\n\n");
    }
    let note = if r.superseded { ", later revised" } else { "" };
    let _ = write!(
      out,
      "[Stage {}] Response {} (version {}{note}): {}",
      r.stage,
      i + 1,
      r.version,
      r.answer,
    );
  }
  out
}
