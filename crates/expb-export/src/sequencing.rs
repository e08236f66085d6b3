//! Trial sequencing with skip, jump and end branches.
//!
//! The [`SequencingContext`] is the only sequencing state. It is owned by the
//! [`SequencingController`] and handed to trial evaluation read-only, so no
//! trial can alter the flow except through a controller request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use expb_model::TrialId;

use crate::error::SequenceError;
use crate::project::Trial;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SequenceMode {
    #[default]
    Normal,
    /// Move forward, skipping trials until the target.
    SkipTo,
    /// Continue at the target, which may lie behind the current trial.
    JumpTo,
}

/// Sequencing state read by each trial's evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SequencingContext {
    mode: SequenceMode,
    target_id: Option<TrialId>,
}

impl SequencingContext {
    pub fn mode(&self) -> SequenceMode {
        self.mode
    }

    pub fn target_id(&self) -> Option<&TrialId> {
        self.target_id.as_ref()
    }

    /// Whether `trial` should run under this context.
    pub fn should_run(&self, trial: &TrialId) -> bool {
        match self.mode {
            SequenceMode::Normal => true,
            SequenceMode::SkipTo | SequenceMode::JumpTo => self.target_id.as_ref() == Some(trial),
        }
    }

    fn reset(&mut self) {
        self.mode = SequenceMode::Normal;
        self.target_id = None;
    }
}

/// What to do after a trial when its response matches a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "kebab-case")]
pub enum BranchAction {
    SkipTo(TrialId),
    JumpTo(TrialId),
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchRule {
    /// Response value that triggers the action.
    pub response: Value,
    pub action: BranchAction,
}

impl BranchRule {
    /// Numbers compare by value, so `1` matches `1.0`.
    pub fn matches(&self, response: &Value) -> bool {
        match (&self.response, response) {
            (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
            (a, b) => a == b,
        }
    }
}

#[derive(Debug, Clone)]
struct Step {
    id: TrialId,
    branches: Vec<BranchRule>,
}

/// Walks a trial list, applying branch requests.
#[derive(Debug, Clone)]
pub struct SequencingController {
    steps: Vec<Step>,
    context: SequencingContext,
    /// Index of the next trial to consider.
    cursor: usize,
    current: Option<usize>,
    ended: bool,
}

impl SequencingController {
    pub fn new(trials: &[Trial]) -> Self {
        Self {
            steps: trials
                .iter()
                .map(|trial| Step {
                    id: trial.id.clone(),
                    branches: trial.branches.clone(),
                })
                .collect(),
            context: SequencingContext::default(),
            cursor: 0,
            current: None,
            ended: false,
        }
    }

    pub fn context(&self) -> &SequencingContext {
        &self.context
    }

    /// The trial most recently returned by [`next`](Self::next).
    pub fn current(&self) -> Option<&TrialId> {
        self.current.map(|index| &self.steps[index].id)
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Advances to the next trial that should run.
    pub fn next(&mut self) -> Option<TrialId> {
        if self.ended {
            return None;
        }
        if self.context.mode == SequenceMode::JumpTo
            && let Some(index) = self.context.target_id().and_then(|t| self.index_of(t))
        {
            self.cursor = index;
        }
        while self.cursor < self.steps.len() {
            let index = self.cursor;
            self.cursor += 1;
            let id = &self.steps[index].id;
            if !self.context.should_run(id) {
                debug!(trial = %id, "trial skipped");
                continue;
            }
            let id = id.clone();
            self.context.reset();
            self.current = Some(index);
            return Some(id);
        }
        self.ended = true;
        self.context.reset();
        None
    }

    /// Skips forward to `target`; trials in between do not run.
    pub fn request_skip_to(&mut self, target: &TrialId) -> Result<(), SequenceError> {
        let index = self
            .index_of(target)
            .ok_or_else(|| SequenceError::UnknownTrial(target.clone()))?;
        if index < self.cursor {
            return Err(SequenceError::BackwardSkip(target.clone()));
        }
        self.set(SequenceMode::SkipTo, target);
        Ok(())
    }

    /// Continues at `target`, before or after the current trial.
    pub fn request_jump_to(&mut self, target: &TrialId) -> Result<(), SequenceError> {
        if self.index_of(target).is_none() {
            return Err(SequenceError::UnknownTrial(target.clone()));
        }
        self.set(SequenceMode::JumpTo, target);
        Ok(())
    }

    /// Ends the sequence; [`next`](Self::next) yields nothing afterwards.
    pub fn end(&mut self) {
        debug!("sequence ended");
        self.ended = true;
        self.context.reset();
    }

    /// Applies the first branch rule of the current trial matching `response`.
    pub fn record_response(
        &mut self,
        response: &Value,
    ) -> Result<Option<BranchAction>, SequenceError> {
        let Some(index) = self.current else {
            return Ok(None);
        };
        let Some(action) = self.steps[index]
            .branches
            .iter()
            .find(|rule| rule.matches(response))
            .map(|rule| rule.action.clone())
        else {
            return Ok(None);
        };
        match &action {
            BranchAction::SkipTo(target) => self.request_skip_to(target)?,
            BranchAction::JumpTo(target) => self.request_jump_to(target)?,
            BranchAction::End => self.end(),
        }
        Ok(Some(action))
    }

    fn set(&mut self, mode: SequenceMode, target: &TrialId) {
        debug!(?mode, target = %target, "sequencing request");
        self.context.mode = mode;
        self.context.target_id = Some(target.clone());
    }

    fn index_of(&self, id: &TrialId) -> Option<usize> {
        self.steps.iter().position(|step| &step.id == id)
    }
}
