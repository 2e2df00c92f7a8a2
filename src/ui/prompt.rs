//! Prompt capability for commands.
//!
//! Every question is published as a [`PromptEvent`] and answered by a
//! [`PromptResponder`]: [`DialoguerResponder`] on a terminal, [`PromptTrap`] for
//! scripted answers in raw mode and tests.

use crate::error::PromptError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Message reported when a call-site validator rejects an answer.
pub const ENTER_THE_VALUE: &str = "Enter the value";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Input,
    Secure,
    Confirm,
    Choice,
    Multiple,
}

/// Description of a question, as published on the prompt bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub kind: PromptKind,
    pub message: String,
    pub default: Option<String>,
    pub hint: Option<String>,
    pub choices: Vec<String>,
}

impl PromptRequest {
    fn new(kind: PromptKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
            default: None,
            hint: None,
            choices: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAnswer {
    Text(String),
    Confirmed(bool),
    Selected(String),
    SelectedMany(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    Asked(PromptRequest),
    Rejected { message: String, reason: String },
}

/// Sender side of the prompt event channel.
#[derive(Clone)]
pub struct PromptBus {
    sender: Sender<PromptEvent>,
}

impl PromptBus {
    pub fn new_pair() -> (Self, Receiver<PromptEvent>) {
        let (sender, receiver) = channel();
        (Self { sender }, receiver)
    }

    fn emit(&self, event: PromptEvent) {
        // A dropped receiver only means nobody is listening.
        let _ = self.sender.send(event);
    }
}

/// Answers prompt requests.
#[async_trait]
pub trait PromptResponder: Send + Sync {
    async fn respond(&self, request: &PromptRequest) -> Result<PromptAnswer, PromptError>;
}

type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Options for free-text questions
#[derive(Clone, Default)]
pub struct AskOptions {
    default: Option<String>,
    hint: Option<String>,
    validate: Option<Validator>,
}

impl AskOptions {
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Reject answers for which `validate` returns false.
    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }
}

/// Prompt handle given to commands
#[derive(Clone)]
pub struct Prompt {
    responder: Arc<dyn PromptResponder>,
    bus: Option<PromptBus>,
}

impl Prompt {
    pub fn new(responder: Arc<dyn PromptResponder>) -> Self {
        Self {
            responder,
            bus: None,
        }
    }

    pub fn with_bus(mut self, bus: PromptBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Swap the responder; an attached bus keeps receiving events.
    pub fn with_responder(mut self, responder: Arc<dyn PromptResponder>) -> Self {
        self.responder = responder;
        self
    }

    pub async fn ask(&self, message: &str, options: AskOptions) -> Result<String, PromptError> {
        self.text(PromptKind::Input, message, options).await
    }

    /// Like [`Prompt::ask`] with the input hidden on a terminal.
    pub async fn secure(&self, message: &str, options: AskOptions) -> Result<String, PromptError> {
        self.text(PromptKind::Secure, message, options).await
    }

    pub async fn confirm(&self, message: &str) -> Result<bool, PromptError> {
        let request = PromptRequest::new(PromptKind::Confirm, message);
        match self.dispatch(&request).await? {
            PromptAnswer::Confirmed(value) => Ok(value),
            _ => Err(PromptError::UnexpectedAnswer(request.message)),
        }
    }

    pub async fn choice(&self, message: &str, choices: &[&str]) -> Result<String, PromptError> {
        let mut request = PromptRequest::new(PromptKind::Choice, message);
        request.choices = choices.iter().map(|c| c.to_string()).collect();
        match self.dispatch(&request).await? {
            PromptAnswer::Selected(value) if request.choices.contains(&value) => Ok(value),
            _ => Err(PromptError::UnexpectedAnswer(request.message)),
        }
    }

    pub async fn multiple(
        &self,
        message: &str,
        choices: &[&str],
    ) -> Result<Vec<String>, PromptError> {
        let mut request = PromptRequest::new(PromptKind::Multiple, message);
        request.choices = choices.iter().map(|c| c.to_string()).collect();
        match self.dispatch(&request).await? {
            PromptAnswer::SelectedMany(values)
                if values.iter().all(|v| request.choices.contains(v)) =>
            {
                Ok(values)
            }
            _ => Err(PromptError::UnexpectedAnswer(request.message)),
        }
    }

    async fn text(
        &self,
        kind: PromptKind,
        message: &str,
        options: AskOptions,
    ) -> Result<String, PromptError> {
        let mut request = PromptRequest::new(kind, message);
        request.default = options.default.clone();
        request.hint = options.hint.clone();

        let answer = match self.dispatch(&request).await? {
            PromptAnswer::Text(value) if value.is_empty() => {
                options.default.clone().unwrap_or(value)
            }
            PromptAnswer::Text(value) => value,
            _ => return Err(PromptError::UnexpectedAnswer(request.message)),
        };

        if let Some(validate) = &options.validate {
            if !validate(&answer) {
                self.emit(PromptEvent::Rejected {
                    message: request.message.clone(),
                    reason: ENTER_THE_VALUE.to_string(),
                });
                return Err(PromptError::Invalid(ENTER_THE_VALUE.to_string()));
            }
        }
        Ok(answer)
    }

    async fn dispatch(&self, request: &PromptRequest) -> Result<PromptAnswer, PromptError> {
        self.emit(PromptEvent::Asked(request.clone()));
        self.responder.respond(request).await
    }

    fn emit(&self, event: PromptEvent) {
        if let Some(bus) = &self.bus {
            bus.emit(event);
        }
    }
}

/// Scripted responder: answers are trapped per prompt message and consumed in
/// order.
#[derive(Default)]
pub struct PromptTrap {
    traps: Mutex<HashMap<String, VecDeque<PromptAnswer>>>,
}

impl PromptTrap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trap(&self, message: impl Into<String>, answer: PromptAnswer) -> &Self {
        self.traps
            .lock()
            .entry(message.into())
            .or_default()
            .push_back(answer);
        self
    }

    /// Number of trapped answers not consumed yet.
    pub fn pending(&self) -> usize {
        self.traps.lock().values().map(VecDeque::len).sum()
    }
}

#[async_trait]
impl PromptResponder for PromptTrap {
    async fn respond(&self, request: &PromptRequest) -> Result<PromptAnswer, PromptError> {
        self.traps
            .lock()
            .get_mut(&request.message)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| PromptError::Untrapped(request.message.clone()))
    }
}

/// Interactive terminal responder backed by `dialoguer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerResponder;

#[async_trait]
impl PromptResponder for DialoguerResponder {
    async fn respond(&self, request: &PromptRequest) -> Result<PromptAnswer, PromptError> {
        let request = request.clone();
        tokio::task::spawn_blocking(move || interact(&request))
            .await
            .map_err(|e| PromptError::Interaction(e.to_string()))?
    }
}

fn interact(request: &PromptRequest) -> Result<PromptAnswer, PromptError> {
    use dialoguer::{Confirm, Input, MultiSelect, Password, Select};

    let failed = |e: dialoguer::Error| PromptError::Interaction(e.to_string());
    let message = match &request.hint {
        Some(hint) => format!("{} ({})", request.message, hint),
        None => request.message.clone(),
    };

    match request.kind {
        PromptKind::Input => {
            let mut input = Input::<String>::new().with_prompt(message).allow_empty(true);
            if let Some(default) = &request.default {
                input = input.default(default.clone());
            }
            input.interact_text().map(PromptAnswer::Text).map_err(failed)
        }
        PromptKind::Secure => Password::new()
            .with_prompt(message)
            .allow_empty_password(true)
            .interact()
            .map(PromptAnswer::Text)
            .map_err(failed),
        PromptKind::Confirm => Confirm::new()
            .with_prompt(message)
            .interact()
            .map(PromptAnswer::Confirmed)
            .map_err(failed),
        PromptKind::Choice => {
            let index = Select::new()
                .with_prompt(message)
                .items(&request.choices)
                .default(0)
                .interact()
                .map_err(failed)?;
            Ok(PromptAnswer::Selected(request.choices[index].clone()))
        }
        PromptKind::Multiple => {
            let indexes = MultiSelect::new()
                .with_prompt(message)
                .items(&request.choices)
                .interact()
                .map_err(failed)?;
            Ok(PromptAnswer::SelectedMany(
                indexes
                    .into_iter()
                    .map(|i| request.choices[i].clone())
                    .collect(),
            ))
        }
    }
}
