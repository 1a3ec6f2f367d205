use std::fmt::Display;

use crate::config::constants::{
    DEFAULT_TEMPERATURE, DEFAULT_TOP_P, MODELS, SAMPLING_MAX, SAMPLING_MIN, SAMPLING_STEP,
};
use crate::models::{GenerationError, Message};

/// Per-request generation settings. Lives in the controller, never in a
/// conversation record.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    model: String,
    temperature: f32,
    top_p: f32,
}

impl GenerationParams {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    /// Switches to `model` if it is part of the allow-list.
    /// Returns false when the model is rejected.
    pub fn set_model(&mut self, model: &str) -> bool {
        if !MODELS.contains(&model) {
            return false;
        }
        self.model = model.to_string();
        true
    }

    pub fn next_model(&mut self) {
        self.cycle_model(1);
    }

    pub fn prev_model(&mut self) {
        self.cycle_model(MODELS.len() - 1);
    }

    fn cycle_model(&mut self, offset: usize) {
        let pos = MODELS.iter().position(|m| *m == self.model).unwrap_or(0);
        self.model = MODELS[(pos + offset) % MODELS.len()].to_string();
    }

    pub fn set_temperature(&mut self, value: f32) {
        self.temperature = clamp_sampling(value);
    }

    pub fn set_top_p(&mut self, value: f32) {
        self.top_p = clamp_sampling(value);
    }

    pub fn step_temperature(&mut self, steps: i32) {
        self.set_temperature(self.temperature + steps as f32 * SAMPLING_STEP);
    }

    pub fn step_top_p(&mut self, steps: i32) {
        self.set_top_p(self.top_p + steps as f32 * SAMPLING_STEP);
    }
}

fn clamp_sampling(value: f32) -> f32 {
    if value.is_nan() {
        return SAMPLING_MIN;
    }
    // Round to 2 decimals so repeated steps do not accumulate float noise
    let value = (value * 100.0).round() / 100.0;
    value.clamp(SAMPLING_MIN, SAMPLING_MAX)
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: MODELS[0].to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }
}

impl Display for GenerationParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (temperature: {:.2}, top_p: {:.2})",
            self.model, self.temperature, self.top_p
        )
    }
}

/// Everything the worker needs to produce one reply
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub conversation_id: String,
    pub history: Vec<Message>,
    pub prompt: String,
    pub system_instruction: String,
    pub params: GenerationParams,
}

/// Posted back to the interactive loop once the worker is done
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub conversation_id: String,
    pub result: Result<String, GenerationError>,
}
