//! Drill progression: the per-word step machine and the session that walks
//! a word list through it.
//!
//! Each word goes Learn → CopyWrite → CopySentence → ComposeSentence. A step
//! only moves forward when its completion check passes; `StepBack` and
//! `JumpTo` are the only free moves.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DrillError, Result};
use crate::matching::{grade_sentence_copy, words_match, GradeResult};
use crate::syllables::{MarkedChar, SyllableMarks};
use crate::types::{SentenceFeedback, WordRecord};

/// Correct spellings needed to leave the write step.
pub const REQUIRED_REPETITIONS: u8 = 3;

/// From this many correct spellings on, the word is hidden and only heard.
pub const HIDDEN_AFTER_REPETITIONS: u8 = 2;

/// Stage of the learning sequence for one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Learn,
    CopyWrite,
    CopySentence,
    ComposeSentence,
}

impl Step {
    /// Fixed forward order of the steps.
    pub const ORDER: [Step; 4] = [
        Step::Learn,
        Step::CopyWrite,
        Step::CopySentence,
        Step::ComposeSentence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learn => "learn",
            Self::CopyWrite => "copy_write",
            Self::CopySentence => "copy_sentence",
            Self::ComposeSentence => "compose_sentence",
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Learn => None,
            Self::CopyWrite => Some(Self::Learn),
            Self::CopySentence => Some(Self::CopyWrite),
            Self::ComposeSentence => Some(Self::CopySentence),
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::Learn => Some(Self::CopyWrite),
            Self::CopyWrite => Some(Self::CopySentence),
            Self::CopySentence => Some(Self::ComposeSentence),
            Self::ComposeSentence => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state of the active word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillState {
    pub step: Step,
    pub repetition_count: u8,
    pub marks: SyllableMarks,
    pub last_error: Option<String>,
    /// Single-line buffer for the write and copy steps.
    pub input: String,
    /// Buffer for the composed sentence.
    pub sentence_input: String,
    pub feedback: Option<SentenceFeedback>,
}

impl Default for DrillState {
    fn default() -> Self {
        Self {
            step: Step::Learn,
            repetition_count: 0,
            marks: SyllableMarks::new(),
            last_error: None,
            input: String::new(),
            sentence_input: String::new(),
            feedback: None,
        }
    }
}

impl DrillState {
    /// Fresh state for a newly activated word, at `step`.
    pub fn at(step: Step) -> Self {
        Self {
            step,
            ..Self::default()
        }
    }

    /// True during the transcription pass of the write step.
    pub fn is_hidden(&self) -> bool {
        self.step == Step::CopyWrite && self.repetition_count >= HIDDEN_AFTER_REPETITIONS
    }

    /// Move to `step` on the same word, keeping only the syllable marks.
    fn enter(&mut self, step: Step) {
        *self = Self {
            step,
            marks: std::mem::take(&mut self.marks),
            ..Self::default()
        };
    }
}

/// User or collaborator input to the drill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrillEvent {
    BeginDrilling,
    InputChanged { text: String },
    SubmitWord,
    SubmitSentence,
    SentenceChanged { text: String },
    CompositionReviewed { feedback: SentenceFeedback },
    StepBack,
    JumpTo { index: usize },
    ToggleSplit { index: usize },
    ToggleStress { index: usize },
    RevealSyllables,
    ClearMarks,
}

impl DrillEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BeginDrilling => "begin_drilling",
            Self::InputChanged { .. } => "input_changed",
            Self::SubmitWord => "submit_word",
            Self::SubmitSentence => "submit_sentence",
            Self::SentenceChanged { .. } => "sentence_changed",
            Self::CompositionReviewed { .. } => "composition_reviewed",
            Self::StepBack => "step_back",
            Self::JumpTo { .. } => "jump_to",
            Self::ToggleSplit { .. } => "toggle_split",
            Self::ToggleStress { .. } => "toggle_stress",
            Self::RevealSyllables => "reveal_syllables",
            Self::ClearMarks => "clear_marks",
        }
    }
}

/// Audio the client should play after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum AudioCue {
    Word(String),
    Sentence(String),
}

impl AudioCue {
    pub fn text(&self) -> &str {
        match self {
            Self::Word(text) | Self::Sentence(text) => text,
        }
    }
}

/// What an event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// Buffers or marks changed; step unchanged.
    Updated,
    /// The event had nothing to do.
    NoChange,
    /// Correct spelling counted, still in the write step.
    Repetition { count: u8 },
    /// Wrong spelling; listen and try again.
    Retry,
    /// Copied sentence rejected.
    Mismatch { message: String },
    /// Composed sentence rejected by the reviewer.
    Revise,
    StepChanged { step: Step },
    WordChanged { index: usize, step: Step },
    SessionComplete,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioCue>,
}

impl Transition {
    fn silent(outcome: Outcome) -> Self {
        Self {
            outcome,
            audio: None,
        }
    }
}

/// View of a session for display.
#[derive(Debug, Clone, Serialize)]
pub struct DrillSnapshot {
    pub index: usize,
    pub total: usize,
    pub word: WordRecord,
    pub step: Step,
    pub repetition_count: u8,
    pub hidden: bool,
    pub marks: SyllableMarks,
    /// Empty while the word is hidden.
    pub rendered: Vec<MarkedChar>,
    pub last_error: Option<String>,
    pub input: String,
    pub sentence_input: String,
    pub feedback: Option<SentenceFeedback>,
    pub complete: bool,
    /// Fraction of the word list reached, 0.0 to 1.0.
    pub progress: f64,
}

/// A word list being drilled, one active word at a time.
#[derive(Debug, Clone)]
pub struct DrillSession {
    words: Vec<WordRecord>,
    current: usize,
    state: DrillState,
    complete: bool,
}

impl DrillSession {
    /// Start at the first word's Learn step.
    pub fn new(words: Vec<WordRecord>) -> Result<Self> {
        if words.is_empty() {
            return Err(DrillError::EmptySession);
        }
        Ok(Self {
            words,
            current: 0,
            state: DrillState::default(),
            complete: false,
        })
    }

    pub fn words(&self) -> &[WordRecord] {
        &self.words
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_word(&self) -> &WordRecord {
        &self.words[self.current]
    }

    pub fn state(&self) -> &DrillState {
        &self.state
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Audio that belongs to the current position, if any.
    pub fn entry_cue(&self) -> Option<AudioCue> {
        let word = self.current_word();
        match self.state.step {
            Step::Learn => Some(AudioCue::Word(word.word.clone())),
            Step::CopyWrite
                if self.state.repetition_count == 0
                    || self.state.repetition_count == HIDDEN_AFTER_REPETITIONS =>
            {
                Some(AudioCue::Word(word.word.clone()))
            }
            Step::CopySentence => Some(AudioCue::Sentence(word.example_sentence.clone())),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> DrillSnapshot {
        let word = self.current_word().clone();
        let hidden = self.state.is_hidden();
        let rendered = if hidden {
            Vec::new()
        } else {
            self.state.marks.render(&word.word)
        };
        let reached = if self.complete {
            self.words.len()
        } else {
            self.current + 1
        };

        DrillSnapshot {
            index: self.current,
            total: self.words.len(),
            step: self.state.step,
            repetition_count: self.state.repetition_count,
            hidden,
            marks: self.state.marks.clone(),
            rendered,
            last_error: self.state.last_error.clone(),
            input: self.state.input.clone(),
            sentence_input: self.state.sentence_input.clone(),
            feedback: self.state.feedback.clone(),
            complete: self.complete,
            progress: reached as f64 / self.words.len() as f64,
            word,
        }
    }

    /// Apply one event. Events that make no sense in the current step are
    /// rejected and leave the session untouched.
    pub fn apply(&mut self, event: DrillEvent) -> Result<Transition> {
        if self.complete && !matches!(event, DrillEvent::JumpTo { .. }) {
            return Err(DrillError::SessionComplete);
        }

        let step = self.state.step;
        match (step, event) {
            (_, DrillEvent::JumpTo { index }) => self.jump_to(index),
            (_, DrillEvent::StepBack) => Ok(self.step_back()),

            (Step::Learn, DrillEvent::BeginDrilling) => Ok(self.enter_step(Step::CopyWrite)),

            (Step::CopyWrite | Step::CopySentence, DrillEvent::InputChanged { text }) => {
                self.state.input = text;
                self.state.last_error = None;
                Ok(Transition::silent(Outcome::Updated))
            }

            (Step::CopyWrite, DrillEvent::SubmitWord) => Ok(self.submit_word()),
            (Step::CopySentence, DrillEvent::SubmitSentence) => Ok(self.submit_sentence()),

            (Step::ComposeSentence, DrillEvent::SentenceChanged { text }) => {
                self.state.sentence_input = text;
                self.state.last_error = None;
                self.state.feedback = None;
                Ok(Transition::silent(Outcome::Updated))
            }
            (Step::ComposeSentence, DrillEvent::CompositionReviewed { feedback }) => {
                Ok(self.composition_reviewed(feedback))
            }

            (_, DrillEvent::ToggleSplit { index }) if !self.state.is_hidden() => {
                self.state.marks = self.state.marks.toggle_split(index);
                Ok(Transition::silent(Outcome::Updated))
            }
            (_, DrillEvent::ToggleStress { index }) if !self.state.is_hidden() => {
                self.state.marks = self.state.marks.toggle_stress(index);
                Ok(Transition::silent(Outcome::Updated))
            }
            (Step::Learn, DrillEvent::RevealSyllables) => {
                let word = &self.words[self.current];
                self.state.marks = SyllableMarks::canonical(&word.word, &word.syllables);
                Ok(Transition::silent(Outcome::Updated))
            }
            (Step::Learn, DrillEvent::ClearMarks) => {
                self.state.marks = SyllableMarks::new();
                Ok(Transition::silent(Outcome::Updated))
            }

            (step, event) => Err(DrillError::InvalidEvent {
                step,
                event: event.name(),
            }),
        }
    }

    fn submit_word(&mut self) -> Transition {
        let word = &self.words[self.current].word;
        if !words_match(&self.state.input, word) {
            return Transition {
                outcome: Outcome::Retry,
                audio: Some(AudioCue::Word(word.clone())),
            };
        }

        self.state.repetition_count += 1;
        self.state.input.clear();
        if self.state.repetition_count >= REQUIRED_REPETITIONS {
            return self.enter_step(Step::CopySentence);
        }

        Transition {
            outcome: Outcome::Repetition {
                count: self.state.repetition_count,
            },
            audio: self.entry_cue(),
        }
    }

    fn submit_sentence(&mut self) -> Transition {
        let target = &self.words[self.current].example_sentence;
        match grade_sentence_copy(target, &self.state.input) {
            GradeResult::Exact => self.enter_step(Step::ComposeSentence),
            GradeResult::Mismatch { message, .. } => {
                self.state.last_error = Some(message.clone());
                Transition::silent(Outcome::Mismatch { message })
            }
        }
    }

    fn composition_reviewed(&mut self, feedback: SentenceFeedback) -> Transition {
        if !feedback.is_correct {
            self.state.feedback = Some(feedback);
            return Transition::silent(Outcome::Revise);
        }

        if self.current + 1 < self.words.len() {
            self.activate(self.current + 1, Step::Learn)
        } else {
            self.complete = true;
            self.state.feedback = Some(feedback);
            Transition::silent(Outcome::SessionComplete)
        }
    }

    fn step_back(&mut self) -> Transition {
        match self.state.step.previous() {
            Some(step) => self.enter_step(step),
            None if self.current > 0 => self.activate(self.current - 1, Step::ComposeSentence),
            None => Transition::silent(Outcome::NoChange),
        }
    }

    fn jump_to(&mut self, index: usize) -> Result<Transition> {
        if index >= self.words.len() {
            return Err(DrillError::WordOutOfRange {
                index,
                len: self.words.len(),
            });
        }
        Ok(self.activate(index, Step::Learn))
    }

    fn enter_step(&mut self, step: Step) -> Transition {
        self.state.enter(step);
        Transition {
            outcome: Outcome::StepChanged { step },
            audio: self.entry_cue(),
        }
    }

    fn activate(&mut self, index: usize, step: Step) -> Transition {
        self.current = index;
        self.state = DrillState::at(step);
        self.complete = false;
        Transition {
            outcome: Outcome::WordChanged { index, step },
            audio: self.entry_cue(),
        }
    }
}
