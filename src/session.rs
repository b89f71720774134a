use image::{GrayImage, RgbImage};

use std::collections::HashMap;

use crate::geometry::RotatedRect;
use crate::segment::draw_character_boxes;

/// Everything produced for one accepted candidate.
#[derive(Debug, Clone)]
pub struct RecognitionResult {
    pub text: String,
    pub region: RotatedRect,
    /// Rectified grayscale crop.
    pub plate: GrayImage,
    /// Rectified color crop.
    pub plate_color: RgbImage,
    /// Noise-filtered binary crop, the image handed to the engine.
    pub filtered: GrayImage,
}

/// How the session decides whether a new text supersedes the best one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestPolicy {
    /// Compare against the most recently recorded best entry only.
    LastEntry,
    /// Compare against the longest entry recorded so far.
    RunningMax,
}

impl Default for BestPolicy {
    fn default() -> Self {
        BestPolicy::LastEntry
    }
}

/// Progress of one detection pass.
///
/// Per candidate the pass runs normalize, filter, recognize and aggregate;
/// the terminal state only distinguishes whether anything was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Searching,
    /// At least one candidate was accepted.
    Done,
    /// No candidate survived the filters; not an error.
    NoneFound,
}

/// Per-image collector for accepted candidates and the best plate so far.
///
/// A session is created fresh for every input image and handed back to the
/// caller; nothing carries over between detections.
#[derive(Debug)]
pub struct DetectionSession {
    results: Vec<RecognitionResult>,
    best: Vec<String>,
    best_rois: HashMap<String, RgbImage>,
    policy: BestPolicy,
    state: SessionState,
}

impl DetectionSession {
    pub fn new(policy: BestPolicy) -> Self {
        Self {
            results: Vec::new(),
            best: Vec::new(),
            best_rois: HashMap::new(),
            policy,
            state: SessionState::Idle,
        }
    }

    pub fn begin_search(&mut self) {
        self.state = SessionState::Searching;
    }

    /// Record one accepted candidate and update the best list.
    pub fn push(&mut self, result: RecognitionResult) {
        let length = char_len(&result.text);
        let supersedes = match self.policy {
            BestPolicy::LastEntry => {
                self.best.last().map_or(true, |last| char_len(last) < length)
            }
            BestPolicy::RunningMax => {
                self.best.iter().map(|t| char_len(t)).max().map_or(true, |max| max < length)
            }
        };
        if supersedes {
            self.best.push(result.text.clone());
            self.best_rois.insert(result.text.clone(), result.plate_color.clone());
        }
        self.results.push(result);
    }

    /// Settle the terminal state once the search is over.
    pub fn finish(&mut self) {
        self.state = if self.results.is_empty() {
            SessionState::NoneFound
        } else {
            SessionState::Done
        };
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn results(&self) -> &[RecognitionResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn regions(&self) -> Vec<RotatedRect> {
        self.results.iter().map(|r| r.region).collect()
    }

    pub fn plates(&self) -> Vec<&GrayImage> {
        self.results.iter().map(|r| &r.plate).collect()
    }

    pub fn filtered_plates(&self) -> Vec<&GrayImage> {
        self.results.iter().map(|r| &r.filtered).collect()
    }

    /// Best texts in the order they were recorded; the last one wins.
    pub fn best_list(&self) -> &[String] {
        &self.best
    }

    pub fn best(&self) -> Option<&str> {
        self.best.last().map(String::as_str)
    }

    /// Rectified color crop recorded for a best-list text.
    pub fn plate_roi(&self, text: &str) -> Option<&RgbImage> {
        self.best_rois.get(text)
    }

    /// Character boxes drawn onto the best plate's color crop.
    ///
    /// `None` when nothing was recognized or no crop is registered for the
    /// best text.
    pub fn annotated_best(&self) -> Option<RgbImage> {
        let text = self.best.last()?;
        let roi = self.best_rois.get(text)?;
        Some(draw_character_boxes(roi))
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
