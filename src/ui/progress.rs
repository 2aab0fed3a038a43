use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::pipeline::Stage;

/// Named progress bars sharing one terminal area.
pub struct ProgressManager {
    mp: MultiProgress,
    bars: Arc<Mutex<HashMap<String, ProgressBar>>>,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self {
            mp: MultiProgress::new(),
            bars: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Adds bar `id` with `total` steps.
    pub fn create_bar(
        &self,
        id: &str,
        total: u64,
        template: &str,
        message: &str,
    ) -> Result<(), String> {
        let mut bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;

        if bars.contains_key(id) {
            return Err(format!("Progress bar '{}' already exists", id));
        }

        let style = ProgressStyle::default_bar()
            .template(template)
            .map_err(|e| format!("Bad template: {}", e))?
            .progress_chars("█▉▊▋▌▍▎▏ ");
        let pb = self.mp.add(ProgressBar::new(total));
        pb.set_style(style);
        pb.set_message(message.to_string());

        bars.insert(id.to_string(), pb);
        Ok(())
    }

    fn with_bar(&self, id: &str, f: impl FnOnce(&ProgressBar)) -> Result<(), String> {
        let bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;
        match bars.get(id) {
            Some(pb) => {
                f(pb);
                Ok(())
            }
            None => Err(format!("Progress bar '{}' not found", id)),
        }
    }

    pub fn inc(&self, id: &str, value: u64) -> Result<(), String> {
        self.with_bar(id, |pb| pb.inc(value))
    }

    pub fn set_message(&self, id: &str, message: &str) -> Result<(), String> {
        self.with_bar(id, |pb| pb.set_message(message.to_string()))
    }

    pub fn position(&self, id: &str) -> Result<u64, String> {
        let mut position = 0;
        self.with_bar(id, |pb| position = pb.position())?;
        Ok(position)
    }

    /// Finishes bar `id`, leaving it on screen.
    pub fn finish(&self, id: &str, message: &str) -> Result<(), String> {
        self.with_bar(id, |pb| pb.finish_with_message(message.to_string()))
    }

    pub fn clear_all(&self) {
        if let Ok(mut bars) = self.bars.lock() {
            for (_, pb) in bars.drain() {
                pb.finish_and_clear();
            }
        }
    }

    /// Moves the pipeline bar `id` to `stage`. Every stage before it counts
    /// as done.
    pub fn enter_stage(&self, id: &str, stage: Stage) -> Result<(), String> {
        let done = Stage::ALL
            .iter()
            .position(|s| *s == stage)
            .unwrap_or_default() as u64;
        self.with_bar(id, |pb| {
            pb.set_position(done);
            pb.set_message(stage.label());
        })
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

pub mod templates {
    pub const PIPELINE: &str = "RUN  [{bar:30.cyan}] {pos}/{len} stages {msg}";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden_manager() -> ProgressManager {
        let manager = ProgressManager::new();
        manager.mp.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        manager
    }

    #[test]
    fn stages_advance_the_bar() {
        let manager = hidden_manager();
        manager
            .create_bar("run", Stage::ALL.len() as u64, templates::PIPELINE, "")
            .unwrap();
        manager.enter_stage("run", Stage::Demodulate).unwrap();
        assert_eq!(manager.position("run").unwrap(), 2);
    }

    #[test]
    fn duplicate_and_missing_bars_are_errors() {
        let manager = hidden_manager();
        manager.create_bar("a", 1, templates::PIPELINE, "").unwrap();
        assert!(manager.create_bar("a", 1, templates::PIPELINE, "").is_err());
        assert!(manager.inc("b", 1).is_err());
        manager.clear_all();
        assert!(manager.set_message("a", "gone").is_err());
    }
}
