//! Terminal feedback for the list command
//!
//! A list run has two phases: reading go.mod, then one proxy lookup per
//! public dependency. The reporter shows a spinner for the first and a
//! counting bar for the second, and keeps its own tally so the command can
//! tell how many lookups reported back.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TICK: Duration = Duration::from_millis(80);
const BAR_TICK: Duration = Duration::from_millis(100);

/// Where a list run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
    Idle,
    ReadingRequirements,
    CheckingModules { done: usize, total: usize },
}

/// Progress reporter for the list command
pub struct ListProgress {
    /// Draw to the terminal; quiet and JSON runs only track the phase
    visible: bool,
    phase: ListPhase,
    bar: Option<ProgressBar>,
}

impl ListProgress {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            phase: ListPhase::Idle,
            bar: None,
        }
    }

    /// A reporter that never draws
    pub fn hidden() -> Self {
        Self::new(false)
    }

    /// Enter the go.mod reading phase
    pub fn reading_requirements(&mut self) {
        self.replace_bar(|| {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                    .template("{spinner:.cyan} {msg}")
                    .expect("valid spinner template"),
            );
            spinner.set_message("Reading module requirements...");
            spinner.enable_steady_tick(SPINNER_TICK);
            spinner
        });
        self.phase = ListPhase::ReadingRequirements;
    }

    /// Switch from the spinner to a bar over `total` module lookups
    ///
    /// With nothing to look up no bar is drawn.
    pub fn checking_modules(&mut self, total: usize) {
        self.phase = ListPhase::CheckingModules { done: 0, total };
        if total == 0 {
            self.clear_bar();
            return;
        }
        self.replace_bar(|| {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
                    .expect("valid bar template")
                    .progress_chars("█▓▒░"),
            );
            bar.set_message("Checking modules");
            bar.enable_steady_tick(BAR_TICK);
            bar
        });
    }

    /// Record one lookup that reported back
    pub fn module_checked(&mut self, module_path: &str) {
        if let ListPhase::CheckingModules { done, .. } = &mut self.phase {
            *done += 1;
        }
        if let Some(bar) = &self.bar {
            bar.inc(1);
            bar.set_message(module_path.to_string());
        }
    }

    /// Clear the display and return the number of lookups recorded
    pub fn finish(&mut self) -> usize {
        self.clear_bar();
        let done = match self.phase {
            ListPhase::CheckingModules { done, .. } => done,
            _ => 0,
        };
        self.phase = ListPhase::Idle;
        done
    }

    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    /// Returns true if a spinner or bar is drawn
    pub fn is_drawing(&self) -> bool {
        self.bar.is_some()
    }

    fn replace_bar(&mut self, make: impl FnOnce() -> ProgressBar) {
        self.clear_bar();
        if self.visible {
            self.bar = Some(make());
        }
    }

    fn clear_bar(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Default for ListProgress {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_tracks_phases() {
        let mut progress = ListProgress::hidden();
        assert_eq!(progress.phase(), ListPhase::Idle);

        progress.reading_requirements();
        assert_eq!(progress.phase(), ListPhase::ReadingRequirements);
        assert!(!progress.is_drawing());

        progress.checking_modules(2);
        progress.module_checked("github.com/foo/bar");
        assert_eq!(
            progress.phase(),
            ListPhase::CheckingModules { done: 1, total: 2 }
        );
        assert!(!progress.is_drawing());

        assert_eq!(progress.finish(), 1);
        assert_eq!(progress.phase(), ListPhase::Idle);
    }

    #[test]
    fn test_visible_switches_spinner_to_bar() {
        let mut progress = ListProgress::new(true);
        progress.reading_requirements();
        assert!(progress.is_drawing());

        progress.checking_modules(2);
        assert!(progress.is_drawing());
        progress.module_checked("github.com/foo/bar");
        progress.module_checked("gopkg.in/yaml.v2");

        assert_eq!(progress.finish(), 2);
        assert!(!progress.is_drawing());
    }

    #[test]
    fn test_nothing_to_check_draws_nothing() {
        let mut progress = ListProgress::new(true);
        progress.reading_requirements();
        progress.checking_modules(0);
        assert!(!progress.is_drawing());
        assert_eq!(progress.finish(), 0);
    }

    #[test]
    fn test_checked_outside_checking_phase_is_ignored() {
        let mut progress = ListProgress::hidden();
        progress.module_checked("github.com/foo/bar");
        assert_eq!(progress.finish(), 0);
    }
}
