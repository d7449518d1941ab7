use indicatif::{ProgressBar, ProgressStyle};

/// Detect if we're running in a CI environment
fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS", "JENKINS_URL"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

fn visible(enabled: bool) -> bool {
    enabled && !is_ci()
}

/// Create a spinner with a message.
/// Hidden when progress is disabled or in CI.
pub fn spinner(message: &str, enabled: bool) -> ProgressBar {
    let pb = if visible(enabled) {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };

    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Bar counting analyzed queries.
pub fn bar(total: usize, enabled: bool) -> ProgressBar {
    let pb = if visible(enabled) {
        ProgressBar::new(total as u64)
    } else {
        ProgressBar::hidden()
    };

    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.cyan} Analyzing queries [{bar:30.cyan/blue}] {pos}/{len}")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_progress_is_hidden() {
        assert!(spinner("Loading...", false).is_hidden());
        let pb = bar(10, false);
        assert!(pb.is_hidden());
        pb.inc(3);
        assert_eq!(pb.position(), 3);
    }

    #[test]
    fn test_spinner_with_empty_message() {
        let pb = spinner("", true);
        pb.finish_and_clear();
    }
}
