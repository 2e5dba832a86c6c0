//! Configuration loading and resolution.
//!
//! Every setting resolves as explicit flag, then environment variable, then
//! default.

use std::path::PathBuf;

use socialtrade::{ExportLayout, ExportResult, UserLoader, DEFAULT_MAX_PARALLEL};

pub const SOCIAL_DIR_ENV: &str = "SOCIALTRADE_SOCIAL_DIR";
pub const PORTFOLIO_DIR_ENV: &str = "SOCIALTRADE_PORTFOLIO_DIR";
pub const JOBS_ENV: &str = "SOCIALTRADE_JOBS";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub layout: ExportLayout,
    pub jobs: usize,
}

impl Settings {
    /// Resolve settings from CLI flags and the process environment.
    pub fn resolve(social_dir: Option<&str>, portfolio_dir: Option<&str>, jobs: Option<usize>) -> Self {
        Self::resolve_with(social_dir, portfolio_dir, jobs, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with<F>(
        social_dir: Option<&str>,
        portfolio_dir: Option<&str>,
        jobs: Option<usize>,
        env: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ExportLayout::default();
        let social_dir = resolve_dir(social_dir, env(SOCIAL_DIR_ENV), defaults.social_dir);
        let portfolio_dir =
            resolve_dir(portfolio_dir, env(PORTFOLIO_DIR_ENV), defaults.portfolio_dir);

        Self {
            layout: ExportLayout::new(social_dir, portfolio_dir),
            jobs: resolve_jobs(jobs, env(JOBS_ENV)),
        }
    }

    /// Open a loader over the resolved layout.
    pub fn open_loader(&self) -> ExportResult<UserLoader> {
        Ok(UserLoader::open(self.layout.clone())?.with_max_parallel(self.jobs))
    }
}

fn resolve_dir(explicit: Option<&str>, env_value: Option<String>, default: PathBuf) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }
    match env_value {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => default,
    }
}

fn resolve_jobs(explicit: Option<usize>, env_value: Option<String>) -> usize {
    if let Some(n) = explicit {
        return n.max(1);
    }
    match env_value.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_MAX_PARALLEL,
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                tracing::warn!("Ignoring {JOBS_ENV}={raw:?}; using {DEFAULT_MAX_PARALLEL}");
                DEFAULT_MAX_PARALLEL
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve_with(None, None, None, no_env);
        assert_eq!(settings.layout, ExportLayout::default());
        assert_eq!(settings.jobs, DEFAULT_MAX_PARALLEL);
    }

    #[test]
    fn test_explicit_beats_env() {
        let env = |key: &str| match key {
            SOCIAL_DIR_ENV => Some("/env/social".to_string()),
            PORTFOLIO_DIR_ENV => Some("/env/portfolio".to_string()),
            JOBS_ENV => Some("9".to_string()),
            _ => None,
        };
        let settings = Settings::resolve_with(Some("/flag/social"), None, Some(2), env);
        assert_eq!(settings.layout.social_dir, PathBuf::from("/flag/social"));
        assert_eq!(settings.layout.portfolio_dir, PathBuf::from("/env/portfolio"));
        assert_eq!(settings.jobs, 2);
    }

    #[test]
    fn test_bad_jobs_env_falls_back() {
        assert_eq!(resolve_jobs(None, Some("lots".into())), DEFAULT_MAX_PARALLEL);
        assert_eq!(resolve_jobs(None, Some("0".into())), DEFAULT_MAX_PARALLEL);
        assert_eq!(resolve_jobs(None, Some(" 6 ".into())), 6);
        assert_eq!(resolve_jobs(Some(0), None), 1);
    }

    #[test]
    fn test_blank_env_dir_ignored() {
        let dir = resolve_dir(None, Some("  ".into()), PathBuf::from("TwitterData"));
        assert_eq!(dir, PathBuf::from("TwitterData"));
    }
}
