use std::{fmt, fs, path::PathBuf, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        })
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme `{other}`")),
        }
    }
}

/// The one piece of client state that outlives a session.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Stored theme, or dark when nothing usable is stored.
    pub fn current(&self) -> Theme {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Persist `theme`. A failed write is logged; the theme still applies.
    pub fn set(&self, theme: Theme) -> Theme {
        if let Err(e) = fs::write(&self.path, theme.to_string()) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not save theme preference");
        }
        theme
    }

    pub fn toggle(&self) -> Theme {
        self.set(self.current().toggled())
    }
}
