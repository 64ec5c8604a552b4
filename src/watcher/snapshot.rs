//! Tri-state watch results
//!
//! Every resource class reaches the core as `(data, loaded, error)`.
//! `data` is meaningful only once `loaded` is true and `error` is unset.

use crate::error::LoadError;

/// Snapshot of one watched resource class (or of a value derived from several)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchResult<T> {
    pub data: T,
    pub loaded: bool,
    pub error: Option<LoadError>,
}

impl<T: Default> WatchResult<T> {
    /// Not loaded yet
    pub fn pending() -> Self {
        Self {
            data: T::default(),
            loaded: false,
            error: None,
        }
    }

    /// Settled with an error; data is discarded
    pub fn failed(error: LoadError) -> Self {
        Self {
            data: T::default(),
            loaded: true,
            error: Some(error),
        }
    }

    /// Result carrying `data` only when `status` is ready, empty otherwise
    pub fn gated(status: LoadStatus, data: impl FnOnce() -> T) -> Self {
        match status.error {
            Some(error) => Self::failed(error),
            None if status.loaded => Self::ready(data()),
            None => Self::pending(),
        }
    }
}

impl<T> WatchResult<T> {
    pub fn ready(data: T) -> Self {
        Self {
            data,
            loaded: true,
            error: None,
        }
    }

    /// Loaded and error free
    pub fn is_ready(&self) -> bool {
        self.loaded && self.error.is_none()
    }

    pub fn status(&self) -> LoadStatus {
        LoadStatus {
            loaded: self.loaded,
            error: self.error.clone(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WatchResult<U> {
        WatchResult {
            data: f(self.data),
            loaded: self.loaded,
            error: self.error,
        }
    }
}

/// Loaded/error pair without data
#[derive(Debug, Clone, PartialEq)]
pub struct LoadStatus {
    pub loaded: bool,
    pub error: Option<LoadError>,
}

impl LoadStatus {
    pub fn ready() -> Self {
        Self {
            loaded: true,
            error: None,
        }
    }

    /// Combine several statuses.
    ///
    /// The first error wins and settles the result (`loaded` is reported
    /// true alongside it). Without errors, `loaded` is the AND of all inputs.
    pub fn combine(statuses: impl IntoIterator<Item = LoadStatus>) -> Self {
        let mut loaded = true;
        for status in statuses {
            if let Some(error) = status.error {
                return Self {
                    loaded: true,
                    error: Some(error),
                };
            }
            loaded &= status.loaded;
        }
        Self {
            loaded,
            error: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.loaded && self.error.is_none()
    }
}
