// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use contestreg_domain::DomainError;
use contestreg_persistence::PersistenceError;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::notifier::NotifyError;

/// Errors that end an operation.
#[derive(Debug, Error)]
pub enum OpsError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Deletion of {email} failed, stopping batch: {source}")]
    DeletionAborted {
        email: String,
        #[source]
        source: PersistenceError,
    },
}
