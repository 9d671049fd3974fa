// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Readiness state holders.
//
// Each binding owns one holder, shared by `Arc`/`Rc` with whoever needs to
// query it. The first caller runs the setup; callers arriving while it is in
// flight wait for the same outcome. A failed setup is cached and replayed: a
// process that failed to provision its tables stays failed until restart.

use std::future::Future;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{InitError, LouisError, Result};

/// Lifecycle of a binding's one-time setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

fn replay<T>(outcome: &std::result::Result<T, InitError>) -> Result<&T> {
    match outcome {
        Ok(value) => Ok(value),
        Err(err) => Err(LouisError::Init(err.clone())),
    }
}

/// Blocking readiness holder for the native bindings.
pub struct Readiness<T> {
    outcome: OnceLock<std::result::Result<T, InitError>>,
    started: AtomicBool,
}

impl<T> Readiness<T> {
    pub const fn new() -> Self {
        Self {
            outcome: OnceLock::new(),
            started: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ReadinessState {
        match self.outcome.get() {
            Some(Ok(_)) => ReadinessState::Ready,
            Some(Err(_)) => ReadinessState::Failed,
            None if self.started.load(Ordering::Acquire) => ReadinessState::Initializing,
            None => ReadinessState::Uninitialized,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ReadinessState::Ready
    }

    /// The cached setup product, without triggering setup.
    pub fn get(&self) -> Result<&T> {
        match self.outcome.get() {
            Some(outcome) => replay(outcome),
            None => Err(LouisError::NotInitialized),
        }
    }

    /// Run `setup` unless it already ran, blocking while another thread runs
    /// it.
    pub fn ensure_ready<F>(&self, setup: F) -> Result<&T>
    where
        F: FnOnce() -> std::result::Result<T, InitError>,
    {
        let outcome = self.outcome.get_or_init(|| {
            self.started.store(true, Ordering::Release);
            setup()
        });
        replay(outcome)
    }
}

impl<T> Default for Readiness<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Readiness holder whose setup is asynchronous (web module instantiation).
pub struct AsyncReadiness<T> {
    outcome: tokio::sync::OnceCell<std::result::Result<T, InitError>>,
    started: AtomicBool,
}

impl<T> AsyncReadiness<T> {
    pub fn new() -> Self {
        Self {
            outcome: tokio::sync::OnceCell::new(),
            started: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ReadinessState {
        match self.outcome.get() {
            Some(Ok(_)) => ReadinessState::Ready,
            Some(Err(_)) => ReadinessState::Failed,
            None if self.started.load(Ordering::Acquire) => ReadinessState::Initializing,
            None => ReadinessState::Uninitialized,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ReadinessState::Ready
    }

    /// The cached setup product; `NotInitialized` until setup has finished.
    pub fn get(&self) -> Result<&T> {
        match self.outcome.get() {
            Some(outcome) => replay(outcome),
            None => Err(LouisError::NotInitialized),
        }
    }

    /// Await `setup` unless it already ran; concurrent callers share the
    /// in-flight attempt.
    pub async fn ensure_ready<F, Fut>(&self, setup: F) -> Result<&T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, InitError>>,
    {
        let started = &self.started;
        let outcome = self
            .outcome
            .get_or_init(|| async move {
                let mut in_flight = InFlight::enter(started);
                let outcome = setup().await;
                in_flight.finished = true;
                outcome
            })
            .await;
        replay(outcome)
    }
}

/// Marks a setup as running; clears the mark if the setup future is dropped
/// before it finishes, so the next caller starts from `Uninitialized`.
struct InFlight<'a> {
    started: &'a AtomicBool,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn enter(started: &'a AtomicBool) -> Self {
        started.store(true, Ordering::Release);
        Self {
            started,
            finished: false,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.started.store(false, Ordering::Release);
        }
    }
}

impl<T> Default for AsyncReadiness<T> {
    fn default() -> Self {
        Self::new()
    }
}
