// src/cancel.rs

//! Cancellation for long-running copies
//!
//! A [`CancelToken`] is a shared flag polled by the recursive copy between
//! entries and between chunks of a file. [`SigintGuard`] routes SIGINT into
//! a token for as long as the guard is alive and restores the previous
//! disposition on drop.
//!
//! [`Interrupt::arm`] is called once per copy, so outside a copy SIGINT
//! keeps its default disposition and terminates the process.

use crate::error::Result;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, warn};

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Flag flipped by the signal handler; bridged into the active token
static SIGINT_FLAG: OnceLock<Arc<AtomicBool>> = OnceLock::new();

/// Serializes handler installation
static INSTALL_LOCK: Mutex<()> = Mutex::new(());

extern "C" fn handle_sigint(_: libc::c_int) {
    if let Some(flag) = SIGINT_FLAG.get() {
        flag.store(true, Ordering::SeqCst);
    }
}

/// Routes SIGINT into a [`CancelToken`] while alive
pub struct SigintGuard {
    token: CancelToken,
    previous: SigAction,
}

impl SigintGuard {
    /// Install the SIGINT handler and return the token it cancels
    pub fn install() -> Result<Self> {
        let _lock = INSTALL_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let flag = SIGINT_FLAG.get_or_init(|| Arc::new(AtomicBool::new(false)));
        flag.store(false, Ordering::SeqCst);
        let token = CancelToken { flag: Arc::clone(flag) };

        let action = SigAction::new(
            SigHandler::Handler(handle_sigint),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        // SAFETY: the handler only performs an atomic store.
        let previous = unsafe { signal::sigaction(Signal::SIGINT, &action)? };
        debug!("Installed SIGINT handler");

        Ok(Self { token, previous })
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

impl Drop for SigintGuard {
    fn drop(&mut self) {
        // SAFETY: restores the disposition that was active before install().
        if let Err(e) = unsafe { signal::sigaction(Signal::SIGINT, &self.previous) } {
            warn!("Failed to restore SIGINT handler: {}", e);
        }
    }
}

/// Source of cancellation for relocation copies
#[derive(Debug, Clone)]
pub enum Interrupt {
    /// Route SIGINT into a fresh token for the duration of each copy
    Sigint,
    /// Use a caller-owned token; it is never reset
    Token(CancelToken),
}

impl Interrupt {
    /// Arm cancellation for a single copy
    ///
    /// For [`Interrupt::Sigint`] the handler stays installed until the
    /// returned value is dropped.
    pub fn arm(&self) -> Result<ArmedInterrupt> {
        match self {
            Interrupt::Sigint => {
                let guard = SigintGuard::install()?;
                Ok(ArmedInterrupt {
                    token: guard.token().clone(),
                    _guard: Some(guard),
                })
            }
            Interrupt::Token(token) => Ok(ArmedInterrupt {
                token: token.clone(),
                _guard: None,
            }),
        }
    }
}

/// Cancellation armed for one copy
pub struct ArmedInterrupt {
    token: CancelToken,
    _guard: Option<SigintGuard>,
}

impl ArmedInterrupt {
    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}
