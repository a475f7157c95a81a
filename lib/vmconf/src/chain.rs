// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runs an ordered list of checks and stops at the first one that objects.

use slog::{debug, info, warn, Logger};

use crate::lookup::LookupError;
use crate::result::ValidationResult;

/// What a check that consults collaborators returns: a business verdict, or
/// the collaborator fault that kept it from reaching one.
pub type CheckResult = Result<ValidationResult, LookupError>;

/// An ordered, fail-fast sequence of checks.
///
/// Once a check rejects or faults, later checks are not evaluated and make no
/// lookups.
pub struct CheckChain<'a> {
    log: &'a Logger,
    verdict: Option<CheckResult>,
}

impl<'a> CheckChain<'a> {
    pub fn new(log: &'a Logger) -> Self {
        Self { log, verdict: None }
    }

    /// Runs `check` unless an earlier check already stopped the chain.
    pub fn check<F>(mut self, name: &'static str, check: F) -> Self
    where
        F: FnOnce() -> CheckResult,
    {
        if self.verdict.is_some() {
            return self;
        }

        debug!(self.log, "running check"; "check" => name);
        match check() {
            Ok(result) if result.is_valid() => {}
            Ok(result) => {
                info!(self.log, "check rejected operation";
                      "check" => name,
                      "reason" => ?result.reason());
                self.verdict = Some(Ok(result));
            }
            Err(e) => {
                warn!(self.log, "check could not complete";
                      "check" => name,
                      "error" => %e);
                self.verdict = Some(Err(e));
            }
        }
        self
    }

    /// Like [`CheckChain::check`], for checks that need no collaborators.
    pub fn pure<F>(self, name: &'static str, check: F) -> Self
    where
        F: FnOnce() -> ValidationResult,
    {
        self.check(name, || Ok(check()))
    }

    /// Runs `check` only when `applies` holds. A check whose inputs are absent
    /// is skipped, not failed.
    pub fn check_if<F>(
        self,
        applies: bool,
        name: &'static str,
        check: F,
    ) -> Self
    where
        F: FnOnce() -> CheckResult,
    {
        if applies {
            self.check(name, check)
        } else {
            self
        }
    }

    /// Returns the first rejection or fault, or `VALID` if every check passed.
    pub fn finish(self) -> CheckResult {
        self.verdict.unwrap_or(Ok(ValidationResult::VALID))
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use vmconf_types::EngineMessage;

    use super::*;

    fn test_logger() -> Logger {
        Logger::root(slog::Discard, slog::o!())
    }

    #[test]
    fn first_rejection_wins_and_later_checks_do_not_run() {
        let log = test_logger();
        let ran = Cell::new(0);
        let result = CheckChain::new(&log)
            .pure("ok", || {
                ran.set(ran.get() + 1);
                ValidationResult::VALID
            })
            .pure("first", || {
                ran.set(ran.get() + 1);
                ValidationResult::invalid(
                    EngineMessage::ActionTypeFailedVmIsNotDown,
                )
            })
            .pure("second", || {
                ran.set(ran.get() + 1);
                ValidationResult::invalid(
                    EngineMessage::VmCannotUpdateCluster,
                )
            })
            .finish()
            .unwrap();

        assert_eq!(
            result.reason(),
            Some(EngineMessage::ActionTypeFailedVmIsNotDown)
        );
        assert_eq!(ran.get(), 2);
    }

    #[test]
    fn faults_stop_the_chain() {
        let log = test_logger();
        let result = CheckChain::new(&log)
            .check("lookup", || Err(LookupError::UnknownOs(3)))
            .pure("never", || unreachable!())
            .finish();
        assert!(matches!(result, Err(LookupError::UnknownOs(3))));
    }

    #[test]
    fn skipped_checks_do_not_reject() {
        let log = test_logger();
        let result = CheckChain::new(&log)
            .check_if(false, "skipped", || {
                Ok(ValidationResult::invalid(
                    EngineMessage::VmCannotUpdateCluster,
                ))
            })
            .finish()
            .unwrap();
        assert!(result.is_valid());
    }
}
