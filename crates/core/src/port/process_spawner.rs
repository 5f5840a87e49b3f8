// Process Spawner Port
// Abstraction for creating a child process and reaping it by pid

use std::io;

use thiserror::Error;

use crate::domain::{Argv, ChildExit, Redirect};

/// Child process identifier
pub type ChildPid = u32;

/// Result of waiting for a child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOutcome {
    /// Pid the wait call actually reaped
    pub pid: ChildPid,
    pub exit: ChildExit,
}

/// Spawner errors
#[derive(Error, Debug)]
pub enum SpawnError {
    /// Process could not be created
    #[error("process creation failed: {0}")]
    Fork(#[source] io::Error),

    /// Process was created but the program could not be executed
    #[error("exec failed: {0}")]
    Exec(#[source] io::Error),

    #[error("wait failed: {0}")]
    Wait(#[source] io::Error),
}

impl SpawnError {
    pub fn into_io(self) -> io::Error {
        match self {
            SpawnError::Fork(e) | SpawnError::Exec(e) | SpawnError::Wait(e) => e,
        }
    }
}

/// Process Spawner trait
///
/// Implementations:
/// - StdProcessSpawner (infra-system): std::process::Command + waitpid
/// - MockProcessSpawner: scripted outcomes for tests
pub trait ProcessSpawner: Send + Sync {
    /// Start `argv` with the given stdout/stderr redirects
    ///
    /// Redirects must be in place before the new program image runs.
    /// The program is looked up in `PATH`.
    ///
    /// # Errors
    /// - SpawnError::Fork if the process cannot be created
    /// - SpawnError::Exec if the program cannot be executed
    fn spawn(
        &self,
        argv: &Argv,
        stdout: Redirect<'_>,
        stderr: Redirect<'_>,
    ) -> Result<ChildPid, SpawnError>;

    /// Block until the child `pid` terminates
    ///
    /// # Errors
    /// - SpawnError::Wait if the wait call fails
    fn wait(&self, pid: ChildPid) -> Result<WaitOutcome, SpawnError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use nix::errno::Errno;
    use std::sync::{Arc, Mutex};

    /// Mock spawner behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Child exits normally with this code
        Exit(i32),
        /// Child is killed by this signal
        Signal(i32),
        /// Exec fails with this errno
        ExecFail(i32),
        /// Process creation fails with this errno
        ForkFail(i32),
        /// waitpid fails with this errno
        WaitFail(i32),
        /// waitpid reaps some other pid
        WrongPid(ChildPid),
    }

    /// What a spawn call was asked to do
    #[derive(Debug, Clone)]
    pub struct RecordedSpawn {
        pub argv: Argv,
        pub stdout_redirected: bool,
        pub stderr_redirected: bool,
    }

    /// Mock Process Spawner for testing
    pub struct MockProcessSpawner {
        behavior: Arc<Mutex<MockBehavior>>,
        spawns: Arc<Mutex<Vec<RecordedSpawn>>>,
        wait_count: Arc<Mutex<usize>>,
        next_pid: Arc<Mutex<ChildPid>>,
    }

    impl MockProcessSpawner {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                spawns: Arc::new(Mutex::new(Vec::new())),
                wait_count: Arc::new(Mutex::new(0)),
                next_pid: Arc::new(Mutex::new(1000)),
            }
        }
        pub fn new_success() -> Self {
            Self::new(MockBehavior::Exit(0))
        }
        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }
        pub fn spawn_count(&self) -> usize {
            self.spawns.lock().unwrap().len()
        }
        pub fn wait_count(&self) -> usize {
            *self.wait_count.lock().unwrap()
        }
        pub fn last_spawn(&self) -> Option<RecordedSpawn> {
            self.spawns.lock().unwrap().last().cloned()
        }
    }

    impl ProcessSpawner for MockProcessSpawner {
        fn spawn(
            &self,
            argv: &Argv,
            stdout: Redirect<'_>,
            stderr: Redirect<'_>,
        ) -> Result<ChildPid, SpawnError> {
            self.spawns.lock().unwrap().push(RecordedSpawn {
                argv: argv.clone(),
                stdout_redirected: !stdout.is_inherit(),
                stderr_redirected: !stderr.is_inherit(),
            });

            match self.behavior.lock().unwrap().clone() {
                MockBehavior::ForkFail(errno) => {
                    Err(SpawnError::Fork(io::Error::from_raw_os_error(errno)))
                }
                MockBehavior::ExecFail(errno) => {
                    Err(SpawnError::Exec(io::Error::from_raw_os_error(errno)))
                }
                _ => {
                    let mut next = self.next_pid.lock().unwrap();
                    *next += 1;
                    Ok(*next)
                }
            }
        }

        fn wait(&self, pid: ChildPid) -> Result<WaitOutcome, SpawnError> {
            *self.wait_count.lock().unwrap() += 1;

            let outcome = |exit: ChildExit| -> Result<WaitOutcome, SpawnError> {
                Ok(WaitOutcome { pid, exit })
            };
            match self.behavior.lock().unwrap().clone() {
                MockBehavior::Exit(code) => outcome(ChildExit::Exited(code)),
                MockBehavior::Signal(signo) => outcome(ChildExit::Signaled(signo)),
                MockBehavior::WaitFail(errno) => {
                    Err(SpawnError::Wait(io::Error::from_raw_os_error(errno)))
                }
                MockBehavior::WrongPid(other) => Ok(WaitOutcome {
                    pid: other,
                    exit: ChildExit::Exited(0),
                }),
                // Nothing was spawned, so there is no child to reap
                MockBehavior::ForkFail(_) | MockBehavior::ExecFail(_) => {
                    Err(SpawnError::Wait(io::Error::from(Errno::ECHILD)))
                }
            }
        }
    }
}
