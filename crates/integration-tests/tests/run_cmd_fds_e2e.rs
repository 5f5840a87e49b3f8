//! Descriptor-based runner, end to end
//!
//! Real children via StdProcessSpawner, reports captured by RecordingReporter

use std::fs::File;
use std::io::{Read, Seek};
use std::sync::Arc;

use cmdharness_core::domain::ReportKind;
use cmdharness_core::port::process_spawner::ProcessSpawner;
use cmdharness_core::port::reporter::mocks::RecordingReporter;
use cmdharness_core::{Argv, ChildExit, CommandRunner, Redirect, RunError};
use cmdharness_infra_system::StdProcessSpawner;
use nix::sys::signal::Signal;

fn runner() -> (CommandRunner, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::new());
    let runner = CommandRunner::new(Arc::new(StdProcessSpawner::new()), reporter.clone());
    (runner, reporter)
}

fn read_back(file: &mut File) -> String {
    let mut text = String::new();
    file.rewind().unwrap();
    file.read_to_string(&mut text).unwrap();
    text
}

/// Zero-exit command returns normally, nothing reported
#[test]
fn test_zero_exit_returns_normally() {
    let (runner, reporter) = runner();

    runner
        .run_cmd_fds(None, &["true"], Redirect::Inherit, Redirect::Inherit)
        .unwrap();

    assert!(reporter.reports().is_empty());
}

/// Empty argument list: one TBROK, no child
#[test]
fn test_empty_argv_is_broken_once() {
    let (runner, reporter) = runner();
    let empty: Vec<String> = Vec::new();

    let result = runner.run_cmd_fds(None, &empty, Redirect::Inherit, Redirect::Inherit);

    assert!(matches!(result, Err(RunError::EmptyArgv { .. })));
    let fatal = reporter.fatal_reports();
    assert_eq!(fatal.len(), 1);
    assert_eq!(fatal[0].kind, ReportKind::Broken);
    assert!(fatal[0].location.file().ends_with("run_cmd_fds_e2e.rs"));
}

/// Non-zero exit N: TBROK naming the command, exit code preserved
#[test]
fn test_nonzero_exit_is_broken() {
    let (runner, reporter) = runner();

    let result = runner.run_cmd_fds(
        None,
        &["sh", "-c", "exit 42"],
        Redirect::Inherit,
        Redirect::Inherit,
    );

    match result {
        Err(RunError::CommandFailed { program, exit, .. }) => {
            assert_eq!(program, "sh");
            assert_eq!(exit.code(), Some(42));
        }
        other => panic!("expected CommandFailed, got {:?}", other),
    }
    let fatal = reporter.fatal_reports();
    assert_eq!(fatal.len(), 1);
    assert!(fatal[0].message.contains("failed to exec cmd 'sh'"));
}

/// Unresolvable program: exec failure escalates as a command failure
#[test]
fn test_missing_program_is_broken() {
    let (runner, reporter) = runner();

    let result = runner.run_cmd_fds(
        None,
        &["cmdharness-definitely-not-installed"],
        Redirect::Inherit,
        Redirect::Inherit,
    );

    assert!(matches!(
        result,
        Err(RunError::CommandFailed {
            exit: ChildExit::ExecFailed(_),
            ..
        })
    ));
    assert_eq!(reporter.fatal_reports().len(), 1);
    assert!(reporter.fatal_reports()[0].os_error.is_some());
}

/// NUL byte in an argument: fatal, but not an exec failure and no OS error
#[test]
fn test_nul_byte_argument_is_spawn_failure() {
    let (runner, reporter) = runner();

    let result = runner.run_cmd_fds(None, &["echo", "a\0b"], Redirect::Inherit, Redirect::Inherit);

    match result {
        Err(RunError::SpawnFailed { program, .. }) => assert_eq!(program, "echo"),
        other => panic!("expected SpawnFailed, got {:?}", other),
    }
    let fatal = reporter.fatal_reports();
    assert_eq!(fatal.len(), 1);
    assert_eq!(fatal[0].os_error, None);
    assert!(!fatal[0].message.contains("failed to exec cmd"));
}

/// Killed by a signal: abnormal termination is a failure
#[test]
fn test_signal_termination_is_broken() {
    let (runner, _reporter) = runner();

    let result = runner.run_cmd_fds(
        None,
        &["sh", "-c", "kill -TERM $$"],
        Redirect::Inherit,
        Redirect::Inherit,
    );

    match result {
        Err(RunError::CommandFailed { exit, .. }) => {
            assert_eq!(exit, ChildExit::Signaled(Signal::SIGTERM as i32));
        }
        other => panic!("expected CommandFailed, got {:?}", other),
    }
}

/// stdout and stderr land on their own descriptors, not swapped or merged
#[test]
fn test_stdout_and_stderr_redirected_separately() {
    let (runner, reporter) = runner();
    let mut out = tempfile::tempfile().unwrap();
    let mut err = tempfile::tempfile().unwrap();

    runner
        .run_cmd_fds(
            None,
            &["sh", "-c", "printf out; printf err >&2"],
            Redirect::to(&out),
            Redirect::to(&err),
        )
        .unwrap();

    assert_eq!(read_back(&mut out), "out");
    assert_eq!(read_back(&mut err), "err");
    assert!(reporter.reports().is_empty());
}

/// Redirect into a pipe; the caller's write end stays open and usable
#[test]
fn test_redirect_into_pipe() {
    let (runner, _reporter) = runner();
    let (read_end, write_end) = nix::unistd::pipe().unwrap();

    runner
        .run_cmd_fds(
            None,
            &["echo", "through the pipe"],
            Redirect::to(&write_end),
            Redirect::Inherit,
        )
        .unwrap();

    // The runner only borrowed the write end; closing it is ours to do
    drop(write_end);

    let mut text = String::new();
    File::from(read_end).read_to_string(&mut text).unwrap();
    assert_eq!(text, "through the pipe\n");
}

/// Output written before a failure is still in the caller's descriptor
#[test]
fn test_failed_command_output_still_captured() {
    let (runner, _reporter) = runner();
    let mut out = tempfile::tempfile().unwrap();

    let result = runner.run_cmd_fds(
        None,
        &["sh", "-c", "echo partial; exit 1"],
        Redirect::to(&out),
        Redirect::Inherit,
    );

    assert!(result.is_err());
    assert_eq!(read_back(&mut out), "partial\n");
}

/// Back-to-back children never receive each other's exit status
#[test]
fn test_sequential_runs_keep_their_own_status() {
    let spawner = StdProcessSpawner::new();
    let first = Argv::new(["sh", "-c", "sleep 0.2; exit 3"]).unwrap();
    let second = Argv::new(["sh", "-c", "exit 5"]).unwrap();

    let pid_a = spawner
        .spawn(&first, Redirect::Inherit, Redirect::Inherit)
        .unwrap();
    let pid_b = spawner
        .spawn(&second, Redirect::Inherit, Redirect::Inherit)
        .unwrap();

    // Reap the faster child first; each wait must return its own pid
    let b = spawner.wait(pid_b).unwrap();
    let a = spawner.wait(pid_a).unwrap();

    assert_eq!((b.pid, b.exit), (pid_b, ChildExit::Exited(5)));
    assert_eq!((a.pid, a.exit), (pid_a, ChildExit::Exited(3)));

    let (runner, _reporter) = runner();
    for code in [3, 5] {
        let script = format!("exit {}", code);
        let err = runner
            .run_cmd_fds(None, &["sh", "-c", script.as_str()], Redirect::Inherit, Redirect::Inherit)
            .unwrap_err();
        match err {
            RunError::CommandFailed { exit, .. } => assert_eq!(exit, ChildExit::Exited(code)),
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }
}

/// Cleanup callback runs once per fatal report
#[test]
fn test_cleanup_runs_on_failure_only() {
    let (runner, _reporter) = runner();
    let calls = std::cell::Cell::new(0);
    let cleanup: &dyn Fn() = &|| calls.set(calls.get() + 1);

    runner
        .run_cmd_fds(Some(cleanup), &["true"], Redirect::Inherit, Redirect::Inherit)
        .unwrap();
    assert_eq!(calls.get(), 0);

    let _ = runner.run_cmd_fds(Some(cleanup), &["false"], Redirect::Inherit, Redirect::Inherit);
    assert_eq!(calls.get(), 1);
}
