// launcher.rs

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::io::Write;

use log::{debug, trace};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{execvp, fork, write, ForkResult, Pid};

use crate::builtins::{is_history_reference, rerun_from_history, run_builtin, Builtin};
use crate::error::ShellError;
use crate::parser::CommandLine;
use crate::session::{Flow, Session};

/// Status a child exits with when its program could not be started.
const EXEC_FAILURE_STATUS: i32 = 1;

impl<O: Write, E: Write> Session<O, E> {
    /// Runs one command line. Builtins and history references run in-process,
    /// anything else in a child. Errors are reported here.
    pub fn launch(&mut self, command: CommandLine) -> Flow {
        match self.try_launch(&command) {
            Ok(flow) => flow,
            Err(error) => {
                self.report(&error);
                Flow::Continue
            }
        }
    }

    fn try_launch(&mut self, command: &CommandLine) -> Result<Flow, ShellError> {
        if let Some(builtin) = Builtin::lookup(command.program()) {
            return run_builtin(builtin, self, command);
        }
        if is_history_reference(command.program()) {
            return rerun_from_history(self, command);
        }
        self.spawn(command)?;
        Ok(Flow::Continue)
    }

    fn spawn(&mut self, command: &CommandLine) -> Result<(), ShellError> {
        let argv = command
            .args
            .iter()
            .map(|arg| CString::new(arg.as_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ShellError::NulArgument(command.program().to_string_lossy().into_owned()))?;
        // built before forking so the child does not allocate
        let mut exec_failure = command.program().as_bytes().to_vec();
        exec_failure.extend_from_slice(b": unable to execute command\n");
        self.flush()?;

        match unsafe { fork() } {
            Ok(ForkResult::Child) => exec_child(&argv, &exec_failure),
            Ok(ForkResult::Parent { child }) => {
                debug!("started {:?} as pid {child}", command.program());
                if command.background {
                    self.record(command);
                    Ok(())
                } else {
                    self.wait_foreground(child, command)
                }
            }
            Err(errno) => Err(ShellError::Fork(errno)),
        }
    }

    /// Only a clean zero exit gets the command into history.
    fn wait_foreground(&mut self, child: Pid, command: &CommandLine) -> Result<(), ShellError> {
        loop {
            match waitpid(child, None) {
                Ok(WaitStatus::Exited(_, 0)) => {
                    self.record(command);
                    return Ok(());
                }
                Ok(status) => {
                    debug!("{:?} not recorded: {status:?}", command.program());
                    return Ok(());
                }
                Err(Errno::EINTR) => continue,
                Err(errno) => return Err(ShellError::Wait(errno)),
            }
        }
    }
}

fn exec_child(argv: &[CString], exec_failure: &[u8]) -> ! {
    let _ = execvp(&argv[0], argv);
    let _ = write(libc::STDERR_FILENO, exec_failure);
    unsafe { libc::_exit(EXEC_FAILURE_STATUS) }
}

/// Collects every background child that has already finished, without blocking.
pub fn reap_background() {
    loop {
        match waitpid(None::<Pid>, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(status) => trace!("reaped background child: {status:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn test_nul_argument_is_rejected_before_fork() {
        let mut session: Session<Vec<u8>, Vec<u8>> = Session::new(50, Vec::new(), Vec::new());
        let command = CommandLine::from_tokens(vec![OsString::from("echo"), OsString::from("a\0b")]).unwrap();
        assert_eq!(session.launch(command), Flow::Continue);
        assert_eq!(
            String::from_utf8(session.err).unwrap(),
            "echo: argument contains a NUL byte\n"
        );
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_builtins_do_not_fork() {
        let mut session: Session<Vec<u8>, Vec<u8>> = Session::new(50, Vec::new(), Vec::new());
        let command = CommandLine::parse(b"history", None).unwrap();
        assert_eq!(session.launch(command), Flow::Continue);
        assert_eq!(String::from_utf8(session.out).unwrap(), "0\thistory\n");
    }
}
