use crate::process::{PlatformCommand, ShellInvoker};

/// POSIX shell: `sh -c "<command line>"`
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixShell;

impl ShellInvoker for UnixShell {
    fn name(&self) -> &'static str {
        "sh"
    }

    fn wrap(&self, command_line: &str) -> PlatformCommand {
        let mut cmd = PlatformCommand::new("sh");
        cmd.arg("-c").arg(command_line);
        cmd
    }
}
