use crate::process::{PlatformCommand, ShellInvoker};

/// Windows command interpreter: `cmd.exe /C "<command line>"`
///
/// `cmd` strips the first and last quote of the tail before running it, so
/// the command line is wrapped in one extra pair. Inner quotes around a path
/// such as `C:\Program Files (x86)\python.exe` then survive intact.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsShell;

impl ShellInvoker for WindowsShell {
    fn name(&self) -> &'static str {
        "cmd.exe"
    }

    fn wrap(&self, command_line: &str) -> PlatformCommand {
        let mut cmd = PlatformCommand::new("cmd.exe");
        cmd.arg("/C").raw_tail(format!("\"{command_line}\""));
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_is_wrapped_in_outer_quotes() {
        let cmd = WindowsShell.wrap("\"C:\\py\\python.exe\" -m pip install numpy");
        assert_eq!(cmd.program(), "cmd.exe");
        assert_eq!(cmd.get_args(), ["/C"]);
        assert_eq!(
            cmd.get_raw_tail(),
            Some("\"\"C:\\py\\python.exe\" -m pip install numpy\"")
        );
    }

    #[test]
    fn test_quoted_path_with_special_characters_keeps_its_quotes() {
        let line = "\"C:\\Program Files (x86)\\app\\python\\python.exe\" get-pip.py";
        let cmd = WindowsShell.wrap(line);
        let tail = cmd.get_raw_tail().unwrap();

        // What cmd runs after dropping the first and last quote
        let inner = &tail[1..tail.len() - 1];
        assert_eq!(inner, line);
        assert!(inner.starts_with("\"C:\\Program Files (x86)"));
    }
}
