use std::path::Path;
use std::process::{Command, Stdio};

#[cfg(windows)]
use std::os::windows::process::CommandExt as _;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;
#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

/// Command presets for the two kinds of child the launcher starts
pub trait LauncherCommandExt {
    /// Short-lived helper whose output the launcher reads, such as
    /// `java -version`. No console window flashes up on Windows.
    fn as_helper(&mut self) -> &mut Self;

    /// The game itself: started in `working_dir` with no inherited stdio, in its
    /// own session (Unix) or process group (Windows) so closing the launcher's
    /// terminal does not take the game down with it.
    fn as_game_session(&mut self, working_dir: &Path) -> &mut Self;
}

impl LauncherCommandExt for Command {
    fn as_helper(&mut self) -> &mut Self {
        self.stdin(Stdio::null());
        #[cfg(windows)]
        self.creation_flags(CREATE_NO_WINDOW);
        self
    }

    fn as_game_session(&mut self, working_dir: &Path) -> &mut Self {
        self.current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(windows)]
        self.creation_flags(CREATE_NEW_PROCESS_GROUP | CREATE_NO_WINDOW);

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // SAFETY: only setsid runs between fork and exec; it is async-signal-safe
            unsafe {
                self.pre_exec(|| {
                    if libc::setsid() == -1 {
                        return Err(std::io::Error::last_os_error());
                    }
                    Ok(())
                });
            }
        }
        self
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn helper_output_is_captured() {
        let output = Command::new("sh")
            .args(["-c", "echo helper-out >&2"])
            .as_helper()
            .output()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "helper-out");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn game_session_leads_its_own_session() {
        let tmp = tempfile::tempdir().unwrap();
        // Field 6 of /proc/self/stat is the session id; a session leader's equals its pid
        let status = Command::new("sh")
            .args(["-c", "set -- $(cat /proc/$$/stat); [ \"$6\" = \"$$\" ] && touch leader"])
            .as_game_session(tmp.path())
            .status()
            .unwrap();
        assert!(status.success());
        assert!(tmp.path().join("leader").exists());
    }
}
