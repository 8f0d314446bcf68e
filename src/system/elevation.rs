// src/system/elevation.rs

//! Admin detection for the current process.

use std::process::{Command as StdCommand, Stdio};

/// Whether the current process already runs with administrator rights.
/// Any failure to find out counts as "not elevated".
pub fn is_process_elevated() -> bool {
    let elevated = check_elevation().unwrap_or_else(|e| {
        log::debug!("Elevation check failed: {}", e);
        false
    });
    log::debug!("Process elevated: {}", elevated);
    elevated
}

/// `net session` only succeeds for members of the Administrators group
/// running with an elevated token.
#[cfg(windows)]
fn check_elevation() -> std::io::Result<bool> {
    let status = StdCommand::new("net")
        .arg("session")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    Ok(status.success())
}

#[cfg(not(windows))]
fn check_elevation() -> std::io::Result<bool> {
    let output = StdCommand::new("id")
        .arg("-u")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()?;
    Ok(output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn test_check_matches_effective_user() {
        let uid = StdCommand::new("id").arg("-u").output().unwrap();
        let is_root = String::from_utf8_lossy(&uid.stdout).trim() == "0";

        assert_eq!(is_process_elevated(), is_root);
    }
}
