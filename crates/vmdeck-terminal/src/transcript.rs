use vmdeck_types::GuestProfile;

use super::BOOT_LINE_COUNT;

/// Line announcing a fresh session
pub fn announcement(guest: &GuestProfile) -> String {
    format!("=== Starting {} Emulation ===", guest.display_name)
}

/// Interactive prompt of the guest's shell
pub fn shell_prompt(guest: &GuestProfile) -> String {
    if guest.is_windows() {
        "C:\\Users\\guest>".to_string()
    } else {
        format!("guest@{}:~$", guest.id)
    }
}

/// The ten boot lines, in emission order
pub fn boot_transcript(guest: &GuestProfile) -> Vec<String> {
    let kernel = if guest.is_windows() { "NT" } else { "Linux" };
    let lines = vec![
        "GRUB loading...".to_string(),
        format!("Loading {} kernel...", kernel),
        "Initializing hardware...".to_string(),
        "Starting kernel modules".to_string(),
        "Mounting file systems".to_string(),
        "Starting system services".to_string(),
        "Starting network manager".to_string(),
        "Loading desktop environment".to_string(),
        format!("System ready - Welcome to {}!", guest.display_name),
        format!("{} ", shell_prompt(guest)),
    ];
    debug_assert_eq!(lines.len(), BOOT_LINE_COUNT);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_shape() {
        let guest = GuestProfile::from_catalog("ubuntu").unwrap();
        let lines = boot_transcript(&guest);
        assert_eq!(lines.len(), BOOT_LINE_COUNT);
        assert_eq!(lines[0], "GRUB loading...");
        assert_eq!(lines[8], "System ready - Welcome to Ubuntu!");
        assert_eq!(lines[9], "guest@ubuntu:~$ ");
    }

    #[test]
    fn test_windows_guest_prompt() {
        let guest = GuestProfile::from_catalog("windows-10").unwrap();
        assert_eq!(shell_prompt(&guest), "C:\\Users\\guest>");
        assert_eq!(boot_transcript(&guest)[1], "Loading NT kernel...");
        assert_eq!(announcement(&guest), "=== Starting Windows 10 Emulation ===");
    }
}
