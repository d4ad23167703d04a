/// Lines picked at random for each system-activity tick
pub const ACTIVITY_POOL: &[&str] = &[
    "systemd[1]: Started Session 2 of user guest.",
    "kernel: eth0: link up, 100Mbps, full-duplex",
    "cron[812]: (root) CMD (run-parts /etc/cron.hourly)",
    "NetworkManager[604]: dhcp4 (eth0): state changed bound -> bound",
    "systemd-journald[231]: Journal rotated",
    "kernel: usb 1-1: new full-speed USB device number 2 using uhci_hcd",
    "dbus-daemon[588]: Successfully activated service 'org.freedesktop.hostname1'",
    "kernel: rtl8139 0000:00:05.0 eth0: link status changed",
    "polkitd[702]: Registered Authentication Agent for unix-session:2",
    "systemd[1]: Starting Daily apt download activities...",
];

/// Commands "typed" by the simulated user after an activity tick
pub const COMMAND_POOL: &[&str] = &[
    "ls -la",
    "ps aux | head -n 5",
    "df -h",
    "uptime",
    "free -m",
    "uname -a",
    "cat /proc/cpuinfo | grep 'model name'",
    "top -bn1 | head -n 3",
];
