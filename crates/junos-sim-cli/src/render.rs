//! Canned output for the operational commands.
//!
//! Every block is framed the same way: a leading CRLF, one CRLF per line,
//! and a trailing blank line. Timestamps in the text are fixed strings; no
//! renderer reads the clock.

use crate::device::{DeviceState, InterfaceStatus};

const CRLF: &str = "\r\n";

/// Width of the dashed rule above and below the interface table header.
const TABLE_RULE_WIDTH: usize = 50;

/// Wrap `lines` in the standard block framing.
pub fn framed<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::from(CRLF);
    for line in lines {
        out.push_str(line.as_ref());
        out.push_str(CRLF);
    }
    out.push_str(CRLF);
    out
}

// ---------------------------------------------------------------------------
// show version
// ---------------------------------------------------------------------------

const VERSION: &[&str] = &[
    "Device Information:",
    "  Model: MX480 Juniper Networks Router",
    "  JUNOS Software Release: 22.4R1.10",
    "  Build Date: November 9, 2025",
    "  Serial Number: JN139E123456",
    "  Uptime: 15 days, 3 hours, 42 minutes, 18 seconds",
    "  Boot time: 2025-10-25 07:18:00 UTC",
];

pub fn version() -> String {
    framed(VERSION)
}

// ---------------------------------------------------------------------------
// show interfaces / show interface <name>
// ---------------------------------------------------------------------------

/// Description column text; loopbacks are recognised by name.
fn interface_description(name: &str) -> &'static str {
    if name.contains("lo") {
        "Loopback Interface"
    } else {
        "Gigabit Ethernet"
    }
}

/// Status table built from the device's interfaces in insertion order.
pub fn interface_table(device: &DeviceState) -> String {
    let rule = "-".repeat(TABLE_RULE_WIDTH);
    let mut lines = vec![
        "Interface Status:".to_string(),
        rule.clone(),
        format!("{:<15} {:<8} {:<25}", "Interface", "Status", "Description"),
        rule,
    ];
    for (name, status) in device.interfaces() {
        lines.push(format!(
            "{:<15} {:<8} {:<25}",
            name,
            status.as_str(),
            interface_description(name)
        ));
    }
    framed(&lines)
}

/// Detail block for one interface.
pub fn interface_detail(name: &str, status: InterfaceStatus) -> String {
    framed(&[
        format!("Physical interface: {name}"),
        "  Interface type: Gigabit Ethernet".to_string(),
        "  Administrative status: Enabled".to_string(),
        format!("  Operational status: {}", status.title()),
        "  Link-level type: Ethernet".to_string(),
        "  MTU: 1514, MRU: 1522".to_string(),
        "  Speed: 1000Mbps".to_string(),
        "  Duplex: Full-duplex".to_string(),
        "  Hardware address: 00:1f:12:34:56:78".to_string(),
        "  Last flapped: Never".to_string(),
        "  Statistics last cleared: Never".to_string(),
    ])
}

// ---------------------------------------------------------------------------
// show system ...
// ---------------------------------------------------------------------------

const SYSTEM_UPTIME: &[&str] = &[
    "Current time: 2025-11-09 14:30:42 UTC",
    "Time Source:  LOCAL CLOCK ",
    "System booted: 2025-10-25 07:18:00 UTC (2w1d 07:12 ago)",
    "Protocols started: 2025-10-25 07:19:32 UTC (2w1d 07:11 ago)",
    "Last configured: 2025-11-08 14:25:33 UTC (1d 00:05 ago) by admin",
    " 2:30PM  up 15 days,  7:12, 1 user, load averages: 0.23, 0.18, 0.15",
];

const SYSTEM_INFORMATION: &[&str] = &[
    "Hardware inventory:",
    "Item             Version  Part number  Serial number     Description",
    "Chassis                                JN139E123456      MX480",
    "Midplane         REV 05   750-031001   ABCD123456        MX480 Backplane",
    "FPM Board        REV 04   750-031002   EFGH789012        Front Panel Display",
    "Routing Engine 0 REV 03   750-031003   MNOP345678        RE-S-1800x4",
    "CB 0             REV 01   750-031004   QRST901234        Enhanced MX SCB",
    "CB 1             REV 01   750-031004   UVWX567890        Enhanced MX SCB",
    "MIC 0/0/0        REV 02   750-031005   ABCD111111        4x 10GE XFP",
    "MIC 0/1/0        REV 01   750-031006   EFGH222222        20x 1GE RJ45",
    "Fan Tray         REV 01   740-021822   MNOP333333        Enhanced Fan Tray",
    "PEM 0            REV 03   740-021823   QRST444444        2500W AC Power Entry Module",
    "PEM 1            REV 03   740-021823   UVWX555555        2500W AC Power Entry Module",
];

const SYSTEM_PROCESSES: &[&str] = &[
    "last pid: 15234;  load averages:  0.23,  0.18,  0.15    up 15+07:12:18  14:30:42",
    "80 processes:  2 running, 75 sleeping, 3 waiting",
    "CPU states: 12.5% user,  0.0% nice,  4.2% system,  2.1% interrupt, 81.2% idle",
    "Mem: 148M Active, 89M Inact, 892M Wired, 52M Cache, 199M Buf, 2820M Free",
    "",
    "  PID USERNAME    THR PRI NICE   SIZE    RES STATE   C   TIME    WCPU COMMAND",
    " 1234 root          1  20    0   148M  28984K select  0  12:45  0.00% chassisd",
    " 1345 root          1  20    0    89M  15672K select  0   8:23  0.00% dcd",
    " 1456 root          1  20    0   234M  45328K select  0  45:12  0.00% rpd",
    " 1567 root          1  20    0    67M  12456K select  0   2:34  0.00% mgd",
    " 1678 root          1  20    0    45M   8923K select  0   1:23  0.00% alarmd",
];

const SYSTEM_STORAGE: &[&str] = &[
    "Filesystem           1K-blocks      Used Available Capacity  Mounted on",
    "/dev/da0s1a             495703    174567    281486    38%    /",
    "devfs                        1         1         0   100%    /dev",
    "/dev/da0s1e             495703    123456    332597    27%    /config",
    "/dev/da0s1f            3952588   1234567   2401765    34%    /var",
    "/dev/da0s1d             495703     89012    367041    20%    /var/tmp",
    "procfs                       8         8         0   100%    /proc",
];

pub fn system_uptime() -> String {
    framed(SYSTEM_UPTIME)
}

pub fn system_information() -> String {
    framed(SYSTEM_INFORMATION)
}

pub fn system_processes() -> String {
    framed(SYSTEM_PROCESSES)
}

pub fn system_storage() -> String {
    framed(SYSTEM_STORAGE)
}

// ---------------------------------------------------------------------------
// show configuration [section]
// ---------------------------------------------------------------------------

const COMMIT_HEADER: &str = "## Last commit: 2025-11-08 14:25:33 UTC by admin";

const CONFIG_VERSION: &str = "version 22.4R1.10;";

const SYSTEM_CONFIG: &[&str] = &[
    "system {",
    "    host-name JUNOS-MX;",
    "    domain-name lab.local;",
    "    time-zone UTC;",
    "    authentication-order [ radius password ];",
    "    root-authentication {",
    "        encrypted-password \"$6$ABC123...\";",
    "    }",
    "    name-server {",
    "        8.8.8.8;",
    "        8.8.4.4;",
    "    }",
    "    login {",
    "        user admin {",
    "            uid 2000;",
    "            class super-user;",
    "            authentication {",
    "                encrypted-password \"$6$DEF456...\";",
    "            }",
    "        }",
    "    }",
    "    services {",
    "        ssh {",
    "            root-login allow;",
    "            protocol-version v2;",
    "        }",
    "        netconf {",
    "            ssh;",
    "        }",
    "    }",
    "    syslog {",
    "        user * {",
    "            any emergency;",
    "        }",
    "        file messages {",
    "            any notice;",
    "            authorization info;",
    "        }",
    "    }",
    "    ntp {",
    "        server 0.pool.ntp.org;",
    "        server 1.pool.ntp.org;",
    "    }",
    "}",
];

const INTERFACES_CONFIG: &[&str] = &[
    "interfaces {",
    "    ge-0/0/0 {",
    "        description \"WAN Interface\";",
    "        unit 0 {",
    "            family inet {",
    "                address 192.168.1.1/24;",
    "            }",
    "        }",
    "    }",
    "    ge-0/0/1 {",
    "        description \"LAN Interface\";",
    "        disable;",
    "    }",
    "    ge-0/0/2 {",
    "        description \"DMZ Interface\";",
    "        unit 0 {",
    "            family inet {",
    "                address 10.0.1.1/24;",
    "            }",
    "        }",
    "    }",
    "    lo0 {",
    "        unit 0 {",
    "            family inet {",
    "                address 127.0.0.1/32;",
    "            }",
    "        }",
    "    }",
    "}",
];

const ROUTING_OPTIONS_CONFIG: &[&str] = &[
    "routing-options {",
    "    static {",
    "        route 0.0.0.0/0 next-hop 192.168.1.254;",
    "    }",
    "}",
];

const PROTOCOLS_CONFIG: &[&str] = &[
    "protocols {",
    "    ospf {",
    "        area 0.0.0.0 {",
    "            interface ge-0/0/2.0;",
    "        }",
    "    }",
    "}",
];

/// Sections that `show configuration <section>` can display on their own.
pub const CONFIG_SECTIONS: &[(&str, &[&str])] =
    &[("system", SYSTEM_CONFIG), ("interfaces", INTERFACES_CONFIG)];

/// The complete committed configuration.
pub fn configuration() -> String {
    let mut lines = vec![COMMIT_HEADER, CONFIG_VERSION];
    for block in [
        SYSTEM_CONFIG,
        INTERFACES_CONFIG,
        ROUTING_OPTIONS_CONFIG,
        PROTOCOLS_CONFIG,
    ] {
        lines.extend_from_slice(block);
    }
    framed(&lines)
}

/// One top-level section, or `None` if it is not a known section.
pub fn configuration_section(section: &str) -> Option<String> {
    let (_, block) = CONFIG_SECTIONS.iter().find(|(name, _)| *name == section)?;
    let mut lines = vec![COMMIT_HEADER];
    lines.extend_from_slice(block);
    Some(framed(&lines))
}
