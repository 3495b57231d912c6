//! Command dispatch.
//!
//! Command lines are split on whitespace and matched against [`RULES`] in
//! order; the first rule whose pattern matches wins. Keyword matching is
//! case-sensitive and token-wise, so `show  version` and `show version`
//! are the same command.

use crate::device::DeviceState;
use crate::error::CommandError;
use crate::render;

type Handler = fn(&[&str], &mut DeviceState) -> Result<String, CommandError>;

/// How a rule's keywords are compared against the command tokens.
enum Pattern {
    /// Tokens must equal the keywords exactly.
    Exact(&'static [&'static str]),
    /// Tokens must start with the keywords; the rest become arguments.
    Prefix(&'static [&'static str]),
}

impl Pattern {
    /// Arguments left after the keywords, if the pattern matches.
    fn strip<'a, 'b>(&self, tokens: &'a [&'b str]) -> Option<&'a [&'b str]> {
        match self {
            Self::Exact(words) => (tokens == *words).then_some(&[]),
            Self::Prefix(words) => tokens.strip_prefix(*words),
        }
    }
}

struct Rule {
    pattern: Pattern,
    handler: Handler,
}

/// Dispatch table in precedence order.
const RULES: &[Rule] = &[
    Rule {
        pattern: Pattern::Exact(&["help"]),
        handler: help,
    },
    Rule {
        pattern: Pattern::Exact(&["?"]),
        handler: help,
    },
    Rule {
        pattern: Pattern::Exact(&["show", "version"]),
        handler: show_version,
    },
    Rule {
        pattern: Pattern::Exact(&["show", "interfaces"]),
        handler: show_interfaces,
    },
    Rule {
        pattern: Pattern::Prefix(&["show", "configuration"]),
        handler: show_configuration,
    },
    Rule {
        pattern: Pattern::Prefix(&["show", "interface"]),
        handler: show_interface,
    },
    Rule {
        pattern: Pattern::Prefix(&["show", "system"]),
        handler: show_system,
    },
    Rule {
        pattern: Pattern::Exact(&["exit"]),
        handler: exit,
    },
    Rule {
        pattern: Pattern::Exact(&["quit"]),
        handler: exit,
    },
];

/// Usage and description for every documented command, in `help` order.
pub const HELP_ENTRIES: &[(&str, &str)] = &[
    ("help", "Show this help message"),
    ("show version", "Display device version information"),
    ("show interfaces", "Display interface status"),
    ("show interface <if>", "Display detailed interface information"),
    ("show configuration", "Display complete configuration"),
    (
        "show configuration <sec>",
        "Display configuration section (system, interfaces)",
    ),
    ("show system [uptime]", "Display system uptime"),
    ("show system information", "Display hardware inventory"),
    ("show system processes", "Display system processes"),
    ("show system storage", "Display storage information"),
    ("exit/quit", "Exit the session"),
];

/// Reports reachable as `show system <name>`.
pub(crate) const SYSTEM_REPORTS: &[(&str, fn() -> String)] = &[
    ("uptime", render::system_uptime),
    ("information", render::system_information),
    ("processes", render::system_processes),
    ("storage", render::system_storage),
];

/// Execute one command line against `device` and return the text to send.
///
/// Blank input yields an empty string. Errors are rendered, never returned;
/// `exit`/`quit` is the only command that mutates `device`.
pub fn dispatch(line: &str, device: &mut DeviceState) -> String {
    let line = line.trim();
    if line.is_empty() {
        return String::new();
    }
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let result = RULES
        .iter()
        .find_map(|rule| {
            rule.pattern
                .strip(&tokens)
                .map(|args| (rule.handler)(args, device))
        })
        .unwrap_or_else(|| Err(CommandError::UnknownCommand(line.to_string())));

    match result {
        Ok(text) => text,
        Err(e) => {
            log::debug!("rejected {line:?}: {e}");
            e.to_response()
        },
    }
}

fn help(_args: &[&str], _device: &mut DeviceState) -> Result<String, CommandError> {
    let mut lines = vec!["Available commands:".to_string()];
    lines.extend(HELP_ENTRIES.iter().map(|(usage, description)| {
        // The stock device prints the exit row one column short.
        let width = if *usage == "exit/quit" { 23 } else { 24 };
        format!("  {usage:<width$} - {description}")
    }));
    Ok(render::framed(&lines))
}

fn show_version(_args: &[&str], _device: &mut DeviceState) -> Result<String, CommandError> {
    Ok(render::version())
}

fn show_interfaces(_args: &[&str], device: &mut DeviceState) -> Result<String, CommandError> {
    Ok(render::interface_table(device))
}

fn show_configuration(args: &[&str], _device: &mut DeviceState) -> Result<String, CommandError> {
    if args.is_empty() {
        return Ok(render::configuration());
    }
    let section = args.join(" ");
    render::configuration_section(&section).ok_or(CommandError::SectionNotFound(section))
}

fn show_interface(args: &[&str], device: &mut DeviceState) -> Result<String, CommandError> {
    let name = args.first().ok_or(CommandError::InterfaceNameRequired)?;
    let status = device
        .interface_status(name)
        .ok_or_else(|| CommandError::InterfaceNotFound(name.to_string()))?;
    Ok(render::interface_detail(name, status))
}

fn show_system(args: &[&str], _device: &mut DeviceState) -> Result<String, CommandError> {
    let Some(sub) = args.first() else {
        return Ok(render::system_uptime());
    };
    SYSTEM_REPORTS
        .iter()
        .find(|(name, _)| name == sub)
        .map(|(_, report)| report())
        .ok_or_else(|| CommandError::UnknownSystemSubcommand(sub.to_string()))
}

fn exit(_args: &[&str], device: &mut DeviceState) -> Result<String, CommandError> {
    device.shut_down();
    Ok("Goodbye!\r\n".to_string())
}
