//! `help` and `list`, registered in every new registry.

use super::{CommandDef, CommandDescriptor, CommandRegistry, ParamKind, ParamSpec};

pub(super) fn definitions() -> Vec<CommandDef> {
    vec![
        CommandDef::new("help")
            .description("Show available commands")
            .usage("//help [command_name]")
            .param(ParamSpec::optional("command_name", ParamKind::Str))
            .handler(|inv| {
                Ok(Some(match inv.args.str("command_name") {
                    Some(name) => command_help(inv.registry, name),
                    None => overview(inv.registry),
                }))
            }),
        CommandDef::new("list")
            .description("List all available commands")
            .handler(|inv| Ok(Some(sorted_listing(inv.registry)))),
    ]
}

/// One line per command, in registration order.
pub(crate) fn overview(registry: &CommandRegistry) -> String {
    let mut out = String::from("Available Commands:\n");
    for cmd in registry.descriptors() {
        out.push_str(&format!("  //{} - {}\n", cmd.name, cmd.description));
    }
    out.push_str("\nUse //help <command_name> for detailed help on a specific command.");
    out
}

/// Detailed help for a single command.
pub(crate) fn command_help(registry: &CommandRegistry, name: &str) -> String {
    match registry.descriptor(name.trim_start_matches('/')) {
        Some(cmd) => describe(cmd),
        None => format!("Command '{name}' not found."),
    }
}

fn describe(cmd: &CommandDescriptor) -> String {
    let mut out = format!("//{} - {}\n", cmd.name, cmd.description);
    if !cmd.usage.is_empty() {
        out.push_str(&format!("Usage: {}\n", cmd.usage));
    }
    if !cmd.parameters.is_empty() {
        out.push_str("Parameters:\n");
        for param in &cmd.parameters {
            let required = if param.required { "required" } else { "optional" };
            let default = param
                .default
                .as_ref()
                .map(|value| format!(" (default: {value})"))
                .unwrap_or_default();
            out.push_str(&format!(
                "  - {}: {} ({required}){default}\n",
                param.name,
                param.kind.label()
            ));
        }
    }
    out
}

fn sorted_listing(registry: &CommandRegistry) -> String {
    let mut names = registry.list_names();
    if names.is_empty() {
        return "No commands available.".to_string();
    }
    names.sort();
    let mut out = String::from("Available Commands:\n");
    for name in names {
        out.push_str(&format!("  //{name}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::commands::{CommandDef, CommandRegistry, ParamKind, ParamSpec};

    #[test]
    fn help_overview_lists_every_command() {
        let registry = CommandRegistry::new();
        let out = registry.execute("help");
        assert!(out.contains("//help - Show available commands"), "got: {out}");
        assert!(out.contains("//list - List all available commands"), "got: {out}");
    }

    #[test]
    fn help_for_one_command_shows_parameters() {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                CommandDef::new("analyze")
                    .description("Analyze code")
                    .usage("//analyze <code> [language]")
                    .param(ParamSpec::required("code", ParamKind::Str))
                    .param(ParamSpec::with_default("language", ParamKind::Str, "python"))
                    .handler(|_| Ok(None)),
            )
            .unwrap();

        let out = registry.execute("help analyze");
        assert!(out.contains("Usage: //analyze <code> [language]"), "got: {out}");
        assert!(out.contains("  - code: string (required)"), "got: {out}");
        assert!(
            out.contains("  - language: string (optional) (default: python)"),
            "got: {out}"
        );
    }

    #[test]
    fn help_for_unknown_command() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.execute("help nope"), "Command 'nope' not found.");
    }

    #[test]
    fn list_sorts_names() {
        let mut registry = CommandRegistry::new();
        registry
            .register(CommandDef::new("config").handler(|_| Ok(None)))
            .unwrap();
        assert_eq!(
            registry.execute("list"),
            "Available Commands:\n  //config\n  //help\n  //list\n"
        );
    }
}
