//! The console command grammar: one input line becomes one typed command.

use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use strum_macros::EnumString;
use strum_macros::IntoStaticStr;

/// The verbs the console understands. The strum serialization is the
/// user-facing verb token; matching is case-insensitive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum CommandKind {
    /// `ccget` — query a single property from the open data file.
    #[strum(serialize = "ccget")]
    DataQuery,
    /// `ccwrite` — convert the open data file to another format.
    #[strum(serialize = "ccwrite")]
    DataExport,
    /// `miew` — run a script in the panel's 3D viewer context.
    #[strum(serialize = "miew")]
    SceneScript,
    #[strum(serialize = "help")]
    Help,
    #[strum(serialize = "clear")]
    Clear,
}

impl CommandKind {
    /// The verb token as the user types it.
    pub fn verb(self) -> &'static str {
        self.into()
    }

    pub fn usage(self) -> &'static str {
        match self {
            CommandKind::DataQuery => "ccget <property> [file]",
            CommandKind::DataExport => "ccwrite <format> [file]",
            CommandKind::SceneScript => "miew <script...>",
            CommandKind::Help => "help",
            CommandKind::Clear => "clear",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CommandKind::DataQuery => "print one parsed property (e.g. `ccget natom`)",
            CommandKind::DataExport => "convert the open file (formats: json, xyz)",
            CommandKind::SceneScript => "run a viewer script (e.g. `miew rotate x 90`)",
            CommandKind::Help => "show this reference",
            CommandKind::Clear => "reset the output panels",
        }
    }
}

/// A parsed, typed representation of one user-submitted input line.
/// Immutable once parsed; consumed exactly once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    /// Remaining whitespace-delimited tokens, original order, case preserved.
    pub arguments: Vec<String>,
    pub raw_text: String,
    /// True when the first token matched no known verb and the line degraded
    /// to a help response. Lets callers tell "asked for help" from "typo"
    /// without changing the user-visible outcome.
    pub was_unrecognized: bool,
}

/// Parse one input line.
///
/// Forgiving by policy: an empty line or an unknown first token yields a
/// `Help` command rather than an error. There is no quoting or escaping, so
/// an argument cannot contain whitespace.
pub fn parse(raw: &str) -> Command {
    let mut tokens = raw.trim().split_whitespace();
    let Some(first) = tokens.next() else {
        return Command {
            kind: CommandKind::Help,
            arguments: Vec::new(),
            raw_text: raw.to_string(),
            was_unrecognized: false,
        };
    };

    match first.parse::<CommandKind>() {
        Ok(kind) => Command {
            kind,
            arguments: tokens.map(str::to_string).collect(),
            raw_text: raw.to_string(),
            was_unrecognized: false,
        },
        Err(_) => Command {
            kind: CommandKind::Help,
            arguments: Vec::new(),
            raw_text: raw.to_string(),
            was_unrecognized: true,
        },
    }
}

/// Static reference of supported verbs and examples, shown for `help` and
/// for unrecognized input.
pub fn help_text() -> String {
    let mut text = String::from("CCView console commands:\n");
    for kind in CommandKind::iter() {
        text.push_str(&format!("  {:<26} {}\n", kind.usage(), kind.description()));
    }
    text.push_str("\nProperties and formats are handled by the cclib backend.");
    text
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_known_verbs_case_insensitively() {
        assert_eq!(parse("ccget natom").kind, CommandKind::DataQuery);
        assert_eq!(parse("CCGET natom").kind, CommandKind::DataQuery);
        assert_eq!(parse("CcWrite json").kind, CommandKind::DataExport);
        assert_eq!(parse("miew rotate x 90").kind, CommandKind::SceneScript);
        assert_eq!(parse("HELP").kind, CommandKind::Help);
        assert_eq!(parse("clear").kind, CommandKind::Clear);
    }

    #[test]
    fn arguments_keep_order_and_case() {
        let cmd = parse("  ccget   scfEnergies   Water.LOG ");
        assert_eq!(cmd.arguments, vec!["scfEnergies", "Water.LOG"]);
        assert!(!cmd.was_unrecognized);
    }

    #[test]
    fn unknown_verb_degrades_to_help() {
        let cmd = parse("ccgte natom");
        assert_eq!(cmd.kind, CommandKind::Help);
        assert_eq!(cmd.arguments, Vec::<String>::new());
        assert!(cmd.was_unrecognized);
    }

    #[test]
    fn blank_line_is_help_but_not_a_typo() {
        for raw in ["", "   ", "\t"] {
            let cmd = parse(raw);
            assert_eq!(cmd.kind, CommandKind::Help);
            assert!(!cmd.was_unrecognized);
        }
    }

    #[test]
    fn help_text_lists_every_verb() {
        let text = help_text();
        for kind in CommandKind::iter() {
            assert!(text.contains(kind.verb()), "missing {}", kind.verb());
        }
    }
}
