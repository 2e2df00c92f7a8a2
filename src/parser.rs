//! Option parser: turns raw tokens into a [`ParsedArgv`].
//!
//! Built on the `clap` builder API with one `clap::Command` assembled per parse
//! from flag metadata. Flags are typed here. Command flag defaults are left to
//! the binder so absence stays observable; global flag defaults are filled in
//! so global callbacks see them as present keys.

use crate::error::KernelError;
use crate::metadata::{FlagDefinition, FlagType, Value};
use clap::{value_parser, Arg, ArgAction, ArgMatches};
use std::collections::{BTreeMap, HashSet};

const POSITIONALS: &str = "__positionals";

/// Output of a parse: leftover positional tokens plus typed flags keyed by their
/// exposed name (aliases already folded in)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgv {
    /// Positional tokens in input order (the `_` list)
    pub positionals: Vec<String>,
    pub flags: BTreeMap<String, Value>,
}

impl ParsedArgv {
    pub fn flag(&self, name: &str) -> Option<&Value> {
        self.flags.get(name)
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }
}

/// Parse `tokens` against a command's flags plus the global flags that do not
/// collide with them. Command flags win on collision.
pub fn parse_command<'a>(
    command_name: &str,
    flags: &'a [FlagDefinition],
    globals: impl IntoIterator<Item = &'a FlagDefinition>,
    tokens: &[String],
) -> Result<ParsedArgv, KernelError> {
    let flags = flags
        .iter()
        .map(|flag| (flag, false))
        .chain(globals.into_iter().map(|flag| (flag, true)));
    run(command_name, flags, tokens)
}

/// Parse an invocation that carries no command name.
pub fn parse_globals<'a>(
    globals: impl IntoIterator<Item = &'a FlagDefinition>,
    tokens: &[String],
) -> Result<ParsedArgv, KernelError> {
    run("global", globals.into_iter().map(|flag| (flag, true)), tokens)
}

/// `flags` pairs each definition with whether it is a global flag.
fn run<'a>(
    name: &str,
    flags: impl IntoIterator<Item = (&'a FlagDefinition, bool)>,
    tokens: &[String],
) -> Result<ParsedArgv, KernelError> {
    let mut cli = clap::Command::new(name.to_string())
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new(POSITIONALS)
                .num_args(1..)
                .action(ArgAction::Append)
                .value_parser(value_parser!(String))
                .allow_negative_numbers(true),
        );

    let mut taken: HashSet<String> = HashSet::new();
    let mut accepted: Vec<(&FlagDefinition, bool, bool)> = Vec::new();
    for (flag, global) in flags {
        let negation = format!("no-{}", flag.name);
        let mut identities = vec![flag.name.clone()];
        identities.extend(flag.alias.clone());
        if identities.iter().any(|id| taken.contains(id)) {
            tracing::debug!(flag = %flag.name, "skipping shadowed flag");
            continue;
        }
        let negatable = flag.flag_type == FlagType::Boolean && !taken.contains(&negation);

        cli = cli.arg(flag_arg(flag));
        if negatable {
            cli = cli.arg(
                Arg::new(negation.clone())
                    .long(negation.clone())
                    .action(ArgAction::SetTrue)
                    .hide(true),
            );
            identities.push(negation);
        }
        taken.extend(identities);
        accepted.push((flag, negatable, global));
    }

    let matches = cli
        .try_get_matches_from(tokens)
        .map_err(|e| KernelError::InvalidFlag {
            command: name.to_string(),
            message: first_line(&e.to_string()),
        })?;

    let mut parsed = ParsedArgv {
        positionals: matches
            .get_many::<String>(POSITIONALS)
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        flags: BTreeMap::new(),
    };
    for (flag, negatable, global) in accepted {
        let value = match extract(&matches, flag, negatable) {
            Some(value) => Some(value),
            None if global => flag.default.clone(),
            None => None,
        };
        if let Some(value) = value {
            parsed.flags.insert(flag.name.clone(), value);
        }
    }
    Ok(parsed)
}

fn flag_arg(flag: &FlagDefinition) -> Arg {
    let mut arg = Arg::new(flag.name.clone()).long(flag.name.clone());
    if matches!(
        flag.flag_type,
        FlagType::String | FlagType::Boolean | FlagType::Number
    ) {
        // Repeating a single-valued flag keeps the last occurrence.
        arg = arg.overrides_with(flag.name.clone());
    }
    if let Some(alias) = &flag.alias {
        let mut chars = alias.chars();
        arg = match (chars.next(), chars.next()) {
            (Some(short), None) => arg.short(short),
            _ => arg.alias(alias.clone()),
        };
    }

    match flag.flag_type {
        FlagType::String => arg
            .action(ArgAction::Set)
            .num_args(1)
            .value_parser(value_parser!(String)),
        // `--flag`, `--flag=true`, `--flag=false`; a following token is never
        // consumed as the value.
        FlagType::Boolean => arg
            .action(ArgAction::Set)
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_parser(parse_boolish),
        FlagType::Number => arg
            .action(ArgAction::Set)
            .num_args(1)
            .allow_negative_numbers(true)
            .value_parser(value_parser!(f64)),
        FlagType::Array => arg
            .action(ArgAction::Append)
            .num_args(1)
            .value_parser(value_parser!(String)),
        FlagType::NumArray => arg
            .action(ArgAction::Append)
            .num_args(1)
            .allow_negative_numbers(true)
            .value_parser(value_parser!(f64)),
    }
}

fn parse_boolish(raw: &str) -> Result<bool, String> {
    Ok(is_truthy(raw))
}

/// Any literal other than an empty or false-like word counts as true.
pub(crate) fn is_truthy(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    !matches!(lowered.as_str(), "" | "false" | "0" | "no" | "off" | "n")
}

fn extract(matches: &ArgMatches, flag: &FlagDefinition, negatable: bool) -> Option<Value> {
    let id = flag.name.as_str();
    match flag.flag_type {
        FlagType::Boolean => {
            if negatable && matches.get_flag(&format!("no-{}", id)) {
                return Some(Value::Boolean(false));
            }
            matches.get_one::<bool>(id).map(|b| Value::Boolean(*b))
        }
        FlagType::String => matches.get_one::<String>(id).cloned().map(Value::String),
        FlagType::Number => matches.get_one::<f64>(id).map(|n| Value::Number(*n)),
        FlagType::Array => matches
            .get_many::<String>(id)
            .map(|values| Value::List(values.cloned().collect())),
        FlagType::NumArray => matches
            .get_many::<f64>(id)
            .map(|values| Value::NumList(values.copied().collect())),
    }
}

fn first_line(rendered: &str) -> String {
    let line = rendered.lines().next().unwrap_or_default();
    line.trim_start_matches("error: ").to_string()
}
