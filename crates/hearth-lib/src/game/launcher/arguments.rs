/// Argument template expansion and placeholder substitution
use crate::game::manifest::Argument;
use crate::game::platform::PlatformDescriptor;
use crate::game::rules;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Placeholders the planner always fills in
pub const KNOWN_PLACEHOLDERS: &[&str] = &[
    "auth_player_name",
    "version_name",
    "game_directory",
    "assets_root",
    "assets_index_name",
    "auth_uuid",
    "auth_access_token",
    "user_type",
    "version_type",
    "user_properties",
    "quickPlayRealms",
    "natives_directory",
    "launcher_name",
    "launcher_version",
    "classpath",
    "classpath_separator",
    "library_directory",
];

const CLASSPATH_FLAGS: &[&str] = &["-cp", "-classpath", "--class-path"];

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("static regex"))
}

/// Expand a template for `platform`.
///
/// Literals are copied verbatim. A conditional contributes its value(s), in
/// order, only when its rules allow the platform.
pub fn expand_template(template: &[Argument], platform: &PlatformDescriptor) -> Vec<String> {
    let mut out = Vec::new();
    for arg in template {
        match arg {
            Argument::Literal(s) => out.push(s.clone()),
            Argument::Conditional { rules, value } => {
                if rules::evaluate(rules, platform) {
                    out.extend(value.values().iter().cloned());
                }
            }
        }
    }
    out
}

/// Legacy `minecraftArguments` are plain whitespace-separated tokens
pub fn split_legacy(arguments: &str) -> Vec<String> {
    arguments.split_whitespace().map(str::to_string).collect()
}

/// Replace every `${name}` with its value in a single pass.
/// Unknown names are left as they are.
pub fn substitute_variables(text: &str, variables: &HashMap<String, String>) -> String {
    placeholder_regex()
        .replace_all(text, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Placeholder names still present in `args`
pub fn unexpanded_placeholders(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| {
            placeholder_regex()
                .captures_iter(arg)
                .map(|caps| caps[1].to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Drop a classpath flag and its value; the planner places its own.
pub fn strip_classpath_flag(args: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if CLASSPATH_FLAGS.contains(&arg.as_str()) {
            iter.next();
            continue;
        }
        out.push(arg);
    }
    out
}

pub fn has_library_path(args: &[String]) -> bool {
    args.iter().any(|a| a.contains("-Djava.library.path"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::manifest::ArgumentValue;
    use crate::game::platform::OsFamily;
    use crate::game::rules::Rule;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn conditional_values_expand_in_order() {
        let template = vec![
            Argument::Literal("-Xss1M".to_string()),
            Argument::Conditional {
                rules: vec![Rule::allow().for_os("osx")],
                value: ArgumentValue::Multiple(vec![
                    "-XstartOnFirstThread".to_string(),
                    "-Dapple=1".to_string(),
                ]),
            },
            Argument::Conditional {
                rules: vec![Rule::allow().for_os("windows")],
                value: ArgumentValue::Single("-Dwin=1".to_string()),
            },
        ];

        let mac = PlatformDescriptor::new(OsFamily::MacOS, "aarch64");
        assert_eq!(
            expand_template(&template, &mac),
            vec!["-Xss1M", "-XstartOnFirstThread", "-Dapple=1"]
        );

        let linux = PlatformDescriptor::new(OsFamily::Linux, "x86_64");
        assert_eq!(expand_template(&template, &linux), vec!["-Xss1M"]);
    }

    #[test]
    fn substitution_is_single_pass() {
        let variables = vars(&[("a", "${b}"), ("b", "B")]);
        assert_eq!(substitute_variables("x${a}y", &variables), "x${b}y");
        assert_eq!(
            substitute_variables("--dir=${b} ${unknown}", &variables),
            "--dir=B ${unknown}"
        );
    }

    #[test]
    fn empty_values_substitute() {
        let variables = vars(&[("quickPlayRealms", "")]);
        assert_eq!(substitute_variables("${quickPlayRealms}", &variables), "");
    }

    #[test]
    fn finds_leftovers() {
        let args = vec!["--a".to_string(), "${left}over${two}".to_string()];
        assert_eq!(unexpanded_placeholders(&args), vec!["left", "two"]);
    }

    #[test]
    fn classpath_flag_removed_with_value() {
        let args: Vec<String> = ["-Dx=1", "-cp", "${classpath}", "-Dy=2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(strip_classpath_flag(args), vec!["-Dx=1", "-Dy=2"]);
    }

    #[test]
    fn legacy_split() {
        assert_eq!(
            split_legacy("  --username ${auth_player_name}\t--version  ${version_name} "),
            vec!["--username", "${auth_player_name}", "--version", "${version_name}"]
        );
    }
}
