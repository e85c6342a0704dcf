use serde::{Deserialize, Serialize};
use std::fmt;

/// A manifest-declared path translation hint
///
/// Serialized as `{"type": "directory_match", "source": "...", "target": "..."}`.
/// An unknown `type` fails deserialization instead of being skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Local directory `source` is stored remotely under `target`
    DirectoryMatch { source: String, target: String },
}

impl Rule {
    pub fn directory_match(source: impl Into<String>, target: impl Into<String>) -> Self {
        Rule::DirectoryMatch {
            source: source.into(),
            target: target.into(),
        }
    }

    /// The (from, to) directories for `direction`, without trailing slashes
    fn sides(&self, direction: Direction) -> (&str, &str) {
        match self {
            Rule::DirectoryMatch { source, target } => {
                let (from, to) = match direction {
                    Direction::LocalToRemote => (source, target),
                    Direction::RemoteToLocal => (target, source),
                };
                (from.trim_end_matches('/'), to.trim_end_matches('/'))
            }
        }
    }

    /// True when this rule claims every path in `direction` (its `from` side is the root)
    fn matches_everything(&self, direction: Direction) -> bool {
        self.sides(direction).0.is_empty()
    }

    /// Apply this rule to `path`, or `None` if it does not match
    ///
    /// An empty `from` side is the root directory: every path matches and
    /// is moved under `to`. This keeps `source -> ""` invertible.
    fn apply(&self, path: &str, direction: Direction) -> Option<String> {
        let (from, to) = self.sides(direction);
        let rest = if from.is_empty() {
            path
        } else {
            path.strip_prefix(from)?.strip_prefix('/')?
        };
        if to.is_empty() {
            Some(rest.to_string())
        } else {
            Some(format!("{to}/{rest}"))
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::DirectoryMatch { source, target } => {
                write!(f, "directory_match: {source}/ <-> {target}/")
            }
        }
    }
}

/// Which side a path is expressed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LocalToRemote,
    RemoteToLocal,
}

/// Translate `path` to the other side using the first matching rule
///
/// Rules whose `from` side is the root are tried after all others, so a
/// rule like `frontend -> ""` does not shadow more specific rules when
/// mapping remote paths back. Returns the path unchanged when no rule applies.
pub fn translate(path: &str, rules: &[Rule], direction: Direction) -> String {
    let (catch_all, specific): (Vec<&Rule>, Vec<&Rule>) = rules
        .iter()
        .partition(|rule| rule.matches_everything(direction));

    specific
        .into_iter()
        .chain(catch_all)
        .find_map(|rule| rule.apply(path, direction))
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_match_both_directions() {
        let rules = vec![Rule::directory_match("lib", "legacy")];

        assert_eq!(
            translate("lib/util.py", &rules, Direction::LocalToRemote),
            "legacy/util.py"
        );
        assert_eq!(
            translate("legacy/util.py", &rules, Direction::RemoteToLocal),
            "lib/util.py"
        );
    }

    #[test]
    fn test_no_match_is_identity() {
        let rules = vec![Rule::directory_match("lib", "legacy")];
        assert_eq!(
            translate("src/app.ts", &rules, Direction::LocalToRemote),
            "src/app.ts"
        );
        assert_eq!(translate("src/app.ts", &[], Direction::RemoteToLocal), "src/app.ts");
    }

    #[test]
    fn test_prefix_must_end_at_separator() {
        let rules = vec![Rule::directory_match("lib", "legacy")];
        assert_eq!(
            translate("library/util.py", &rules, Direction::LocalToRemote),
            "library/util.py"
        );
        // A bare directory name without a trailing file is not a match
        assert_eq!(translate("lib", &rules, Direction::LocalToRemote), "lib");
    }

    #[test]
    fn test_first_match_wins() {
        let rules = vec![
            Rule::directory_match("src", "app"),
            Rule::directory_match("src/components", "ui"),
        ];
        assert_eq!(
            translate("src/components/Header.tsx", &rules, Direction::LocalToRemote),
            "app/components/Header.tsx"
        );
    }

    #[test]
    fn test_trailing_slash_and_nested_prefixes() {
        let rules = vec![Rule::directory_match("gcf/user/", "functions/user")];
        assert_eq!(
            translate("gcf/user/main.py", &rules, Direction::LocalToRemote),
            "functions/user/main.py"
        );
    }

    #[test]
    fn test_empty_target_strips_prefix() {
        let rules = vec![Rule::directory_match("frontend", "")];
        assert_eq!(
            translate("frontend/src/App.tsx", &rules, Direction::LocalToRemote),
            "src/App.tsx"
        );
    }

    #[test]
    fn test_empty_target_maps_back_under_source() {
        let rules = vec![Rule::directory_match("frontend", "")];
        assert_eq!(
            translate("src/App.tsx", &rules, Direction::RemoteToLocal),
            "frontend/src/App.tsx"
        );
        assert_eq!(
            translate("index.html", &rules, Direction::RemoteToLocal),
            "frontend/index.html"
        );
    }

    #[test]
    fn test_rule_claimed_paths_round_trip() {
        let rules = vec![
            Rule::directory_match("frontend", ""),
            Rule::directory_match("lib", "legacy"),
            Rule::directory_match("gcf/user/", "functions/user"),
        ];
        for path in [
            "frontend/src/App.tsx",
            "frontend/index.html",
            "lib/util.py",
            "lib/nested/deep.py",
            "gcf/user/main.py",
        ] {
            let remote = translate(path, &rules, Direction::LocalToRemote);
            assert_ne!(remote, path);
            assert_eq!(translate(&remote, &rules, Direction::RemoteToLocal), path);
        }
    }

    #[test]
    fn test_root_rule_does_not_shadow_specific_rules() {
        // Listed first, but a remote legacy/ path still belongs to lib/
        let rules = vec![
            Rule::directory_match("frontend", ""),
            Rule::directory_match("lib", "legacy"),
        ];
        assert_eq!(
            translate("legacy/util.py", &rules, Direction::RemoteToLocal),
            "lib/util.py"
        );
    }

    #[test]
    fn test_translate_is_deterministic() {
        let rules = vec![
            Rule::directory_match("lib", "legacy"),
            Rule::directory_match("web", "frontend"),
        ];
        for path in ["lib/a.py", "web/b.ts", "c.js"] {
            let first = translate(path, &rules, Direction::LocalToRemote);
            let second = translate(path, &rules, Direction::LocalToRemote);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_rule_json_shape() {
        let rule = Rule::directory_match("lib", "legacy");
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "directory_match", "source": "lib", "target": "legacy"})
        );

        let unknown = serde_json::from_str::<Rule>(r#"{"type": "glob", "source": "a", "target": "b"}"#);
        assert!(unknown.is_err());
    }
}
