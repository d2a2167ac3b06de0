// iOS Tunnel Manager - Shell Command Construction
// Every argument handed to the elevated shell goes through quote()

/// Quote a single argument for a POSIX shell.
///
/// Safe arguments pass through unchanged; anything else is wrapped in
/// single quotes, with embedded single quotes spliced as `'\''`.
pub fn quote(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(is_safe_char) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Quote each argument and join with single spaces.
pub fn join<I, S>(argv: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    argv.into_iter()
        .map(|arg| quote(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a shell command string back into arguments.
///
/// Inverse of `join` for the quoting subset produced here: single quotes,
/// double quotes, and backslash escapes. Returns `None` on an unterminated
/// quote or a trailing backslash.
pub fn split(input: &str) -> Option<Vec<String>> {
    let mut argv = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    argv.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return None,
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\' | '$' | '`')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => return None,
                        },
                        Some(c) => current.push(c),
                        None => return None,
                    }
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(c) => current.push(c),
                    None => return None,
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        argv.push(current);
    }
    Some(argv)
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '=' | '@' | ',' | '%' | '+')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_arguments_pass_through() {
        assert_eq!(quote("pymobiledevice3"), "pymobiledevice3");
        assert_eq!(quote("/tmp/tunnel.log"), "/tmp/tunnel.log");
        assert_eq!(quote("start-tunnel"), "start-tunnel");
    }

    #[test]
    fn empty_argument_stays_an_argument() {
        assert_eq!(quote(""), "''");
        assert_eq!(split("''").unwrap(), vec![""]);
    }

    #[test]
    fn metacharacters_are_quoted() {
        assert_eq!(quote("a b"), "'a b'");
        assert_eq!(quote("$(reboot)"), "'$(reboot)'");
        assert_eq!(quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn quote_split_round_trip() {
        let cases = [
            "plain",
            "with space",
            "single'quote",
            "double\"quote",
            "$VAR and `cmd` and ; rm -rf /",
            "new\nline",
            "trailing\\backslash",
            "",
        ];
        for case in cases {
            let joined = join([case]);
            assert_eq!(split(&joined).unwrap(), vec![case], "case: {case:?}");
        }
    }

    #[test]
    fn join_round_trips_full_argv() {
        let argv = ["python3", "-m", "pymobiledevice3", "lock down", "a'b\"c"];
        let joined = join(argv);
        assert_eq!(split(&joined).unwrap(), argv);
    }

    #[test]
    fn split_handles_double_quotes_and_escapes() {
        assert_eq!(
            split(r#"kill -TERM "12 34" \;"#).unwrap(),
            vec!["kill", "-TERM", "12 34", ";"]
        );
    }

    #[test]
    fn split_rejects_unterminated_quote() {
        assert!(split("'open").is_none());
        assert!(split("\"open").is_none());
        assert!(split("dangling\\").is_none());
    }
}
