//! Shell glob matching for `find -name`.
//!
//! `*` and `?` become `.*` and `.`; bracket classes pass through to the
//! regex engine (`[!...]` becomes `[^...]`). A `]` right after the opening
//! `[` or `[!` is a literal member, as in POSIX. Everything else is
//! literal. The pattern is anchored at both ends.

use regex::Regex;
use tracing::warn;

use crate::core::{VfsError, VfsResult};

/// Compile a glob into an anchored regex.
pub fn compile(glob: &str) -> VfsResult<Regex> {
    let source = translate(glob);
    Regex::new(&source).map_err(|err| {
        warn!(pattern = glob, "glob failed to compile");
        VfsError::invalid_pattern(glob, err.to_string())
    })
}

fn translate(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    out.push('^');

    let mut in_class = false;
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        if in_class {
            match c {
                ']' => {
                    in_class = false;
                    out.push(']');
                }
                // Class-set syntax in the regex engine, literal in a glob
                '\\' | '[' | '&' | '~' => {
                    out.push('\\');
                    out.push(c);
                }
                _ => out.push(c),
            }
            continue;
        }
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                in_class = true;
                out.push('[');
                if chars.peek() == Some(&'!') {
                    chars.next();
                    out.push('^');
                }
                if chars.peek() == Some(&']') {
                    chars.next();
                    out.push_str("\\]");
                }
            }
            other => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }

    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star() {
        let re = compile("*.txt").unwrap();
        assert!(re.is_match("one.txt"));
        assert!(re.is_match(".txt"));
        assert!(!re.is_match("one.txt.bak"));
        assert!(!re.is_match("onetxt"));
    }

    #[test]
    fn test_question_mark() {
        let re = compile("file?.log").unwrap();
        assert!(re.is_match("file1.log"));
        assert!(!re.is_match("file10.log"));
    }

    #[test]
    fn test_literal_metacharacters() {
        let re = compile("a+b(1).conf").unwrap();
        assert!(re.is_match("a+b(1).conf"));
        assert!(!re.is_match("aab1.conf"));
    }

    #[test]
    fn test_bracket_class() {
        let re = compile("log[0-9]").unwrap();
        assert!(re.is_match("log3"));
        assert!(!re.is_match("logx"));

        let negated = compile("[!a]*").unwrap();
        assert!(negated.is_match("bcd"));
        assert!(!negated.is_match("abc"));
    }

    #[test]
    fn test_leading_bracket_is_literal_member() {
        let re = compile("[]]*").unwrap();
        assert!(re.is_match("]tail"));
        assert!(!re.is_match("tail"));

        let negated = compile("[!]]").unwrap();
        assert!(negated.is_match("x"));
        assert!(!negated.is_match("]"));

        let open = compile("[[]x").unwrap();
        assert!(open.is_match("[x"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = compile("[abc").unwrap_err();
        assert!(matches!(err, VfsError::InvalidPattern { ref pattern, .. } if pattern == "[abc"));
    }
}
