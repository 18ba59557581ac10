//! Command-line lexing with in-place variable expansion.

use std::iter::Peekable;
use std::str::CharIndices;

use katamari_dispatch::Context;

use crate::error::ShellError;

/// Split `line` into words, expanding variables from `ctx` as they are read.
///
/// - `'...'` is literal: nothing inside is expanded or escaped.
/// - `"..."` expands variables; `\` escapes only `"`, `\` and `$`.
/// - Outside quotes, `\` escapes any character.
///
/// `$NAME`, `${NAME}` and `$?` read the context variables and `$CWD` is the
/// working directory. Unset names expand to nothing. Expanded text lands in
/// the current word as-is and is never split or lexed again.
pub fn split_line(line: &str, ctx: &Context) -> Result<Vec<String>, ShellError> {
    Lexer {
        src: line,
        chars: line.char_indices().peekable(),
        ctx,
    }
    .words()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    ctx: &'a Context,
}

impl Lexer<'_> {
    fn words(mut self) -> Result<Vec<String>, ShellError> {
        let mut words = Vec::new();
        let mut word = String::new();
        // Set by a quote so that `''` still yields a word.
        let mut quoted = false;
        let mut quote = Quote::None;

        while let Some((_, ch)) = self.chars.next() {
            match (quote, ch) {
                (Quote::Single, '\'') | (Quote::Double, '"') => quote = Quote::None,
                (Quote::Single, c) => word.push(c),
                (Quote::Double, '\\') => {
                    match self.chars.next_if(|&(_, c)| matches!(c, '"' | '\\' | '$')) {
                        Some((_, c)) => word.push(c),
                        None => word.push('\\'),
                    }
                },
                (Quote::None, '\\') => {
                    if let Some((_, c)) = self.chars.next() {
                        word.push(c);
                    }
                },
                (Quote::None, '\'') => {
                    quote = Quote::Single;
                    quoted = true;
                },
                (Quote::None, '"') => {
                    quote = Quote::Double;
                    quoted = true;
                },
                (Quote::None | Quote::Double, '$') => self.expand_into(&mut word),
                (Quote::None, c) if c.is_whitespace() => {
                    if !word.is_empty() || quoted {
                        words.push(std::mem::take(&mut word));
                        quoted = false;
                    }
                },
                (_, c) => word.push(c),
            }
        }

        match quote {
            Quote::Single => Err(ShellError::Tokenize("unterminated single quote".into())),
            Quote::Double => Err(ShellError::Tokenize("unterminated double quote".into())),
            Quote::None => {
                if !word.is_empty() || quoted {
                    words.push(word);
                }
                Ok(words)
            },
        }
    }

    /// Runs after a `$` has been consumed.
    fn expand_into(&mut self, word: &mut String) {
        if self.chars.next_if(|&(_, c)| c == '?').is_some() {
            word.push_str(self.ctx.var("?").unwrap_or("0"));
            return;
        }

        if let Some(&(open, '{')) = self.chars.peek() {
            let start = open + 1;
            // An unclosed `${` stays literal.
            let Some(len) = self.src[start..].find('}') else {
                word.push('$');
                return;
            };
            let close = start + len;
            while self.chars.next_if(|&(i, _)| i <= close).is_some() {}
            self.push_var(&self.src[start..close], word);
            return;
        }

        let mut name = String::new();
        while let Some((_, c)) = self.chars.next_if(|&(_, c)| c.is_alphanumeric() || c == '_') {
            name.push(c);
        }
        if name.is_empty() {
            word.push('$');
        } else {
            self.push_var(&name, word);
        }
    }

    fn push_var(&self, name: &str, word: &mut String) {
        match name {
            "CWD" => word.push_str(&self.ctx.cwd.display().to_string()),
            _ => word.push_str(self.ctx.var(name).unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        let mut ctx = Context::new("/home/user");
        ctx.set_var("NAME", "katamari");
        ctx.set_var("QUOTE", "it's");
        ctx.set_var("SPACED", "a  b");
        ctx
    }

    fn split(line: &str) -> Vec<String> {
        split_line(line, &ctx()).unwrap()
    }

    #[test]
    fn plain_words() {
        assert_eq!(split("hello world"), vec!["hello", "world"]);
        assert_eq!(split("  a\t\tb   c "), vec!["a", "b", "c"]);
    }

    #[test]
    fn blank_line_has_no_words() {
        assert!(split("").is_empty());
        assert!(split("   ").is_empty());
    }

    #[test]
    fn single_quotes_are_literal() {
        assert_eq!(split("echo '$NAME'"), vec!["echo", "$NAME"]);
        assert_eq!(split(r"echo '\$x'"), vec!["echo", r"\$x"]);
        assert_eq!(split("echo 'a \"b\" c'"), vec!["echo", "a \"b\" c"]);
    }

    #[test]
    fn double_quotes_expand() {
        assert_eq!(split(r#"echo "hi $NAME""#), vec!["echo", "hi katamari"]);
        assert_eq!(split(r#"echo "it's""#), vec!["echo", "it's"]);
    }

    #[test]
    fn double_quote_escapes() {
        assert_eq!(
            split(r#"echo "say \"hi\" \n \$NAME""#),
            vec!["echo", r#"say "hi" \n $NAME"#]
        );
    }

    #[test]
    fn backslash_outside_quotes() {
        assert_eq!(split(r"echo hello\ world"), vec!["echo", "hello world"]);
        assert_eq!(split(r"echo \$NAME"), vec!["echo", "$NAME"]);
    }

    #[test]
    fn adjacent_spans_join() {
        assert_eq!(split(r#"a'b'"c"d"#), vec!["abcd"]);
        assert_eq!(split("pre-$NAME-post"), vec!["pre-katamari-post"]);
    }

    #[test]
    fn empty_quotes_make_empty_word() {
        assert_eq!(split("set X ''"), vec!["set", "X", ""]);
        assert_eq!(split(r#"echo "$UNSET""#), vec!["echo", ""]);
    }

    #[test]
    fn unset_variable_outside_quotes_vanishes() {
        assert_eq!(split("echo $UNSET"), vec!["echo"]);
        assert_eq!(split("[$UNSET]"), vec!["[]"]);
    }

    #[test]
    fn expanded_quote_is_not_relexed() {
        assert_eq!(split("echo $QUOTE"), vec!["echo", "it's"]);
        assert_eq!(split("echo ${QUOTE}s"), vec!["echo", "it'ss"]);
    }

    #[test]
    fn expanded_whitespace_is_not_split() {
        assert_eq!(split("echo $SPACED"), vec!["echo", "a  b"]);
    }

    #[test]
    fn braced_and_special_names() {
        let mut c = ctx();
        c.set_var("?", "127");
        assert_eq!(
            split_line("${NAME}! $? $CWD", &c).unwrap(),
            vec!["katamari!", "127", "/home/user"]
        );
    }

    #[test]
    fn lone_dollar_and_unclosed_brace_are_literal() {
        assert_eq!(split("cost: $ 5 $"), vec!["cost:", "$", "5", "$"]);
        assert_eq!(split("${NAME"), vec!["${NAME"]);
        assert_eq!(split(r#""$""#), vec!["$"]);
    }

    #[test]
    fn unterminated_quotes() {
        assert!(matches!(
            split_line("echo 'oops", &ctx()),
            Err(ShellError::Tokenize(ref m)) if m == "unterminated single quote"
        ));
        assert!(matches!(
            split_line(r#"echo "oops"#, &ctx()),
            Err(ShellError::Tokenize(ref m)) if m == "unterminated double quote"
        ));
    }

    mod prop {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn double_quoted_variable_is_delivered_verbatim(value in "\\PC{0,40}") {
                let mut c = Context::default();
                c.set_var("V", &value);
                prop_assert_eq!(
                    split_line(r#"echo "$V""#, &c).unwrap(),
                    vec!["echo".to_string(), value]
                );
            }

            #[test]
            fn single_quoted_text_is_literal(text in "[^']{0,40}") {
                let line = format!("echo '{text}'");
                prop_assert_eq!(
                    split_line(&line, &ctx()).unwrap(),
                    vec!["echo".to_string(), text]
                );
            }
        }
    }
}
