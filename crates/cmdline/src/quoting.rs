//! Join and split argument vectors using double-quote / backslash-quote rules.
//!
//! The grammar is deliberately small: whitespace separates tokens, `"` opens and
//! closes a span in which whitespace is literal, and `\"` is a literal quote
//! anywhere. There is no support for `--flag=value` compaction, pipes, globbing
//! or variable expansion.

use crate::error::QuoteError;

/// Renders `args` as a single line that [`split`] turns back into the same tokens.
///
/// Arguments containing whitespace are wrapped in double quotes, literal quotes are
/// escaped with a backslash, and the empty argument renders as `""`.
pub fn join<I, S>(args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (index, arg) in args.into_iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        quote_into(&mut out, arg.as_ref());
    }
    out
}

/// Quotes a single argument with the same rules as [`join`].
pub fn quote(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    quote_into(&mut out, arg);
    out
}

fn quote_into(out: &mut String, arg: &str) {
    if arg.is_empty() {
        out.push_str("\"\"");
        return;
    }

    let wrap = arg.chars().any(char::is_whitespace);
    if wrap {
        out.push('"');
    }
    for ch in arg.chars() {
        if ch == '"' {
            out.push('\\');
        }
        out.push(ch);
    }
    if wrap {
        out.push('"');
    }
}

/// Tokenizes a line produced by [`join`] (or typed by a user) into arguments.
///
/// Fails with [`QuoteError::UnterminatedQuote`] when a quoted span is never closed.
pub fn split(command: &str) -> Result<Vec<String>, QuoteError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut open_quote: Option<usize> = None;

    let mut chars = command.char_indices().peekable();
    while let Some((offset, ch)) = chars.next() {
        match ch {
            '\\' if matches!(chars.peek(), Some((_, '"'))) => {
                chars.next();
                current.push('"');
                in_token = true;
            }
            '"' => {
                open_quote = match open_quote {
                    Some(_) => None,
                    None => Some(offset),
                };
                in_token = true;
            }
            c if open_quote.is_none() && is_separator(c) => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if let Some(offset) = open_quote {
        return Err(QuoteError::UnterminatedQuote { offset });
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn is_separator(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_leaves_plain_words_bare() {
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("--flag"), "--flag");
        assert_eq!(quote("C:\\dir\\file"), "C:\\dir\\file");
    }

    #[test]
    fn quote_escapes_quotes_without_wrapping_when_no_whitespace() {
        assert_eq!(quote("a\"b"), "a\\\"b");
    }

    #[test]
    fn quote_wraps_whitespace_and_empty() {
        assert_eq!(quote("two words"), "\"two words\"");
        assert_eq!(quote("tab\there"), "\"tab\there\"");
        assert_eq!(quote(""), "\"\"");
    }

    #[test]
    fn split_collapses_separator_runs() {
        assert_eq!(
            split("  a \t b\r\n c  ").unwrap(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn split_joins_adjacent_quoted_and_bare_text() {
        assert_eq!(split("pre\"fix suf\"fix").unwrap(), vec!["prefix suffix"]);
    }

    #[test]
    fn split_keeps_lone_backslashes() {
        assert_eq!(split("a\\b \\").unwrap(), vec!["a\\b", "\\"]);
    }

    #[test]
    fn split_reports_offset_of_unclosed_quote() {
        assert_eq!(
            split("ok \"never closed"),
            Err(QuoteError::UnterminatedQuote { offset: 3 })
        );
    }
}
