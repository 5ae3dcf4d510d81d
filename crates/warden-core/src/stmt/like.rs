//! `LIKE` pattern escaping and matching. The escape character is `\`.

pub(crate) const ESCAPE: char = '\\';

/// Escapes `text` so every character in it matches literally.
pub(crate) fn escape(text: &str) -> String {
    let mut ret = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | ESCAPE) {
            ret.push(ESCAPE);
        }
        ret.push(c);
    }
    ret
}

/// Matches `text` against an escaped pattern, case-sensitively.
pub(crate) fn matches(pattern: &str, text: &str) -> bool {
    let pattern = tokenize(pattern);
    let text: Vec<char> = text.chars().collect();
    matches_from(&pattern, &text)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Literal(char),
    AnyOne,
    AnyMany,
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = vec![];
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            ESCAPE => Token::Literal(chars.next().unwrap_or(ESCAPE)),
            '%' => Token::AnyMany,
            '_' => Token::AnyOne,
            c => Token::Literal(c),
        });
    }
    tokens
}

fn matches_from(pattern: &[Token], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((Token::AnyMany, rest)) => (0..=text.len()).any(|i| matches_from(rest, &text[i..])),
        Some((Token::AnyOne, rest)) => !text.is_empty() && matches_from(rest, &text[1..]),
        Some((Token::Literal(c), rest)) => {
            text.first() == Some(c) && matches_from(rest, &text[1..])
        }
    }
}
