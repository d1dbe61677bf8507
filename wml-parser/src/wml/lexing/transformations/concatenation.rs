//! Concatenation merge
//!
//!     `A + B` joins TEXT and QUOTED operands into a single token. Whitespace around
//!     the `+` is dropped, and a line break may follow the `+` so that long strings
//!     can continue on the next line. Between two TEXT operands one space is kept;
//!     as soon as either side of a join is QUOTED nothing is inserted. The merged
//!     token is QUOTED if any operand was.

use crate::wml::token::{Token, TokenKind};

fn is_operand(token: &Token) -> bool {
    match token.kind {
        TokenKind::Quoted => true,
        TokenKind::Text => !token.is_plus(),
        _ => false,
    }
}

fn skip(tokens: &[Token], mut index: usize, allow_line_break: bool) -> usize {
    while let Some(token) = tokens.get(index) {
        let skippable = token.kind == TokenKind::Whitespace
            || (allow_line_break && token.kind == TokenKind::EndOfLine);
        if !skippable {
            break;
        }
        index += 1;
    }
    index
}

/// Index of the operand continuing the chain after `tokens[index]`, if any.
fn next_operand(tokens: &[Token], index: usize) -> Option<usize> {
    let plus = skip(tokens, index + 1, false);
    if !tokens.get(plus)?.is_plus() {
        return None;
    }
    let operand = skip(tokens, plus + 1, true);
    tokens.get(operand).filter(|t| is_operand(t)).map(|_| operand)
}

pub fn merge_concatenations(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut index = 0;

    while index < tokens.len() {
        let token = &tokens[index];
        if !is_operand(token) {
            merged.push(token.clone());
            index += 1;
            continue;
        }

        let mut chain = token.clone();
        let mut previous_kind = token.kind;
        let mut last = index;
        while let Some(next) = next_operand(&tokens, last) {
            let operand = &tokens[next];
            if previous_kind == TokenKind::Text && operand.kind == TokenKind::Text {
                chain.content.push(' ');
            }
            chain.content.push_str(&operand.content);
            if operand.kind == TokenKind::Quoted {
                chain.kind = TokenKind::Quoted;
            }
            chain.span.end = operand.span.end;
            previous_kind = operand.kind;
            last = next;
        }

        merged.push(chain);
        index = last + 1;
    }

    merged
}

#[cfg(test)]
mod tests {
    use crate::wml::lexing::lex;
    use crate::wml::testing::kinds_and_contents;
    use crate::wml::token::TokenKind::*;

    #[test]
    fn text_operands_are_joined_with_a_space() {
        assert_eq!(kinds_and_contents(&lex("A + B")), vec![(Text, "A B".to_string())]);
    }

    #[test]
    fn quoted_operands_are_joined_directly() {
        assert_eq!(
            kinds_and_contents(&lex(r#""A"+"B""#)),
            vec![(Quoted, "AB".to_string())]
        );
    }

    #[test]
    fn mixed_chain_becomes_quoted() {
        assert_eq!(
            kinds_and_contents(&lex(r#"A + "B" + C + D"#)),
            vec![(Quoted, "ABC D".to_string())]
        );
    }

    #[test]
    fn chain_may_continue_on_next_line() {
        let tokens = lex("name=_ \"Elvish \" +\n    \"Fighter\"\n");
        assert_eq!(
            kinds_and_contents(&tokens),
            vec![
                (Text, "name=_".to_string()),
                (Whitespace, " ".to_string()),
                (Quoted, "Elvish Fighter".to_string()),
                (EndOfLine, "\n".to_string()),
            ]
        );
    }

    #[test]
    fn dangling_plus_is_left_alone() {
        assert_eq!(
            kinds_and_contents(&lex("A +")),
            vec![
                (Text, "A".to_string()),
                (Whitespace, " ".to_string()),
                (Text, "+".to_string()),
            ]
        );
    }

    #[test]
    fn merged_span_covers_the_chain() {
        let tokens = lex("x A + B y");
        assert_eq!(tokens[2].span, 2..7);
    }
}
