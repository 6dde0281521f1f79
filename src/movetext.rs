//! Movetext tokenizer: strips move numbers, comments, variations, NAGs and
//! result markers, leaving bare SAN tokens in order.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MovetextError {
    #[error("unterminated `{{` comment")]
    UnclosedComment,
    #[error("unbalanced variation parentheses")]
    UnbalancedVariation,
}

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

pub fn san_tokens(text: &str) -> Result<Vec<String>, MovetextError> {
    let mut cleaned = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if !chars.by_ref().any(|c| c == '}') { return Err(MovetextError::UnclosedComment); }
                cleaned.push(' ');
            }
            ';' => {
                for c in chars.by_ref() { if c == '\n' { break; } }
                cleaned.push(' ');
            }
            '(' => { depth += 1; cleaned.push(' '); }
            ')' => {
                depth = depth.checked_sub(1).ok_or(MovetextError::UnbalancedVariation)?;
                cleaned.push(' ');
            }
            _ if depth > 0 => {}
            _ => cleaned.push(c),
        }
    }
    if depth > 0 { return Err(MovetextError::UnbalancedVariation); }

    let mut tokens = Vec::new();
    for raw in cleaned.split_whitespace() {
        if RESULTS.contains(&raw) { break; }
        if raw.starts_with('$') { continue; }
        let digits = raw.len() - raw.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let san = if digits > 0 && raw[digits..].starts_with('.') { raw[digits..].trim_start_matches('.') } else { raw };
        if !san.is_empty() { tokens.push(san.to_string()); }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_numbers_attached_or_not() {
        assert_eq!(san_tokens("1.e4 e5 2.Nf3 Nc6").unwrap(), ["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(san_tokens("1. e4 e5 2. Nf3").unwrap(), ["e4", "e5", "Nf3"]);
        assert_eq!(san_tokens("12...Nf6 13.O-O").unwrap(), ["Nf6", "O-O"]);
    }

    #[test]
    fn castling_with_zeros_is_not_a_move_number() {
        assert_eq!(san_tokens("5.0-0 0-0-0").unwrap(), ["0-0", "0-0-0"]);
    }

    #[test]
    fn skips_comments_variations_nags_and_result() {
        let text = "1.e4 {best by test} e5 (1...c5 2.Nf3 (2.c3)) 2.Nf3 $1 ; trailing\nNc6 1-0 3.Bb5";
        assert_eq!(san_tokens(text).unwrap(), ["e4", "e5", "Nf3", "Nc6"]);
    }

    #[test]
    fn unbalanced_input_is_an_error() {
        assert_eq!(san_tokens("1.e4 {oops"), Err(MovetextError::UnclosedComment));
        assert_eq!(san_tokens("1.e4 (e5"), Err(MovetextError::UnbalancedVariation));
        assert_eq!(san_tokens("1.e4 e5)"), Err(MovetextError::UnbalancedVariation));
    }

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(san_tokens("   ").unwrap().is_empty());
    }
}
