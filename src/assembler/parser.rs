use std::str::FromStr;

use crate::ast::{Directive, Instruction, Line, Mnemonic};

use super::addressing::parse_literal;
use super::{ErrorKind, LineError};

/// Parse assembly text into numbered [`Line`]s.
///
/// One text line holds at most a label and one instruction or directive.
/// Full-line comments survive as [`Line::Comment`]; a comment trailing code
/// is dropped. Errors are collected per line instead of aborting at the
/// first one.
#[tracing::instrument(skip(source))]
pub fn parse_source(source: &str) -> (Vec<(usize, Line)>, Vec<LineError>) {
    let mut lines = Vec::new();
    let mut errors = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        let (code, comment) = match raw.split_once(';') {
            Some((code, comment)) => (code, Some(comment)),
            None => (raw, None),
        };
        let code = code.trim();
        if code.is_empty() {
            if let Some(comment) = comment {
                lines.push((line_no, Line::Comment(comment.trim().to_string())));
            }
            continue;
        }
        match parse_code(code) {
            Ok(parsed) => lines.extend(parsed.into_iter().map(|line| (line_no, line))),
            Err(kind) => errors.push(LineError {
                line: line_no,
                kind,
            }),
        }
    }
    (lines, errors)
}

/// A code fragment: a label, an instruction or a directive, or a label
/// followed by one of the latter two.
fn parse_code(code: &str) -> Result<Vec<Line>, ErrorKind> {
    let mut lines = Vec::new();
    let mut rest = code;
    if let Some((head, tail)) = code.split_once(':') {
        let label = head.trim();
        if !is_identifier(label) {
            return Err(ErrorKind::MalformedLabel(label.to_string()));
        }
        lines.push(Line::label(label));
        rest = tail.trim();
    }
    if !rest.is_empty() {
        if rest.starts_with('.') {
            lines.push(parse_directive(rest)?);
        } else {
            lines.push(parse_instruction(rest)?);
        }
    }
    Ok(lines)
}

fn parse_directive(code: &str) -> Result<Line, ErrorKind> {
    let mut parts = code.split_whitespace();
    let name = parts.next().unwrap_or_default();
    if name != ".org" {
        return Err(ErrorKind::UnknownDirective(name.to_string()));
    }
    let address = parts
        .next()
        .and_then(parse_literal)
        .ok_or_else(|| ErrorKind::MalformedDirective(code.to_string()))?;
    if parts.next().is_some() {
        return Err(ErrorKind::MalformedDirective(code.to_string()));
    }
    Ok(Line::Directive(Directive::Origin(address)))
}

fn parse_instruction(code: &str) -> Result<Line, ErrorKind> {
    let (text, rest) = match code.split_once(char::is_whitespace) {
        Some((text, rest)) => (text, rest.trim()),
        None => (code, ""),
    };
    let mnemonic =
        Mnemonic::from_str(text).map_err(|_| ErrorKind::UnknownMnemonic(text.to_string()))?;
    let operand = if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    };
    Ok(Line::Instruction(Instruction::new(mnemonic, operand)))
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn instructions() {
        let (lines, errors) = parse_source("  LDA #$05\n  BRK\n");
        assert_eq!(errors, vec![]);
        assert_eq!(
            lines,
            vec![
                (1, Line::instruction(Mnemonic::LDA, "#$05")),
                (2, Line::implied(Mnemonic::BRK)),
            ]
        );
    }

    #[test]
    fn label_with_trailing_instruction() {
        let (lines, errors) = parse_source("loop: DEC $80\n");
        assert_eq!(errors, vec![]);
        assert_eq!(
            lines,
            vec![
                (1, Line::label("loop")),
                (1, Line::instruction(Mnemonic::DEC, "$80")),
            ]
        );
    }

    #[test]
    fn comments_and_blanks() {
        let source = "; header\n\n  LDA #$01 ; trailing comments are dropped\n";
        let (lines, errors) = parse_source(source);
        assert_eq!(errors, vec![]);
        assert_eq!(
            lines,
            vec![
                (1, Line::Comment("header".to_string())),
                (3, Line::instruction(Mnemonic::LDA, "#$01")),
            ]
        );
    }

    #[test]
    fn org_directive() {
        let (lines, errors) = parse_source(".org $0800\n");
        assert_eq!(errors, vec![]);
        assert_eq!(lines, vec![(1, Line::Directive(Directive::Origin(0x0800)))]);
    }

    #[test]
    fn bad_lines_are_collected() {
        let source = "  LOL #$05\n  LDA #$01\n.word $10\nmov: NOP\n";
        let (lines, errors) = parse_source(source);
        assert_eq!(
            lines,
            vec![
                (2, Line::instruction(Mnemonic::LDA, "#$01")),
                (4, Line::label("mov")),
                (4, Line::implied(Mnemonic::NOP)),
            ]
        );
        assert_eq!(
            errors,
            vec![
                LineError {
                    line: 1,
                    kind: ErrorKind::UnknownMnemonic("LOL".to_string()),
                },
                LineError {
                    line: 3,
                    kind: ErrorKind::UnknownDirective(".word".to_string()),
                },
            ]
        );
    }

    #[test]
    fn malformed_labels() {
        let (_, errors) = parse_source("1up: NOP\n");
        assert_eq!(
            errors,
            vec![LineError {
                line: 1,
                kind: ErrorKind::MalformedLabel("1up".to_string()),
            }]
        );
    }
}
