use thiserror::Error;

use super::expr::Expr;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("line {line}: unexpected `)`")]
    UnexpectedClose { line: usize },
    #[error("unclosed `(` opened on line {line}")]
    UnclosedParen { line: usize },
}

/// Read every top-level expression of a source string.
///
/// Atoms are whatever sits between whitespace and parentheses; `;` starts a
/// comment that runs to the end of the line.
#[tracing::instrument(skip(source))]
pub fn read_program(source: &str) -> Result<Vec<Expr>, ReadError> {
    let mut top = Vec::new();
    let mut stack: Vec<(usize, Vec<Expr>)> = Vec::new();
    let mut line = 1;
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\n' => line += 1,
            c if c.is_whitespace() => {}
            ';' => {
                while chars.next_if(|&c| c != '\n').is_some() {}
            }
            '(' => stack.push((line, Vec::new())),
            ')' => {
                let (_, items) = stack.pop().ok_or(ReadError::UnexpectedClose { line })?;
                let list = Expr::List(items);
                match stack.last_mut() {
                    Some((_, parent)) => parent.push(list),
                    None => top.push(list),
                }
            }
            c => {
                let mut atom = String::from(c);
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || matches!(next, '(' | ')' | ';') {
                        break;
                    }
                    atom.push(next);
                    chars.next();
                }
                match stack.last_mut() {
                    Some((_, items)) => items.push(Expr::Atom(atom)),
                    None => top.push(Expr::Atom(atom)),
                }
            }
        }
    }

    if let Some((line, _)) = stack.last() {
        return Err(ReadError::UnclosedParen { line: *line });
    }
    Ok(top)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn atoms_and_lists() {
        let program = read_program("(+ 1 2)").unwrap();
        assert_eq!(
            program,
            vec![Expr::list(vec![
                Expr::atom("+"),
                Expr::atom("1"),
                Expr::atom("2"),
            ])]
        );
    }

    #[test]
    fn nesting() {
        let program = read_program("(print (* x (+ 1 2)))").unwrap();
        assert_eq!(
            program,
            vec![Expr::list(vec![
                Expr::atom("print"),
                Expr::list(vec![
                    Expr::atom("*"),
                    Expr::atom("x"),
                    Expr::list(vec![Expr::atom("+"), Expr::atom("1"), Expr::atom("2")]),
                ]),
            ])]
        );
    }

    #[test]
    fn multiple_top_level_expressions() {
        let program = read_program("(let (x 5) 0)\nx\n").unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program[1], Expr::atom("x"));
    }

    #[test]
    fn comments() {
        let program = read_program("; adds\n(+ 1 2) ; inline\n").unwrap();
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn unexpected_close() {
        assert_eq!(
            read_program("(+ 1 2))"),
            Err(ReadError::UnexpectedClose { line: 1 })
        );
    }

    #[test]
    fn unclosed_paren() {
        assert_eq!(
            read_program("(+ 1\n  (+ 2"),
            Err(ReadError::UnclosedParen { line: 2 })
        );
    }
}
