use std::fmt;

/// A node of the program the compiler walks: an atom (number or variable) or
/// an application `(op arg ...)`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Expr {
    Atom(String),
    List(Vec<Expr>),
}

impl Expr {
    pub fn atom(text: impl Into<String>) -> Expr {
        Expr::Atom(text.into())
    }

    pub fn list(items: Vec<Expr>) -> Expr {
        Expr::List(items)
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Expr::Atom(text) => Some(text),
            Expr::List(_) => None,
        }
    }

    /// Operator name of an application, when its head is an atom.
    pub fn head(&self) -> Option<&str> {
        match self {
            Expr::List(items) => items.first().and_then(Expr::as_atom),
            Expr::Atom(_) => None,
        }
    }

    /// Arguments of an application.
    pub fn args(&self) -> &[Expr] {
        match self {
            Expr::List(items) if !items.is_empty() => &items[1..],
            _ => &[],
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Atom(text) => write!(f, "{}", text),
            Expr::List(items) => {
                write!(f, "(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// The closed set of operators and special forms the compiler understands.
///
/// Anything else is an unknown-operator error, never silently skipped.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, strum_macros::EnumString, strum_macros::Display)]
pub enum Form {
    #[strum(to_string = "+")]
    Add,
    #[strum(to_string = "-")]
    Sub,
    #[strum(to_string = "*")]
    Mul,
    #[strum(to_string = "=")]
    Eq,
    #[strum(to_string = "<")]
    Lt,
    #[strum(to_string = ">")]
    Gt,
    #[strum(to_string = "if")]
    If,
    #[strum(to_string = "let")]
    Let,
    #[strum(to_string = "print")]
    Print,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn heads_and_args() {
        let expr = Expr::list(vec![Expr::atom("+"), Expr::atom("1"), Expr::atom("2")]);
        assert_eq!(expr.head(), Some("+"));
        assert_eq!(expr.args(), &[Expr::atom("1"), Expr::atom("2")]);
        assert_eq!(Expr::atom("x").head(), None);
        assert_eq!(Expr::atom("x").args(), &[]);
    }

    #[test]
    fn display() {
        let expr = Expr::list(vec![
            Expr::atom("if"),
            Expr::list(vec![Expr::atom("<"), Expr::atom("1"), Expr::atom("2")]),
            Expr::atom("10"),
            Expr::atom("20"),
        ]);
        assert_eq!(expr.to_string(), "(if (< 1 2) 10 20)");
    }

    #[test]
    fn forms() {
        assert_eq!(Form::from_str("+"), Ok(Form::Add));
        assert_eq!(Form::from_str("let"), Ok(Form::Let));
        assert_eq!(Form::from_str("print"), Ok(Form::Print));
        assert!(Form::from_str("launch").is_err());
        assert_eq!(Form::Lt.to_string(), "<");
    }
}
