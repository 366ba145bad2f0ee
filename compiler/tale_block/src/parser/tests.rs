use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn var(name: &str) -> Expr {
    Expr::Var(name.to_string())
}

#[test]
fn test_precedence_chain() {
    assert_eq!(
        parse_expression("a or b and c"),
        Ok(binary(
            BinaryOp::Or,
            var("a"),
            binary(BinaryOp::And, var("b"), var("c"))
        ))
    );
    assert_eq!(
        parse_expression("x > 1 == true"),
        Ok(binary(
            BinaryOp::Eq,
            binary(BinaryOp::Gt, var("x"), Expr::Int(1)),
            Expr::Bool(true)
        ))
    );
}

#[test]
fn test_calls_and_dotted_names() {
    assert_eq!(
        parse_expression("MAX(mood.happy, 2)"),
        Ok(Expr::Call {
            name: "MAX".to_string(),
            args: vec![var("mood.happy"), Expr::Int(2)],
        })
    );
}

#[test]
fn test_statements() {
    assert_eq!(
        parse_statement("temp x = 1"),
        Ok(Statement::Assign {
            name: "x".to_string(),
            temp: true,
            value: Expr::Int(1),
        })
    );
    assert_eq!(parse_statement("return"), Ok(Statement::Return(None)));
    assert_eq!(
        parse_statement("go(1)"),
        Ok(Statement::Eval(Expr::Call {
            name: "go".to_string(),
            args: vec![Expr::Int(1)],
        }))
    );
}

#[test]
fn test_expected_expression_after_operator() {
    let err = parse_expression("1 +");
    assert_eq!(
        err,
        Err(ParseError::new(
            ErrorCode::E1002,
            "Expected expression after '+'",
            Span::new(2, 3)
        ))
    );
}

#[test]
fn test_unclosed_paren() {
    let err = parse_expression("(1 + 2");
    assert_eq!(err.map_err(|e| (e.code, e.span)), Err((ErrorCode::E1003, Span::new(0, 6))));
}

#[test]
fn test_trailing_garbage() {
    let err = parse_expression("1 2");
    assert_eq!(err.map_err(|e| e.message), Err("Unexpected '2'".to_string()));
    let err = parse_expression("1)");
    assert_eq!(err.map_err(|e| e.code), Err(ErrorCode::E1001));
}

#[test]
fn test_empty_input() {
    assert_eq!(
        parse_expression("   ").map_err(|e| e.code),
        Err(ErrorCode::E1002)
    );
}

proptest! {
    #[test]
    fn parsing_never_panics(source in "[a-z0-9 ()+*!<=>&|\"-]{0,40}") {
        let _ = parse_expression(&source);
        let _ = parse_statement(&source);
    }
}
