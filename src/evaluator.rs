use crate::Error;
use crate::ast::{Expr, Lambda};
use crate::builtinops::{Arity, all_builtins, call_builtin};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to an environment frame.
///
/// Frames are shared, not copied: a closure keeps its defining frame alive
/// through this handle, and a later `define` in that frame is visible to
/// every closure holding it. Recursive definitions work through exactly
/// this sharing: by the time the body of
/// `(define fact (lambda (n) ... (fact ...)))` runs, `fact` is bound in
/// the frame the closure captured.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One frame of the environment chain
#[derive(Debug, Default)]
pub struct Environment {
    bindings: HashMap<String, Expr>,
    parent: Option<EnvRef>,
}

impl Environment {
    /// Create the child frame used for one callable invocation
    pub(crate) fn child(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            bindings: HashMap::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Look up a name through the frame chain, distinguishing unbound
    /// names from names bound to nil
    fn lookup(&self, name: &str) -> Option<Expr> {
        if let Some(value) = self.bindings.get(name) {
            return Some(value.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().lookup(name))
    }

    /// Read a variable; unbound names read as nil
    pub(crate) fn get(&self, name: &str) -> Expr {
        self.lookup(name).unwrap_or(Expr::Nil)
    }

    /// Bind or overwrite a name in this frame only
    pub(crate) fn put(&mut self, name: &str, value: Expr) {
        self.bindings.insert(name.to_owned(), value);
    }
}

/// Create the root environment with every builtin bound under both of
/// its spellings.
pub fn create_root_env() -> EnvRef {
    let mut root = Environment::default();
    for op in all_builtins() {
        root.put(op.name, Expr::Builtin(op));
        root.put(op.alias, Expr::Builtin(op));
    }
    Rc::new(RefCell::new(root))
}

/// Evaluate one expression in the given environment.
///
/// # Example
/// ```
/// use minilisp::ast::Expr;
/// use minilisp::evaluator::{create_root_env, eval};
/// use minilisp::parser::parse_program;
///
/// let env = create_root_env();
/// let program = parse_program("(define x 4) (* x 10)").unwrap();
/// let mut last = Expr::Nil;
/// for form in &program {
///     last = eval(form, &env).unwrap();
/// }
/// assert_eq!(last, Expr::Integer(40));
/// ```
pub fn eval(expr: &Expr, env: &EnvRef) -> Result<Expr, Error> {
    match expr {
        // Self-evaluating forms
        Expr::Nil | Expr::Integer(_) | Expr::Float(_) | Expr::Builtin(_) | Expr::Lambda(_) => {
            Ok(expr.clone())
        }

        // Variable lookup; unbound names read as nil
        Expr::Symbol(name) => Ok(env.borrow().get(name)),

        // Special forms and callable application
        Expr::List(elements) => eval_list(elements, env),
    }
}

/// Evaluate a compound form.
///
/// Special form names are syntax, not bindings: they are recognized here
/// before any environment lookup, so no binding can shadow them. A
/// `define` of the name `if` creates an ordinary variable while `(if ...)`
/// keeps meaning the conditional.
fn eval_list(elements: &[Expr], env: &EnvRef) -> Result<Expr, Error> {
    let [head, args @ ..] = elements else {
        return Err(Error::TypeError(
            "Cannot evaluate the empty list".to_owned(),
        ));
    };

    let Expr::Symbol(name) = head else {
        return Err(Error::TypeError(format!(
            "Form head must be a symbol, got {head}"
        )));
    };

    match name.as_str() {
        "quote" => eval_quote(args),
        "define" => eval_define(args, env),
        "set!" => eval_set(args, env),
        "progn" => eval_progn(args, env),
        "if" => eval_if(args, env),
        "while" => eval_while(args, env),
        "lambda" => eval_lambda(args, env),
        _ => apply(name, args, env),
    }
}

/// Evaluate quote: return the argument verbatim
fn eval_quote(args: &[Expr]) -> Result<Expr, Error> {
    match args {
        [expr] => Ok(expr.clone()),
        _ => Err(Error::arity("quote", Arity::Exact(1), args.len())),
    }
}

/// Evaluate define: bind a new name in the current frame.
///
/// The name must not already resolve to a non-nil value anywhere in the
/// frame chain, and the check runs before the value expression, so a
/// rejected define evaluates nothing. Names bound to nil count as free.
fn eval_define(args: &[Expr], env: &EnvRef) -> Result<Expr, Error> {
    match args {
        [Expr::Symbol(name), value_expr] => {
            if !env.borrow().get(name).is_nil() {
                return Err(Error::DuplicateDefinition(name.clone()));
            }
            let value = eval(value_expr, env)?;
            env.borrow_mut().put(name, value);
            Ok(Expr::Nil)
        }
        [_, _] => Err(Error::TypeError(
            "define requires a symbol name".to_owned(),
        )),
        _ => Err(Error::arity("define", Arity::Exact(2), args.len())),
    }
}

/// Evaluate set!: evaluate the value and write the binding into the
/// current frame. There is no duplicate check, and the write never
/// follows the chain: setting a name seen from an outer frame shadows it
/// locally instead of mutating the outer binding.
fn eval_set(args: &[Expr], env: &EnvRef) -> Result<Expr, Error> {
    match args {
        [Expr::Symbol(name), value_expr] => {
            let value = eval(value_expr, env)?;
            env.borrow_mut().put(name, value);
            Ok(Expr::Nil)
        }
        [_, _] => Err(Error::TypeError("set! requires a symbol name".to_owned())),
        _ => Err(Error::arity("set!", Arity::Exact(2), args.len())),
    }
}

/// Evaluate progn: run each expression in order in the current frame,
/// yielding the last result (nil when there are none)
fn eval_progn(args: &[Expr], env: &EnvRef) -> Result<Expr, Error> {
    let mut result = Expr::Nil;
    for expr in args {
        result = eval(expr, env)?;
    }
    Ok(result)
}

/// A condition is true iff it is a nonzero number; every non-numeric
/// condition is a type error, nil included
fn is_truthy(form: &str, value: &Expr) -> Result<bool, Error> {
    match value {
        Expr::Integer(n) => Ok(*n != 0),
        Expr::Float(x) => Ok(*x != 0.0),
        other => Err(Error::TypeError(format!(
            "'{form}' condition must be numeric, got {other}"
        ))),
    }
}

/// Evaluate if: a condition and exactly two branches, only one of which
/// runs
fn eval_if(args: &[Expr], env: &EnvRef) -> Result<Expr, Error> {
    match args {
        [condition_expr, then_expr, else_expr] => {
            let condition = eval(condition_expr, env)?;
            if is_truthy("if", &condition)? {
                eval(then_expr, env)
            } else {
                eval(else_expr, env)
            }
        }
        _ => Err(Error::arity("if", Arity::Exact(3), args.len())),
    }
}

/// Evaluate while: re-evaluate the condition before every iteration,
/// then the body; always returns nil
fn eval_while(args: &[Expr], env: &EnvRef) -> Result<Expr, Error> {
    match args {
        [condition_expr, body_expr] => loop {
            let condition = eval(condition_expr, env)?;
            if !is_truthy("while", &condition)? {
                return Ok(Expr::Nil);
            }
            eval(body_expr, env)?;
        },
        _ => Err(Error::arity("while", Arity::Exact(2), args.len())),
    }
}

/// Evaluate lambda: validate the parameter list and capture the current
/// frame by reference. Parameters are bound in order at call time, so a
/// repeated name ends up holding the rightmost argument.
fn eval_lambda(args: &[Expr], env: &EnvRef) -> Result<Expr, Error> {
    match args {
        [Expr::List(param_list), body] => {
            let mut params = Vec::new();
            for param in param_list {
                match param {
                    Expr::Symbol(name) => params.push(name.clone()),
                    other => {
                        return Err(Error::TypeError(format!(
                            "Lambda parameters must be symbols, got {other}"
                        )));
                    }
                }
            }

            Ok(Expr::Lambda(Rc::new(Lambda {
                params,
                body: body.clone(),
                env: Rc::clone(env),
            })))
        }
        [_, _] => Err(Error::TypeError(
            "Lambda parameters must be a list".to_owned(),
        )),
        _ => Err(Error::arity("lambda", Arity::Exact(2), args.len())),
    }
}

/// Apply a named callable: resolve the head, evaluate the arguments left
/// to right in the caller's environment, then dispatch on the callable
/// kind. A head that is not bound at all is an unknown symbol; a head
/// bound to a non-callable value is a type error.
fn apply(name: &str, args: &[Expr], env: &EnvRef) -> Result<Expr, Error> {
    let Some(callee) = env.borrow().lookup(name) else {
        return Err(Error::UnknownSymbol(name.to_owned()));
    };

    let mut evaluated = Vec::with_capacity(args.len());
    for arg in args {
        evaluated.push(eval(arg, env)?);
    }

    match callee {
        Expr::Builtin(op) => call_builtin(op, &evaluated),
        Expr::Lambda(lambda) => {
            if evaluated.len() != lambda.params.len() {
                return Err(Error::arity(
                    name,
                    Arity::Exact(lambda.params.len()),
                    evaluated.len(),
                ));
            }

            // Fresh frame on top of the captured environment, not the
            // caller's
            let frame = Environment::child(&lambda.env);
            {
                let mut frame_mut = frame.borrow_mut();
                for (param, value) in lambda.params.iter().zip(evaluated) {
                    frame_mut.put(param, value);
                }
            }
            eval(&lambda.body, &frame)
        }
        other => Err(Error::TypeError(format!(
            "'{name}' is not callable: {other}"
        ))),
    }
}
