use std::rc::Rc;

use cinder_middle::interner::sym;
use cinder_middle::lexer::token::TokenType;
use cinder_middle::parser::expr::{
    ArrayMemberKind, AssignmentExpr, AssignmentTarget, CallArgumentKind, Expr, ExprKind,
    FunctionCall, LiteralExpr, ObjectMemberKind, TemplateSegment,
};

use crate::frame::Frame;
use crate::localscope::LocalScope;
use crate::value::array::Array;
use crate::value::error::ErrorKind;
use crate::value::iterator;
use crate::value::object::{
    NamedObject, Object, PropertyKey, PropertyValue, PropertyValueKind,
};
use crate::value::ops::conversions::ValueConversion;
use crate::value::ops::{arithmetic, equality};
use crate::value::regex::RegExp;
use crate::value::{Typeof, Value};

use super::pattern::{destructure_assign, BindMode};
use super::{create_closure, load_name, store_name, throw_error, throw_unwind, Ctx, Unwind};

type ExprResult = Result<Value, Unwind>;

pub(crate) fn eval_expr(sc: &mut LocalScope<'_>, cx: &Ctx, frame: &Rc<Frame>, expr: &Expr) -> ExprResult {
    match &expr.kind {
        ExprKind::Literal(literal) => eval_literal(sc, cx, frame, literal),
        ExprKind::This => Ok(frame.resolve_this()),
        ExprKind::Binary(binary) => eval_binary(sc, cx, frame, binary.operator, &binary.left, &binary.right),
        ExprKind::Grouping(group) => {
            let mut last = Value::undefined();
            for expr in &group.0 {
                last = eval_expr(sc, cx, frame, expr)?;
            }
            Ok(last)
        }
        ExprKind::Sequence((left, right)) => {
            eval_expr(sc, cx, frame, left)?;
            eval_expr(sc, cx, frame, right)
        }
        ExprKind::Conditional(cond) => {
            let test = eval_expr(sc, cx, frame, &cond.condition)?;
            if test.to_boolean(sc).map_err(|e| throw_unwind(sc, e))? {
                eval_expr(sc, cx, frame, &cond.then)
            } else {
                eval_expr(sc, cx, frame, &cond.el)
            }
        }
        ExprKind::Unary(unary) => eval_unary(sc, cx, frame, unary.operator, &unary.expr),
        ExprKind::Prefix((operator, target)) => {
            let old = eval_expr(sc, cx, frame, target)?;
            let old = old.to_number(sc).map_err(|e| throw_unwind(sc, e))?;
            let new = match operator {
                TokenType::Increment => old + 1.0,
                _ => old - 1.0,
            };
            assign_target(sc, cx, frame, target, Value::number(new))?;
            Ok(Value::number(new))
        }
        ExprKind::Postfix((operator, target)) => {
            let old = eval_expr(sc, cx, frame, target)?;
            let old = old.to_number(sc).map_err(|e| throw_unwind(sc, e))?;
            let new = match operator {
                TokenType::Increment => old + 1.0,
                _ => old - 1.0,
            };
            assign_target(sc, cx, frame, target, Value::number(new))?;
            Ok(Value::number(old))
        }
        ExprKind::Assignment(assignment) => eval_assignment(sc, cx, frame, assignment),
        ExprKind::PropertyAccess(_) | ExprKind::Call(_) => {
            // Outside a chain head these cannot short-circuit.
            Ok(eval_maybe_short(sc, cx, frame, expr)?.unwrap_or(Value::Undefined))
        }
        ExprKind::Chain(inner) => Ok(eval_maybe_short(sc, cx, frame, inner)?.unwrap_or(Value::Undefined)),
        ExprKind::Function(decl) => Ok(create_closure(sc, cx, frame, decl)),
        ExprKind::Array(literal) => {
            let mut items = Vec::with_capacity(literal.0.len());
            for member in &literal.0 {
                match member {
                    ArrayMemberKind::Item(item) => items.push(eval_expr(sc, cx, frame, item)?),
                    ArrayMemberKind::Hole => items.push(Value::undefined()),
                    ArrayMemberKind::Spread(spread) => {
                        let value = eval_expr(sc, cx, frame, spread)?;
                        let elements = iterator::collect_iterable(sc, &value).map_err(|e| throw_unwind(sc, e))?;
                        items.extend(elements);
                    }
                }
            }
            let array = Array::with_items(sc, items);
            Ok(Value::Object(sc.register(array)))
        }
        ExprKind::Object(literal) => eval_object_literal(sc, cx, frame, &literal.0),
        ExprKind::TemplateLiteral(template) => {
            let mut out = String::new();
            for segment in &template.segments {
                match segment {
                    TemplateSegment::String(text) => out.push_str(sc.resolve(*text)),
                    TemplateSegment::Expr(expr) => {
                        let value = eval_expr(sc, cx, frame, expr)?;
                        let text = value.to_js_string(sc).map_err(|e| throw_unwind(sc, e))?;
                        out.push_str(&text.to_rc(sc));
                    }
                }
            }
            let sym = sc.intern(&*out);
            Ok(Value::string(sym.into()))
        }
        ExprKind::Empty => Ok(Value::undefined()),
    }
}

fn eval_literal(sc: &mut LocalScope<'_>, cx: &Ctx, frame: &Rc<Frame>, literal: &LiteralExpr) -> ExprResult {
    match literal {
        LiteralExpr::Boolean(b) => Ok(Value::boolean(*b)),
        LiteralExpr::Number(n) => Ok(Value::number(*n)),
        LiteralExpr::String(s) => Ok(Value::string((*s).into())),
        LiteralExpr::Null => Ok(Value::null()),
        LiteralExpr::Undefined => Ok(Value::undefined()),
        LiteralExpr::Identifier(name) => load_name(sc, cx, frame, *name, false),
        LiteralExpr::Regex(literal, flags) => {
            // The token text still carries the delimiting slashes.
            let source = sc.resolve_rc(*literal);
            let source = source.strip_prefix('/').unwrap_or(&source);
            let source = source.strip_suffix('/').unwrap_or(source);
            let source: Rc<str> = Rc::from(source);
            let flags = sc.resolve_rc(*flags);
            match RegExp::new(sc, source, flags) {
                Ok(regex) => Ok(Value::Object(sc.register(regex))),
                Err(err) => Err(throw_error(
                    sc,
                    ErrorKind::SyntaxError,
                    format!("Invalid regular expression: {err}"),
                )),
            }
        }
    }
}

fn eval_unary(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    operator: TokenType,
    operand: &Expr,
) -> ExprResult {
    // `typeof` and `delete` treat their operand specially before (or
    // instead of) evaluating it.
    match operator {
        TokenType::Typeof => {
            if let ExprKind::Literal(LiteralExpr::Identifier(name)) = &operand.kind {
                let value = load_name(sc, cx, frame, *name, true)?;
                return Ok(Value::string(value.type_of().as_sym().into()));
            }
            let value = eval_expr(sc, cx, frame, operand)?;
            return Ok(Value::string(value.type_of().as_sym().into()));
        }
        TokenType::Delete => {
            return match &operand.kind {
                ExprKind::PropertyAccess(access) => {
                    let target = eval_expr(sc, cx, frame, &access.target)?;
                    if access.optional && target.is_nullish() {
                        return Ok(Value::boolean(true));
                    }
                    let key = property_key_of(sc, cx, frame, access.computed, &access.property)?;
                    let deleted = target.delete_property(sc, key).map_err(|e| throw_unwind(sc, e))?;
                    Ok(Value::boolean(deleted))
                }
                // Bindings cannot be deleted in this dialect.
                ExprKind::Literal(LiteralExpr::Identifier(_)) => Ok(Value::boolean(false)),
                _ => {
                    eval_expr(sc, cx, frame, operand)?;
                    Ok(Value::boolean(true))
                }
            };
        }
        _ => {}
    }

    let value = eval_expr(sc, cx, frame, operand)?;
    let result = match operator {
        TokenType::Minus => arithmetic::neg(sc, &value),
        TokenType::Plus => value.to_number(sc).map(Value::number),
        TokenType::LogicalNot => value.to_boolean(sc).map(|b| Value::boolean(!b)),
        TokenType::BitwiseNot => arithmetic::bitnot(sc, &value),
        TokenType::Void => Ok(Value::undefined()),
        _ => {
            return Err(throw_error(
                sc,
                ErrorKind::EvaluatorError,
                format!("Unexpected unary operator {operator}"),
            ))
        }
    };
    result.map_err(|e| throw_unwind(sc, e))
}

fn eval_binary(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    operator: TokenType,
    left: &Expr,
    right: &Expr,
) -> ExprResult {
    // Short-circuiting forms evaluate the right side conditionally.
    match operator {
        TokenType::LogicalAnd => {
            let left = eval_expr(sc, cx, frame, left)?;
            return if left.to_boolean(sc).map_err(|e| throw_unwind(sc, e))? {
                eval_expr(sc, cx, frame, right)
            } else {
                Ok(left)
            };
        }
        TokenType::LogicalOr => {
            let left = eval_expr(sc, cx, frame, left)?;
            return if left.to_boolean(sc).map_err(|e| throw_unwind(sc, e))? {
                Ok(left)
            } else {
                eval_expr(sc, cx, frame, right)
            };
        }
        TokenType::NullishCoalescing => {
            let left = eval_expr(sc, cx, frame, left)?;
            return if left.is_nullish() {
                eval_expr(sc, cx, frame, right)
            } else {
                Ok(left)
            };
        }
        _ => {}
    }

    let lhs = eval_expr(sc, cx, frame, left)?;
    let rhs = eval_expr(sc, cx, frame, right)?;

    let result = match operator {
        TokenType::Plus => arithmetic::add(sc, &lhs, &rhs),
        TokenType::Minus => arithmetic::sub(sc, &lhs, &rhs),
        TokenType::Star => arithmetic::mul(sc, &lhs, &rhs),
        TokenType::Slash => arithmetic::div(sc, &lhs, &rhs),
        TokenType::Remainder => arithmetic::rem(sc, &lhs, &rhs),
        TokenType::Exponentiation => arithmetic::pow(sc, &lhs, &rhs),
        TokenType::BitwiseAnd => arithmetic::bitand(sc, &lhs, &rhs),
        TokenType::BitwiseOr => arithmetic::bitor(sc, &lhs, &rhs),
        TokenType::BitwiseXor => arithmetic::bitxor(sc, &lhs, &rhs),
        TokenType::LeftShift => arithmetic::shl(sc, &lhs, &rhs),
        TokenType::RightShift => arithmetic::shr(sc, &lhs, &rhs),
        TokenType::UnsignedRightShift => arithmetic::ushr(sc, &lhs, &rhs),
        TokenType::Less => arithmetic::lt(sc, &lhs, &rhs),
        TokenType::LessEqual => arithmetic::le(sc, &lhs, &rhs),
        TokenType::Greater => arithmetic::gt(sc, &lhs, &rhs),
        TokenType::GreaterEqual => arithmetic::ge(sc, &lhs, &rhs),
        TokenType::Equality => equality::loose_eq(sc, &lhs, &rhs).map(Value::boolean),
        TokenType::Inequality => equality::loose_eq(sc, &lhs, &rhs).map(|b| Value::boolean(!b)),
        TokenType::StrictEquality => Ok(Value::boolean(equality::strict_eq(&lhs, &rhs))),
        TokenType::StrictInequality => Ok(Value::boolean(!equality::strict_eq(&lhs, &rhs))),
        TokenType::In => PropertyKey::from_value(sc, lhs)
            .and_then(|key| rhs.has_property(sc, key))
            .map(Value::boolean),
        TokenType::Instanceof => equality::instance_of(sc, &lhs, &rhs).map(Value::boolean),
        _ => {
            return Err(throw_error(
                sc,
                ErrorKind::EvaluatorError,
                format!("Unexpected binary operator {operator}"),
            ))
        }
    };
    result.map_err(|e| throw_unwind(sc, e))
}

fn eval_assignment(sc: &mut LocalScope<'_>, cx: &Ctx, frame: &Rc<Frame>, assignment: &AssignmentExpr) -> ExprResult {
    match &assignment.left {
        AssignmentTarget::Pattern(pattern) => {
            let value = eval_expr(sc, cx, frame, &assignment.right)?;
            destructure_assign(sc, cx, frame, pattern, value.clone(), BindMode::Assign)?;
            Ok(value)
        }
        AssignmentTarget::Expr(target) => match assignment.operator {
            TokenType::Assignment => {
                let value = eval_expr(sc, cx, frame, &assignment.right)?;
                assign_target(sc, cx, frame, target, value.clone())?;
                Ok(value)
            }
            TokenType::LogicalAndAssignment => {
                let current = eval_expr(sc, cx, frame, target)?;
                if !current.to_boolean(sc).map_err(|e| throw_unwind(sc, e))? {
                    return Ok(current);
                }
                let value = eval_expr(sc, cx, frame, &assignment.right)?;
                assign_target(sc, cx, frame, target, value.clone())?;
                Ok(value)
            }
            TokenType::LogicalOrAssignment => {
                let current = eval_expr(sc, cx, frame, target)?;
                if current.to_boolean(sc).map_err(|e| throw_unwind(sc, e))? {
                    return Ok(current);
                }
                let value = eval_expr(sc, cx, frame, &assignment.right)?;
                assign_target(sc, cx, frame, target, value.clone())?;
                Ok(value)
            }
            TokenType::LogicalNullishAssignment => {
                let current = eval_expr(sc, cx, frame, target)?;
                if !current.is_nullish() {
                    return Ok(current);
                }
                let value = eval_expr(sc, cx, frame, &assignment.right)?;
                assign_target(sc, cx, frame, target, value.clone())?;
                Ok(value)
            }
            operator => {
                let current = eval_expr(sc, cx, frame, target)?;
                let rhs = eval_expr(sc, cx, frame, &assignment.right)?;
                let combined = apply_compound(sc, operator, &current, &rhs)?;
                assign_target(sc, cx, frame, target, combined.clone())?;
                Ok(combined)
            }
        },
    }
}

fn apply_compound(sc: &mut LocalScope<'_>, operator: TokenType, lhs: &Value, rhs: &Value) -> ExprResult {
    let result = match operator {
        TokenType::AdditionAssignment => arithmetic::add(sc, lhs, rhs),
        TokenType::SubtractionAssignment => arithmetic::sub(sc, lhs, rhs),
        TokenType::MultiplicationAssignment => arithmetic::mul(sc, lhs, rhs),
        TokenType::DivisionAssignment => arithmetic::div(sc, lhs, rhs),
        TokenType::RemainderAssignment => arithmetic::rem(sc, lhs, rhs),
        TokenType::ExponentiationAssignment => arithmetic::pow(sc, lhs, rhs),
        TokenType::LeftShiftAssignment => arithmetic::shl(sc, lhs, rhs),
        TokenType::RightShiftAssignment => arithmetic::shr(sc, lhs, rhs),
        TokenType::UnsignedRightShiftAssignment => arithmetic::ushr(sc, lhs, rhs),
        TokenType::BitwiseAndAssignment => arithmetic::bitand(sc, lhs, rhs),
        TokenType::BitwiseOrAssignment => arithmetic::bitor(sc, lhs, rhs),
        TokenType::BitwiseXorAssignment => arithmetic::bitxor(sc, lhs, rhs),
        _ => {
            return Err(throw_error(
                sc,
                ErrorKind::EvaluatorError,
                format!("Unexpected assignment operator {operator}"),
            ))
        }
    };
    result.map_err(|e| throw_unwind(sc, e))
}

/// Writes a value into an assignable expression (identifier or member
/// access).
pub(crate) fn assign_target(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    target: &Expr,
    value: Value,
) -> Result<(), Unwind> {
    match &target.kind {
        ExprKind::Literal(LiteralExpr::Identifier(name)) => store_name(sc, cx, frame, *name, value),
        ExprKind::PropertyAccess(access) => {
            let receiver = eval_expr(sc, cx, frame, &access.target)?;
            let key = property_key_of(sc, cx, frame, access.computed, &access.property)?;

            // `__proto__` writes go through the cycle-checked path.
            if let (Some(s), Value::Object(handle)) = (key.as_string(), &receiver) {
                if s.sym() == sym::PROTO {
                    return handle
                        .set_prototype_checked(sc, value)
                        .map_err(|e| throw_unwind(sc, e));
                }
            }

            receiver
                .set_property(sc, key, PropertyValue::static_default(value))
                .map_err(|e| throw_unwind(sc, e))
        }
        ExprKind::Grouping(group) if group.0.len() == 1 => assign_target(sc, cx, frame, &group.0[0], value),
        _ => Err(throw_error(
            sc,
            ErrorKind::ReferenceError,
            "Invalid assignment target".into(),
        )),
    }
}

/// Resolves the property key of a member access.
fn property_key_of(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    computed: bool,
    property: &Expr,
) -> Result<PropertyKey, Unwind> {
    if computed {
        let value = eval_expr(sc, cx, frame, property)?;
        PropertyKey::from_value(sc, value).map_err(|e| throw_unwind(sc, e))
    } else {
        match &property.kind {
            ExprKind::Literal(LiteralExpr::Identifier(name)) => Ok(PropertyKey::String((*name).into())),
            ExprKind::Literal(LiteralExpr::Undefined) => Ok(PropertyKey::String(sym::UNDEFINED.into())),
            _ => Err(throw_error(
                sc,
                ErrorKind::EvaluatorError,
                "Malformed property access".into(),
            )),
        }
    }
}

/// Evaluates a member/call expression, short-circuiting to `None` when an
/// optional link hits `null`/`undefined`. The `Chain` head turns `None`
/// into `undefined`.
fn eval_maybe_short(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    expr: &Expr,
) -> Result<Option<Value>, Unwind> {
    match &expr.kind {
        ExprKind::PropertyAccess(access) => {
            let Some(target) = eval_maybe_short(sc, cx, frame, &access.target)? else {
                return Ok(None);
            };
            if access.optional && target.is_nullish() {
                return Ok(None);
            }
            let key = property_key_of(sc, cx, frame, access.computed, &access.property)?;
            target
                .get_property(sc, key)
                .map(Some)
                .map_err(|e| throw_unwind(sc, e))
        }
        ExprKind::Call(call) => eval_call(sc, cx, frame, call),
        // A nested chain caps its own short-circuit.
        ExprKind::Chain(inner) => Ok(Some(
            eval_maybe_short(sc, cx, frame, inner)?.unwrap_or(Value::Undefined),
        )),
        _ => eval_expr(sc, cx, frame, expr).map(Some),
    }
}

fn eval_call(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    call: &FunctionCall,
) -> Result<Option<Value>, Unwind> {
    // Resolve the callee, remembering the receiver of a method call.
    let (callee, this) = match &call.target.kind {
        ExprKind::PropertyAccess(access) if !call.constructor_call => {
            let Some(target) = eval_maybe_short(sc, cx, frame, &access.target)? else {
                return Ok(None);
            };
            if access.optional && target.is_nullish() {
                return Ok(None);
            }
            let key = property_key_of(sc, cx, frame, access.computed, &access.property)?;
            let callee = target
                .get_property(sc, key)
                .map_err(|e| throw_unwind(sc, e))?;
            (callee, target)
        }
        _ => {
            let Some(callee) = eval_maybe_short(sc, cx, frame, &call.target)? else {
                return Ok(None);
            };
            // Direct calls bind `this` to the global object (non-strict).
            (callee, Value::Object(sc.global()))
        }
    };

    if call.optional && callee.is_nullish() {
        return Ok(None);
    }

    let mut args = Vec::with_capacity(call.arguments.len());
    for argument in &call.arguments {
        match argument {
            CallArgumentKind::Normal(expr) => args.push(eval_expr(sc, cx, frame, expr)?),
            CallArgumentKind::Spread(expr) => {
                let value = eval_expr(sc, cx, frame, expr)?;
                let elements = iterator::collect_iterable(sc, &value).map_err(|e| throw_unwind(sc, e))?;
                args.extend(elements);
            }
        }
    }

    if !matches!(callee.type_of(), Typeof::Function) {
        let rendered = display_call_target(sc, &call.target);
        return Err(throw_error(
            sc,
            ErrorKind::TypeError,
            format!("{rendered} is not a function"),
        ));
    }

    let result = if call.constructor_call {
        callee.construct(sc, args)
    } else {
        callee.apply(sc, this, args)
    };
    result.map(Some).map_err(|e| throw_unwind(sc, e))
}

fn display_call_target(sc: &LocalScope<'_>, target: &Expr) -> String {
    match target.as_identifier() {
        Some(name) => sc.resolve(name).to_owned(),
        None => target.to_string(),
    }
}

fn eval_object_literal(
    sc: &mut LocalScope<'_>,
    cx: &Ctx,
    frame: &Rc<Frame>,
    members: &[(ObjectMemberKind, Expr)],
) -> ExprResult {
    let object = NamedObject::new(sc);

    for (kind, value_expr) in members {
        match kind {
            ObjectMemberKind::Static(name) => {
                let value = eval_expr(sc, cx, frame, value_expr)?;
                object
                    .define_own_property(sc, PropertyKey::String((*name).into()), PropertyValue::static_default(value))
                    .map_err(|e| throw_unwind(sc, e))?;
            }
            ObjectMemberKind::Dynamic(key_expr) => {
                let key = eval_expr(sc, cx, frame, key_expr)?;
                let key = PropertyKey::from_value(sc, key).map_err(|e| throw_unwind(sc, e))?;
                let value = eval_expr(sc, cx, frame, value_expr)?;
                object
                    .define_own_property(sc, key, PropertyValue::static_default(value))
                    .map_err(|e| throw_unwind(sc, e))?;
            }
            ObjectMemberKind::Getter(name) | ObjectMemberKind::Setter(name) => {
                let function = eval_expr(sc, cx, frame, value_expr)?;
                let Value::Object(function) = function else {
                    return Err(throw_error(sc, ErrorKind::TypeError, "Accessor must be a function".into()));
                };
                let key = PropertyKey::String((*name).into());

                // Merge with an already-present accessor half.
                let existing = object.get_raw_property(&key);
                let (mut get, mut set) = match existing.map(|e| e.kind) {
                    Some(PropertyValueKind::Trap { get, set }) => (get, set),
                    _ => (None, None),
                };
                if matches!(kind, ObjectMemberKind::Getter(_)) {
                    get = Some(function);
                } else {
                    set = Some(function);
                }

                object
                    .define_own_property(
                        sc,
                        key,
                        PropertyValue::accessor(get, set, Default::default()),
                    )
                    .map_err(|e| throw_unwind(sc, e))?;
            }
            ObjectMemberKind::Spread => {
                let source = eval_expr(sc, cx, frame, value_expr)?;
                if let Value::Object(handle) = &source {
                    let keys = handle.own_keys(sc).map_err(|e| throw_unwind(sc, e))?;
                    for key in keys {
                        let key = PropertyKey::from_value(sc, key).map_err(|e| throw_unwind(sc, e))?;
                        if let Some(desc) = handle
                            .get_own_property_descriptor(sc, key.clone())
                            .map_err(|e| throw_unwind(sc, e))?
                        {
                            if desc
                                .descriptor
                                .contains(crate::value::object::PropertyDataDescriptor::ENUMERABLE)
                            {
                                let value = desc.get_or_apply(sc, source.clone()).map_err(|e| throw_unwind(sc, e))?;
                                object
                                    .define_own_property(sc, key, PropertyValue::static_default(value))
                                    .map_err(|e| throw_unwind(sc, e))?;
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(Value::Object(sc.register(object)))
}
