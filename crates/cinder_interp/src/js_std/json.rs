use cinder_middle::interner::sym;

use crate::localscope::LocalScope;
use crate::throw;
use crate::value::array::Array;
use crate::value::function::CallContext;
use crate::value::object::{Handle, NamedObject, Object, PropertyDataDescriptor, PropertyKey, PropertyValue};
use crate::value::ops::conversions::ValueConversion;
use crate::value::{Typeof, Value, ValueContext};

use super::{register, register_fn};

pub fn init(sc: &mut LocalScope<'_>, global: &Handle) {
    let json = sc.register(NamedObject::new(sc));
    let parse_sym = sc.intern("parse");
    let stringify_sym = sc.intern("stringify");
    register_fn(sc, &json, parse_sym, parse);
    register_fn(sc, &json, stringify_sym, stringify);
    register(sc, global, sym::JSON, Value::Object(json));
}

struct JsonParser<'a> {
    bytes: &'a [u8],
    idx: usize,
}

impl<'a> JsonParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            bytes: source.as_bytes(),
            idx: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.bytes.get(self.idx), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.idx += 1;
        }
    }

    fn current(&self) -> Option<u8> {
        self.bytes.get(self.idx).copied()
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.current() == Some(expected) {
            self.idx += 1;
            true
        } else {
            false
        }
    }

    fn expect_literal(&mut self, literal: &str) -> Result<(), String> {
        if self.bytes[self.idx..].starts_with(literal.as_bytes()) {
            self.idx += literal.len();
            Ok(())
        } else {
            Err(format!("Unexpected token in JSON at position {}", self.idx))
        }
    }

    fn parse_value(&mut self, sc: &mut LocalScope<'_>) -> Result<Value, String> {
        self.skip_whitespace();
        match self.current() {
            Some(b'{') => self.parse_object(sc),
            Some(b'[') => self.parse_array(sc),
            Some(b'"') => {
                let text = self.parse_string()?;
                let sym = sc.intern(&*text);
                Ok(Value::string(sym.into()))
            }
            Some(b't') => {
                self.expect_literal("true")?;
                Ok(Value::boolean(true))
            }
            Some(b'f') => {
                self.expect_literal("false")?;
                Ok(Value::boolean(false))
            }
            Some(b'n') => {
                self.expect_literal("null")?;
                Ok(Value::null())
            }
            Some(c) if c == b'-' || c.is_ascii_digit() => self.parse_number(),
            _ => Err(format!("Unexpected token in JSON at position {}", self.idx)),
        }
    }

    fn parse_object(&mut self, sc: &mut LocalScope<'_>) -> Result<Value, String> {
        self.idx += 1; // {
        let object = NamedObject::new(sc);

        self.skip_whitespace();
        if !self.eat(b'}') {
            loop {
                self.skip_whitespace();
                let key = self.parse_string()?;
                self.skip_whitespace();
                if !self.eat(b':') {
                    return Err(format!("Expected ':' in JSON at position {}", self.idx));
                }
                let value = self.parse_value(sc)?;

                let key = sc.intern(&*key);
                object
                    .define_own_property(sc, PropertyKey::String(key.into()), PropertyValue::static_default(value))
                    .map_err(|_| "failed to define property".to_string())?;

                self.skip_whitespace();
                if self.eat(b',') {
                    continue;
                }
                if self.eat(b'}') {
                    break;
                }
                return Err(format!("Expected ',' or '}}' in JSON at position {}", self.idx));
            }
        }

        Ok(Value::Object(sc.register(object)))
    }

    fn parse_array(&mut self, sc: &mut LocalScope<'_>) -> Result<Value, String> {
        self.idx += 1; // [
        let mut items = Vec::new();

        self.skip_whitespace();
        if !self.eat(b']') {
            loop {
                items.push(self.parse_value(sc)?);
                self.skip_whitespace();
                if self.eat(b',') {
                    continue;
                }
                if self.eat(b']') {
                    break;
                }
                return Err(format!("Expected ',' or ']' in JSON at position {}", self.idx));
            }
        }

        let array = Array::with_items(sc, items);
        Ok(Value::Object(sc.register(array)))
    }

    fn parse_string(&mut self) -> Result<String, String> {
        if !self.eat(b'"') {
            return Err(format!("Expected string in JSON at position {}", self.idx));
        }

        let mut out = String::new();
        loop {
            match self.current() {
                None => return Err("Unterminated string in JSON".to_string()),
                Some(b'"') => {
                    self.idx += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.idx += 1;
                    match self.current() {
                        Some(b'"') => out.push('"'),
                        Some(b'\\') => out.push('\\'),
                        Some(b'/') => out.push('/'),
                        Some(b'b') => out.push('\x08'),
                        Some(b'f') => out.push('\x0C'),
                        Some(b'n') => out.push('\n'),
                        Some(b'r') => out.push('\r'),
                        Some(b't') => out.push('\t'),
                        Some(b'u') => {
                            let hex = self
                                .bytes
                                .get(self.idx + 1..self.idx + 5)
                                .and_then(|b| std::str::from_utf8(b).ok())
                                .ok_or("Invalid unicode escape in JSON")?;
                            let code = u16::from_str_radix(hex, 16).map_err(|_| "Invalid unicode escape in JSON")?;
                            out.push(char::from_u32(code as u32).unwrap_or(char::REPLACEMENT_CHARACTER));
                            self.idx += 4;
                        }
                        _ => return Err("Invalid escape in JSON".to_string()),
                    }
                    self.idx += 1;
                }
                Some(c) if c < 0x80 => {
                    out.push(c as char);
                    self.idx += 1;
                }
                Some(_) => {
                    let (c, len) = cinder_middle::util::next_char_in_bytes(&self.bytes[self.idx..]);
                    out.push(c);
                    self.idx += len;
                }
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value, String> {
        let start = self.idx;
        if self.current() == Some(b'-') {
            self.idx += 1;
        }
        while matches!(self.current(), Some(c) if c.is_ascii_digit() || matches!(c, b'.' | b'e' | b'E' | b'+' | b'-')) {
            self.idx += 1;
        }
        std::str::from_utf8(&self.bytes[start..self.idx])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .map(Value::number)
            .ok_or_else(|| format!("Invalid number in JSON at position {start}"))
    }
}

pub fn parse(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let source = cx.args.first().unwrap_or_undefined().to_js_string(cx.scope)?;
    let source = source.to_rc(cx.scope);

    let mut parser = JsonParser::new(&source);
    let value = match parser.parse_value(cx.scope) {
        Ok(value) => value,
        Err(message) => throw!(cx.scope, SyntaxError, "{}", message),
    };
    parser.skip_whitespace();
    if parser.current().is_some() {
        throw!(cx.scope, SyntaxError, "Unexpected trailing characters in JSON");
    }
    Ok(value)
}

fn escape_json_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_value(
    sc: &mut LocalScope<'_>,
    value: &Value,
    out: &mut String,
    indent: &str,
    depth: usize,
) -> Result<bool, Value> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            if n.is_finite() {
                out.push_str(&cinder_middle::util::format_f64(*n));
            } else {
                out.push_str("null");
            }
        }
        Value::String(s) => {
            let text = s.to_rc(sc);
            escape_json_string(out, &text);
        }
        Value::Undefined | Value::Symbol(_) => return Ok(false),
        Value::Object(handle) => {
            if matches!(handle.type_of(), Typeof::Function) {
                return Ok(false);
            }
            if depth > 64 {
                throw!(sc, TypeError, "Converting circular structure to JSON");
            }

            // `toJSON`-free; arrays and plain objects only.
            if let Some(array) = value.downcast_ref::<Array>() {
                let items = array.items().borrow().clone();
                write_sequence(sc, out, indent, depth, items.len(), |sc, out, index| {
                    let item = &items[index];
                    if !write_value(sc, item, out, indent, depth + 1)? {
                        out.push_str("null");
                    }
                    Ok(())
                }, ('[', ']'))?;
            } else {
                let keys = enumerable_string_keys(sc, handle)?;
                let mut entries = Vec::new();
                for key in keys {
                    let item = value.get_property(sc, key.clone())?;
                    entries.push((key, item));
                }

                let mut rendered = Vec::new();
                for (key, item) in entries {
                    let mut piece = String::new();
                    if write_value(sc, &item, &mut piece, indent, depth + 1)? {
                        let name = key.to_display_string(sc);
                        rendered.push((name, piece));
                    }
                }

                write_sequence(sc, out, indent, depth, rendered.len(), |_sc, out, index| {
                    let (name, piece) = &rendered[index];
                    escape_json_string(out, name);
                    out.push(':');
                    if !indent.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(piece);
                    Ok(())
                }, ('{', '}'))?;
            }
        }
    }
    Ok(true)
}

fn write_sequence<F>(
    sc: &mut LocalScope<'_>,
    out: &mut String,
    indent: &str,
    depth: usize,
    len: usize,
    mut write_item: F,
    brackets: (char, char),
) -> Result<(), Value>
where
    F: FnMut(&mut LocalScope<'_>, &mut String, usize) -> Result<(), Value>,
{
    out.push(brackets.0);
    for index in 0..len {
        if index > 0 {
            out.push(',');
        }
        if !indent.is_empty() {
            out.push('\n');
            for _ in 0..=depth {
                out.push_str(indent);
            }
        }
        write_item(sc, out, index)?;
    }
    if len > 0 && !indent.is_empty() {
        out.push('\n');
        for _ in 0..depth {
            out.push_str(indent);
        }
    }
    out.push(brackets.1);
    Ok(())
}

fn enumerable_string_keys(sc: &mut LocalScope<'_>, handle: &Handle) -> Result<Vec<PropertyKey>, Value> {
    let keys = handle.own_keys(sc)?;
    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
        if let Value::String(_) = key {
            let key = PropertyKey::from_value(sc, key)?;
            if let Some(desc) = handle.get_own_property_descriptor(sc, key.clone())? {
                if desc.descriptor.contains(PropertyDataDescriptor::ENUMERABLE) {
                    out.push(key);
                }
            }
        }
    }
    Ok(out)
}

pub fn stringify(cx: CallContext<'_, '_>) -> Result<Value, Value> {
    let value = cx.args.first().unwrap_or_undefined();

    // The replacer argument is not supported; the third argument selects
    // the indentation.
    let indent = match cx.args.get(2) {
        Some(Value::Number(n)) => " ".repeat((*n as usize).min(10)),
        Some(Value::String(s)) => s.to_rc(cx.scope).to_string(),
        _ => String::new(),
    };

    let mut out = String::new();
    if !write_value(cx.scope, &value, &mut out, &indent, 0)? {
        return Ok(Value::undefined());
    }
    let sym = cx.scope.intern(&*out);
    Ok(Value::string(sym.into()))
}
