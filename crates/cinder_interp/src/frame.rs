use std::cell::RefCell;
use std::rc::Rc;

use cinder_middle::interner::Symbol;
use cinder_middle::parser::scope::{DeclKind, ScopeId, ScopeTree};

use crate::value::object::Handle;
use crate::value::Value;

/// A variable slot. `let`/`const` slots start out uninitialized; reading
/// them before the declaration executes is the temporal dead zone.
#[derive(Debug, Clone)]
pub enum Slot {
    Uninitialized,
    Value(Value),
}

/// A runtime environment record. Frames link outward to the enclosing
/// environment; closures capture the chain by reference.
#[derive(Debug)]
pub struct Frame {
    pub scope: ScopeId,
    slots: RefCell<Vec<Slot>>,
    pub parent: Option<Rc<Frame>>,
    /// The `this` binding, present on function and script frames. Arrow
    /// functions contribute no binding so lookups continue outward.
    pub this: Option<Value>,
    /// Set for `with` frames: the object whose properties shadow outer
    /// bindings.
    pub with_object: Option<Handle>,
    /// The function name for stack traces, on call frames.
    pub function_name: Option<Symbol>,
}

impl Frame {
    fn slots_for(scopes: &ScopeTree, scope: ScopeId) -> Vec<Slot> {
        scopes[scope]
            .symbols()
            .iter()
            .map(|symbol| match symbol.decl {
                // Hoisted bindings observe `undefined` before their
                // initializer; lexical ones are in the TDZ.
                DeclKind::Var | DeclKind::FunctionDecl | DeclKind::Param => Slot::Value(Value::undefined()),
                DeclKind::Let | DeclKind::Const => Slot::Uninitialized,
            })
            .collect()
    }

    pub fn new_script(scopes: &ScopeTree, scope: ScopeId, this: Value) -> Rc<Self> {
        Rc::new(Self {
            scope,
            slots: RefCell::new(Self::slots_for(scopes, scope)),
            parent: None,
            this: Some(this),
            with_object: None,
            function_name: None,
        })
    }

    pub fn new_function(
        scopes: &ScopeTree,
        scope: ScopeId,
        parent: Rc<Frame>,
        this: Option<Value>,
        function_name: Option<Symbol>,
    ) -> Rc<Self> {
        Rc::new(Self {
            scope,
            slots: RefCell::new(Self::slots_for(scopes, scope)),
            parent: Some(parent),
            this,
            with_object: None,
            function_name,
        })
    }

    pub fn new_block(scopes: &ScopeTree, scope: ScopeId, parent: Rc<Frame>) -> Rc<Self> {
        Rc::new(Self {
            scope,
            slots: RefCell::new(Self::slots_for(scopes, scope)),
            parent: Some(parent),
            this: None,
            with_object: None,
            function_name: None,
        })
    }

    /// A dynamic scope layer for `with`; has no slots of its own.
    pub fn new_with(parent: Rc<Frame>, object: Handle) -> Rc<Self> {
        Rc::new(Self {
            scope: parent.scope,
            slots: RefCell::new(Vec::new()),
            parent: Some(parent),
            this: None,
            with_object: Some(object),
            function_name: None,
        })
    }

    pub fn get_slot(&self, index: u16) -> Slot {
        self.slots.borrow()[index as usize].clone()
    }

    pub fn set_slot(&self, index: u16, value: Value) {
        self.slots.borrow_mut()[index as usize] = Slot::Value(value);
    }

    /// The lexical `this`, resolved outward through arrow frames.
    pub fn resolve_this(&self) -> Value {
        let mut frame = self;
        loop {
            if let Some(this) = &frame.this {
                return this.clone();
            }
            match &frame.parent {
                Some(parent) => frame = parent,
                None => return Value::undefined(),
            }
        }
    }
}
