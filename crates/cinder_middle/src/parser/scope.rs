use rustc_hash::FxHashMap;

use crate::interner::Symbol;

/// Index of a scope in the [`ScopeTree`] produced alongside the AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    /// The script-level scope is always created first.
    pub const ROOT: ScopeId = ScopeId(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Script,
    Function,
    Block,
}

/// How a name was introduced into its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    FunctionDecl,
    Param,
    Var,
    Let,
    Const,
}

impl DeclKind {
    /// `var` and function declarations hoist to the enclosing function or
    /// script scope; `let`/`const` (and params) bind where they appear.
    pub fn hoists(self) -> bool {
        matches!(self, DeclKind::Var | DeclKind::FunctionDecl)
    }

    /// Whether reads before initialization are a `ReferenceError` (TDZ).
    pub fn has_tdz(self) -> bool {
        matches!(self, DeclKind::Let | DeclKind::Const)
    }
}

/// One declared name: kind plus the slot index the runtime frame uses,
/// so the evaluator can address locals without a hash lookup.
#[derive(Debug, Clone, Copy)]
pub struct ScopeSymbol {
    pub name: Symbol,
    pub decl: DeclKind,
    pub index: u16,
}

#[derive(Debug)]
pub struct ScopeData {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    /// Set for every scope lexically inside a `with` body: all lookups there
    /// must go through the dynamic scope chain.
    pub dynamic: bool,
    symbols: Vec<ScopeSymbol>,
    by_name: FxHashMap<Symbol, u16>,
}

impl ScopeData {
    pub fn symbols(&self) -> &[ScopeSymbol] {
        &self.symbols
    }

    pub fn lookup(&self, name: Symbol) -> Option<ScopeSymbol> {
        self.by_name.get(&name).map(|&i| self.symbols[i as usize])
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// The parser-side symbol tables for one script.
///
/// Distinct from the runtime environment records: this is immutable after
/// parsing and describes layout; frames instantiate it at run time.
#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: Vec<ScopeData>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, parent: Option<ScopeId>, kind: ScopeKind) -> ScopeId {
        let dynamic = parent.is_some_and(|p| self[p].dynamic);
        self.scopes.push(ScopeData {
            parent,
            kind,
            dynamic,
            symbols: Vec::new(),
            by_name: FxHashMap::default(),
        });
        ScopeId(self.scopes.len() as u32 - 1)
    }

    pub fn mark_dynamic(&mut self, scope: ScopeId) {
        self.scopes[scope.0 as usize].dynamic = true;
    }

    /// Declares `name` in `scope`, hoisting `var`/function declarations to
    /// the nearest enclosing function or script scope.
    ///
    /// Returns the scope the binding actually landed in, or `Err` for a
    /// duplicate `let`/`const` in the same scope.
    pub fn declare(&mut self, scope: ScopeId, name: Symbol, decl: DeclKind) -> Result<ScopeId, Symbol> {
        let target = if decl.hoists() {
            self.hoist_target(scope)
        } else {
            scope
        };

        let data = &mut self.scopes[target.0 as usize];
        if let Some(existing) = data.lookup(name) {
            // `var` merges with anything already hoisted there. A lexical
            // binding colliding with any other declaration is a parse error.
            if decl.has_tdz() || existing.decl.has_tdz() {
                return Err(name);
            }
            return Ok(target);
        }

        let index = data.symbols.len() as u16;
        data.symbols.push(ScopeSymbol { name, decl, index });
        data.by_name.insert(name, index);
        Ok(target)
    }

    fn hoist_target(&self, mut scope: ScopeId) -> ScopeId {
        loop {
            let data = &self[scope];
            match (data.kind, data.parent) {
                (ScopeKind::Block, Some(parent)) => scope = parent,
                _ => return scope,
            }
        }
    }

    /// Resolves `name` starting at `scope`, walking parent scopes.
    pub fn resolve(&self, mut scope: ScopeId, name: Symbol) -> Option<(ScopeId, ScopeSymbol)> {
        loop {
            let data = &self[scope];
            if let Some(symbol) = data.lookup(name) {
                return Some((scope, symbol));
            }
            scope = data.parent?;
        }
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl std::ops::Index<ScopeId> for ScopeTree {
    type Output = ScopeData;

    fn index(&self, id: ScopeId) -> &ScopeData {
        &self.scopes[id.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interner::StringInterner;

    #[test]
    fn var_hoists_to_function_scope() {
        let mut interner = StringInterner::new();
        let name = interner.intern("x");

        let mut tree = ScopeTree::new();
        let script = tree.push(None, ScopeKind::Script);
        let function = tree.push(Some(script), ScopeKind::Function);
        let block = tree.push(Some(function), ScopeKind::Block);

        let landed = tree.declare(block, name, DeclKind::Var).unwrap();
        assert_eq!(landed, function);
        assert!(tree[function].lookup(name).is_some());
        assert!(tree[block].lookup(name).is_none());
    }

    #[test]
    fn duplicate_let_is_rejected_and_var_merges() {
        let mut interner = StringInterner::new();
        let name = interner.intern("x");

        let mut tree = ScopeTree::new();
        let script = tree.push(None, ScopeKind::Script);

        tree.declare(script, name, DeclKind::Var).unwrap();
        tree.declare(script, name, DeclKind::Var).unwrap();
        assert_eq!(tree[script].len(), 1);
        assert!(tree.declare(script, name, DeclKind::Let).is_err());
    }

    #[test]
    fn resolve_walks_outward() {
        let mut interner = StringInterner::new();
        let outer = interner.intern("outer");

        let mut tree = ScopeTree::new();
        let script = tree.push(None, ScopeKind::Script);
        let block = tree.push(Some(script), ScopeKind::Block);
        tree.declare(script, outer, DeclKind::Let).unwrap();

        let (found_in, symbol) = tree.resolve(block, outer).unwrap();
        assert_eq!(found_in, script);
        assert_eq!(symbol.decl, DeclKind::Let);
    }
}
