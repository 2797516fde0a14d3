use std::collections::HashMap;

use crate::type_decl::TypeDecl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Class,
    TypeParam,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSymbol {
    /// Positional `(name, type)` pairs.
    pub params: Vec<(String, TypeDecl)>,
    pub is_static: bool,
}

impl FunctionSymbol {
    pub fn param_types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.params.iter().map(|(_, ty)| ty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassSymbol {
    pub members: SymbolTable,
    pub generic_params: Vec<String>,
}

impl ClassSymbol {
    pub fn new() -> Self {
        ClassSymbol {
            members: SymbolTable::new(),
            generic_params: Vec::new(),
        }
    }

    pub fn with_generic_params(params: &[&str]) -> Self {
        ClassSymbol {
            members: SymbolTable::new(),
            generic_params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }
}

impl Default for ClassSymbol {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolDetail {
    Variable,
    Function(FunctionSymbol),
    Class(ClassSymbol),
    TypeParam,
}

/// A named entity; for functions `ty` is the return type, for classes it is
/// the class type itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: TypeDecl,
    pub detail: SymbolDetail,
}

impl Symbol {
    pub fn variable(name: impl Into<String>, ty: TypeDecl) -> Self {
        Symbol {
            name: name.into(),
            ty,
            detail: SymbolDetail::Variable,
        }
    }

    pub fn function(name: impl Into<String>, return_type: TypeDecl, params: Vec<(String, TypeDecl)>) -> Self {
        Symbol {
            name: name.into(),
            ty: return_type,
            detail: SymbolDetail::Function(FunctionSymbol { params, is_static: true }),
        }
    }

    /// An instance method; `function` builds static ones.
    pub fn method(name: impl Into<String>, return_type: TypeDecl, params: Vec<(String, TypeDecl)>) -> Self {
        Symbol {
            name: name.into(),
            ty: return_type,
            detail: SymbolDetail::Function(FunctionSymbol { params, is_static: false }),
        }
    }

    pub fn class(name: impl Into<String>, class: ClassSymbol) -> Self {
        let name = name.into();
        Symbol {
            ty: TypeDecl::Class(name.clone()),
            name,
            detail: SymbolDetail::Class(class),
        }
    }

    pub fn type_param(name: impl Into<String>) -> Self {
        let name = name.into();
        Symbol {
            ty: TypeDecl::GenericParam(name.clone()),
            name,
            detail: SymbolDetail::TypeParam,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self.detail {
            SymbolDetail::Variable => SymbolKind::Variable,
            SymbolDetail::Function(_) => SymbolKind::Function,
            SymbolDetail::Class(_) => SymbolKind::Class,
            SymbolDetail::TypeParam => SymbolKind::TypeParam,
        }
    }

    pub fn is_variable(&self) -> bool {
        self.kind() == SymbolKind::Variable
    }

    pub fn as_function(&self) -> Option<&FunctionSymbol> {
        match &self.detail {
            SymbolDetail::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassSymbol> {
        match &self.detail {
            SymbolDetail::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut ClassSymbol> {
        match &mut self.detail {
            SymbolDetail::Class(c) => Some(c),
            _ => None,
        }
    }
}

/// One scope level. Lookups through enclosing scopes go through [`ScopeChain`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: HashMap::new(),
        }
    }

    /// Returns the symbol previously bound to the same name, if any.
    pub fn define(&mut self, symbol: Symbol) -> Option<Symbol> {
        self.symbols.insert(symbol.name.clone(), symbol)
    }

    pub fn resolve_locally(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn resolve_locally_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.symbols.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Lexical scope chain: block scopes innermost first, then the members of
/// the class being analyzed, then the global scope.
///
/// Block scopes are owned by the chain and popped in LIFO order; class
/// member tables stay owned by their [`ClassSymbol`] in the global scope.
#[derive(Debug)]
pub struct ScopeChain {
    global: SymbolTable,
    current_class: Option<String>,
    locals: Vec<SymbolTable>,
}

impl ScopeChain {
    pub fn new(global: SymbolTable) -> Self {
        ScopeChain {
            global,
            current_class: None,
            locals: Vec::new(),
        }
    }

    pub fn push_scope(&mut self) {
        self.locals.push(SymbolTable::new());
    }

    pub fn pop_scope(&mut self) {
        self.locals.pop();
    }

    pub fn depth(&self) -> usize {
        self.locals.len()
    }

    /// Drops block scopes above `depth`; used when an error unwinds a
    /// construct without running its matching pops.
    pub fn truncate(&mut self, depth: usize) {
        self.locals.truncate(depth);
    }

    pub fn enter_class(&mut self, name: &str) {
        self.current_class = Some(name.to_string());
    }

    pub fn leave_class(&mut self) {
        self.current_class = None;
        self.locals.clear();
    }

    pub fn current_class_name(&self) -> Option<&str> {
        self.current_class.as_deref()
    }

    pub fn global(&self) -> &SymbolTable {
        &self.global
    }

    pub fn global_mut(&mut self) -> &mut SymbolTable {
        &mut self.global
    }

    pub fn class(&self, name: &str) -> Option<&ClassSymbol> {
        self.global.resolve_locally(name).and_then(Symbol::as_class)
    }

    pub fn class_mut(&mut self, name: &str) -> Option<&mut ClassSymbol> {
        self.global.resolve_locally_mut(name).and_then(Symbol::as_class_mut)
    }

    fn current_class_members(&self) -> Option<&SymbolTable> {
        let name = self.current_class.as_deref()?;
        self.class(name).map(|c| &c.members)
    }

    /// The innermost table: a block scope, else the class members, else global.
    pub fn current_table(&self) -> &SymbolTable {
        if let Some(table) = self.locals.last() {
            return table;
        }
        self.current_class_members().unwrap_or(&self.global)
    }

    pub fn resolve_locally(&self, name: &str) -> Option<&Symbol> {
        self.current_table().resolve_locally(name)
    }

    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        for table in self.locals.iter().rev() {
            if let Some(symbol) = table.resolve_locally(name) {
                return Some(symbol);
            }
        }
        if let Some(symbol) = self.current_class_members().and_then(|m| m.resolve_locally(name)) {
            return Some(symbol);
        }
        self.global.resolve_locally(name)
    }

    /// Like [`resolve`](Self::resolve) but skips block scopes, so locals
    /// never hide the methods of the current class.
    pub fn resolve_member(&self, name: &str) -> Option<&Symbol> {
        self.current_class_members()
            .and_then(|m| m.resolve_locally(name))
            .or_else(|| self.global.resolve_locally(name))
    }

    /// Binds in the innermost block scope, or globally outside any block.
    pub fn define(&mut self, symbol: Symbol) -> Option<Symbol> {
        match self.locals.last_mut() {
            Some(table) => table.define(symbol),
            None => self.global.define(symbol),
        }
    }

    /// Binds a member of `class`; `None` when the class is unknown.
    pub fn define_member(&mut self, class: &str, symbol: Symbol) -> Option<Option<Symbol>> {
        self.class_mut(class).map(|c| c.members.define(symbol))
    }
}
