use crate::type_decl::TypeDecl;

/// Enclosing constructs that make `break`/`continue` legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Loop,
    Switch,
}

#[derive(Debug, Clone)]
pub struct MethodContext {
    pub name: String,
    pub return_type: TypeDecl,
}

/// Stack depths captured before a statement so a failed statement can be
/// unwound without its matching pops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextMark {
    pub scope_depth: usize,
    contexts: usize,
    switch_types: usize,
}

#[derive(Debug, Default)]
pub struct AnalysisContext {
    contexts: Vec<ContextKind>,
    switch_types: Vec<TypeDecl>,
    pub method: Option<MethodContext>,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ContextKind) {
        self.contexts.push(kind);
    }

    pub fn pop(&mut self) {
        self.contexts.pop();
    }

    pub fn push_switch(&mut self, condition: TypeDecl) {
        self.switch_types.push(condition);
        self.contexts.push(ContextKind::Switch);
    }

    pub fn pop_switch(&mut self) {
        self.switch_types.pop();
        self.contexts.pop();
    }

    pub fn switch_type(&self) -> Option<&TypeDecl> {
        self.switch_types.last()
    }

    /// Any enclosing loop or switch, searching outward.
    pub fn can_break(&self) -> bool {
        !self.contexts.is_empty()
    }

    pub fn can_continue(&self) -> bool {
        self.contexts.contains(&ContextKind::Loop)
    }

    pub fn mark(&self, scope_depth: usize) -> ContextMark {
        ContextMark {
            scope_depth,
            contexts: self.contexts.len(),
            switch_types: self.switch_types.len(),
        }
    }

    pub fn restore(&mut self, mark: ContextMark) {
        self.contexts.truncate(mark.contexts);
        self.switch_types.truncate(mark.switch_types);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continue_needs_a_loop_somewhere_outward() {
        let mut ctx = AnalysisContext::new();
        ctx.push_switch(TypeDecl::INT);
        assert!(ctx.can_break());
        assert!(!ctx.can_continue());

        ctx.push(ContextKind::Loop);
        ctx.push_switch(TypeDecl::CHAR);
        assert!(ctx.can_continue());
        assert_eq!(ctx.switch_type(), Some(&TypeDecl::CHAR));
    }

    #[test]
    fn restore_unwinds_to_mark() {
        let mut ctx = AnalysisContext::new();
        ctx.push(ContextKind::Loop);
        let mark = ctx.mark(3);
        ctx.push_switch(TypeDecl::INT);
        ctx.push(ContextKind::Loop);
        ctx.restore(mark);
        assert_eq!(mark.scope_depth, 3);
        assert!(ctx.switch_type().is_none());
        assert!(ctx.can_continue());
    }
}
