//! Generic node view of the typed AST, used for `parse` output and for
//! comparing control-flow skeletons.

use std::fmt::Write;

use crate::ast::*;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub kind: NodeKind,
    pub attributes: Vec<(&'static str, String)>,
    pub line: Line,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(kind: NodeKind, line: Line) -> Self {
        TreeNode {
            kind,
            attributes: Vec::new(),
            line,
            children: Vec::new(),
        }
    }

    fn attr(mut self, key: &'static str, value: impl ToString) -> Self {
        self.attributes.push((key, value.to_string()));
        self
    }

    fn child(mut self, node: TreeNode) -> Self {
        self.children.push(node);
        self
    }

    fn children(mut self, nodes: impl IntoIterator<Item = TreeNode>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Pre-order list of node kinds.
    pub fn kinds(&self) -> Vec<NodeKind> {
        let mut out = Vec::new();
        self.collect_kinds(&mut out);
        out
    }

    fn collect_kinds(&self, out: &mut Vec<NodeKind>) {
        out.push(self.kind);
        for child in &self.children {
            child.collect_kinds(out);
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, "", true, true);
        out
    }

    fn render_into(&self, out: &mut String, prefix: &str, is_last: bool, is_root: bool) {
        let connector = match (is_root, is_last) {
            (true, _) => "",
            (false, true) => "└── ",
            (false, false) => "├── ",
        };
        let _ = write!(out, "{}{}{}", prefix, connector, self.kind);
        for (key, value) in &self.attributes {
            let _ = write!(out, " {}={}", key, value);
        }
        let _ = writeln!(out, " (line {})", self.line);

        let child_prefix = match (is_root, is_last) {
            (true, _) => prefix.to_string(),
            (false, true) => format!("{}    ", prefix),
            (false, false) => format!("{}│   ", prefix),
        };
        let count = self.children.len();
        for (i, child) in self.children.iter().enumerate() {
            child.render_into(out, &child_prefix, i + 1 == count, false);
        }
    }
}

pub trait ToTree {
    fn to_tree(&self) -> TreeNode;
}

impl Program {
    pub fn print_tree(&self) -> String {
        self.to_tree().render()
    }

    pub fn node_kinds(&self) -> Vec<NodeKind> {
        self.to_tree().kinds()
    }
}

impl ToTree for Program {
    fn to_tree(&self) -> TreeNode {
        TreeNode::new(NodeKind::Program, self.line).children(self.classes.iter().map(ToTree::to_tree))
    }
}

impl ToTree for ClassDecl {
    fn to_tree(&self) -> TreeNode {
        TreeNode::new(NodeKind::ClassDecl, self.line)
            .attr("name", &self.name)
            .children(self.members.iter().map(|m| match m {
                Member::Field(field) => field.to_tree(),
                Member::Method(method) => method.to_tree(),
            }))
    }
}

impl ToTree for FieldDecl {
    fn to_tree(&self) -> TreeNode {
        let node = TreeNode::new(NodeKind::FieldDecl, self.line)
            .attr("name", &self.name)
            .attr("type", &self.ty);
        match &self.init {
            Some(init) => node.child(init.to_tree()),
            None => node,
        }
    }
}

impl ToTree for MethodDecl {
    fn to_tree(&self) -> TreeNode {
        let params = TreeNode::new(NodeKind::ParameterList, self.line).children(self.params.iter().map(|p| {
            TreeNode::new(NodeKind::Parameter, p.line)
                .attr("name", &p.name)
                .attr("type", &p.ty)
        }));
        TreeNode::new(NodeKind::MethodDecl, self.line)
            .attr("name", &self.name)
            .attr("type", &self.return_type)
            .child(params)
            .child(self.body.to_tree())
    }
}

impl ToTree for Block {
    fn to_tree(&self) -> TreeNode {
        TreeNode::new(NodeKind::Block, self.line).children(self.stmts.iter().map(ToTree::to_tree))
    }
}

impl ToTree for VarDecl {
    fn to_tree(&self) -> TreeNode {
        let node = TreeNode::new(NodeKind::VariableDecl, self.line)
            .attr("name", &self.name)
            .attr("type", &self.ty);
        match &self.init {
            Some(init) => node.child(init.to_tree()),
            None => node,
        }
    }
}

impl ToTree for Stmt {
    fn to_tree(&self) -> TreeNode {
        let node = TreeNode::new(self.kind.node_kind(), self.line);
        match &self.kind {
            StmtKind::VarDecl(decl) => decl.to_tree(),
            StmtKind::Block(block) => block.to_tree(),
            StmtKind::If { condition, then_branch, else_branch } => {
                let node = node.child(condition.to_tree()).child(then_branch.to_tree());
                match else_branch {
                    Some(else_branch) => node.child(else_branch.to_tree()),
                    None => node,
                }
            }
            StmtKind::While { condition, body } => node.child(condition.to_tree()).child(body.to_tree()),
            StmtKind::DoWhile { body, condition } => node.child(body.to_tree()).child(condition.to_tree()),
            StmtKind::For { init, condition, update, body } => node
                .children(init.iter().map(|s| s.to_tree()))
                .children(condition.iter().map(ToTree::to_tree))
                .children(update.iter().map(ToTree::to_tree))
                .child(body.to_tree()),
            StmtKind::Switch { condition, arms } => node.child(condition.to_tree()).children(arms.iter().map(|arm| match arm {
                SwitchArm::Case { value, body, line } => TreeNode::new(NodeKind::Case, *line)
                    .child(value.to_tree())
                    .child(body.to_tree()),
                SwitchArm::Default { body, line } => TreeNode::new(NodeKind::Default, *line).child(body.to_tree()),
            })),
            StmtKind::Return(value) => node.children(value.iter().map(ToTree::to_tree)),
            StmtKind::Expression(expr) => node.child(expr.to_tree()),
            StmtKind::Break | StmtKind::Continue => node,
        }
    }
}

impl ToTree for Expr {
    fn to_tree(&self) -> TreeNode {
        let node = TreeNode::new(self.kind.node_kind(), self.line);
        match &self.kind {
            ExprKind::Literal(lit) => node.attr("literalType", lit.value.kind_name()).attr("value", &lit.text),
            ExprKind::Variable(name) => node.attr("name", name),
            ExprKind::Binary { op, left, right } => node.attr("operator", op).child(left.to_tree()).child(right.to_tree()),
            ExprKind::Unary { op, operand } => {
                let position = if op.is_postfix() { "postfix" } else { "prefix" };
                node.attr("operator", op).attr("position", position).child(operand.to_tree())
            }
            ExprKind::MethodCall { receiver, name, args } => node
                .attr("name", name)
                .children(receiver.iter().map(|r| r.to_tree()))
                .children(args.iter().map(ToTree::to_tree)),
            ExprKind::ArrayAccess { array, index } => node.child(array.to_tree()).child(index.to_tree()),
            ExprKind::FieldAccess { object, field } => node.attr("field", field).child(object.to_tree()),
            ExprKind::New { ty, size, .. } => node.attr("type", ty).children(size.iter().map(|s| s.to_tree())),
            ExprKind::Assignment { target, value } => node.child(target.to_tree()).child(value.to_tree()),
            ExprKind::ArrayInit(elements) => node.children(elements.iter().map(ToTree::to_tree)),
        }
    }
}
