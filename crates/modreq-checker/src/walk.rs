//! The statement and expression walk shared by both backends.
//!
//! Backends differ only in how a call is typed: the eager checker resolves
//! it on the spot, the constraint generator reserves a placeholder and
//! defers. Everything else (scopes, literals, function bodies) is the same
//! and lives in the provided methods of [`ScriptWalker`].

use modreq_parser::{BinaryOp, NodeArena, NodeIndex, NodeKind, UnaryOp};
use modreq_solver::{CallSite, TypeId};

use crate::module::{CheckedModule, TypeRef, call_site_for};
use crate::scope::Environment;

pub(crate) trait ScriptWalker<'a> {
    fn nodes(&self) -> &'a NodeArena;
    fn env(&mut self) -> &mut Environment<'a>;
    fn module(&mut self) -> &mut CheckedModule;

    /// Types the call at `call`. `callee` is `any` for method calls.
    fn type_call(&mut self, call: NodeIndex, callee: TypeRef, call_site: CallSite) -> TypeRef;

    /// Called after every top-level statement.
    fn end_statement(&mut self) {}

    fn walk_chunk(&mut self, root: NodeIndex) {
        let nodes = self.nodes();
        let Some(NodeKind::Chunk { statements }) = nodes.kind(root) else {
            return;
        };
        for &statement in statements {
            self.walk_statement(statement);
            self.end_statement();
        }
    }

    fn walk_block(&mut self, block: NodeIndex) {
        let nodes = self.nodes();
        let Some(NodeKind::Block { statements }) = nodes.kind(block) else {
            return;
        };
        self.env().push_scope();
        for &statement in statements {
            self.walk_statement(statement);
        }
        self.env().pop_scope();
    }

    fn walk_statement(&mut self, statement: NodeIndex) {
        let nodes = self.nodes();
        let Some(kind) = nodes.kind(statement) else {
            return;
        };
        match kind {
            NodeKind::Local { names, values } => {
                let types = self.walk_expression_list(values);
                for (i, name) in names.iter().enumerate() {
                    let ty = types
                        .get(i)
                        .copied()
                        .unwrap_or(TypeRef::Module(TypeId::NIL));
                    self.env().declare(name, ty);
                }
            }
            NodeKind::LocalFunction { name, function } => {
                // Declared first so the body can recurse.
                self.env().declare(name, TypeRef::ANY);
                let ty = self.walk_expression(*function);
                self.env().assign(name, ty);
            }
            NodeKind::FunctionStatement { target, function } => {
                let ty = self.walk_expression(*function);
                match nodes.kind(*target) {
                    Some(NodeKind::Identifier { name }) => {
                        self.env().assign(name, ty);
                    }
                    _ => {
                        self.walk_expression(*target);
                    }
                }
            }
            NodeKind::Assign { targets, values } => {
                let types = self.walk_expression_list(values);
                for (i, target) in targets.iter().enumerate() {
                    match nodes.kind(*target) {
                        Some(NodeKind::Identifier { name }) => {
                            let ty = types
                                .get(i)
                                .copied()
                                .unwrap_or(TypeRef::Module(TypeId::NIL));
                            self.env().assign(name, ty);
                        }
                        _ => {
                            self.walk_expression(*target);
                        }
                    }
                }
            }
            NodeKind::Return { values } => {
                self.walk_expression_list(values);
            }
            NodeKind::If {
                clauses,
                else_block,
            } => {
                for (condition, block) in clauses {
                    self.walk_expression(*condition);
                    self.walk_block(*block);
                }
                if else_block.is_some() {
                    self.walk_block(*else_block);
                }
            }
            NodeKind::While { condition, body } => {
                self.walk_expression(*condition);
                self.walk_block(*body);
            }
            NodeKind::Repeat { body, condition } => {
                self.walk_block(*body);
                self.walk_expression(*condition);
            }
            NodeKind::For {
                names,
                header,
                body,
            } => {
                self.walk_expression_list(header);
                self.env().push_scope();
                for name in names {
                    self.env().declare(name, TypeRef::ANY);
                }
                self.walk_block(*body);
                self.env().pop_scope();
            }
            NodeKind::Block { .. } => self.walk_block(statement),
            NodeKind::ExpressionStatement { expression } => {
                self.walk_expression(*expression);
            }
            NodeKind::Break | NodeKind::Continue | NodeKind::Error => {}
            _ => {
                self.walk_expression(statement);
            }
        }
    }

    fn walk_expression_list(&mut self, values: &[NodeIndex]) -> Vec<TypeRef> {
        values
            .iter()
            .map(|value| self.walk_expression(*value))
            .collect()
    }

    fn walk_expression(&mut self, expr: NodeIndex) -> TypeRef {
        let nodes = self.nodes();
        let Some(kind) = nodes.kind(expr) else {
            return TypeRef::ANY;
        };
        let ty = match kind {
            NodeKind::Identifier { name } => self.env().lookup(name),
            NodeKind::StringLiteral { .. } => TypeRef::Module(TypeId::STRING),
            NodeKind::BooleanLiteral { .. } => TypeRef::Module(TypeId::BOOLEAN),
            NodeKind::NilLiteral => TypeRef::Module(TypeId::NIL),
            NodeKind::Member { object, .. } => {
                self.walk_expression(*object);
                TypeRef::ANY
            }
            NodeKind::Index { object, key } => {
                self.walk_expression(*object);
                self.walk_expression(*key);
                TypeRef::ANY
            }
            NodeKind::Call {
                callee,
                method,
                args,
            } => {
                let callee_ty = self.walk_expression(*callee);
                self.walk_expression_list(args);
                let callee_ty = if method.is_some() {
                    TypeRef::ANY
                } else {
                    callee_ty
                };
                let call_site = call_site_for(nodes, expr, args);
                self.type_call(expr, callee_ty, call_site)
            }
            NodeKind::Function { params, body } => {
                let module = self.module();
                let param_pack = module.arena.add_pack(params.iter().map(|_| TypeId::ANY));
                let ret = module.arena.add_pack([TypeId::ANY]);
                let function = module
                    .arena
                    .add_function(modreq_solver::FunctionType::new(param_pack, ret));
                self.env().push_scope();
                for param in params {
                    self.env().declare(param, TypeRef::ANY);
                }
                self.walk_block(*body);
                self.env().pop_scope();
                TypeRef::Module(function)
            }
            NodeKind::Table { items } => {
                self.walk_expression_list(items);
                TypeRef::ANY
            }
            NodeKind::Binary { op, left, right } => {
                self.walk_expression(*left);
                self.walk_expression(*right);
                match op {
                    BinaryOp::Equal
                    | BinaryOp::NotEqual
                    | BinaryOp::Less
                    | BinaryOp::LessEqual
                    | BinaryOp::Greater
                    | BinaryOp::GreaterEqual => TypeRef::Module(TypeId::BOOLEAN),
                    BinaryOp::Concat => TypeRef::Module(TypeId::STRING),
                    _ => TypeRef::ANY,
                }
            }
            NodeKind::Unary { op, operand } => {
                self.walk_expression(*operand);
                match op {
                    UnaryOp::Not => TypeRef::Module(TypeId::BOOLEAN),
                    UnaryOp::Minus | UnaryOp::Len => TypeRef::ANY,
                }
            }
            NodeKind::Paren { expression } => self.walk_expression(*expression),
            _ => TypeRef::ANY,
        };
        self.module().expr_types.insert(expr, ty);
        ty
    }
}
