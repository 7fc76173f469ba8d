//! Statements and return checking.

use tern_core::{CompilationError, Result, Type};
use tern_registry::ir;
use tern_syntax::ast::{Block, IfStmt, ReturnStmt, Stmt, VarDecl, WhileStmt};

use super::Transformer;

impl<'a, 'ast> Transformer<'a, 'ast> {
    /// Transform a block in its own scope.
    pub(crate) fn transform_block(&mut self, block: &'ast Block<'ast>) -> Result<ir::Block> {
        self.scoped(|t| t.transform_stmts(block))
    }

    /// Transform the statements of a block in the current scope.
    pub(crate) fn transform_stmts(&mut self, block: &'ast Block<'ast>) -> Result<ir::Block> {
        let stmts = block
            .stmts
            .iter()
            .map(|stmt| self.transform_stmt(stmt))
            .collect::<Result<Vec<_>>>()?;
        Ok(ir::Block {
            stmts,
            span: block.span,
        })
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    fn transform_stmt(&mut self, stmt: &'ast Stmt<'ast>) -> Result<ir::Stmt> {
        match stmt {
            Stmt::Var(decl) => self.transform_local(decl),
            Stmt::Expr(stmt) => Ok(ir::Stmt::Expr(self.transform_expr(stmt.expr)?)),
            Stmt::Return(ret) => self.transform_return(ret),
            Stmt::Block(block) => Ok(ir::Stmt::Block(self.transform_block(block)?)),
            Stmt::If(stmt) => self.transform_if(stmt),
            Stmt::While(stmt) => self.transform_while(stmt),
        }
    }

    fn transform_local(&mut self, decl: &'ast VarDecl<'ast>) -> Result<ir::Stmt> {
        let (ty, init) = self.typed_initializer(decl)?;
        let id = self.ctx.fresh_var();
        self.declare_variable(decl, id, ty.clone(), false)?;
        Ok(ir::Stmt::Let {
            id,
            name: decl.name.name.to_string(),
            ty,
            init,
            is_mutable: decl.is_mutable,
        })
    }

    fn transform_return(&mut self, ret: &'ast ReturnStmt<'ast>) -> Result<ir::Stmt> {
        let Some(func) = self.ctx.function() else {
            return Err(CompilationError::InvalidReturn {
                reason: "return outside of a function",
                span: ret.span,
            });
        };
        let (expected, is_constructor) = {
            let func = self.ctx.registry.func(func);
            (func.ret.clone(), func.is_constructor())
        };

        match ret.value {
            Some(_) if is_constructor => Err(CompilationError::InvalidReturn {
                reason: "a constructor cannot return a value",
                span: ret.span,
            }),
            Some(value) => {
                let value = self.transform_expr(value)?;
                if expected.is_void() {
                    return Err(CompilationError::TypeMismatch {
                        expected: "void".to_string(),
                        found: self.pretty(&value.ty),
                        span: value.span,
                    });
                }
                Ok(ir::Stmt::Return(Some(self.coerce(value, &expected)?)))
            }
            None if expected.is_void() || is_constructor => Ok(ir::Stmt::Return(None)),
            None => Err(CompilationError::InvalidReturn {
                reason: "missing return value",
                span: ret.span,
            }),
        }
    }

    fn transform_if(&mut self, stmt: &'ast IfStmt<'ast>) -> Result<ir::Stmt> {
        let condition = self.condition(stmt.condition)?;
        let then_block = self.transform_block(&stmt.then_block)?;
        let else_block = match stmt.else_block.as_ref() {
            Some(block) => Some(self.transform_block(block)?),
            None => None,
        };
        Ok(ir::Stmt::If {
            condition,
            then_block,
            else_block,
        })
    }

    fn transform_while(&mut self, stmt: &'ast WhileStmt<'ast>) -> Result<ir::Stmt> {
        let condition = self.condition(stmt.condition)?;
        let body = self.transform_block(&stmt.body)?;
        Ok(ir::Stmt::While { condition, body })
    }

    fn condition(&mut self, expr: &'ast tern_syntax::ast::Expr<'ast>) -> Result<ir::Value> {
        let value = self.transform_expr(expr)?;
        self.coerce(value, &Type::bool())
    }
}
