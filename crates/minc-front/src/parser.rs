//! Recursive-descent parser driving SSA construction.
//!
//! The parser consumes the token stream and emits typed instructions
//! directly into the function's blocks; there is no AST. Every declared
//! variable is backed by an `AllocA` at the head of the entry block;
//! reads insert `Load`s and writes insert `Store`s, so variable dataflow
//! goes through memory and the parser never places a phi. Phi synthesis
//! belongs to a later memory-to-SSA pass over the verified IR.
//!
//! Grammar, precedence low to high:
//!
//! ```text
//! statement   := block | ';' | if | while | do-while | for | expr ';'
//! declaration := type [ name ['=' assignment] (',' ...)* ] ';'
//! expression  := assignment (',' assignment)*
//! assignment  := comparison ['=' assignment]         (right-associative)
//! comparison  := add [('=='|'!='|'<'|'<='|'>'|'>=') add]
//! add         := prefix ('+' prefix)*
//! prefix      := ('*'|'&') prefix | primary
//! primary     := '(' expression ')' | ident | bool-lit
//!              | 'null' | int-lit | 'cast' '(' type ',' expression ')'
//! ```

use indexmap::IndexMap;

use minc_core::{
    construct_block_graph, BlockId, CastKind, Function, Inst, IntValue, IntWidth, NodeId, Op,
    TypeId, TypeKind, TypeTable, Value,
};
use minc_core::CmpOp;

use crate::error::CompileError;
use crate::token::TokenKind;
use crate::tokenizer::Tokenizer;

/// Parses one program (an implicit function body read until end of
/// input) into a function with predecessor lists and dominators
/// populated. The first violation aborts with an error.
pub fn parse(
    types: &mut TypeTable,
    source: &str,
    dump_source: bool,
) -> Result<Function, CompileError> {
    let tokenizer = Tokenizer::new(source, dump_source)?;
    let mut func = Function::new();
    let start = func.start();
    let mut parser = Parser {
        tokenizer,
        types,
        func,
        current: start,
        scopes: vec![IndexMap::new()],
    };
    parser.block_interior()?;
    if parser.tokenizer.kind != TokenKind::Eof {
        return Err(parser.syntax("unexpected token"));
    }
    let mut func = parser.func;
    construct_block_graph(&mut func);
    tracing::debug!(
        blocks = func.block_count(),
        insts = func.inst_count(),
        vars = func.var_count(),
        "ssa construction complete"
    );
    Ok(func)
}

/// A name in scope: its declared type and the address of its storage.
struct Symbol {
    ty: TypeId,
    addr: NodeId,
}

/// Parse-time classification of an expression result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    /// An address; assignable. `node` is the storage address.
    LValue,
    /// A materialized value. `node` produces the value itself.
    RValue,
}

/// An entry of the parser's value bookkeeping: the producing instruction,
/// the source-level type, and the lvalue/rvalue classification.
#[derive(Debug, Clone, Copy)]
struct Operand {
    node: NodeId,
    ty: TypeId,
    kind: ValueKind,
}

struct Parser<'t> {
    tokenizer: Tokenizer,
    types: &'t mut TypeTable,
    func: Function,
    current: BlockId,
    scopes: Vec<IndexMap<String, Symbol>>,
}

impl Parser<'_> {
    // -----------------------------------------------------------------------
    // Small helpers
    // -----------------------------------------------------------------------

    fn syntax(&self, message: impl Into<String>) -> CompileError {
        CompileError::Syntax {
            line: self.tokenizer.line(),
            col: self.tokenizer.column(),
            message: message.into(),
        }
    }

    fn semantic(&self, message: impl Into<String>) -> CompileError {
        CompileError::Semantic {
            line: self.tokenizer.line(),
            col: self.tokenizer.column(),
            message: message.into(),
        }
    }

    fn lexical(&self, message: impl Into<String>) -> CompileError {
        CompileError::Lexical {
            line: self.tokenizer.line(),
            col: self.tokenizer.column(),
            message: message.into(),
        }
    }

    /// Consumes the current token, which must be `kind`.
    fn expect(&mut self, kind: TokenKind) -> Result<(), CompileError> {
        if self.tokenizer.kind != kind {
            return Err(self.syntax(format!("expected {}", kind.describe())));
        }
        self.tokenizer.read_next()
    }

    fn emit(&mut self, inst: Inst) -> NodeId {
        self.func.append(self.current, inst)
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn push_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Materializes an lvalue by loading through its address; rvalues pass
    /// through unchanged.
    fn rvalue(&mut self, operand: Operand) -> Operand {
        match operand.kind {
            ValueKind::RValue => operand,
            ValueKind::LValue => {
                let node = self.emit(Inst::new(operand.ty, Op::Load { addr: operand.node }));
                Operand {
                    node,
                    ty: operand.ty,
                    kind: ValueKind::RValue,
                }
            }
        }
    }

    fn emit_constant(&mut self, value: Value) -> Operand {
        let ty = value.type_id(self.types);
        let node = self.emit(Inst::new(ty, Op::Constant(value)));
        Operand {
            node,
            ty,
            kind: ValueKind::RValue,
        }
    }

    /// Inserts a conversion of `operand` to `to` when its type differs.
    fn coerce(&mut self, operand: Operand, to: TypeId) -> Operand {
        if operand.ty == to {
            return operand;
        }
        let node = self.emit(Inst::new(to, Op::Cast { arg: operand.node }));
        Operand {
            node,
            ty: to,
            kind: ValueKind::RValue,
        }
    }

    fn is_boolean(&self, ty: TypeId) -> bool {
        *self.types.kind(ty) == TypeKind::Boolean
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    fn primary(&mut self) -> Result<Operand, CompileError> {
        match self.tokenizer.kind {
            TokenKind::LParen => {
                self.tokenizer.read_next()?;
                let operand = self.expression(false)?;
                self.expect(TokenKind::RParen)?;
                Ok(operand)
            }
            TokenKind::Identifier => {
                let symbol = self
                    .lookup(&self.tokenizer.text)
                    .ok_or_else(|| self.semantic("undeclared symbol"))?;
                let operand = Operand {
                    node: symbol.addr,
                    ty: symbol.ty,
                    kind: ValueKind::LValue,
                };
                self.tokenizer.read_next()?;
                Ok(operand)
            }
            TokenKind::False => {
                self.tokenizer.read_next()?;
                Ok(self.emit_constant(Value::Boolean(false)))
            }
            TokenKind::True => {
                self.tokenizer.read_next()?;
                Ok(self.emit_constant(Value::Boolean(true)))
            }
            TokenKind::Null => {
                self.tokenizer.read_next()?;
                Ok(self.emit_constant(Value::NullPointer))
            }
            TokenKind::IntLiteral => {
                let value = self.integer_literal()?;
                self.tokenizer.read_next()?;
                Ok(self.emit_constant(value))
            }
            TokenKind::Cast => {
                self.tokenizer.read_next()?;
                self.expect(TokenKind::LParen)?;
                let to = self.parse_type()?;
                self.expect(TokenKind::Comma)?;
                let operand = self.expression(false)?;
                let operand = self.rvalue(operand);
                if !self.types.can_cast(operand.ty, to, CastKind::Explicit) {
                    return Err(self.semantic("invalid cast"));
                }
                let node = self.emit(Inst::new(to, Op::Cast { arg: operand.node }));
                self.expect(TokenKind::RParen)?;
                Ok(Operand {
                    node,
                    ty: to,
                    kind: ValueKind::RValue,
                })
            }
            _ => Err(self.syntax("expected (, id, true, false, null, an integer, or cast")),
        }
    }

    fn prefix(&mut self) -> Result<Operand, CompileError> {
        match self.tokenizer.kind {
            TokenKind::Star => {
                self.tokenizer.read_next()?;
                let operand = self.prefix()?;
                let operand = self.rvalue(operand);
                let pointee = self
                    .types
                    .dereference(operand.ty)
                    .ok_or_else(|| self.semantic("can't dereference a non-pointer"))?;
                Ok(Operand {
                    node: operand.node,
                    ty: pointee,
                    kind: ValueKind::LValue,
                })
            }
            TokenKind::Ampersand => {
                self.tokenizer.read_next()?;
                let operand = self.prefix()?;
                if operand.kind != ValueKind::LValue {
                    return Err(self.semantic("can't take address of a rvalue"));
                }
                let pointer = self.types.pointer(operand.ty);
                let constant_pointer = self.types.to_constant(pointer);
                Ok(Operand {
                    node: operand.node,
                    ty: constant_pointer,
                    kind: ValueKind::RValue,
                })
            }
            _ => self.primary(),
        }
    }

    fn add_expression(&mut self) -> Result<Operand, CompileError> {
        let mut lhs = self.prefix()?;
        while self.tokenizer.kind == TokenKind::Plus {
            let left = self.rvalue(lhs);
            self.tokenizer.read_next()?;
            let right = self.prefix()?;
            let right = self.rvalue(right);
            let combined = self
                .types
                .arith_combined(left.ty, right.ty)
                .ok_or_else(|| self.semantic("types not compatible"))?;
            let left = self.coerce(left, combined.lhs);
            let right = self.coerce(right, combined.rhs);
            let node = self.emit(Inst::new(
                combined.result,
                Op::Add {
                    lhs: left.node,
                    rhs: right.node,
                },
            ));
            lhs = Operand {
                node,
                ty: combined.result,
                kind: ValueKind::RValue,
            };
        }
        Ok(lhs)
    }

    fn comparison_expression(&mut self) -> Result<Operand, CompileError> {
        let lhs = self.add_expression()?;
        let op = match self.tokenizer.kind {
            TokenKind::EqualEqual => CmpOp::Eq,
            TokenKind::NotEqual => CmpOp::Ne,
            TokenKind::LessEqual => CmpOp::Le,
            TokenKind::GreaterEqual => CmpOp::Ge,
            TokenKind::Less => CmpOp::Lt,
            TokenKind::Greater => CmpOp::Gt,
            _ => return Ok(lhs),
        };
        self.tokenizer.read_next()?;
        let left = self.rvalue(lhs);
        let rhs = self.add_expression()?;
        let right = self.rvalue(rhs);
        let combined = self
            .types
            .compare_combined(left.ty, right.ty)
            .ok_or_else(|| self.semantic("types not compatible"))?;
        let left = self.coerce(left, combined.lhs);
        let right = self.coerce(right, combined.rhs);
        let node = self.emit(Inst::new(
            combined.result,
            Op::Compare {
                op,
                lhs: left.node,
                rhs: right.node,
            },
        ));
        Ok(Operand {
            node,
            ty: combined.result,
            kind: ValueKind::RValue,
        })
    }

    fn assignment_expression(&mut self) -> Result<Operand, CompileError> {
        let target = self.comparison_expression()?;
        if self.tokenizer.kind != TokenKind::Equal {
            return Ok(target);
        }
        if target.kind != ValueKind::LValue {
            return Err(self.semantic("can't assign to rvalue"));
        }
        if self.types.get(target.ty).constant {
            return Err(self.semantic("can't assign to constant"));
        }
        self.tokenizer.read_next()?;
        let value = self.assignment_expression()?;
        let value = self.rvalue(value);
        self.store_into(target.node, target.ty, value)?;
        Ok(target)
    }

    /// Checks assignability, inserts the implicit conversion when the
    /// stripped types differ, and emits the store.
    fn store_into(
        &mut self,
        addr: NodeId,
        target_ty: TypeId,
        value: Operand,
    ) -> Result<(), CompileError> {
        let fully_qualified = {
            let v = self.types.to_volatile(target_ty);
            self.types.to_constant(v)
        };
        if !self
            .types
            .can_cast(value.ty, fully_qualified, CastKind::Implicit)
        {
            return Err(self.semantic("invalid types for ="));
        }
        let value_base = self.types.strip_qualifiers(value.ty);
        let target_base = self.types.strip_qualifiers(target_ty);
        let value = if value_base != target_base {
            let to = self.types.to_constant(target_ty);
            self.coerce(value, to)
        } else {
            value
        };
        self.emit(Inst::new(
            TypeId::VOID,
            Op::Store {
                addr,
                value: value.node,
            },
        ));
        Ok(())
    }

    fn expression(&mut self, ignore_comma: bool) -> Result<Operand, CompileError> {
        let mut operand = self.assignment_expression()?;
        while self.tokenizer.kind == TokenKind::Comma && !ignore_comma {
            self.tokenizer.read_next()?;
            operand = self.assignment_expression()?;
        }
        Ok(operand)
    }

    /// Converts the current integer-literal token, typing it as the
    /// narrowest signed width that holds the value, falling back to the
    /// unsigned width, then wider.
    fn integer_literal(&mut self) -> Result<Value, CompileError> {
        let text = &self.tokenizer.text;
        // Base chosen explicitly: octal stays disabled.
        let (digits, radix) = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => (hex, 16),
            None => (text.as_str(), 10),
        };
        let value = u64::from_str_radix(digits, radix).map_err(|e| {
            if *e.kind() == std::num::IntErrorKind::PosOverflow {
                self.lexical("number too big")
            } else {
                self.lexical("invalid integer literal")
            }
        })?;
        let (unsigned, width) = literal_type(value);
        Ok(Value::Integer(IntValue::new(unsigned, width, value)))
    }

    // -----------------------------------------------------------------------
    // Types
    // -----------------------------------------------------------------------

    fn parse_qualifiers(&mut self) -> Result<(bool, bool), CompileError> {
        let mut constant = false;
        let mut volatile = false;
        loop {
            match self.tokenizer.kind {
                TokenKind::Constant => {
                    if constant {
                        return Err(self.syntax("too many \"constant\"s"));
                    }
                    constant = true;
                    self.tokenizer.read_next()?;
                }
                TokenKind::Volatile => {
                    if volatile {
                        return Err(self.syntax("too many \"volatile\"s"));
                    }
                    volatile = true;
                    self.tokenizer.read_next()?;
                }
                _ => return Ok((constant, volatile)),
            }
        }
    }

    fn apply_qualifiers(&mut self, ty: TypeId, qualifiers: (bool, bool)) -> TypeId {
        let (constant, volatile) = qualifiers;
        let mut ty = ty;
        if volatile {
            ty = self.types.to_volatile(ty);
        }
        if constant {
            ty = self.types.to_constant(ty);
        }
        ty
    }

    fn base_type(&mut self) -> Result<TypeId, CompileError> {
        let ty = match self.tokenizer.kind {
            TokenKind::Void => self.types.void(),
            TokenKind::Boolean => self.types.boolean(),
            TokenKind::Int8 => self.types.integer(false, IntWidth::Int8),
            TokenKind::UInt8 => self.types.integer(true, IntWidth::Int8),
            TokenKind::Int16 => self.types.integer(false, IntWidth::Int16),
            TokenKind::UInt16 => self.types.integer(true, IntWidth::Int16),
            TokenKind::Int32 => self.types.integer(false, IntWidth::Int32),
            TokenKind::UInt32 => self.types.integer(true, IntWidth::Int32),
            TokenKind::Int64 => self.types.integer(false, IntWidth::Int64),
            TokenKind::UInt64 => self.types.integer(true, IntWidth::Int64),
            TokenKind::Int => self.types.integer(false, IntWidth::Native),
            TokenKind::UInt => self.types.integer(true, IntWidth::Native),
            _ => return Err(self.syntax("expected a type")),
        };
        self.tokenizer.read_next()?;
        Ok(ty)
    }

    /// `[qualifiers] base [qualifiers] ('*' [qualifiers])*`
    fn parse_type(&mut self) -> Result<TypeId, CompileError> {
        let qualifiers = self.parse_qualifiers()?;
        let mut ty = self.base_type()?;
        ty = self.apply_qualifiers(ty, qualifiers);
        let qualifiers = self.parse_qualifiers()?;
        ty = self.apply_qualifiers(ty, qualifiers);
        while self.tokenizer.kind == TokenKind::Star {
            self.tokenizer.read_next()?;
            ty = self.types.pointer(ty);
            let qualifiers = self.parse_qualifiers()?;
            ty = self.apply_qualifiers(ty, qualifiers);
        }
        Ok(ty)
    }

    // -----------------------------------------------------------------------
    // Declarations
    // -----------------------------------------------------------------------

    fn declaration(&mut self, terminating: TokenKind) -> Result<(), CompileError> {
        let ty = self.parse_type()?;
        if self.tokenizer.kind == TokenKind::Semicolon {
            // A bare type declares nothing.
            self.tokenizer.read_next()?;
            return Ok(());
        }
        loop {
            if self.tokenizer.kind != TokenKind::Identifier {
                return Err(self.syntax("expected id"));
            }
            let name = self.tokenizer.text.clone();
            if self
                .scopes
                .last()
                .map_or(false, |scope| scope.contains_key(&name))
            {
                return Err(self.semantic("can't redefine symbol in same scope"));
            }
            let default = self
                .types
                .default_value(ty)
                .ok_or_else(|| self.semantic("invalid type for variable"))?;
            let addr = self.declare(&name, ty);
            self.tokenizer.read_next()?;
            if self.tokenizer.kind == TokenKind::Equal {
                self.tokenizer.read_next()?;
                let value = self.expression(true)?;
                let value = self.rvalue(value);
                self.store_into(addr, ty, value)?;
            } else {
                let value = self.emit_constant(default);
                self.emit(Inst::new(
                    TypeId::VOID,
                    Op::Store {
                        addr,
                        value: value.node,
                    },
                ));
            }
            if self.tokenizer.kind == terminating {
                self.tokenizer.read_next()?;
                return Ok(());
            }
            self.expect(TokenKind::Comma)?;
        }
    }

    /// Materializes storage for a new symbol: an `AllocA` at the head of
    /// the entry block (which holds no phis), registered in the innermost
    /// scope.
    fn declare(&mut self, name: &str, ty: TypeId) -> NodeId {
        let var = self.func.add_var(name, ty);
        let pointer = self.types.pointer(ty);
        let constant_pointer = self.types.to_constant(pointer);
        let entry = self.func.start();
        let addr = self
            .func
            .prepend(entry, Inst::new(constant_pointer, Op::AllocA { var }));
        self.func.var_mut(var).alloc = Some(addr);
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name.to_string(), Symbol { ty, addr });
        tracing::trace!(name, %addr, "declared variable");
        addr
    }

    // -----------------------------------------------------------------------
    // Statements and control flow
    // -----------------------------------------------------------------------

    /// Parses a parenthesized boolean condition in the current block and
    /// returns its value node.
    fn condition(&mut self, context: &str) -> Result<NodeId, CompileError> {
        if self.tokenizer.kind != TokenKind::LParen {
            return Err(self.syntax("expected ("));
        }
        // The primary rule consumes the parentheses.
        let operand = self.expression(false)?;
        let operand = self.rvalue(operand);
        if !self.is_boolean(operand.ty) {
            return Err(self.semantic(format!("{context} condition type must be boolean")));
        }
        Ok(operand.node)
    }

    fn if_statement(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::If)?;
        let cond = self.condition("if")?;
        let cond_block = self.current;
        let then_block = self.func.add_block();
        self.current = then_block;
        self.statement()?;
        let then_exit = self.current;
        if self.tokenizer.kind == TokenKind::Else {
            self.tokenizer.read_next()?;
            let else_block = self.func.add_block();
            self.current = else_block;
            self.statement()?;
            let else_exit = self.current;
            let end_block = self.func.add_block();
            self.func
                .set_terminator(then_exit, Inst::new(TypeId::VOID, Op::Jump { target: end_block }));
            self.func
                .set_terminator(else_exit, Inst::new(TypeId::VOID, Op::Jump { target: end_block }));
            self.func.set_terminator(
                cond_block,
                Inst::new(
                    TypeId::VOID,
                    Op::Branch {
                        cond,
                        on_true: then_block,
                        on_false: else_block,
                    },
                ),
            );
            self.current = end_block;
        } else {
            let end_block = self.func.add_block();
            self.func
                .set_terminator(then_exit, Inst::new(TypeId::VOID, Op::Jump { target: end_block }));
            self.func.set_terminator(
                cond_block,
                Inst::new(
                    TypeId::VOID,
                    Op::Branch {
                        cond,
                        on_true: then_block,
                        on_false: end_block,
                    },
                ),
            );
            self.current = end_block;
        }
        Ok(())
    }

    fn while_statement(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::While)?;
        let cond_block = self.func.add_block();
        self.func.set_terminator(
            self.current,
            Inst::new(TypeId::VOID, Op::Jump { target: cond_block }),
        );
        self.current = cond_block;
        let cond = self.condition("while")?;
        let cond_exit = self.current;
        let body_block = self.func.add_block();
        self.current = body_block;
        self.statement()?;
        self.func.set_terminator(
            self.current,
            Inst::new(TypeId::VOID, Op::Jump { target: cond_block }),
        );
        let end_block = self.func.add_block();
        self.func.set_terminator(
            cond_exit,
            Inst::new(
                TypeId::VOID,
                Op::Branch {
                    cond,
                    on_true: body_block,
                    on_false: end_block,
                },
            ),
        );
        self.current = end_block;
        Ok(())
    }

    fn do_while_statement(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::Do)?;
        let body_block = self.func.add_block();
        self.func.set_terminator(
            self.current,
            Inst::new(TypeId::VOID, Op::Jump { target: body_block }),
        );
        self.current = body_block;
        self.statement()?;
        self.expect(TokenKind::While)?;
        let cond = self.condition("do while")?;
        let end_block = self.func.add_block();
        self.func.set_terminator(
            self.current,
            Inst::new(
                TypeId::VOID,
                Op::Branch {
                    cond,
                    on_true: body_block,
                    on_false: end_block,
                },
            ),
        );
        self.current = end_block;
        self.expect(TokenKind::Semicolon)
    }

    fn for_statement(&mut self) -> Result<(), CompileError> {
        // Declarations in the header live in their own scope.
        self.push_scope();
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::LParen)?;
        self.expression_or_declaration()?;

        let cond_block = self.func.add_block();
        self.func.set_terminator(
            self.current,
            Inst::new(TypeId::VOID, Op::Jump { target: cond_block }),
        );
        self.current = cond_block;
        let operand = self.expression(false)?;
        let operand = self.rvalue(operand);
        if !self.is_boolean(operand.ty) {
            return Err(self.semantic("for condition type must be boolean"));
        }
        let cond = operand.node;
        let cond_exit = self.current;
        self.expect(TokenKind::Semicolon)?;

        let update_block = self.func.add_block();
        self.current = update_block;
        self.expression(false)?;
        self.expect(TokenKind::RParen)?;
        self.func.set_terminator(
            self.current,
            Inst::new(TypeId::VOID, Op::Jump { target: cond_block }),
        );

        let body_block = self.func.add_block();
        self.current = body_block;
        self.statement()?;
        self.func.set_terminator(
            self.current,
            Inst::new(TypeId::VOID, Op::Jump { target: update_block }),
        );

        let end_block = self.func.add_block();
        self.func.set_terminator(
            cond_exit,
            Inst::new(
                TypeId::VOID,
                Op::Branch {
                    cond,
                    on_true: body_block,
                    on_false: end_block,
                },
            ),
        );
        self.current = end_block;
        self.pop_scope();
        Ok(())
    }

    fn expression_or_declaration(&mut self) -> Result<(), CompileError> {
        if self.tokenizer.kind.starts_expression() {
            self.expression(false)?;
            self.expect(TokenKind::Semicolon)
        } else if self.tokenizer.kind.starts_type() {
            self.declaration(TokenKind::Semicolon)
        } else {
            Err(self.syntax("unexpected token"))
        }
    }

    fn statement(&mut self) -> Result<(), CompileError> {
        match self.tokenizer.kind {
            kind if kind.starts_expression() => {
                self.expression(false)?;
                self.expect(TokenKind::Semicolon)
            }
            TokenKind::LBrace => self.block(),
            TokenKind::Semicolon => self.tokenizer.read_next(),
            TokenKind::If => self.if_statement(),
            TokenKind::Do => self.do_while_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::Break | TokenKind::Continue | TokenKind::GoTo => {
                Err(self.syntax("unsupported statement"))
            }
            _ => Err(self.syntax("expected statement")),
        }
    }

    fn block(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::LBrace)?;
        self.block_interior()?;
        self.expect(TokenKind::RBrace)
    }

    fn block_interior(&mut self) -> Result<(), CompileError> {
        self.push_scope();
        while self.tokenizer.kind != TokenKind::Eof && self.tokenizer.kind != TokenKind::RBrace {
            if self.tokenizer.kind.starts_type() {
                self.declaration(TokenKind::Semicolon)?;
            } else {
                self.statement()?;
            }
        }
        self.pop_scope();
        Ok(())
    }
}

/// The narrowest type holding a literal: signed first, then unsigned of
/// the same width, then wider.
fn literal_type(value: u64) -> (bool, IntWidth) {
    if value <= i8::MAX as u64 {
        (false, IntWidth::Int8)
    } else if value <= u8::MAX as u64 {
        (true, IntWidth::Int8)
    } else if value <= i16::MAX as u64 {
        (false, IntWidth::Int16)
    } else if value <= u16::MAX as u64 {
        (true, IntWidth::Int16)
    } else if value <= i32::MAX as u64 {
        (false, IntWidth::Int32)
    } else if value <= u32::MAX as u64 {
        (true, IntWidth::Int32)
    } else if value <= i64::MAX as u64 {
        (false, IntWidth::Int64)
    } else {
        (true, IntWidth::Int64)
    }
}
