/**
 * Copyright 2022 - Jahred Love
 *
 * Redistribution and use in source and binary forms, with or without modification,
 * are permitted provided that the following conditions are met:
 *
 * 1. Redistributions of source code must retain the above copyright notice, this
 * list of conditions and the following disclaimer.
 *
 * 2. Redistributions in binary form must reproduce the above copyright notice, this
 * list of conditions and the following disclaimer in the documentation and/or other
 * materials provided with the distribution.
 *
 * 3. Neither the name of the copyright holder nor the names of its contributors may
 * be used to endorse or promote products derived from this software without specific
 * prior written permission.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS “AS IS” AND
 * ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE IMPLIED
 * WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE DISCLAIMED.
 * IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT,
 * INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT
 * NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR
 * PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
 * WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE)
 * ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
 * POSSIBILITY OF SUCH DAMAGE.
 */

// Expression emission: precedence climbing over the binary operator table,
// with primaries handling literals, unary forms, f-string runs, and the
// identifier postfix grammar (calls, indexing, assignment). Intrinsic call
// sites lower to syscalls instead of user CALLs.

use super::Parser;
use crate::casm::{Op, SYS_PRINTF, SYS_STR};
use crate::intrinsics;
use crate::token::TokenKind;
use crate::typectx;

/// Binary operator precedences, lowest to highest. The walrus sits at the
/// bottom of the table (level 0) but is recognized in the identifier
/// postfix position, since its left side must be a plain name.
fn binary_prec(kind: TokenKind) -> Option<(u8, Op)> {
    Some(match kind {
        TokenKind::PipePipe => (1, Op::LogicOr),
        TokenKind::AmpAmp => (2, Op::LogicAnd),
        TokenKind::Pipe => (3, Op::BitOr),
        TokenKind::Caret => (4, Op::BitXor),
        TokenKind::Amp => (5, Op::BitAnd),
        TokenKind::EqEq => (6, Op::Eq),
        TokenKind::NotEq => (6, Op::Ne),
        TokenKind::Lt => (7, Op::Lt),
        TokenKind::Le => (7, Op::Le),
        TokenKind::Gt => (7, Op::Gt),
        TokenKind::Ge => (7, Op::Ge),
        TokenKind::Shl => (8, Op::Shl),
        TokenKind::Shr => (8, Op::Shr),
        TokenKind::Plus => (9, Op::Add),
        TokenKind::Minus => (9, Op::Sub),
        TokenKind::Star => (10, Op::Mul),
        TokenKind::Slash => (10, Op::Div),
        TokenKind::Percent => (10, Op::Mod),
        _ => return None,
    })
}

impl Parser {
    /// Precedence climbing: emit the leftmost atom, then while the next
    /// token is a binary operator at or above `min_prec`, emit the right
    /// operand and append the opcode (folding literal operands).
    pub(super) fn parse_expression(&mut self, min_prec: u8) {
        self.parse_primary();
        loop {
            let (prec, op) = match binary_prec(self.kind()) {
                Some(x) => x,
                None => break,
            };
            if prec < min_prec {
                break;
            }
            self.bump();
            self.parse_expression(prec + 1);
            self.code.binary_op(op);
        }
    }

    fn parse_primary(&mut self) {
        if self.at(TokenKind::FStringPart) || self.at(TokenKind::LBraceExp) {
            self.parse_fstring_run();
            return;
        }
        let t = match self.bump() {
            Some(t) => t,
            None => return,
        };
        match t.kind {
            TokenKind::Integer => {
                // A literal that fails to parse as i32 compiles as zero.
                let v = t.text.parse::<i32>().unwrap_or(0);
                self.code.push_int(v);
            }
            TokenKind::Str => self.code.push_str(&t.text),
            TokenKind::Minus => {
                self.parse_primary();
                self.code.push_int(-1);
                self.code.binary_op(Op::Mul);
            }
            TokenKind::Not => {
                self.parse_primary();
                self.code.op(Op::LogicNot);
            }
            TokenKind::Star => {
                // pointer dereference: 4-byte address read
                self.parse_primary();
                self.code.op(Op::ReadAddr);
                self.code.byte(4);
            }
            TokenKind::Amp => {
                // address-of: the operand stands for itself
                self.parse_primary();
            }
            TokenKind::LParen => {
                self.parse_expression(0);
                self.eat(TokenKind::RParen);
            }
            TokenKind::LBracket => {
                self.code.op(Op::ListNew);
                while !self.eof() && !self.at(TokenKind::RBracket) {
                    self.parse_expression(0);
                    self.code.op(Op::ListAppend);
                    self.eat(TokenKind::Comma);
                }
                self.eat(TokenKind::RBracket);
            }
            TokenKind::LBrace => {
                if !self.python_mode {
                    self.code.op(Op::DictNew);
                    while !self.eof() && !self.at(TokenKind::RBrace) {
                        self.parse_expression(0); // key
                        self.eat(TokenKind::Colon);
                        self.parse_expression(0); // value
                        self.code.op(Op::DictSet);
                        self.eat(TokenKind::Comma);
                    }
                    self.eat(TokenKind::RBrace);
                }
            }
            TokenKind::Keyword => match t.text.as_str() {
                "nullptr" => self.code.push_int(0),
                "true" => self.code.push_int(1),
                "false" => self.code.push_int(0),
                "sizeof" => self.parse_sizeof(),
                _ => {} // stray keyword in expression position: skipped
            },
            TokenKind::Identifier => self.parse_identifier_expr(t.text),
            _ => {} // unknown token: skipped
        }
    }

    fn parse_sizeof(&mut self) {
        let type_name = if self.eat(TokenKind::LParen) {
            let name = self.parse_type_name();
            self.eat(TokenKind::RParen);
            name
        } else {
            self.parse_type_name()
        };
        let size = typectx::type_size(&type_name, &self.types);
        self.code.push_int(size);
    }

    /// A run of f-string tokens: fragments push strings, interpolations
    /// evaluate and coerce through the str() syscall, and the pieces
    /// concatenate left-to-right with ADD.
    fn parse_fstring_run(&mut self) {
        let mut first = true;
        loop {
            if self.at(TokenKind::FStringPart) {
                let t = self.bump().expect("fstring part");
                self.code.push_str(&t.text);
            } else if self.at(TokenKind::LBraceExp) {
                self.bump();
                self.parse_expression(0);
                while !self.eof() && !self.at(TokenKind::RBraceExp) {
                    self.bump();
                }
                self.eat(TokenKind::RBraceExp);
                self.code.syscall(SYS_STR);
            } else {
                break;
            }
            if first {
                first = false;
            } else {
                self.code.binary_op(Op::Add);
            }
        }
    }

    /// Identifier atom: accumulate dotted/arrow accesses into a qualified
    /// name, then dispatch on what follows — call, index, assignment,
    /// walrus, or a plain load.
    fn parse_identifier_expr(&mut self, first: String) {
        let mut name = first;
        while self.at(TokenKind::Dot) || self.at(TokenKind::Arrow) {
            self.bump();
            match self.bump() {
                Some(t) => {
                    name.push('.');
                    name.push_str(&t.text);
                }
                None => break,
            }
        }

        if self.at(TokenKind::LParen) {
            self.bump();
            let mut count: i32 = 0;
            while !self.eof() && !self.at(TokenKind::RParen) {
                self.parse_expression(0);
                count += 1;
                self.eat(TokenKind::Comma);
            }
            self.eat(TokenKind::RParen);
            self.emit_call(&name, count);
            return;
        }

        if self.at(TokenKind::LBracket) {
            let target = self.mangle(&name);
            self.code.op(Op::Load);
            self.code.name(&target);
            self.bump(); // '['
            self.parse_expression(0);
            self.eat(TokenKind::RBracket);
            if self.eat(TokenKind::Eq) {
                self.parse_expression(0);
                self.code.op(Op::WriteAddr);
                self.code.byte(4);
            } else {
                self.code.op(Op::ReadAddr);
                self.code.byte(4);
            }
            return;
        }

        if self.at(TokenKind::Eq) {
            self.bump();
            self.parse_expression(0);
            let sym = self.mangle(&name);
            self.code.op(Op::Store);
            self.code.name(&sym);
            return;
        }

        if self.at(TokenKind::Walrus) {
            // assignment expression: store, then reload so the value stays
            // on the stack
            self.bump();
            self.parse_expression(0);
            let sym = self.mangle(&name);
            self.code.op(Op::Store);
            self.code.name(&sym);
            self.code.op(Op::Load);
            self.code.name(&sym);
            return;
        }

        if let Some(id) = intrinsics::load_constant(&name) {
            self.code.syscall(id);
            return;
        }
        let target = self.mangle(&name);
        self.code.op(Op::Load);
        self.code.name(&target);
    }

    fn emit_call(&mut self, name: &str, count: i32) {
        if name == "Console.WriteLine" {
            self.code.push_int(count);
            self.code.syscall(SYS_PRINTF);
            self.code.push_str("\\n");
            self.code.push_int(1);
            self.code.syscall(SYS_PRINTF);
            return;
        }
        if let Some(id) = intrinsics::call_with_argc(name) {
            self.code.push_int(count);
            self.code.syscall(id);
            return;
        }
        if let Some(id) = intrinsics::call_bare(name) {
            self.code.syscall(id);
            return;
        }
        if let Some((suffix, id)) = intrinsics::method_suffix(name) {
            // reload the receiver, then push the argument count
            let receiver = name[..name.len() - suffix.len()].to_string();
            self.code.op(Op::Load);
            self.code.name(&receiver);
            self.code.push_int(count);
            self.code.syscall(id);
            return;
        }
        let target = self.mangle(name);
        self.trace(&format!("call {}", target));
        self.code.op(Op::Call);
        self.code.name(&target);
    }
}
