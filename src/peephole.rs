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

/// Constant folding over the emitted byte tail. The window is exactly two
/// PUSH_INT instructions (opcode + 4 value bytes, twice = 10 bytes); no
/// other opcode shares that five-byte prefix encoding, so the byte-signature
/// check cannot misfire.

use crate::casm::Op;

const OP_PUSH_INT: u8 = Op::PushInt as u8;

/// If the last ten bytes of `code` encode two PUSH_INT instructions and
/// `op` is a foldable arithmetic/bitwise operator, replace them with a
/// single PUSH_INT of the computed result and report true. Division and
/// modulus by a literal zero disable the fold. Comparison and logical
/// operators are never folded.
pub fn fold_const_binary(code: &mut Vec<u8>, op: Op) -> bool {
    let n = code.len();
    if n < 10 {
        return false;
    }
    if code[n - 10] != OP_PUSH_INT || code[n - 5] != OP_PUSH_INT {
        return false;
    }
    let a = i32::from_be_bytes([code[n - 9], code[n - 8], code[n - 7], code[n - 6]]);
    let b = i32::from_be_bytes([code[n - 4], code[n - 3], code[n - 2], code[n - 1]]);

    let folded = match op {
        Op::Add => a.wrapping_add(b),
        Op::Sub => a.wrapping_sub(b),
        Op::Mul => a.wrapping_mul(b),
        Op::Div => {
            if b == 0 {
                return false;
            }
            a.wrapping_div(b)
        }
        Op::Mod => {
            if b == 0 {
                return false;
            }
            a.wrapping_rem(b)
        }
        Op::Shl => a.wrapping_shl(b as u32),
        Op::Shr => a.wrapping_shr(b as u32),
        Op::BitAnd => a & b,
        Op::BitOr => a | b,
        Op::BitXor => a ^ b,
        _ => return false,
    };

    code.truncate(n - 10);
    code.push(OP_PUSH_INT);
    code.extend_from_slice(&folded.to_be_bytes());
    true
}
