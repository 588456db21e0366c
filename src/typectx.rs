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

// Type descriptor catalogue, seeded once at parser construction. There is no
// user-defined type syntax: recognizing a name here is what routes a
// statement into declaration parsing.

use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct TypeInfo {
    pub size: i32,
    pub pointer: bool,
    /// Field name and byte offset, in declaration order (aggregate types only).
    pub fields: &'static [(&'static str, i32)],
}

impl TypeInfo {
    const fn scalar(size: i32) -> Self {
        TypeInfo {
            size,
            pointer: false,
            fields: &[],
        }
    }

    const fn handle(size: i32) -> Self {
        TypeInfo {
            size,
            pointer: true,
            fields: &[],
        }
    }
}

/// Scalar specifiers that concatenate into one multi-word type name
/// (`unsigned long long int` reads as a single name).
pub const TYPE_SPECIFIERS: &[&str] = &[
    "unsigned", "signed", "long", "short", "char", "char8_t", "char16_t", "char32_t",
    "wchar_t", "int", "float", "double", "void", "bool", "_Bool",
];

pub fn is_type_specifier(word: &str) -> bool {
    TYPE_SPECIFIERS.contains(&word)
}

pub fn builtin_types() -> HashMap<&'static str, TypeInfo> {
    let mut types: HashMap<&'static str, TypeInfo> = HashMap::new();
    types.insert("int", TypeInfo::scalar(4));
    types.insert("char", TypeInfo::scalar(1));
    types.insert("void", TypeInfo::scalar(0));
    types.insert("FILE", TypeInfo::handle(4));
    types.insert("const", TypeInfo::scalar(0));
    types.insert("size_t", TypeInfo::scalar(4));
    types.insert("string", TypeInfo::scalar(4));
    types.insert("Task", TypeInfo::scalar(0));
    types.insert("var", TypeInfo::scalar(0));
    types.insert("bool", TypeInfo::scalar(1));
    types.insert("_Bool", TypeInfo::scalar(1));
    types.insert("double", TypeInfo::scalar(8));
    types.insert("float", TypeInfo::scalar(4));
    types.insert("time_t", TypeInfo::scalar(4));
    types.insert(
        "Point",
        TypeInfo {
            size: 8,
            pointer: false,
            fields: &[("x", 0), ("y", 4)],
        },
    );
    types.insert(
        "IntFloat",
        TypeInfo {
            size: 4,
            pointer: false,
            fields: &[("i", 0), ("f", 0)],
        },
    );
    types.insert("Color", TypeInfo::scalar(4));
    // C++ scalar types
    types.insert("short", TypeInfo::scalar(2));
    types.insert("long", TypeInfo::scalar(4));
    types.insert("signed", TypeInfo::scalar(4));
    types.insert("unsigned", TypeInfo::scalar(4));
    types.insert("wchar_t", TypeInfo::scalar(2));
    types.insert("char8_t", TypeInfo::scalar(1));
    types.insert("char16_t", TypeInfo::scalar(2));
    types.insert("char32_t", TypeInfo::scalar(4));
    // Container handles
    types.insert("set", TypeInfo::handle(4));
    types.insert("dict", TypeInfo::handle(4));
    types.insert("deque", TypeInfo::handle(4));
    types.insert("queue", TypeInfo::handle(4));
    types.insert("heap", TypeInfo::handle(4));
    types.insert("tuple", TypeInfo::handle(4));
    types
}

/// Byte size for a (possibly multi-word) type name. Unknown names fall back
/// to a word-scan over the specifiers, then to 4.
pub fn type_size(name: &str, types: &HashMap<&'static str, TypeInfo>) -> i32 {
    if let Some(info) = types.get(name) {
        return info.size;
    }
    if name.contains("double") {
        return 8;
    }
    if name.contains("float") {
        return 4;
    }
    if name.contains("short") {
        return 2;
    }
    if name.contains("long") {
        return 4;
    }
    if name.contains("char") && name.contains("32") {
        return 4;
    }
    if name.contains("char") && name.contains("16") {
        return 2;
    }
    if name.contains("char") {
        return 1;
    }
    if name.contains("wchar") {
        return 2;
    }
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_scalars() {
        let types = builtin_types();
        assert_eq!(types["int"].size, 4);
        assert_eq!(types["double"].size, 8);
        assert!(types["set"].pointer);
    }

    #[test]
    fn aggregate_fields_carry_offsets() {
        let types = builtin_types();
        assert_eq!(types["Point"].fields, &[("x", 0), ("y", 4)]);
    }

    #[test]
    fn multiword_names_use_the_scan() {
        let types = builtin_types();
        assert_eq!(type_size("unsigned long long int", &types), 4);
        assert_eq!(type_size("long double", &types), 8);
        assert_eq!(type_size("unsigned char", &types), 1);
        assert_eq!(type_size("mystery", &types), 4);
    }
}
