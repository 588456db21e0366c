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

// Intrinsic call-site lowering tables. Recognized names bypass user CALL
// dispatch and lower straight to syscall ids; the id values are part of the
// artifact contract and must not drift.

/// Exact call names lowered as: args..., PUSH_INT argc, SYSCALL id.
const CALLS_WITH_ARGC: &[(&str, u8)] = &[
    // stdio / files
    ("fopen", 0x70),
    ("open", 0x70),
    ("fprintf", 0x71),
    ("fclose", 0x72),
    ("printf", 0x60),
    ("print", 0x60),
    ("puts", 0x61),
    // time
    ("time", 0x80),
    ("ctime", 0x81),
    // Python builtins
    ("len", 0x63),
    ("range", 0xE8),
    ("min", 0xE9),
    ("max", 0xEA),
    ("sum", 0xEB),
    ("sorted", 0xEC),
    ("int", 0xED),
    ("Integer", 0xED),
    ("float", 0xEE),
    ("Double", 0xEE),
    ("str", 0xEF),
    ("String", 0xEF),
    ("bool", 0xF0),
    ("tuple", 0xF1),
    ("chr", 0xF2),
    ("ord", 0xF3),
    ("round", 0xF4),
    ("divmod", 0xF5),
    ("pow", 0xF6),
    ("all", 0xF7),
    ("any", 0xF8),
    ("repr", 0xF9),
    ("bin", 0xFA),
    ("hex", 0xFB),
    ("oct", 0xFC),
    ("input", 0xFD),
    ("zip", 0xFE),
    ("enumerate", 0xFF),
    ("reversed", 0xC9),
    // C string
    ("strlen", 0x63),
    ("__random", 0xCA),
    // C memory
    ("malloc", 0xD0),
    ("calloc", 0xD1),
    ("realloc", 0xD2),
    ("free", 0xD3),
    // C string conversions
    ("atof", 0xD4),
    ("atoi", 0xD5),
    ("atol", 0xD6),
    ("atoll", 0xD7),
    ("strtod", 0xD8),
    ("strtof", 0xD9),
    ("strtol", 0xDA),
    ("strtold", 0xDB),
    ("strtoll", 0xDC),
    ("strtoul", 0xDD),
    ("strtoull", 0xDE),
    // C process control
    ("abort", 0xE0),
    ("exit", 0xC0),
    ("_Exit", 0xE1),
    ("atexit", 0xE2),
    ("at_quick_exit", 0xE3),
    ("quick_exit", 0xE4),
    ("getenv", 0xE5),
    ("system", 0xC1),
    // C search/sort
    ("bsearch", 0xE6),
    ("qsort", 0xE7),
];

/// Constructors and namespaced helpers lowered as a bare SYSCALL (no
/// argument count pushed).
const CALLS_BARE: &[(&str, u8)] = &[
    ("set", 0x90),
    ("dict", 0x92),
    ("deque", 0x95),
    ("list", 0x95),
    ("math.sqrt", 0xB0),
    ("abs", 0xB1),
    ("sys.exit", 0xC0),
    ("os.system", 0xC1),
    ("time.sleep", 0xC2),
];

/// Qualified method calls recognized by a suffix match on the accumulated
/// dotted name. Lowering reloads the receiver, pushes the argument count,
/// and issues the syscall. Where one suffix ends another (`.cbegin` /
/// `.begin`), the longer form is listed first.
const METHOD_SUFFIXES: &[(&str, u8)] = &[
    // C++ list methods
    (".assign", 0xA8),
    (".front", 0xA9),
    (".back", 0xAA),
    (".cbegin", 0xAB),
    (".begin", 0xAB),
    (".cend", 0xAC),
    (".end", 0xAC),
    (".crbegin", 0xAD),
    (".rbegin", 0xAD),
    (".crend", 0xAE),
    (".rend", 0xAE),
    (".size", 0x63),
    (".empty", 0xAF),
    (".max_size", 0xB4),
    (".clear", 0xB5),
    (".insert", 0xB6),
    (".emplace", 0xB6),
    (".erase", 0xB7),
    (".emplace_front", 0xB8),
    (".push_front", 0xB8),
    (".prepend_range", 0xB9),
    (".pop_front", 0x97),
    (".emplace_back", 0x96),
    (".push_back", 0x96),
    (".append_range", 0xBA),
    (".pop_back", 0x98),
    (".resize", 0xBB),
    (".swap", 0xBC),
    (".sort", 0xBD),
    (".unique", 0xBE),
    (".reverse", 0xBF),
    (".merge", 0xC3),
    (".splice", 0xC4),
    (".remove_if", 0xC6),
    (".remove", 0xC5),
    (".equals", 0xC7),
    (".compare", 0xC8),
    // string manipulation
    (".lower", 0xA0),
    (".upper", 0xA1),
    (".split", 0xA2),
    (".join", 0xA3),
    (".replace", 0xA4),
    (".find", 0xA5),
    (".cardinality", 0xA5),
    (".startswith", 0xA6),
    (".strip", 0xA7),
    // collections
    (".add", 0x91),
    (".push", 0x96),
    (".pop", 0x98),
    (".get", 0x94),
];

/// Qualified constants recognized at load position.
const LOAD_CONSTANTS: &[(&str, u8)] = &[("math.pi", 0xB2), ("math.e", 0xB3)];

pub fn call_with_argc(name: &str) -> Option<u8> {
    CALLS_WITH_ARGC.iter().find(|(n, _)| *n == name).map(|(_, id)| *id)
}

pub fn call_bare(name: &str) -> Option<u8> {
    CALLS_BARE.iter().find(|(n, _)| *n == name).map(|(_, id)| *id)
}

/// Returns the matched suffix (so the caller can peel off the receiver) and
/// the syscall id.
pub fn method_suffix(name: &str) -> Option<(&'static str, u8)> {
    METHOD_SUFFIXES
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix))
        .map(|(suffix, id)| (*suffix, *id))
}

pub fn load_constant(name: &str) -> Option<u8> {
    LOAD_CONSTANTS.iter().find(|(n, _)| *n == name).map(|(_, id)| *id)
}
