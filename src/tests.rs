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

#[cfg(test)]
mod integration {
    use std::path::Path;

    use crate::casm;
    use crate::compile::{compile_source, CompileOptions};
    use crate::parse::CompiledProgram;

    fn opts(python_mode: bool) -> CompileOptions {
        CompileOptions {
            include_paths: Vec::new(),
            python_mode,
            verbose: false,
        }
    }

    fn compile_brace(src: &str) -> CompiledProgram {
        compile_source(src, Path::new("."), &opts(false))
    }

    fn compile_python(src: &str) -> CompiledProgram {
        compile_source(src, Path::new("."), &opts(true))
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    /// Decode the emitted stream and assert every jump operand lands inside
    /// the buffer. Mirrors the operand widths of the opcode catalogue.
    fn check_jump_targets(code: &[u8]) {
        let mut i = 0;
        while i < code.len() {
            let op = code[i];
            i += 1;
            match op {
                0x01 => i += 4, // PUSH_INT
                0x0A | 0x0B | 0x0E | 0x0F => {
                    let t = i32::from_be_bytes([code[i], code[i + 1], code[i + 2], code[i + 3]]);
                    assert!(
                        t >= 0 && (t as usize) < code.len(),
                        "jump target {} outside [0, {})",
                        t,
                        code.len()
                    );
                    i += 4;
                }
                0x02 | 0x04 | 0x05 | 0x0C => {
                    let n = code[i] as usize;
                    i += 1 + n;
                }
                0x03 | 0x52 | 0x53 => i += 1, // syscall id / address width
                _ => {}
            }
        }
        assert_eq!(i, code.len(), "operand decoding drifted");
    }

    #[test]
    fn artifact_is_magic_tagged_and_halts() {
        let program = compile_brace("int x = 1;");
        let mut artifact = Vec::new();
        casm::write_artifact(&mut artifact, &program.code).unwrap();
        assert_eq!(&artifact[..4], b"CASM");
        assert_eq!(program.code.last(), Some(&0x00));
    }

    #[test]
    fn literal_arithmetic_folds_to_one_push() {
        let program = compile_brace("int x = 2 + 3 * 4;");
        assert_eq!(
            program.code,
            vec![0x01, 0, 0, 0, 14, 0x04, 1, b'x', 0x00]
        );
    }

    #[test]
    fn division_by_zero_is_left_unfolded() {
        let program = compile_brace("int x = 10 / 0;");
        assert_eq!(
            program.code,
            vec![
                0x01, 0, 0, 0, 10, // PUSH_INT 10
                0x01, 0, 0, 0, 0, // PUSH_INT 0
                0x09, // DIV
                0x04, 1, b'x', // STORE x
                0x00, // HALT
            ]
        );
    }

    #[test]
    fn unary_minus_multiplies_and_folds() {
        let program = compile_brace("int n = -5;");
        assert_eq!(
            program.code,
            vec![0x01, 0xFF, 0xFF, 0xFF, 0xFB, 0x04, 1, b'n', 0x00]
        );
    }

    #[test]
    fn float_shaped_literal_compiles_as_zero() {
        let program = compile_brace("int f = 1.5;");
        assert_eq!(program.code, vec![0x01, 0, 0, 0, 0, 0x04, 1, b'f', 0x00]);
    }

    #[test]
    fn fstring_lowers_fragments_interpolation_and_concat() {
        let program = compile_python("x = f\"hi {1+2}\"\n");
        assert_eq!(
            program.code,
            vec![
                0x02, 3, b'h', b'i', b' ', // PUSH_STR "hi "
                0x01, 0, 0, 0, 3, // PUSH_INT 3 (1+2 folded)
                0x03, 0xEF, // SYSCALL str
                0x06, // ADD
                0x04, 1, b'x', // STORE x
                0x00, // HALT
            ]
        );
    }

    #[test]
    fn python_def_registers_symbol_and_call_closes_stream() {
        let program = compile_python("def f():\n    pass\nf()\n");
        let entry = *program.symbols.get("f").expect("symbol for f");
        assert!(entry < program.code.len());
        assert_eq!(program.code[entry], 0x0D, "entry points at RET of empty body");
        assert_eq!(&program.code[program.code.len() - 4..], &[0x0C, 1, b'f', 0x00]);
        // the reserve-store holds the patched entry address
        assert_eq!(&program.code[..5], &[0x01, 0, 0, 0, entry as u8]);
        check_jump_targets(&program.code);
    }

    #[test]
    fn main_symbol_gets_a_final_call_before_halt() {
        let program = compile_python("def main():\n    pass\n");
        let tail = &program.code[program.code.len() - 7..];
        assert_eq!(tail, &[0x0C, 4, b'm', b'a', b'i', b'n', 0x00]);
    }

    #[test]
    fn without_entry_symbol_only_halt_is_appended() {
        let program = compile_brace("int x = 1;");
        assert!(!program.code.windows(1).any(|w| w == [0x0C]));
    }

    #[test]
    fn function_parameters_pop_in_reverse_order() {
        let program = compile_python("def add(a, b):\n    return a + b\n");
        // prologue: PUSH_INT entry, STORE add, JMP; then STORE b, STORE a
        let store_b = find(&program.code, &[0x04, 1, b'b']).expect("STORE b");
        let store_a = find(&program.code, &[0x04, 1, b'a']).expect("STORE a");
        assert!(store_b < store_a, "later parameter pops first");
        check_jump_targets(&program.code);
    }

    #[test]
    fn if_jz_targets_first_opcode_after_the_block() {
        let program = compile_python("if (x == 1):\n    y = 2\nz = 3\n");
        // LOAD x (3) PUSH_INT 1 (5) EQ (1) JZ(1+4) block(8) -> target 22
        assert_eq!(&program.code[..3], &[0x05, 1, b'x']);
        assert_eq!(program.code[8], 0x19); // EQ
        assert_eq!(program.code[9], 0x0B); // JZ
        assert_eq!(&program.code[10..14], &[0, 0, 0, 22]);
        assert_eq!(program.code[22], 0x01); // PUSH_INT 3 of `z = 3`
        check_jump_targets(&program.code);
    }

    #[test]
    fn elif_else_chain_backpatches_every_arm() {
        let src = "if (a):\n    x = 1\nelif (b):\n    x = 2\nelse:\n    x = 3\nw = 4\n";
        let program = compile_python(src);
        // arm 1: JZ -> elif condition at 21
        assert_eq!(&program.code[4..8], &[0, 0, 0, 21]);
        // arm 2: JZ -> else body at 42
        assert_eq!(&program.code[25..29], &[0, 0, 0, 42]);
        // both terminal jumps -> end of construct at 50
        assert_eq!(&program.code[17..21], &[0, 0, 0, 50]);
        assert_eq!(&program.code[38..42], &[0, 0, 0, 50]);
        assert_eq!(program.code[50], 0x01); // PUSH_INT 4 of `w = 4`
        check_jump_targets(&program.code);
    }

    #[test]
    fn for_loop_jumps_back_to_for_iter() {
        let program = compile_python("for i in range(3):\n    pass\nq = 1\n");
        // range(3): PUSH_INT 3, PUSH_INT 1, SYSCALL 0xE8 -> 12 bytes
        assert_eq!(program.code[12], 0x0E); // FOR_ITER
        assert_eq!(&program.code[13..17], &[0, 0, 0, 25]); // exit target
        assert_eq!(&program.code[17..20], &[0x04, 1, b'i']); // STORE i
        assert_eq!(program.code[20], 0x0A); // JMP
        assert_eq!(&program.code[21..25], &[0, 0, 0, 12]); // back to FOR_ITER
        check_jump_targets(&program.code);
    }

    #[test]
    fn try_except_patches_handler_and_skip() {
        let program = compile_python("try:\n    x = 1\nexcept:\n    y = 2\nz = 3\n");
        assert_eq!(program.code[0], 0x0F); // TRY_ENTER
        assert_eq!(&program.code[1..5], &[0, 0, 0, 19]); // handler start
        assert_eq!(program.code[13], 0x10); // TRY_EXIT
        assert_eq!(program.code[14], 0x0A); // JMP over handler
        assert_eq!(&program.code[15..19], &[0, 0, 0, 27]); // past handler
        assert_eq!(&program.code[19..24], &[0x01, 0, 0, 0, 2]); // handler body
        check_jump_targets(&program.code);
    }

    #[test]
    fn assert_jumps_into_the_abort_trap() {
        let program = compile_python("assert x, \"bad\"\n");
        assert_eq!(program.code[3], 0x0B); // JZ
        assert_eq!(&program.code[4..8], &[0, 0, 0, 13]); // abort address
        assert_eq!(&program.code[8..13], &[0x02, 3, b'b', b'a', b'd']); // message
        assert_eq!(&program.code[13..20], &[0x01, 0, 0, 0, 1, 0x03, 0xE0]);
        check_jump_targets(&program.code);
    }

    #[test]
    fn walrus_stores_then_reloads() {
        let program = compile_python("y = (x := 5)\n");
        assert_eq!(
            program.code,
            vec![
                0x01, 0, 0, 0, 5, // PUSH_INT 5
                0x04, 1, b'x', // STORE x
                0x05, 1, b'x', // LOAD x
                0x04, 1, b'y', // STORE y
                0x00,
            ]
        );
    }

    #[test]
    fn list_literal_builds_with_append() {
        let program = compile_brace("l = [1, 2];");
        assert_eq!(
            program.code,
            vec![
                0x95, // LIST_NEW
                0x01, 0, 0, 0, 1, 0x96, // PUSH_INT 1, LIST_APPEND
                0x01, 0, 0, 0, 2, 0x96, // PUSH_INT 2, LIST_APPEND
                0x04, 1, b'l', 0x00,
            ]
        );
    }

    #[test]
    fn dict_literal_in_brace_mode() {
        let program = compile_brace("d = {1: 2};");
        assert_eq!(
            program.code,
            vec![
                0x92, // DICT_NEW
                0x01, 0, 0, 0, 1, // key
                0x01, 0, 0, 0, 2, // value
                0x93, // DICT_SET
                0x04, 1, b'd', 0x00,
            ]
        );
    }

    #[test]
    fn aggregate_initializer_stores_into_fields() {
        let program = compile_brace("Point p = {1, 2};");
        assert!(find(&program.code, &[0x04, 3, b'p', b'.', b'x']).is_some());
        assert!(find(&program.code, &[0x04, 3, b'p', b'.', b'y']).is_some());
    }

    #[test]
    fn aggregate_overflow_falls_back_to_indexed_slots() {
        let program = compile_brace("Point p = {1, 2, 3};");
        assert!(find(&program.code, &[0x04, 4, b'p', b'[', b'2', b']']).is_some());
    }

    #[test]
    fn sizeof_pushes_the_looked_up_size() {
        let program = compile_brace("int s = sizeof(double);");
        assert_eq!(program.code, vec![0x01, 0, 0, 0, 8, 0x04, 1, b's', 0x00]);
    }

    #[test]
    fn printf_lowers_to_syscall_with_argc() {
        let program = compile_brace("printf(\"hi\");");
        assert_eq!(
            program.code,
            vec![
                0x02, 2, b'h', b'i', // PUSH_STR "hi"
                0x01, 0, 0, 0, 1, // argc
                0x03, 0x60, // SYSCALL printf
                0x00,
            ]
        );
    }

    #[test]
    fn method_suffix_reloads_receiver() {
        let program = compile_brace("items.push_back(4);");
        assert_eq!(
            program.code,
            vec![
                0x01, 0, 0, 0, 4, // argument
                0x05, 5, b'i', b't', b'e', b'm', b's', // LOAD items
                0x01, 0, 0, 0, 1, // argc
                0x03, 0x96, // SYSCALL push_back
                0x00,
            ]
        );
    }

    #[test]
    fn constructors_and_namespaced_calls_are_bare_syscalls() {
        let program = compile_brace("s = set(); t = math.sqrt(9);");
        assert!(find(&program.code, &[0x03, 0x90]).is_some());
        let sqrt_at = find(&program.code, &[0x03, 0xB0]).expect("sqrt syscall");
        // the argument precedes the syscall, with no argc push between
        assert_eq!(&program.code[sqrt_at - 5..sqrt_at], &[0x01, 0, 0, 0, 9]);
    }

    #[test]
    fn math_constants_load_as_syscalls() {
        let program = compile_brace("p = math.pi;");
        assert_eq!(
            program.code,
            vec![0x03, 0xB2, 0x04, 1, b'p', 0x00]
        );
    }

    #[test]
    fn console_writeline_appends_a_newline_print() {
        let program = compile_brace("Console.WriteLine(\"ok\");");
        assert_eq!(
            program.code,
            vec![
                0x02, 2, b'o', b'k', // PUSH_STR "ok"
                0x01, 0, 0, 0, 1, 0x03, 0x60, // argc, printf
                0x02, 2, b'\\', b'n', // PUSH_STR "\n" escape
                0x01, 0, 0, 0, 1, 0x03, 0x60, // argc, printf
                0x00,
            ]
        );
    }

    #[test]
    fn indexing_reads_and_writes_through_addresses() {
        let program = compile_brace("arr[0] = 7; y = arr[1];");
        assert_eq!(
            program.code,
            vec![
                0x05, 3, b'a', b'r', b'r', // LOAD arr
                0x01, 0, 0, 0, 0, // index
                0x01, 0, 0, 0, 7, // value
                0x53, 4, // WRITE_ADDR width 4
                0x05, 3, b'a', b'r', b'r', // LOAD arr
                0x01, 0, 0, 0, 1, // index
                0x52, 4, // READ_ADDR width 4
                0x04, 1, b'y', // STORE y
                0x00,
            ]
        );
    }

    #[test]
    fn while_and_goto_fall_into_the_keyword_skip() {
        let program = compile_brace("while (x) { y = 1; }\nz = 2;");
        // the skipped statement contributes no bytes; the stray `}` is
        // consumed silently by the expression parser
        assert_eq!(program.code, vec![0x01, 0, 0, 0, 2, 0x04, 1, b'z', 0x00]);

        let program = compile_brace("goto label;\nint x = 1;");
        assert_eq!(program.code, vec![0x01, 0, 0, 0, 1, 0x04, 1, b'x', 0x00]);
    }

    #[test]
    fn comparisons_are_never_folded() {
        let program = compile_brace("int c = 2 < 3;");
        assert_eq!(
            program.code,
            vec![
                0x01, 0, 0, 0, 2, 0x01, 0, 0, 0, 3, 0x1B, // LT survives
                0x04, 1, b'c', 0x00,
            ]
        );
    }

    #[test]
    fn stdlib_import_is_elided_without_diagnostics() {
        let program = compile_python("import math\nx = 1\n");
        assert_eq!(program.code, vec![0x01, 0, 0, 0, 1, 0x04, 1, b'x', 0x00]);
    }

    #[test]
    fn unresolved_import_compiles_as_if_absent() {
        let dir = tempfile::tempdir().unwrap();
        let program = compile_source("import nowhere\nx = 1\n", dir.path(), &opts(true));
        assert_eq!(program.code, vec![0x01, 0, 0, 0, 1, 0x04, 1, b'x', 0x00]);
    }

    #[test]
    fn unresolved_include_comment_is_invisible_to_the_lexer() {
        let dir = tempfile::tempdir().unwrap();
        let program = compile_source("#include \"gone.h\"\nint x = 1;\n", dir.path(), &opts(false));
        assert_eq!(program.code, vec![0x01, 0, 0, 0, 1, 0x04, 1, b'x', 0x00]);
    }

    #[test]
    fn imported_module_names_are_mangled() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.soul"), "bee = 1\n").unwrap();
        let program = compile_source("import b\nc = 2\n", dir.path(), &opts(true));
        // simple stores inside the module carry the prefix
        assert!(find(&program.code, &[0x04, 5, b'b', b'.', b'b', b'e', b'e']).is_some());
        // stores after __endmodule__ do not
        assert!(find(&program.code, &[0x04, 1, b'c']).is_some());
    }

    #[test]
    fn dotted_stores_are_not_remangled() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("m.soul"), "cfg.level = 3\n").unwrap();
        let program = compile_source("import m\n", dir.path(), &opts(true));
        let dotted = b"cfg.level";
        let mut store = vec![0x04, dotted.len() as u8];
        store.extend_from_slice(dotted);
        assert!(find(&program.code, &store).is_some(), "dotted name stays verbatim");
    }

    #[test]
    fn functions_inside_modules_resolve_by_mangled_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("util.soul"), "def twice(n):\n    return n + n\n").unwrap();
        let program = compile_source("import util\n", dir.path(), &opts(true));
        let entry = *program.symbols.get("util.twice").expect("mangled symbol");
        assert!(entry < program.code.len());
        check_jump_targets(&program.code);
    }

    #[test]
    fn namespace_bodies_compile_as_top_level() {
        let program = compile_brace("namespace app { int x = 1; }\nint y = 2;");
        assert!(find(&program.code, &[0x04, 1, b'x']).is_some());
        assert!(find(&program.code, &[0x04, 1, b'y']).is_some());
    }

    #[test]
    fn declaration_modifiers_are_discarded() {
        let program = compile_brace("static constexpr int k = 9;");
        assert_eq!(program.code, vec![0x01, 0, 0, 0, 9, 0x04, 1, b'k', 0x00]);
    }

    #[test]
    fn static_assert_is_swallowed_whole() {
        let program = compile_brace("static_assert(sizeof(int) == 4, \"abi\");\nint x = 1;");
        assert_eq!(program.code, vec![0x01, 0, 0, 0, 1, 0x04, 1, b'x', 0x00]);
    }

    #[test]
    fn larger_program_has_only_in_range_jumps() {
        let src = "def fact(n):\n    if (n == 0):\n        return 1\n    return n\n\
                   for i in range(5):\n        fact(i)\ntry:\n    assert i, \"loop var\"\n\
                   except:\n    pass\nfact(3)\n";
        let program = compile_python(src);
        assert!(program.symbols.contains_key("fact"));
        check_jump_targets(&program.code);
        assert_eq!(program.code.last(), Some(&0x00));
    }
}
