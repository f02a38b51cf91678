//! Runtime support emitted at the top of every listing.
//!
//! The generated code never calls into a library. Everything it needs is a
//! NASM macro defined here, plus the `_start` stub that runs `main` and exits
//! with its result.
//!
//! Register use inside the macros:
//! - `rax`, `rbx`: destination and source addresses of block moves
//! - `rcx`: word counts
//! - `rdx`, `rsi`: scratch

/// Macro prelude. Every operator macro works on the top one or two words of
/// the operand stack and leaves its result in place of the left operand.
pub const PRELUDE: &str = r#"BITS 64

%macro push_ 1
    mov qword [rsp], %1
    sub rsp, 8
%endmacro

%macro pop_ 1
    add rsp, 8
    mov %1, [rsp]
%endmacro

; Pushes the return label and jumps to the address in rax.
%macro call_ 1
    lea rbx, [rel .ret%1]
    push_ rbx
    jmp rax
.ret%1:
%endmacro

; Reserves room for a result larger than the arguments, then saves the
; return label and the caller's rbp.
%macro fun_init 1
    pop_ rbx
    sub rsp, %1
    push_ rbx
    push_ rbp
    mov rbp, rsp
%endmacro

%macro ret_val 2
    lea rax, [rbp + %1]
    lea rbx, [rsp + %2]
    mov rcx, %2/8
    move_block
%endmacro

%macro ret_ 0
    mov rbx, [rbp + 16]
    mov rbp, [rbp + 8]
    jmp rbx
%endmacro

; rcx words from rbx down to rax, highest word first.
%macro copy_block 0
    cmp rcx, 0
    je %%done
%%loop:
    mov rdx, [rbx]
    mov [rax], rdx
    sub rax, 8
    sub rbx, 8
    dec rcx
    jnz %%loop
%%done:
%endmacro

%macro move_block 0
    copy_block
    mov rsp, rax
%endmacro

%macro zero_block 1
%rep %1
    push_ 0
%endrep
%endmacro

%macro add_op 0
    pop_ rbx
    add [rsp + 8], rbx
%endmacro

%macro sub_op 0
    pop_ rbx
    sub [rsp + 8], rbx
%endmacro

%macro mul_op 0
    pop_ rbx
    mov rax, [rsp + 8]
    imul rax, rbx
    mov [rsp + 8], rax
%endmacro

%macro div_op 0
    pop_ rbx
    mov rax, [rsp + 8]
    cqo
    idiv rbx
    mov [rsp + 8], rax
%endmacro

%macro and_op 0
    pop_ rbx
    and [rsp + 8], rbx
%endmacro

%macro or_op 0
    pop_ rbx
    or [rsp + 8], rbx
%endmacro

%macro cmp_op 1
    pop_ rbx
    xor rax, rax
    cmp [rsp + 8], rbx
    set%1 al
    mov [rsp + 8], rax
%endmacro

%macro less_op 0
    cmp_op l
%endmacro

%macro greater_op 0
    cmp_op g
%endmacro

%macro leq_op 0
    cmp_op le
%endmacro

%macro geq_op 0
    cmp_op ge
%endmacro

; Compares two blocks of %1 bytes word by word and replaces both with a bool.
%macro equal_block 1
    lea rax, [rsp + %1]
    lea rbx, [rsp + 2*%1]
    mov rcx, %1/8
    mov rdx, 1
%%loop:
    cmp rcx, 0
    je %%done
    mov rsi, [rax]
    cmp rsi, [rbx]
    je %%same
    xor rdx, rdx
%%same:
    sub rax, 8
    sub rbx, 8
    dec rcx
    jmp %%loop
%%done:
    lea rsp, [rsp + 2*%1]
    push_ rdx
%endmacro

%macro not_equal_block 1
    equal_block %1
    xor qword [rsp + 8], 1
%endmacro

%macro neg_int 0
    neg qword [rsp + 8]
%endmacro

%macro not_bool 0
    xor qword [rsp + 8], 1
%endmacro

; Writes the low %1 bytes of the top word to stdout and drops it.
%macro print_ 1
    mov rax, 1
    mov rdi, 1
    lea rsi, [rsp + 8]
    mov rdx, %1
    syscall
    add rsp, 8
%endmacro

"#;

/// The `_start` stub: reserves a word, calls `main` through the usual
/// convention and exits with the highest word of its result as the status.
pub fn entry_point(main_size: usize) -> String {
    let mut out = String::from("section .text\nglobal _start\n\n_start:\n");

    for instruction in [
        String::from("sub rsp, 8"),
        format!("lea rax, [rel {}]", super::compiler::function_label("main")),
        String::from("call_ 0"),
        format!("mov rdi, [rsp + {}]", main_size),
        String::from("mov rax, 60"),
        String::from("syscall"),
    ] {
        out.push_str("    ");
        out.push_str(&instruction);
        out.push('\n');
    }

    out.push('\n');
    out
}
