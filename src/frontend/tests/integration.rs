use crate::asm::Program;
use crate::frontend::parse_program;

#[test]
fn test_display_output_reads_back() {
    let src = "
        START: XOR R0,R0,R0
            ADDi R1,R0,1
            XOR R2,R2,R2
            JEQU R2,R1,END
            ADD R0,R0,R1
            JMP START
        END: STOP
    ";
    let program = parse_program(src).unwrap();
    let again: Program = parse_program(&program.to_string()).unwrap();
    assert_eq!(program, again);
}

#[test]
fn test_complete_program_with_call() {
    let src = "
            IN R0            ; n
            CALL down
            STOP
        down:
            OUT R0
            XOR R1 R1 R1
            JEQU R0 R1 done
            SUBi R0 R0 1
            CALL down
            OUT R0
        done: RET
    ";
    let program = parse_program(src).unwrap();
    assert_eq!(program.len(), 10);
    assert_eq!(program[3].label.as_deref(), Some("down"));
    assert_eq!(program[9].to_string(), "done: RET");
}
