use super::common::{allocate, cfg, lines, parse, run};
use crate::asm::VirtualReg;
use crate::backend::regalloc::{
    AllocError, Coloring, InterferenceGraph, LivenessAnalysis, RegisterAllocator, dot,
};
use crate::backend::target::TargetConfig;

const COUNTER_LOOP: &str = "
    START: XOR R0,R0,R0
        ADDi R1,R0,1
        XOR R2,R2,R2
        JEQU R2,R1,END
        ADD R0,R0,R1
        JMP START
    END: STOP
";

#[test]
fn test_counter_loop_graph() {
    let program = parse(COUNTER_LOOP);
    let g = cfg(&program);

    // back edge
    assert_eq!(g.successors(5), &[0]);
    assert_eq!(g.successors(3), &[4, 6]);
    assert_eq!(g.predecessors(0), &[5]);
    assert!(g.successors(6).is_empty());
}

#[test]
fn test_counter_loop_liveness_and_colors() {
    let program = parse(COUNTER_LOOP);
    let g = cfg(&program);
    let liveness = LivenessAnalysis::analyze(&g);

    let end = g.label_index("END").unwrap();
    assert!(liveness.instruction(end).entry.is_empty());

    let graph = InterferenceGraph::build(&g, &liveness);
    let coloring = Coloring::welsh_powell(&graph);
    assert_ne!(
        coloring.color_of(VirtualReg(0)),
        coloring.color_of(VirtualReg(1))
    );
    assert!(coloring.is_valid_for(&graph));
}

#[test]
fn test_counter_loop_allocation() {
    let (program, allocation) = allocate(COUNTER_LOOP);

    assert_eq!(allocation.program.len(), program.len() + 2);
    assert_eq!(allocation.program.labels(), program.labels());
    assert!(allocation.saves.is_empty());
    assert_eq!(
        lines(&allocation.program)[..2],
        ["XOR R1 R1 R1", "ADDi R1 R1 65536"]
    );
}

#[test]
fn test_allocation_is_deterministic() {
    let (_, first) = allocate(COUNTER_LOOP);
    let (_, second) = allocate(COUNTER_LOOP);
    assert_eq!(first.program, second.program);
    assert_eq!(first.coloring, second.coloring);
}

#[test]
fn test_allocated_program_computes_the_same() {
    let src = "
            IN R0
            IN R1
            XOR R2 R2 R2
        L:  JIEQ R1 R2 DONE
            ADD R3 R0 R0
            ADD R0 R3 R1
            SUBi R1 R1 1
            OUT R0
            JMP L
        DONE: OUT R0
            STOP
    ";
    let (program, allocation) = allocate(src);
    let inputs = [5, 3];
    assert_eq!(
        run(&program, &inputs).output,
        run(&allocation.program, &inputs).output
    );
}

#[test]
fn test_register_pressure_limit() {
    // four values live together need four colors
    let src = "
        IN R0
        IN R1
        IN R2
        IN R3
        ADD R4 R0 R1
        ADD R5 R2 R3
        ADD R6 R4 R5
        OUT R6
    ";
    let program = parse(src);
    let tight = RegisterAllocator::new(TargetConfig::default().with_register_count(5));
    assert_eq!(
        tight.minimize_registers(&program).unwrap_err(),
        AllocError::InsufficientRegisters {
            needed: 4,
            available: 3
        }
    );

    let exact = RegisterAllocator::new(TargetConfig::default().with_register_count(6));
    let allocation = exact.minimize_registers(&program).unwrap();
    assert_eq!(allocation.color_count, 4);
    assert_eq!(run(&allocation.program, &[1, 2, 3, 4]).output, vec![10]);
}

#[test]
fn test_dot_lists_every_edge() {
    let program = parse(COUNTER_LOOP);
    let g = cfg(&program);
    let text = dot::control_graph_to_dot(&g);
    assert_eq!(text.matches(" -> ").count(), g.edge_count());
    assert!(text.contains("\"5 : JMP START\" -> \"0 : START: XOR R0 R0 R0\";"));
}
