use crate::backend::regalloc::{Allocation, Analysis, LiveSet};

/// Format a live set as `{R0, R3}`
pub fn format_live_set(set: &LiveSet) -> String {
    let regs: Vec<String> = set.iter().map(|r| r.to_string()).collect();
    format!("{{{}}}", regs.join(", "))
}

/// Per-instruction liveness table, one row per instruction
pub fn format_liveness(analysis: &Analysis) -> String {
    let program = analysis.cfg.program();
    let mut out = String::new();

    out.push_str(&format!(
        "  {:>4}  {:<28} {:<20} {}\n",
        "#", "instruction", "live in", "live out"
    ));
    for (i, inst) in program.iter().enumerate() {
        let vars = analysis.liveness.instruction(i);
        out.push_str(&format!(
            "  {:>4}  {:<28} {:<20} {}\n",
            i,
            inst.to_string(),
            format_live_set(&vars.entry),
            format_live_set(&vars.exit)
        ));
    }
    out.push_str(&format!(
        "  {} block(s), fixpoint after {} sweep(s)\n",
        analysis.cfg.blocks().len(),
        analysis.liveness.sweeps()
    ));
    out
}

/// Coloring table: virtual register, degree, color
pub fn format_coloring(analysis: &Analysis) -> String {
    let mut out = String::new();
    for (reg, color) in analysis.coloring.iter() {
        out.push_str(&format!(
            "  {:<6} degree {:<3} color {}\n",
            reg.to_string(),
            analysis.interference.degree(reg),
            color
        ));
    }
    out.push_str(&format!(
        "  {} register(s), {} interference edge(s), {} color(s)\n",
        analysis.interference.node_count(),
        analysis.interference.edge_count(),
        analysis.coloring.color_count()
    ));
    out
}

/// One line per call site
pub fn format_saves(allocation: &Allocation) -> String {
    if allocation.saves.is_empty() {
        return "  no calls\n".to_string();
    }
    allocation
        .saves
        .iter()
        .map(|save| {
            let regs: Vec<String> = save.registers.iter().map(|r| r.to_string()).collect();
            if regs.is_empty() {
                format!("  call at {}: saves nothing\n", save.call)
            } else {
                format!("  call at {}: saves {}\n", save.call, regs.join(", "))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::regalloc::RegisterAllocator;
    use crate::frontend::parse_program;

    const SRC: &str = "
            IN R0
            CALL f
            OUT R0
            STOP
        f:  RET
    ";

    #[test]
    fn test_live_set_format() {
        let set: LiveSet = [crate::asm::VirtualReg(3), crate::asm::VirtualReg(0)]
            .into_iter()
            .collect();
        assert_eq!(format_live_set(&set), "{R0, R3}");
        assert_eq!(format_live_set(&LiveSet::new()), "{}");
    }

    #[test]
    fn test_tables_mention_every_instruction_and_register() {
        let program = parse_program(SRC).unwrap();
        let analysis = RegisterAllocator::default().analyze(&program).unwrap();

        let liveness = format_liveness(&analysis);
        assert_eq!(liveness.lines().count(), program.len() + 2);
        assert!(liveness.contains("CALL f"));

        let coloring = format_coloring(&analysis);
        assert!(coloring.contains("R0"));
        assert!(coloring.contains("1 color(s)"));
    }

    #[test]
    fn test_saves_format() {
        let program = parse_program(SRC).unwrap();
        let allocation = RegisterAllocator::default()
            .minimize_registers(&program)
            .unwrap();
        assert_eq!(format_saves(&allocation), "  call at 1: saves R2\n");
    }
}
