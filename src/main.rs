use tcl_regalloc::backend::regalloc::dot::{control_graph_to_dot, interference_to_dot};
use tcl_regalloc::cli::{Config, format_coloring, format_liveness, format_saves, read_source_file};
use tcl_regalloc::machine::Machine;
use tcl_regalloc::pipeline::compile_and_report;

fn main() {
    env_logger::init();

    // Parse configuration
    let config = match Config::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    println!("\n{}", config.file_path);
    println!("{}", "=".repeat(60));

    // Read the source file
    let src = match read_source_file(&config.file_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // Print the source code
    println!("\nSource code:");
    println!("{}", "-".repeat(60));
    println!("{}", src);
    println!("{}", "-".repeat(60));

    // Run the allocation pipeline
    let output = match compile_and_report(&config.file_path, &src, &config.target) {
        Ok(output) => output,
        Err(()) => std::process::exit(1),
    };

    let analysis = &output.analysis;
    if config.verbose {
        println!("\n[1] Liveness:");
        println!("{}", "=".repeat(60));
        print!("{}", format_liveness(analysis));

        println!("\n[2] Coloring:");
        println!("{}", "=".repeat(60));
        print!("{}", format_coloring(analysis));
    }
    if config.dot {
        println!("\n[3] Control flow graph (DOT):");
        println!("{}", "=".repeat(60));
        println!("{}", control_graph_to_dot(&analysis.cfg));

        println!("\n[4] Interference graph (DOT):");
        println!("{}", "=".repeat(60));
        println!(
            "{}",
            interference_to_dot(&analysis.interference, Some(&analysis.coloring))
        );
    }

    println!("\nCaller saves:");
    println!("{}", "=".repeat(60));
    print!("{}", format_saves(&output.allocation));

    println!("\nAllocated program:");
    println!("{}", "=".repeat(60));
    print!("{}", output.text);

    if config.run {
        println!("\nExecution:");
        println!("{}", "=".repeat(60));
        let original = Machine::new(&output.parsed.program, config.target).run(&config.inputs);
        let allocated = Machine::new(&output.allocation.program, config.target).run(&config.inputs);
        match (original, allocated) {
            (Ok(original), Ok(allocated)) => {
                println!("  virtual   output: {:?}", original.output);
                println!("  allocated output: {:?}", allocated.output);
                if original.output != allocated.output {
                    println!("  outputs differ");
                }
            }
            (Err(e), _) => eprintln!("  virtual program faulted: {}", e),
            (_, Err(e)) => eprintln!("  allocated program faulted: {}", e),
        }
    }

    println!("\n{}", "=".repeat(60));
    println!(
        "Allocated {} virtual register(s) onto {} physical register(s)",
        output.allocation.coloring.len(),
        output.allocation.color_count
    );
}
