use std::{env, process};

use kvgraph::{
    Graph, KvGraphError,
    client::CommandLineConfig,
    config::open_graph,
    logging::init_logging,
};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", CommandLineConfig::help());
        return;
    }
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let config = match CommandLineConfig::from_args(&arg_refs) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            eprint!("{}", CommandLineConfig::help());
            process::exit(2);
        }
    };
    if let Err(err) = init_logging("warn") {
        eprintln!("{err}");
        process::exit(2);
    }

    let graph = match config
        .graph_config()
        .map_err(|e| e.to_string())
        .and_then(|cfg| open_graph(&cfg).map_err(|e| e.to_string()))
    {
        Ok(graph) => graph,
        Err(err) => {
            eprintln!("{err}");
            process::exit(2);
        }
    };

    for query in &config.queries {
        if let Err(err) = run_query(&graph, query, config.explain) {
            eprintln!("query failed: {err}");
            process::exit(1);
        }
    }
}

fn run_query(graph: &Graph, query: &str, explain: bool) -> Result<(), KvGraphError> {
    let traversal = graph.query(query)?;
    if explain {
        println!("{}", traversal.plan()?);
        return Ok(());
    }
    for value in traversal.stream()? {
        println!("{}", value?);
    }
    Ok(())
}
