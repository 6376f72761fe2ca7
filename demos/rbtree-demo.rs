//! Exercises the red-black tree with random keys.
//!
//! ```text
//! rbtree-demo <mode> <nodes> [loops]
//!
//!   mode   : 1 prints the tree after every insert and delete,
//!            2 times batches of inserts and deletes
//!   nodes  : number of keys, at least 3
//!   loops  : batches to time in mode 2, at least 3 (default 1)
//! ```

use std::process::ExitCode;
use std::time::{Duration, Instant};

use log::LevelFilter;
use rand::Rng;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

use allocated_rbtree::{Color, Keyed, Linked, Links, NodeId, RbTree};

struct DemoNode {
    links: Links<NodeId>,
    key: u32,
}

impl Linked<NodeId> for DemoNode {
    fn links(&self) -> &Links<NodeId> {
        &self.links
    }

    fn links_mut(&mut self) -> &mut Links<NodeId> {
        &mut self.links
    }
}

impl Keyed for DemoNode {
    type Key = u32;

    fn key(&self) -> &u32 {
        &self.key
    }
}

enum Mode {
    Function,
    Performance { loops: usize },
}

fn usage(progname: &str) -> ExitCode {
    println!();
    println!("  Usage:");
    println!("  {progname} <test mode> <nodes number> [perf loops]");
    println!();
    println!("  options:");
    println!("  test mode    : 1 for function test, 2 for perf test.");
    println!("  nodes number : test nodes number, at least 3");
    println!("  perf loops   : perf loops, default is 1");
    println!();
    ExitCode::FAILURE
}

fn parse_params(args: &[String]) -> Option<(Mode, usize)> {
    if !(3..=4).contains(&args.len()) {
        return None;
    }

    let nodes: usize = args[2].parse().ok().filter(|&n| n >= 3)?;
    let mode = match (args[1].as_str(), args.get(3)) {
        ("1", None) => Mode::Function,
        ("2", None) => Mode::Performance { loops: 1 },
        ("2", Some(loops)) => Mode::Performance {
            loops: loops.parse().ok().filter(|&n| n >= 3)?,
        },
        _ => return None,
    };

    Some((mode, nodes))
}

fn random_keys(n: usize) -> Vec<u32> {
    let mut rng = rand::thread_rng();
    (0..n).map(|_| rng.gen_range(0..100_000)).collect()
}

fn color_tag(links: &Links<NodeId>) -> &'static str {
    match links.color() {
        Color::Black => "B",
        Color::Red => "R",
    }
}

/// Prints every node with its color and which child of its parent it is,
/// parents before children.
fn print_tree(tree: &RbTree<DemoNode>) {
    let Some(top) = tree.root() else {
        return;
    };

    let mut stack = vec![top];
    while let Some(id) = stack.pop() {
        let Some(node) = tree.get_id(id) else {
            continue;
        };
        let links = node.links();

        match links.parent().and_then(|p| tree.get_id(p)) {
            None => println!("{:>5}({}) is root", node.key, color_tag(links)),
            Some(parent) => {
                let side = if parent.links().left() == Some(id) {
                    "left"
                } else {
                    "right"
                };
                println!(
                    "{:>5}({}) is {:>5}'s {:>6} child",
                    node.key,
                    color_tag(links),
                    parent.key,
                    side
                );
            }
        }

        stack.extend(links.right());
        stack.extend(links.left());
    }
}

fn func_test(keys: &[u32]) {
    println!("-----------------------------------------------------------");
    println!("Test keys(nodes_num:{}, print_num:{}):", keys.len(), keys.len().min(50));
    for row in keys[..keys.len().min(50)].chunks(8) {
        let row: Vec<String> = row.iter().map(u32::to_string).collect();
        println!("{}", row.join(" "));
    }
    println!("--------------------Red Black Tree-------------------------");

    let mut tree = RbTree::new();
    for &key in keys {
        if let Err(err) = tree.insert(DemoNode {
            links: Links::new(),
            key,
        }) {
            log::info!("skipping key {key}: {err}");
        }
        println!("== Add node: {key}");
        println!("== Tree detail: ");
        print_tree(&tree);
        println!();
    }

    for &key in keys {
        tree.remove(&key);
        println!("== Del node: {key}");
        println!("== Tree detail: ");
        print_tree(&tree);
        println!();
    }

    if let Err(violation) = tree.check() {
        log::error!("tree broken after test: {violation}");
    }
}

fn perf_test(nodes: usize, loops: usize) {
    println!("-----------------------Perf test---------------------------");

    for i in 0..loops {
        let keys = random_keys(nodes);
        let mut tree = RbTree::new();

        let start = Instant::now();
        for &key in &keys {
            let _ = tree.insert(DemoNode {
                links: Links::new(),
                key,
            });
        }
        let insert_cost = start.elapsed();

        let start = Instant::now();
        for key in &keys {
            tree.remove(key);
        }
        let delete_cost = start.elapsed();

        println!(
            "[ rb]i:{i}, insert cost:{}, delete cost:{}.",
            nanos(insert_cost),
            nanos(delete_cost)
        );
        println!("-----------------------------------------------------------");
    }
}

fn nanos(d: Duration) -> String {
    format!("{}ns", d.as_nanos())
}

fn main() -> ExitCode {
    let _ = CombinedLogger::init(vec![TermLogger::new(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);

    let args: Vec<String> = std::env::args().collect();
    let progname = args
        .first()
        .and_then(|arg| arg.rsplit('/').next())
        .unwrap_or("rbtree-demo")
        .to_owned();

    let Some((mode, nodes)) = parse_params(&args) else {
        return usage(&progname);
    };

    let loops = match mode {
        Mode::Function => 1,
        Mode::Performance { loops } => loops,
    };
    println!("-----------------------------------------------------------");
    println!("                  Red Black Tree test demo                 ");
    println!(
        "      test mode    :     {} test",
        match mode {
            Mode::Function => "function",
            Mode::Performance { .. } => "performance",
        }
    );
    println!("      nodes number :     {nodes} ");
    println!("      perf loops   :     {loops} ");
    println!("-----------------------------------------------------------");

    match mode {
        Mode::Function => func_test(&random_keys(nodes)),
        Mode::Performance { loops } => perf_test(nodes, loops),
    }

    ExitCode::SUCCESS
}
