use clap::Parser;
use jag::prelude::*;
use rand::rngs::ThreadRng;
use rand::seq::IndexedRandom;
use rand::Rng;

/// A CLI tool to generate a random sample library of Joint Activity Graphs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated library JSON file to
    #[arg(short, long, default_value = "generated_library.json")]
    output: String,

    /// Number of leaf activities (no children)
    #[arg(long, default_value_t = 12)]
    leaves: usize,

    /// Number of composite activities built on top of the leaves
    #[arg(long, default_value_t = 6)]
    composites: usize,

    /// The maximum number of children per composite activity
    #[arg(long, default_value_t = 4)]
    max_children: usize,
}

const EXCHANGE_NAMES: &[&str] = &[
    "target", "position", "route", "status", "report", "threat", "signal", "payload",
];
const EXCHANGE_TYPES: &[&str] = &["string", "number", "boolean", "object"];
const VERBS: &[&str] = &[
    "Observe", "Assess", "Plan", "Navigate", "Report", "Secure", "Search", "Deliver",
];
const EXECUTIONS: &[Execution] = &[
    Execution::Sequential,
    Execution::Parallel,
    Execution::Retry,
    Execution::Loop,
    Execution::Overlap,
];

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.leaves == 0 {
        eprintln!("Error: --leaves must be at least 1");
        std::process::exit(1);
    }

    println!(
        "Generating library ({} leaves, {} composites, up to {} children each)...",
        cli.leaves, cli.composites, cli.max_children
    );

    let mut library = Library::new();
    let mut urns = Vec::new();

    for index in 0..cli.leaves {
        let urn = format!("urn:jag:gen:leaf-{}", index);
        library.create(random_activity(&mut rng, &urn, index)?)?;
        urns.push(urn);
    }
    println!("-> Generated {} leaf activities.", cli.leaves);

    // Composites only nest activities created before them, so the result is acyclic.
    for index in 0..cli.composites {
        let urn = format!("urn:jag:gen:composite-{}", index);
        let mut builder = Activity::builder(&urn, format!("Mission {}", index))
            .execution(*EXECUTIONS.choose(&mut rng).unwrap_or(&Execution::Sequential));
        for (name, ty) in random_exchanges(&mut rng) {
            builder = builder.input(name, ty);
        }
        for (name, ty) in random_exchanges(&mut rng) {
            builder = builder.output(name, ty);
        }
        library.create(builder.build()?)?;

        let count = rng.random_range(1..=cli.max_children.max(1));
        for _ in 0..count {
            if let Some(child) = urns.choose(&mut rng) {
                library.add_child(&urn, child)?;
            }
        }

        let bindings = random_bindings(&mut rng, &library, &urn);
        let added = bindings.len();
        if let Some(activity) = library.get_mut(&urn) {
            for binding in bindings {
                activity.add_binding(binding);
            }
        }
        println!("-> Generated '{}' with {} children and {} bindings.", urn, count, added);
        urns.push(urn);
    }

    library.save(&cli.output)?;
    println!(
        "Successfully generated and saved {} activities to '{}'",
        library.len(),
        cli.output
    );

    Ok(())
}

fn random_activity(
    rng: &mut ThreadRng,
    urn: &str,
    index: usize,
) -> std::result::Result<Activity, JagError> {
    let verb = VERBS.choose(rng).unwrap_or(&"Perform");
    let mut builder = Activity::builder(urn, format!("{} {}", verb, index))
        .description(format!("Generated activity #{}", index))
        .author("jag-gen")
        .expected_duration(rng.random_range(1.0..120.0));
    for (name, ty) in random_exchanges(rng) {
        builder = builder.input(name, ty);
    }
    for (name, ty) in random_exchanges(rng) {
        builder = builder.output(name, ty);
    }
    builder.build()
}

fn random_exchanges(rng: &mut ThreadRng) -> Vec<(String, String)> {
    let count = rng.random_range(0..=3);
    let names: Vec<&str> = EXCHANGE_NAMES.choose_multiple(rng, count).copied().collect();
    names
        .into_iter()
        .map(|name| {
            let ty = EXCHANGE_TYPES.choose(rng).unwrap_or(&"string");
            (name.to_string(), ty.to_string())
        })
        .collect()
}

/// Picks one legal provider, where any exist, for each child input and each own output.
fn random_bindings(rng: &mut ThreadRng, library: &Library, urn: &str) -> Vec<Binding> {
    let Some(activity) = library.resolve(urn) else {
        return Vec::new();
    };
    let mut bindings = Vec::new();

    for child in activity.children() {
        let Some(definition) = library.resolve(&child.urn) else {
            continue;
        };
        let providers = activity.inputs_to(&child.id, library);
        for input in definition.inputs() {
            if let Some(from) = providers.choose(rng) {
                bindings.push(Binding::new(from.clone(), input.rebased(child.id.as_str())));
            }
        }
    }

    let providers = activity.available_outputs(library);
    for output in activity.outputs() {
        if let Some(from) = providers.choose(rng) {
            bindings.push(Binding::new(from.clone(), output.rebased(THIS)));
        }
    }

    bindings
        .into_iter()
        .filter(|b| activity.is_legal_binding(b, library))
        .collect()
}
